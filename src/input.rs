//! Input sources: where raw log lines come from.
//!
//! The core never blocks on I/O. A source hands over whatever complete
//! lines are available right now; follow mode simply asks again on the
//! next tick.

use anyhow::{Context, Result};
use memchr::memchr_iter;
use std::fs::File;
use std::io::{BufRead, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

/// A non-blocking line producer.
pub trait InputSource {
    /// Every line that arrived since the last call. Empty when nothing
    /// new is available.
    fn read_new_lines(&mut self) -> Result<Vec<String>>;

    /// Human-readable name for the header line.
    fn display_name(&self) -> &str;

    /// Rewind to the beginning of the source so the next read returns
    /// everything again.
    fn rewind(&mut self) -> Result<()>;
}

/// Tails a regular file from a remembered offset.
pub struct FileInput {
    file: File,
    name: String,
    /// Bytes read past the last emitted newline.
    pending: Vec<u8>,
}

impl FileInput {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let file =
            File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Ok(Self {
            file,
            name,
            pending: Vec::new(),
        })
    }
}

impl InputSource for FileInput {
    fn read_new_lines(&mut self) -> Result<Vec<String>> {
        let mut buf = Vec::new();
        self.file
            .read_to_end(&mut buf)
            .with_context(|| format!("failed to read {}", self.name))?;
        self.pending.extend_from_slice(&buf);

        let mut lines = Vec::new();
        let mut start = 0;
        for newline in memchr_iter(b'\n', &self.pending) {
            lines.push(String::from_utf8_lossy(&self.pending[start..newline]).into_owned());
            start = newline + 1;
        }
        self.pending.drain(..start);

        // We just hit EOF, so a trailing unterminated line is shown as
        // it stands; bytes appended later start a new line.
        if !self.pending.is_empty() {
            lines.push(String::from_utf8_lossy(&self.pending).into_owned());
            self.pending.clear();
        }

        Ok(lines)
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn rewind(&mut self) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(0))
            .with_context(|| format!("failed to rewind {}", self.name))?;
        self.pending.clear();
        Ok(())
    }
}

/// Reads piped stdin on a background thread; the core drains the
/// channel without blocking. All lines are retained so `rewind` can
/// replay the stream from memory.
pub struct StdinInput {
    rx: Receiver<String>,
    seen: Vec<String>,
    cursor: usize,
    name: String,
}

impl StdinInput {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });
        Self::from_receiver(rx)
    }

    fn from_receiver(rx: Receiver<String>) -> Self {
        Self {
            rx,
            seen: Vec::new(),
            cursor: 0,
            name: "stdin".to_string(),
        }
    }
}

impl InputSource for StdinInput {
    fn read_new_lines(&mut self) -> Result<Vec<String>> {
        while let Ok(line) = self.rx.try_recv() {
            self.seen.push(line);
        }
        let new = self.seen[self.cursor..].to_vec();
        self.cursor = self.seen.len();
        Ok(new)
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn rewind(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }
}
