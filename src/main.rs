use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;
use tailgrid::app::App;
use tailgrid::input::{FileInput, InputSource, StdinInput};
use tailgrid::tui;

/// Follow-mode tick: how long to wait for a key before checking the
/// source for new lines.
const FOLLOW_POLL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "tailgrid")]
#[command(about = "A schema-aware terminal viewer for structured JSON logs", long_about = None)]
struct Args {
    /// Log file to view (reads stdin when omitted and input is piped)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Start with follow mode disabled
    #[arg(short = 'n', long = "no-follow")]
    no_follow: bool,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    // Validate the source before touching the terminal; a bad path is
    // the only fatal error class.
    let input = match build_input(&args) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(1);
        }
    };

    info!("starting viewer, source={}", input.display_name());

    let mut app = App::new(input, !args.no_follow);
    app.update_entries()?;

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!("viewer loop failed: {:?}", err);
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    info!("exiting viewer");
    Ok(())
}

fn build_input(args: &Args) -> Result<Box<dyn InputSource>> {
    match &args.file {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("log file '{}' not found", path.display());
            }
            if !path.is_file() {
                anyhow::bail!("'{}' is not a file", path.display());
            }
            Ok(Box::new(FileInput::open(path)?))
        }
        None => {
            if io::stdin().is_terminal() {
                anyhow::bail!(
                    "no log file given and nothing piped to stdin\nUsage: tailgrid <FILE>  or  command | tailgrid"
                );
            }
            Ok(Box::new(StdinInput::spawn()))
        }
    }
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let size = terminal.size()?;
    app.on_resize(size.width, size.height);

    loop {
        if app.redraw.any() {
            terminal.draw(|f| tui::render(f, app))?;
            app.redraw.clear();
        }

        // While following, time out so new data is picked up; otherwise
        // block until the user presses a key.
        let has_event = if app.state.follow_mode() {
            event::poll(FOLLOW_POLL)?
        } else {
            true
        };

        if has_event {
            match event::read()? {
                Event::Key(key) => app.handle_key(key)?,
                Event::Resize(width, height) => app.on_resize(width, height),
                _ => {}
            }
        } else {
            app.update_entries()?;
        }

        if app.should_quit {
            break;
        }
        app.state.clear_changes();
    }

    Ok(())
}

/// Logging goes to the file named by TAILGRID_LOG; the TUI owns the
/// terminal, so without it logging stays off.
fn init_logging() {
    if let Ok(path) = std::env::var("TAILGRID_LOG") {
        if let Ok(file) = std::fs::File::create(&path) {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
    }
}
