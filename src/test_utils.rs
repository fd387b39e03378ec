use crate::input::InputSource;
use anyhow::Result;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Shared handle tests use to feed lines into a [`ScriptedInput`].
pub type LinesHandle = Rc<RefCell<VecDeque<String>>>;

/// Mock InputSource for testing — lines are pushed through a shared
/// queue and replayable on rewind, like the stdin source.
pub struct ScriptedInput {
    queue: LinesHandle,
    seen: Vec<String>,
    cursor: usize,
}

/// Build a scripted source plus the handle used to append lines to it.
pub fn scripted_input() -> (ScriptedInput, LinesHandle) {
    let queue: LinesHandle = Rc::new(RefCell::new(VecDeque::new()));
    let input = ScriptedInput {
        queue: queue.clone(),
        seen: Vec::new(),
        cursor: 0,
    };
    (input, queue)
}

impl InputSource for ScriptedInput {
    fn read_new_lines(&mut self) -> Result<Vec<String>> {
        while let Some(line) = self.queue.borrow_mut().pop_front() {
            self.seen.push(line);
        }
        let new = self.seen[self.cursor..].to_vec();
        self.cursor = self.seen.len();
        Ok(new)
    }

    fn display_name(&self) -> &str {
        "scripted"
    }

    fn rewind(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }
}
