use crate::action::Action;
use crate::level::{Level, LevelError};
use crate::state::State;
use crate::topology::Topology;
use std::io::{self, BufRead, Write};

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Server closed the connection before acknowledging {action}")]
    Closed { action: Action },
    #[error("Server responded with {response} to the inapplicable action: {action}")]
    Rejected {
        action: Action,
        response: String,
        /// Zero-based position of the action in the plan.
        step: usize,
    },
}

/// Line-oriented connection to the environment: it sends the level, then
/// acknowledges each action line with a response line.
pub struct Server<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Server<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Server { reader, writer }
    }

    pub fn read_level(&mut self) -> Result<Level, LevelError> {
        Level::from_reader(&mut self.reader)
    }

    /// Send every action of `plan` and wait for its acknowledgement. Stops at
    /// the first action the server rejects.
    pub fn execute(&mut self, level: &Level, plan: &[Action]) -> Result<(), ExecutionError> {
        let mut state = level.initial.clone();
        let mut response = String::new();

        for (step, &action) in plan.iter().enumerate() {
            writeln!(self.writer, "{}", action)?;
            self.writer.flush()?;

            response.clear();
            if self.reader.read_line(&mut response)? == 0 {
                return Err(ExecutionError::Closed { action });
            }

            let response = response.trim_end();
            if response.contains("false") {
                tracing::error!(
                    "{} was attempted in\n{}",
                    action,
                    level.topology.render(&state)
                );
                return Err(ExecutionError::Rejected {
                    action,
                    response: response.to_string(),
                    step,
                });
            }

            track(&level.topology, &mut state, action);
        }
        Ok(())
    }
}

/// Follow an action the server accepted. Returns false and leaves `state`
/// unchanged if the action does not apply to it.
fn track(topology: &Topology, state: &mut State, action: Action) -> bool {
    match state.apply(topology, action) {
        Some(next) => {
            *state = next;
            true
        }
        None => {
            tracing::warn!(
                "Server accepted {} which is not applicable in\n{}",
                action,
                topology.render(state)
            );
            false
        }
    }
}
