//! Command execution - validate, execute, journal

use crate::command::{CommandContext, DiplomacyCommand, Rejection};

/// Lifecycle of a single command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandState {
    Constructed,
    Validated,
    Executed,
    Rejected(Rejection),
    /// Validated, but execution did not apply
    Failed,
}

/// A command together with where it is in its lifecycle
#[derive(Debug, Clone)]
pub struct TrackedCommand {
    command: DiplomacyCommand,
    state: CommandState,
}

impl TrackedCommand {
    pub fn new(command: DiplomacyCommand) -> Self {
        Self {
            command,
            state: CommandState::Constructed,
        }
    }

    pub fn command(&self) -> &DiplomacyCommand {
        &self.command
    }

    pub fn state(&self) -> &CommandState {
        &self.state
    }

    /// Constructed -> Validated | Rejected
    pub fn validate(&mut self, ctx: &CommandContext) -> std::result::Result<(), Rejection> {
        if self.state != CommandState::Constructed {
            return match &self.state {
                CommandState::Rejected(reason) => Err(reason.clone()),
                _ => Ok(()),
            };
        }
        match self.command.validate(ctx) {
            Ok(()) => {
                self.state = CommandState::Validated;
                Ok(())
            }
            Err(reason) => {
                self.state = CommandState::Rejected(reason.clone());
                Err(reason)
            }
        }
    }

    /// Validated -> Executed | Failed; refuses to run from any other state
    pub fn execute(&mut self, ctx: &mut CommandContext) -> bool {
        if self.state != CommandState::Validated {
            return false;
        }
        let applied = self.command.execute(ctx);
        self.state = if applied {
            CommandState::Executed
        } else {
            CommandState::Failed
        };
        applied
    }
}

/// Result of submitting a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Executed,
    Rejected(Rejection),
    Failed,
}

impl CommandOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, CommandOutcome::Executed)
    }
}

/// Runs commands and journals the ones that applied
///
/// The journal is the concatenated wire encoding of executed commands, so
/// replaying it against the same starting state, advancing the calendar to
/// each command's tick, reproduces the same result.
#[derive(Debug, Clone, Default)]
pub struct CommandProcessor {
    journal: Vec<u8>,
    executed: usize,
    rejected: usize,
}

impl CommandProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, command: DiplomacyCommand, ctx: &mut CommandContext) -> CommandOutcome {
        let mut tracked = TrackedCommand::new(command);

        if let Err(reason) = tracked.validate(ctx) {
            tracing::debug!("{} rejected at tick {}: {}", command.name(), command.tick(), reason);
            self.rejected += 1;
            return CommandOutcome::Rejected(reason);
        }

        if !tracked.execute(ctx) {
            tracing::warn!("{} failed at tick {}", command.name(), command.tick());
            return CommandOutcome::Failed;
        }

        command.encode(&mut self.journal);
        self.executed += 1;
        tracing::debug!("{} executed at tick {}", command.name(), command.tick());
        CommandOutcome::Executed
    }

    pub fn journal(&self) -> &[u8] {
        &self.journal
    }

    pub fn executed_count(&self) -> usize {
        self.executed
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }
}
