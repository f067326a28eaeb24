//! Outbound command transport.
//!
//! The vehicle link itself lives outside this crate. Implementors translate
//! each call into whatever the link speaks; returning `Ok` is the
//! confirmation the dispatcher waits for before committing a takeoff or
//! landing.

use crossbeam_channel::Sender;

use crate::types::{Axis, Command, Direction};
use crate::{PilotError, Result};

/// Anything that can carry commands to the vehicle.
pub trait CommandSink {
    fn takeoff(&mut self) -> Result<()>;
    fn land(&mut self) -> Result<()>;
    fn hover(&mut self) -> Result<()>;
    fn move_axis(&mut self, axis: Axis, direction: Direction, speed: f64) -> Result<()>;

    /// Route a [`Command`] to the matching operation.
    fn send(&mut self, command: &Command) -> Result<()> {
        match *command {
            Command::Takeoff => self.takeoff(),
            Command::Land => self.land(),
            Command::Hover => self.hover(),
            Command::Move {
                axis,
                direction,
                speed,
            } => self.move_axis(axis, direction, speed),
        }
    }
}

impl<S: CommandSink + ?Sized> CommandSink for Box<S> {
    fn takeoff(&mut self) -> Result<()> {
        (**self).takeoff()
    }
    fn land(&mut self) -> Result<()> {
        (**self).land()
    }
    fn hover(&mut self) -> Result<()> {
        (**self).hover()
    }
    fn move_axis(&mut self, axis: Axis, direction: Direction, speed: f64) -> Result<()> {
        (**self).move_axis(axis, direction, speed)
    }
}

/// Keeps every command it is given. Used by tests and the C API.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub commands: Vec<Command>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

impl CommandSink for RecordingSink {
    fn takeoff(&mut self) -> Result<()> {
        self.commands.push(Command::Takeoff);
        Ok(())
    }
    fn land(&mut self) -> Result<()> {
        self.commands.push(Command::Land);
        Ok(())
    }
    fn hover(&mut self) -> Result<()> {
        self.commands.push(Command::Hover);
        Ok(())
    }
    fn move_axis(&mut self, axis: Axis, direction: Direction, speed: f64) -> Result<()> {
        self.commands.push(Command::Move {
            axis,
            direction,
            speed,
        });
        Ok(())
    }
}

/// Writes each command to the log. Consecutive hovers are logged once.
#[derive(Debug, Default)]
pub struct LoggingSink {
    hovering: bool,
}

impl LoggingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandSink for LoggingSink {
    fn takeoff(&mut self) -> Result<()> {
        self.hovering = false;
        log::info!("STATE: Taking Off");
        Ok(())
    }
    fn land(&mut self) -> Result<()> {
        self.hovering = false;
        log::info!("STATE: Landing");
        Ok(())
    }
    fn hover(&mut self) -> Result<()> {
        if !self.hovering {
            log::info!("STATE: Hovering");
        }
        self.hovering = true;
        Ok(())
    }
    fn move_axis(&mut self, axis: Axis, direction: Direction, speed: f64) -> Result<()> {
        self.hovering = false;
        let label = Command::Move {
            axis,
            direction,
            speed,
        }
        .label();
        log::info!("STATE: {}. SPEED: {}", label, speed);
        Ok(())
    }
}

/// Forwards commands to another thread, e.g. the one owning the radio link.
///
/// Fails once the receiving side is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<Command>,
}

impl ChannelSink {
    pub fn new(sender: Sender<Command>) -> Self {
        Self { sender }
    }

    fn push(&self, command: Command) -> Result<()> {
        self.sender
            .send(command)
            .map_err(|_| PilotError::Sink("command receiver dropped".into()))
    }
}

impl CommandSink for ChannelSink {
    fn takeoff(&mut self) -> Result<()> {
        self.push(Command::Takeoff)
    }
    fn land(&mut self) -> Result<()> {
        self.push(Command::Land)
    }
    fn hover(&mut self) -> Result<()> {
        self.push(Command::Hover)
    }
    fn move_axis(&mut self, axis: Axis, direction: Direction, speed: f64) -> Result<()> {
        self.push(Command::Move {
            axis,
            direction,
            speed,
        })
    }
}
