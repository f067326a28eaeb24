//! Frame dispatcher: the rolling two-frame window and the commit point for
//! flight state.

use crate::config::PilotConfig;
use crate::flight;
use crate::motion;
use crate::sink::CommandSink;
use crate::types::{Command, FlightState, Frame};
use crate::Result;

/// The two most recent frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameWindow {
    pub previous: Option<Frame>,
    pub current: Option<Frame>,
}

impl FrameWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift `current` into `previous` and install `frame`.
    pub fn advance(self, frame: Frame) -> FrameWindow {
        FrameWindow {
            previous: self.current,
            current: Some(frame),
        }
    }
}

/// Feeds frames through the takeoff/land machine and motion derivation and
/// forwards the resulting commands to a sink.
///
/// Frames must arrive in capture order through [`Dispatcher::on_frame`];
/// holding `&mut self` for the whole cycle is the only synchronisation the
/// pilot needs.
pub struct Dispatcher<S: CommandSink> {
    config: PilotConfig,
    state: FlightState,
    window: FrameWindow,
    sink: S,
}

impl<S: CommandSink> Dispatcher<S> {
    /// Build a dispatcher, rejecting an unusable configuration.
    pub fn new(config: PilotConfig, sink: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: FlightState::Landed,
            window: FrameWindow::new(),
            sink,
        })
    }

    /// Process one frame and return the commands delivered to the sink.
    ///
    /// A takeoff or landing only changes the flight state once the sink has
    /// accepted it; on sink failure the error is returned and the state is
    /// left as it was. A malformed hand fails the motion step but keeps any
    /// state change already committed this cycle, and the sink is told to
    /// hover before the error is returned.
    pub fn on_frame(&mut self, frame: Frame) -> Result<Vec<Command>> {
        let window = std::mem::take(&mut self.window);
        self.window = window.advance(frame);

        let (current, previous) = match (&self.window.current, &self.window.previous) {
            (Some(current), previous) => (current, previous.as_ref()),
            (None, _) => return Ok(Vec::new()),
        };
        log::trace!(
            "frame {} at {}us: {} hand(s), {} gesture(s)",
            current.id,
            current.timestamp_us,
            current.hands.len(),
            current.gestures.len()
        );

        let mut delivered = Vec::new();

        let (next, command) = flight::transition(self.state, current.primary_gesture(), &self.config);
        if let Some(command) = command {
            if let Err(e) = self.sink.send(&command) {
                log::warn!(
                    "Sink rejected {:?}, staying {}: {}",
                    command,
                    self.state.as_str(),
                    e
                );
                return Err(e);
            }
            delivered.push(command);
        }
        if next != self.state {
            log::info!("STATE: {} -> {}", self.state.as_str(), next.as_str());
            self.state = next;
        }

        let motion = match motion::derive(
            self.state,
            previous.and_then(Frame::primary_hand),
            current.primary_hand(),
            &self.config,
        ) {
            Ok(commands) => commands,
            Err(e) => {
                // Stop whatever motion was last commanded.
                if let Err(sink_err) = self.sink.send(&Command::Hover) {
                    log::warn!("Sink rejected fallback hover: {}", sink_err);
                }
                return Err(e);
            }
        };
        for command in motion {
            self.sink.send(&command)?;
            if command.is_move() {
                log::debug!("{}", command.label());
            }
            delivered.push(command);
        }

        Ok(delivered)
    }

    pub fn state(&self) -> FlightState {
        self.state
    }

    pub fn window(&self) -> &FrameWindow {
        &self.window
    }

    pub fn config(&self) -> &PilotConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the dispatcher and hand back its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
