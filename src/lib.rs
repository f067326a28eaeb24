//! # handpilot - hand-gesture flight control core
//!
//! Turns a stream of hand-tracking frames (Leap Motion) into drone commands:
//! - Circle gestures arm, take off and land through a small state machine
//! - An open hand steers: palm height for altitude, thumb for lateral and
//!   middle finger for forward/back motion
//! - Anything ambiguous (no hand, closed hand, no baseline) hovers
//! - Leap WebSocket JSON decoding, a background dispatch thread and a C FFI
//!
//! ## Quick Start
//! ```no_run
//! use handpilot::{protocol, Dispatcher, LoggingSink, PilotConfig};
//!
//! let mut pilot = Dispatcher::new(PilotConfig::default(), LoggingSink::new()).unwrap();
//! let msg = r#"{"id":1,"timestamp":0,"hands":[],"pointables":[],"gestures":[]}"#;
//! if let Some(frame) = protocol::decode_message(msg).unwrap() {
//!     let commands = pilot.on_frame(frame).unwrap();
//!     println!("{:?} -> {:?}", pilot.state(), commands);
//! }
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod metrics;
pub mod flight;
pub mod motion;
pub mod sink;
pub mod dispatcher;
pub mod protocol;
pub mod pilot;
pub mod ffi;

#[cfg(test)]
mod testutil;

pub use error::PilotError;
pub use types::*;
pub use config::PilotConfig;
pub use dispatcher::{Dispatcher, FrameWindow};
pub use sink::{ChannelSink, CommandSink, LoggingSink, RecordingSink};
pub use pilot::{DispatchReport, PilotThread};

/// Result type alias for handpilot operations.
pub type Result<T> = std::result::Result<T, PilotError>;
