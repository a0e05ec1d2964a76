//! spotter-node: hosts the color object locator as a periodic service
//!
//! Frames and calibration arrive over channels (or directly through the
//! shared [`InputSlots`]); at a fixed rate the latest color/depth pair is
//! located and every detection is published as a stamped point.

pub mod config;
pub mod error;
pub mod node;
pub mod sink;
pub mod slots;

pub use config::NodeConfig;
pub use error::NodeError;
pub use node::{NodeInputs, ObjectSpotter, SpotterStats};
pub use sink::{CandidateSink, ChannelSink};
pub use slots::InputSlots;
