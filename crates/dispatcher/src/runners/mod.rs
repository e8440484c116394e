//! Stage runner implementations

mod log;
mod process;
mod recording;

pub use log::LogRunner;
pub use process::ProcessRunner;
pub use recording::RecordingRunner;
