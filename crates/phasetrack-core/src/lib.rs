pub mod config;
pub mod context;
pub mod error;
pub mod io;
pub mod lifecycle;
pub mod paths;
pub mod phase;
pub mod progress;
pub mod report;
pub mod store;
pub mod task;
pub mod timestamp;
pub mod types;

pub use error::{PhasetrackError, Result};
