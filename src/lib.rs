//! Fan log records out to a colored terminal stream and a plain daily file, rotating the file at
//! local midnight.

pub mod config;
pub mod error;
pub mod logging;
pub mod rotation;
