#![forbid(unsafe_code)]

pub mod catalog;
pub mod countdown;
pub mod error;
pub mod format;
pub mod heatmap;
pub mod message;
pub mod model;
pub mod scheduler;
pub mod time;

pub use error::Error;
pub use time::Clock;
