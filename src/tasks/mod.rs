//! Background Tasks Module
//!
//! Repeating tasks that run alongside request handling.
//!
//! # Tasks
//! - Cache cleanup: expiry sweep plus memory-pressure check
//! - Memory sampling: sample, trend, leak check, conditional reclaim

mod cleanup;
mod sampling;

pub use cleanup::spawn_cleanup_task;
pub use sampling::{spawn_sampling_task, start_monitoring, stop_monitoring};
