mod commands;
mod runner;
pub mod scenario;

pub use crate::commands::{Command, ReplayArgs};
pub use crate::runner::{Event, Runner};
pub use crate::scenario::{Scenario, ScheduledCall};
