#![doc = include_str!("../README.md")]
pub mod config;
pub mod error;
pub mod runtime;
pub mod throttle;
pub mod types;

pub use self::config::ThrottleConfig;
pub use self::error::{Error, Result};
pub use self::runtime::{Runtime, TokioRuntime};
#[cfg(feature = "smol")]
pub use self::runtime::SmolRuntime;
pub use self::throttle::{Call, Phase, Throttle};
pub use self::types::throttled::Throttleable;
