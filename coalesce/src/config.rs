use std::time::Duration;

/// Settings for a [`Throttle`](crate::Throttle).
#[derive(Clone, Debug, Default)]
pub struct ThrottleConfig {
    /// Length of each busy window. `Duration::ZERO` coalesces calls made within one scheduler tick.
    pub busy_time: Duration,
    /// Name attached to log events, to tell throttles apart.
    pub label: Option<String>,
}

impl ThrottleConfig {
    pub fn new(busy_time: Duration) -> Self {
        Self { busy_time, label: None }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl From<Duration> for ThrottleConfig {
    fn from(busy_time: Duration) -> Self {
        Self::new(busy_time)
    }
}
