use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// A schedule of calls to replay against a throttled function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Busy window length.
    pub busy_ms: u64,
    /// How long each execution of the simulated function takes.
    pub work_ms: u64,
    /// Values the simulated function fails for.
    pub fail_on: Vec<u64>,
    pub calls: Vec<ScheduledCall>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self { busy_ms: 100, work_ms: 0, fail_on: Vec::new(), calls: Vec::new() }
    }
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {path:?}"))?;
        serde_json::from_str(&content).with_context(|| format!("invalid scenario {path:?}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledCall {
    /// Offset from the start of the replay.
    pub at_ms: u64,
    pub value: u64,
}

impl FromStr for ScheduledCall {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (at, value) = s.split_once(':').ok_or(r#"call must be formatted as "AT_MS:VALUE""#)?;
        Ok(Self {
            at_ms: at.trim().parse().map_err(|e| format!("invalid call time {at:?}: {e}"))?,
            value: value.trim().parse().map_err(|e| format!("invalid call value {value:?}: {e}"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scheduled_call() {
        assert_eq!("30:2".parse::<ScheduledCall>(), Ok(ScheduledCall { at_ms: 30, value: 2 }));
        assert_eq!(" 0 : 7 ".parse::<ScheduledCall>(), Ok(ScheduledCall { at_ms: 0, value: 7 }));
        assert!("30".parse::<ScheduledCall>().is_err());
        assert!("x:2".parse::<ScheduledCall>().is_err());
        assert!("30:-1".parse::<ScheduledCall>().is_err());
    }

    #[test]
    fn test_deserialize_scenario() {
        let scenario = serde_json::from_str::<Scenario>(
            r#"{"work_ms": 5, "calls": [{"at_ms": 0, "value": 1}, {"at_ms": 30, "value": 2}]}"#,
        )
        .expect("failed to deserialize");
        assert_eq!(
            scenario,
            Scenario {
                busy_ms: 100,
                work_ms: 5,
                fail_on: Vec::new(),
                calls: vec![
                    ScheduledCall { at_ms: 0, value: 1 },
                    ScheduledCall { at_ms: 30, value: 2 }
                ],
            }
        );
    }
}
