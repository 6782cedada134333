use crate::scenario::Scenario;
use anyhow::{anyhow, Context, Result};
use coalesce::{Throttle, ThrottleConfig, TokioRuntime};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::info;

/// Something observed while replaying a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// The simulated function started executing.
    Dispatch { at_ms: u64, value: u64 },
    /// A caller's result resolved.
    Outcome {
        caller: usize,
        issued_at_ms: u64,
        value: u64,
        resolved_at_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl Event {
    fn sort_key(&self) -> (u64, u8, usize) {
        match self {
            Self::Dispatch { at_ms, .. } => (*at_ms, 0, 0),
            Self::Outcome { resolved_at_ms, caller, .. } => (*resolved_at_ms, 1, *caller),
        }
    }
}

pub struct Runner {
    scenario: Scenario,
}

impl Runner {
    pub fn new(scenario: Scenario) -> Self {
        Self { scenario }
    }

    /// Issues every scheduled call and waits for all of them to resolve.
    pub async fn run(&self) -> Result<Vec<Event>> {
        let start = Instant::now();
        let dispatches = Arc::new(Mutex::new(Vec::new()));
        let throttle = self.throttle(start, dispatches.clone());

        let mut calls = self.scenario.calls.clone();
        calls.sort_by_key(|call| call.at_ms);
        info!(busy_ms = self.scenario.busy_ms, calls = calls.len(), "replaying scenario");
        let mut handles = Vec::with_capacity(calls.len());
        for (caller, scheduled) in calls.into_iter().enumerate() {
            sleep_until(start + Duration::from_millis(scheduled.at_ms)).await;
            let issued_at_ms = elapsed_ms(start);
            let call = throttle.call(scheduled.value);
            handles.push(tokio::spawn(async move {
                let outcome = call.await;
                let resolved_at_ms = elapsed_ms(start);
                let (result, error) = match outcome {
                    Ok(value) => (Some(value), None),
                    Err(err) => (None, Some(err.to_string())),
                };
                Event::Outcome {
                    caller,
                    issued_at_ms,
                    value: scheduled.value,
                    resolved_at_ms,
                    result,
                    error,
                }
            }));
        }

        let mut events = Vec::with_capacity(handles.len() * 2);
        for handle in handles {
            events.push(handle.await.context("caller task failed")?);
        }
        let mut dispatches = dispatches.lock().map_err(|_| anyhow!("dispatch log poisoned"))?;
        events.append(&mut dispatches);
        events.sort_by_key(Event::sort_key);
        Ok(events)
    }

    fn throttle(
        &self,
        start: Instant,
        dispatches: Arc<Mutex<Vec<Event>>>,
    ) -> Throttle<u64, u64, String> {
        let fail_on = self.scenario.fail_on.iter().copied().collect::<HashSet<_>>();
        let work = Duration::from_millis(self.scenario.work_ms);
        Throttle::with_config(
            move |value: u64| {
                if let Ok(mut dispatches) = dispatches.lock() {
                    dispatches.push(Event::Dispatch { at_ms: elapsed_ms(start), value });
                }
                let fails = fail_on.contains(&value);
                async move {
                    sleep(work).await;
                    if fails {
                        return Err(format!("simulated failure for {value}"));
                    }
                    value.checked_mul(10).ok_or_else(|| format!("simulated overflow for {value}"))
                }
            },
            ThrottleConfig::new(Duration::from_millis(self.scenario.busy_ms)).with_label("replay"),
            TokioRuntime,
        )
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
