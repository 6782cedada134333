use crate::scenario::{Scenario, ScheduledCall};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub enum Command {
    /// Replay a timed schedule of calls against a throttled function.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// JSON scenario file. Options given on the command line override its fields
    #[arg(short, long)]
    pub(crate) scenario: Option<PathBuf>,
    /// Busy window length in milliseconds
    #[arg(short, long)]
    pub(crate) busy_ms: Option<u64>,
    /// Execution time of the simulated function in milliseconds
    #[arg(short, long)]
    pub(crate) work_ms: Option<u64>,
    /// Values the simulated function fails for
    #[arg(short, long)]
    pub(crate) fail_on: Vec<u64>,
    /// Call to issue, as AT_MS:VALUE
    #[arg(short, long = "call", value_parser)]
    pub(crate) calls: Vec<ScheduledCall>,
}

impl ReplayArgs {
    pub fn scenario(&self) -> Result<Scenario> {
        let mut scenario = match &self.scenario {
            Some(path) => Scenario::load(path)?,
            None => Scenario::default(),
        };
        if let Some(busy_ms) = self.busy_ms {
            scenario.busy_ms = busy_ms;
        }
        if let Some(work_ms) = self.work_ms {
            scenario.work_ms = work_ms;
        }
        if !self.fail_on.is_empty() {
            scenario.fail_on = self.fail_on.clone();
        }
        if !self.calls.is_empty() {
            scenario.calls = self.calls.clone();
        }
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[test]
    fn test_replay_args() {
        let cli = Cli::try_parse_from([
            "coalesce-cli",
            "replay",
            "--busy-ms",
            "50",
            "--call",
            "0:1",
            "--call",
            "30:2",
            "--fail-on",
            "2",
        ])
        .expect("failed to parse");
        let Command::Replay(args) = cli.command;
        let scenario = args.scenario().expect("failed to build scenario");
        assert_eq!(scenario.busy_ms, 50);
        assert_eq!(scenario.work_ms, 0);
        assert_eq!(scenario.fail_on, vec![2]);
        assert_eq!(
            scenario.calls,
            vec![ScheduledCall { at_ms: 0, value: 1 }, ScheduledCall { at_ms: 30, value: 2 }]
        );
    }

    #[test]
    fn test_invalid_call() {
        assert!(Cli::try_parse_from(["coalesce-cli", "replay", "--call", "soon"]).is_err());
    }
}
