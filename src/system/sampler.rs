use std::fmt;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Exit code reported when the listing command could not be spawned at all,
/// mirroring what a shell returns for a missing program.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Exit code reported when the listing command was terminated by a signal.
pub const SIGNALED_EXIT_CODE: i32 = -1;

/// Metric a process listing is ranked by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ranking {
    Cpu,
    Memory,
}

impl Ranking {
    pub const ALL: [Ranking; 2] = [Ranking::Cpu, Ranking::Memory];

    /// Sort field understood by `top -o`.
    pub fn sort_field(self) -> &'static str {
        match self {
            Ranking::Cpu => "%CPU",
            Ranking::Memory => "%MEM",
        }
    }
}

/// One of the three listing invocations performed per cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleKind {
    TaskSummary,
    Ranked(Ranking),
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleKind::TaskSummary => write!(f, "task-summary"),
            SampleKind::Ranked(Ranking::Cpu) => write!(f, "cpu-ranked"),
            SampleKind::Ranked(Ranking::Memory) => write!(f, "mem-ranked"),
        }
    }
}

/// Raw output of one listing invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sample {
    pub text: String,
    pub exit_code: i32,
}

impl Sample {
    pub fn ok(text: impl Into<String>) -> Self {
        Sample {
            text: text.into(),
            exit_code: 0,
        }
    }

    pub fn failed(exit_code: i32) -> Self {
        Sample {
            text: String::new(),
            exit_code,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Source of process-listing text. Implementations never fail: problems are
/// reported through [`Sample::exit_code`].
pub trait Sampler {
    fn sample(&mut self, kind: SampleKind) -> Sample;
}

/// Samples the host by running `top` in batch mode.
#[derive(Clone, Debug)]
pub struct TopSampler {
    command: String,
    delay: String,
    limit: usize,
}

impl TopSampler {
    pub fn new(command: impl Into<String>, delay: impl Into<String>, limit: usize) -> Self {
        TopSampler {
            command: command.into(),
            delay: delay.into(),
            limit,
        }
    }

    fn args(&self, kind: SampleKind) -> Vec<&str> {
        let mut args = vec!["-b", "-c"];
        if let SampleKind::Ranked(ranking) = kind {
            args.extend(["-o", ranking.sort_field()]);
        }
        args.extend(["-n", "1", "-d", self.delay.as_str()]);
        args
    }
}

impl Sampler for TopSampler {
    fn sample(&mut self, kind: SampleKind) -> Sample {
        // `output()` drains both pipes and reaps the child on every path.
        let output = match Command::new(&self.command)
            .args(self.args(kind))
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                warn!(command = %self.command, %kind, error = %err, "failed to spawn listing command");
                return Sample::failed(SPAWN_FAILURE_EXIT_CODE);
            }
        };

        let exit_code = output.status.code().unwrap_or(SIGNALED_EXIT_CODE);
        if exit_code != 0 {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                command = %self.command,
                %kind,
                exit_code,
                stderr = %stderr.trim(),
                "listing command exited with failure"
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = match kind {
            SampleKind::TaskSummary => select_task_line(&stdout).to_string(),
            SampleKind::Ranked(_) => select_ranked_rows(&stdout, self.limit),
        };
        debug!(%kind, exit_code, bytes = text.len(), "sampled");

        Sample { text, exit_code }
    }
}

/// The task counts live on the second line of `top` batch output.
pub fn select_task_line(output: &str) -> &str {
    output.lines().nth(1).unwrap_or("")
}

/// Strip the `%Cpu` aggregate lines and the six summary/header lines that
/// precede the process table, then keep the first `limit` rows.
pub fn select_ranked_rows(output: &str, limit: usize) -> String {
    output
        .lines()
        .filter(|line| !line.starts_with("%Cpu"))
        .skip(6)
        .take(limit)
        .collect::<Vec<_>>()
        .join("\n")
}
