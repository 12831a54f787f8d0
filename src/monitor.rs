use tracing::debug_span;

use crate::diagnostics::{DiagnosticStatus, Severity};
use crate::system::parser::{parse_process_rows, parse_task_summary};
use crate::system::record::{ProcessRecord, TaskSummary};
use crate::system::sampler::{Ranking, SampleKind, Sampler};

pub const OK_MESSAGE: &str = "OK";
pub const ERROR_MESSAGE: &str = "top-command Error";

/// Last exit code seen for each sample kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExitCodes {
    task: i32,
    cpu: i32,
    memory: i32,
}

impl ExitCodes {
    pub fn get(&self, kind: SampleKind) -> i32 {
        match kind {
            SampleKind::TaskSummary => self.task,
            SampleKind::Ranked(Ranking::Cpu) => self.cpu,
            SampleKind::Ranked(Ranking::Memory) => self.memory,
        }
    }

    fn set(&mut self, kind: SampleKind, code: i32) {
        match kind {
            SampleKind::TaskSummary => self.task = code,
            SampleKind::Ranked(Ranking::Cpu) => self.cpu = code,
            SampleKind::Ranked(Ranking::Memory) => self.memory = code,
        }
    }
}

/// Owns the latest task summary and the top-N process records per ranking.
pub struct ProcessMonitor<S> {
    sampler: S,
    process_num: usize,
    task: TaskSummary,
    cpu: Vec<ProcessRecord>,
    memory: Vec<ProcessRecord>,
    exit_codes: ExitCodes,
}

impl<S: Sampler> ProcessMonitor<S> {
    pub fn new(sampler: S, process_num: usize) -> Self {
        ProcessMonitor {
            sampler,
            process_num,
            task: TaskSummary::default(),
            cpu: vec![ProcessRecord::default(); process_num],
            memory: vec![ProcessRecord::default(); process_num],
            exit_codes: ExitCodes::default(),
        }
    }

    /// Sample the task summary, then the CPU ranking, then the memory ranking.
    pub fn update(&mut self) {
        let _span = debug_span!("monitor.update").entered();
        self.update_task();
        for ranking in Ranking::ALL {
            self.update_ranking(ranking);
        }
    }

    fn update_task(&mut self) {
        let kind = SampleKind::TaskSummary;
        let sample = self.sampler.sample(kind);
        self.exit_codes.set(kind, sample.exit_code);
        parse_task_summary(&sample.text, &mut self.task);
    }

    fn update_ranking(&mut self, ranking: Ranking) {
        let kind = SampleKind::Ranked(ranking);
        let sample = self.sampler.sample(kind);
        self.exit_codes.set(kind, sample.exit_code);

        let rows = parse_process_rows(&sample.text, self.process_num);
        // Slots past the parsed rows keep their previous contents.
        for (slot, row) in self.records_mut(ranking).iter_mut().zip(rows) {
            *slot = row;
        }
    }
}

impl<S> ProcessMonitor<S> {
    pub fn process_num(&self) -> usize {
        self.process_num
    }

    pub fn task_summary(&self) -> &TaskSummary {
        &self.task
    }

    pub fn records(&self, ranking: Ranking) -> &[ProcessRecord] {
        match ranking {
            Ranking::Cpu => &self.cpu,
            Ranking::Memory => &self.memory,
        }
    }

    fn records_mut(&mut self, ranking: Ranking) -> &mut [ProcessRecord] {
        match ranking {
            Ranking::Cpu => &mut self.cpu,
            Ranking::Memory => &mut self.memory,
        }
    }

    pub fn exit_codes(&self) -> ExitCodes {
        self.exit_codes
    }

    pub fn check_task(&self, status: &mut DiagnosticStatus) {
        summarize(status, self.exit_codes.get(SampleKind::TaskSummary));

        let task = &self.task;
        status.add("Total Tasks", task.total.as_str());
        status.add("Running Tasks", task.running.as_str());
        status.add("Sleeping Tasks", task.sleeping.as_str());
        status.add("Stopped Tasks", task.stopped.as_str());
        status.add("Zombie Tasks", task.zombie.as_str());
    }

    pub fn check_process(&self, ranking: Ranking, index: usize, status: &mut DiagnosticStatus) {
        summarize(status, self.exit_codes.get(SampleKind::Ranked(ranking)));

        let empty = ProcessRecord::default();
        let proc = self.records(ranking).get(index).unwrap_or(&empty);
        status.add("Process Name", proc.name.as_str());
        status.add("Process ID", proc.pid.as_str());
        status.add("Process User", proc.user.as_str());
        status.add("Process Priority", proc.priority.as_str());
        status.add("Process Nice Value", proc.nice.as_str());
        status.add("Process Virtual Image", proc.virtual_size.as_str());
        status.add("Process Resident Size", proc.resident_size.as_str());
        status.add("Process Shared Mem Size", proc.shared_size.as_str());
        status.add("Process Status", proc.status.as_str());
        status.add("Process %CPU", proc.cpu_percent.as_str());
        status.add("Process %MEM", proc.mem_percent.as_str());
        status.add("Process Time", proc.time.as_str());
    }
}

fn summarize(status: &mut DiagnosticStatus, exit_code: i32) {
    if exit_code != 0 {
        status.summary(Severity::Error, ERROR_MESSAGE);
    } else {
        status.summary(Severity::Ok, OK_MESSAGE);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::system::sampler::Sample;

    #[derive(Default)]
    struct ScriptedSampler {
        samples: HashMap<SampleKind, Sample>,
        calls: Vec<SampleKind>,
    }

    impl Sampler for ScriptedSampler {
        fn sample(&mut self, kind: SampleKind) -> Sample {
            self.calls.push(kind);
            self.samples.get(&kind).cloned().unwrap_or_default()
        }
    }

    const CPU_ROWS: &str = "\
4242 alice 20 0 1623456 121000 80000 R 99.0 0.8 1:02.03 stress
1337 bob 20 0 512000 64000 32000 S 12.5 0.4 0:10.00 firefox";

    fn scripted(task: Sample, cpu: Sample, memory: Sample) -> ScriptedSampler {
        let mut sampler = ScriptedSampler::default();
        sampler.samples.insert(SampleKind::TaskSummary, task);
        sampler.samples.insert(SampleKind::Ranked(Ranking::Cpu), cpu);
        sampler.samples.insert(SampleKind::Ranked(Ranking::Memory), memory);
        sampler
    }

    #[test]
    fn update_samples_in_fixed_order() {
        let mut monitor = ProcessMonitor::new(ScriptedSampler::default(), 2);
        monitor.update();
        assert_eq!(
            monitor.sampler.calls,
            vec![
                SampleKind::TaskSummary,
                SampleKind::Ranked(Ranking::Cpu),
                SampleKind::Ranked(Ranking::Memory),
            ]
        );
    }

    #[test]
    fn records_default_to_empty_before_first_sample() {
        let monitor = ProcessMonitor::new(ScriptedSampler::default(), 3);
        assert_eq!(monitor.records(Ranking::Cpu).len(), 3);
        assert!(monitor.records(Ranking::Memory).iter().all(|r| r.name.is_empty()));

        let mut status = DiagnosticStatus::new("High-load Proc[1]", "host");
        monitor.check_process(Ranking::Cpu, 0, &mut status);
        assert_eq!(status.level, Severity::Ok);
        assert_eq!(status.values.len(), 12);
        assert!(status.values.iter().all(|kv| kv.value.is_empty()));
    }

    #[test]
    fn task_error_keeps_stale_fields() {
        let ok = Sample::ok("Tasks: 120 total, 3 running, 115 sleeping, 2 stopped, 0 zombie");
        let mut monitor = ProcessMonitor::new(
            scripted(ok, Sample::ok(CPU_ROWS), Sample::ok(CPU_ROWS)),
            2,
        );
        monitor.update();

        monitor
            .sampler
            .samples
            .insert(SampleKind::TaskSummary, Sample::failed(1));
        monitor.update();

        let mut status = DiagnosticStatus::new("Task Status", "host");
        monitor.check_task(&mut status);
        assert_eq!(status.level, Severity::Error);
        assert_eq!(status.message, ERROR_MESSAGE);
        assert_eq!(status.value("Total Tasks"), Some("120"));
        assert_eq!(status.value("Zombie Tasks"), Some("0"));
    }

    #[test]
    fn rankings_fail_independently() {
        let mut monitor = ProcessMonitor::new(
            scripted(Sample::ok(""), Sample::failed(2), Sample::ok(CPU_ROWS)),
            2,
        );
        monitor.update();

        let mut cpu = DiagnosticStatus::new("High-load Proc[1]", "host");
        monitor.check_process(Ranking::Cpu, 0, &mut cpu);
        let mut mem = DiagnosticStatus::new("High-mem Proc[1]", "host");
        monitor.check_process(Ranking::Memory, 0, &mut mem);

        assert_eq!(cpu.level, Severity::Error);
        assert_eq!(mem.level, Severity::Ok);
        assert_eq!(mem.value("Process Name"), Some("stress"));
        assert_eq!(monitor.exit_codes().get(SampleKind::Ranked(Ranking::Cpu)), 2);
        assert_eq!(monitor.exit_codes().get(SampleKind::Ranked(Ranking::Memory)), 0);
    }

    #[test]
    fn failed_sample_text_is_still_parsed() {
        let failed = |text: &str| Sample {
            text: text.to_string(),
            exit_code: 1,
        };
        let mut monitor = ProcessMonitor::new(
            scripted(
                failed("Tasks: 9 total, 1 running"),
                failed(CPU_ROWS),
                Sample::ok(""),
            ),
            2,
        );
        monitor.update();

        let mut cpu = DiagnosticStatus::new("High-load Proc[1]", "host");
        monitor.check_process(Ranking::Cpu, 0, &mut cpu);
        assert_eq!(cpu.level, Severity::Error);
        assert_eq!(cpu.value("Process Name"), Some("stress"));
        assert_eq!(cpu.value("Process ID"), Some("4242"));

        let mut task = DiagnosticStatus::new("Task Status", "host");
        monitor.check_task(&mut task);
        assert_eq!(task.level, Severity::Error);
        assert_eq!(task.value("Total Tasks"), Some("9"));
    }

    #[test]
    fn short_sample_keeps_older_slots() {
        let mut monitor = ProcessMonitor::new(
            scripted(Sample::ok(""), Sample::ok(CPU_ROWS), Sample::ok(CPU_ROWS)),
            2,
        );
        monitor.update();

        let one_row = "7 carol 20 0 1 2 3 R 50.0 0.1 0:00.10 make";
        monitor
            .sampler
            .samples
            .insert(SampleKind::Ranked(Ranking::Cpu), Sample::ok(one_row));
        monitor.update();

        let names: Vec<&str> = monitor
            .records(Ranking::Cpu)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["make", "firefox"]);
    }

    #[test]
    fn process_check_reports_fields_in_order() {
        let mut monitor = ProcessMonitor::new(
            scripted(Sample::ok(""), Sample::ok(CPU_ROWS), Sample::ok("")),
            2,
        );
        monitor.update();

        let mut status = DiagnosticStatus::new("High-load Proc[2]", "host");
        monitor.check_process(Ranking::Cpu, 1, &mut status);
        let pairs: Vec<(&str, &str)> = status
            .values
            .iter()
            .map(|kv| (kv.key.as_str(), kv.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Process Name", "firefox"),
                ("Process ID", "1337"),
                ("Process User", "bob"),
                ("Process Priority", "20"),
                ("Process Nice Value", "0"),
                ("Process Virtual Image", "512000"),
                ("Process Resident Size", "64000"),
                ("Process Shared Mem Size", "32000"),
                ("Process Status", "S"),
                ("Process %CPU", "12.5"),
                ("Process %MEM", "0.4"),
                ("Process Time", "0:10.00"),
            ]
        );
    }
}
