use std::future::Future;
use std::time::Duration;

use color_eyre::Result;
use tokio::time::MissedTickBehavior;
use tracing::warn;

use crate::diagnostics::{DiagnosticArray, Publisher, Updater};
use crate::monitor::ProcessMonitor;
use crate::system::sampler::{Ranking, Sampler};

pub const TASK_CHECK_NAME: &str = "Task Status";

/// Diagnostic name for the 0-based `index` slot of a ranking. Consumers key
/// off these names, so they must not change.
pub fn process_check_name(ranking: Ranking, index: usize) -> String {
    let prefix = match ranking {
        Ranking::Cpu => "High-load",
        Ranking::Memory => "High-mem",
    };
    format!("{prefix} Proc[{}]", index + 1)
}

/// Binds a monitor to an updater with one check per task summary and per
/// ranked slot.
pub struct Reporter<S> {
    monitor: ProcessMonitor<S>,
    updater: Updater<ProcessMonitor<S>>,
}

impl<S: Sampler + 'static> Reporter<S> {
    pub fn new(
        monitor: ProcessMonitor<S>,
        hardware_id: impl Into<String>,
        publisher: Box<dyn Publisher>,
    ) -> Self {
        let mut updater = Updater::new(hardware_id, publisher);
        register_checks(&mut updater, monitor.process_num());
        Reporter { monitor, updater }
    }

    /// One full cycle: sample everything, then publish every check.
    pub fn tick(&mut self) -> Result<DiagnosticArray> {
        self.monitor.update();
        self.updater.publish(&self.monitor)
    }

    /// Tick every `period` until `shutdown` resolves. Shutdown is checked
    /// before each tick, so a pending signal is never delayed by a cycle.
    pub async fn run_until<F: Future>(&mut self, period: Duration, shutdown: F) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    if let Err(err) = self.tick() {
                        warn!(error = %err, "failed to publish diagnostics");
                    }
                }
            }
        }
    }

    pub fn monitor(&self) -> &ProcessMonitor<S> {
        &self.monitor
    }

    pub fn updater(&self) -> &Updater<ProcessMonitor<S>> {
        &self.updater
    }
}

pub fn register_checks<S: Sampler + 'static>(
    updater: &mut Updater<ProcessMonitor<S>>,
    process_num: usize,
) {
    updater.add(TASK_CHECK_NAME, |monitor: &ProcessMonitor<S>, status| {
        monitor.check_task(status)
    });
    for ranking in Ranking::ALL {
        for index in 0..process_num {
            updater.add(
                process_check_name(ranking, index),
                move |monitor: &ProcessMonitor<S>, status| {
                    monitor.check_process(ranking, index, status)
                },
            );
        }
    }
}
