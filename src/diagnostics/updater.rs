use std::time::{SystemTime, UNIX_EPOCH};

use color_eyre::Result;

use super::{DiagnosticArray, DiagnosticStatus, Publisher};

type CheckFn<T> = Box<dyn Fn(&T, &mut DiagnosticStatus)>;

struct Check<T> {
    name: String,
    run: CheckFn<T>,
}

/// Holds named checks over a source `T` and publishes their results together.
pub struct Updater<T> {
    hardware_id: String,
    checks: Vec<Check<T>>,
    publisher: Box<dyn Publisher>,
}

impl<T> Updater<T> {
    pub fn new(hardware_id: impl Into<String>, publisher: Box<dyn Publisher>) -> Self {
        Updater {
            hardware_id: hardware_id.into(),
            checks: Vec::new(),
            publisher,
        }
    }

    pub fn hardware_id(&self) -> &str {
        &self.hardware_id
    }

    pub fn add<F>(&mut self, name: impl Into<String>, check: F)
    where
        F: Fn(&T, &mut DiagnosticStatus) + 'static,
    {
        self.checks.push(Check {
            name: name.into(),
            run: Box::new(check),
        });
    }

    pub fn check_names(&self) -> impl Iterator<Item = &str> {
        self.checks.iter().map(|c| c.name.as_str())
    }

    /// Run every check against `source` in registration order.
    pub fn collect(&self, source: &T) -> DiagnosticArray {
        let status = self
            .checks
            .iter()
            .map(|check| {
                let mut status = DiagnosticStatus::new(&check.name, &self.hardware_id);
                (check.run)(source, &mut status);
                status
            })
            .collect();

        DiagnosticArray {
            stamp_ms: now_ms(),
            status,
        }
    }

    pub fn publish(&mut self, source: &T) -> Result<DiagnosticArray> {
        let array = self.collect(source);
        self.publisher.publish(&array)?;
        Ok(array)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
