/// Aggregate task-state counts, kept as the raw text `top` printed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub total: String,
    pub running: String,
    pub sleeping: String,
    pub stopped: String,
    pub zombie: String,
}

impl TaskSummary {
    /// Route a `(count, label)` pair into the field whose name the label contains.
    /// Returns false when the label matches none of the known states.
    pub fn assign(&mut self, count: &str, label: &str) -> bool {
        let slot = if label.contains("total") {
            &mut self.total
        } else if label.contains("running") {
            &mut self.running
        } else if label.contains("sleeping") {
            &mut self.sleeping
        } else if label.contains("stopped") {
            &mut self.stopped
        } else if label.contains("zombie") {
            &mut self.zombie
        } else {
            return false;
        };
        *slot = count.to_string();
        true
    }
}

/// Number of leading columns consumed from each listing row.
pub const PROCESS_FIELDS: usize = 12;

/// One row of the process listing. Every column is kept verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: String,
    pub user: String,
    pub priority: String,
    pub nice: String,
    pub virtual_size: String,
    pub resident_size: String,
    pub shared_size: String,
    pub status: String,
    pub cpu_percent: String,
    pub mem_percent: String,
    pub time: String,
    pub name: String,
}

impl ProcessRecord {
    /// Build a record from the first twelve tokens of a row. Extra tokens
    /// (the tail of a multi-word command) are ignored.
    pub fn from_tokens(tokens: &[&str]) -> Option<Self> {
        let [
            pid,
            user,
            priority,
            nice,
            virtual_size,
            resident_size,
            shared_size,
            status,
            cpu_percent,
            mem_percent,
            time,
            name,
        ] = tokens.get(..PROCESS_FIELDS)?
        else {
            return None;
        };

        Some(ProcessRecord {
            pid: pid.to_string(),
            user: user.to_string(),
            priority: priority.to_string(),
            nice: nice.to_string(),
            virtual_size: virtual_size.to_string(),
            resident_size: resident_size.to_string(),
            shared_size: shared_size.to_string(),
            status: status.to_string(),
            cpu_percent: cpu_percent.to_string(),
            mem_percent: mem_percent.to_string(),
            time: time.to_string(),
            name: name.to_string(),
        })
    }
}
