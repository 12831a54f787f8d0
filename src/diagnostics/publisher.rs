use std::io::Write;

use color_eyre::Result;
use tracing::{info, warn};

use super::{DiagnosticArray, Severity};

/// Destination for published diagnostics.
pub trait Publisher {
    fn publish(&mut self, array: &DiagnosticArray) -> Result<()>;
}

/// Emits one tracing event per status.
#[derive(Debug, Default)]
pub struct LogPublisher;

impl Publisher for LogPublisher {
    fn publish(&mut self, array: &DiagnosticArray) -> Result<()> {
        for status in &array.status {
            let details = status
                .values
                .iter()
                .map(|kv| format!("{}={}", kv.key, kv.value))
                .collect::<Vec<_>>()
                .join(", ");
            match status.level {
                Severity::Ok => info!(
                    name = %status.name,
                    hardware_id = %status.hardware_id,
                    level = %status.level,
                    message = %status.message,
                    %details,
                    "diagnostic"
                ),
                Severity::Error => warn!(
                    name = %status.name,
                    hardware_id = %status.hardware_id,
                    level = %status.level,
                    message = %status.message,
                    %details,
                    "diagnostic"
                ),
            }
        }
        Ok(())
    }
}

/// Writes each published array as a single JSON line.
pub struct JsonPublisher<W: Write> {
    writer: W,
}

impl<W: Write> JsonPublisher<W> {
    pub fn new(writer: W) -> Self {
        JsonPublisher { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Publisher for JsonPublisher<W> {
    fn publish(&mut self, array: &DiagnosticArray) -> Result<()> {
        serde_json::to_writer(&mut self.writer, array)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::diagnostics::DiagnosticStatus;

    fn sample_array() -> DiagnosticArray {
        let mut ok = DiagnosticStatus::new("Task Status", "host_1");
        ok.summary(Severity::Ok, "OK");
        ok.add("Total Tasks", "120");
        let mut err = DiagnosticStatus::new("High-load Proc[1]", "host_1");
        err.summary(Severity::Error, "top-command Error");
        DiagnosticArray {
            stamp_ms: 42,
            status: vec![ok, err],
        }
    }

    #[test]
    fn json_publisher_writes_one_line_per_publish() {
        let mut publisher = JsonPublisher::new(Vec::new());
        publisher.publish(&sample_array()).unwrap();
        publisher.publish(&sample_array()).unwrap();

        let out = String::from_utf8(publisher.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["stamp_ms"], 42);
        assert_eq!(value["status"][0]["level"], "OK");
        assert_eq!(value["status"][0]["values"][0]["key"], "Total Tasks");
        assert_eq!(value["status"][0]["values"][0]["value"], "120");
        assert_eq!(value["status"][1]["level"], "ERROR");
        assert_eq!(value["status"][1]["message"], "top-command Error");
    }

    #[test]
    fn log_publisher_accepts_any_array() {
        let mut publisher = LogPublisher;
        assert!(publisher.publish(&sample_array()).is_ok());
    }
}
