use sysinfo::System;

/// Hostname with `-` replaced by `_`, or `None` when the OS does not report one.
pub fn hardware_id() -> Option<String> {
    System::host_name()
        .filter(|name| !name.trim().is_empty())
        .map(|name| sanitize_hostname(name.trim()))
}

pub fn sanitize_hostname(name: &str) -> String {
    name.replace('-', "_")
}

/// Name the reporting node registers under.
pub fn node_name(hardware_id: &str) -> String {
    format!("process_monitor_{hardware_id}")
}
