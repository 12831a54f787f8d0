use super::record::{ProcessRecord, TaskSummary};

/// Fold a `top` task line (`Tasks: 120 total, 3 running, ...`) into `summary`.
///
/// Segments that are not exactly `<count> <label>` are ignored. When the text
/// has no `:` separator the summary is left untouched and `false` is returned,
/// so the previous sample stays visible.
pub fn parse_task_summary(text: &str, summary: &mut TaskSummary) -> bool {
    let mut sections = text.trim().split(':');
    let _ = sections.next();
    let Some(counts) = sections.next() else {
        return false;
    };

    for segment in counts.split(',') {
        let pair: Vec<&str> = segment.split_whitespace().collect();
        if let [count, label] = pair.as_slice() {
            summary.assign(count, label);
        }
    }
    true
}

/// Turn listing rows into records, keeping at most `limit` of them.
///
/// Rows with fewer than twelve columns are skipped and do not count toward
/// `limit`.
pub fn parse_process_rows(text: &str, limit: usize) -> Vec<ProcessRecord> {
    text.lines()
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            ProcessRecord::from_tokens(&tokens)
        })
        .take(limit)
        .collect()
}
