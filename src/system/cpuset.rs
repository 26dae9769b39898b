//! CPU list parsing for `cpuset.cpus` style files.
//!
//! Format: comma-separated tokens, each a single index or an inclusive
//! `start-end` range, e.g. `0-3`, `0,2-4`, `1`.

use std::collections::BTreeSet;

use tracing::warn;

/// Parse a CPU list into the set of CPU indices it names.
///
/// Malformed tokens (non-numeric, reversed ranges) are logged and skipped;
/// the rest of the list is still parsed. Empty input yields an empty set.
pub fn parse_cpu_list(text: &str) -> BTreeSet<u32> {
    let mut cpus = BTreeSet::new();

    for token in text.split(',').map(str::trim) {
        if token.is_empty() {
            continue;
        }

        match parse_token(token) {
            Some((start, end)) => cpus.extend(start..=end),
            None => warn!(token = %token, "Skipping malformed cpuset token"),
        }
    }

    cpus
}

/// Parse one token into an inclusive range. `None` if malformed.
fn parse_token(token: &str) -> Option<(u32, u32)> {
    match token.split_once('-') {
        Some((start, end)) => {
            let start = start.trim().parse::<u32>().ok()?;
            let end = end.trim().parse::<u32>().ok()?;
            (start <= end).then_some((start, end))
        }
        None => {
            let cpu = token.parse::<u32>().ok()?;
            Some((cpu, cpu))
        }
    }
}
