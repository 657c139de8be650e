//! dpkg-query output parsing for the apt backend

use std::collections::HashSet;
use tracing::trace;

/// Parse `dpkg-query -W -f '${Package}\t${Architecture}\t${Version}\t${db:Status-Status}\n'`.
///
/// Columns are tab-separated and read by position, so an empty field (a
/// package with no recorded version) does not shift the status column. When
/// the status column is present only `installed` rows count, so packages left
/// in `config-files` state after a remove are not reported.
pub fn parse_installed(stdout: &str) -> HashSet<String> {
    let mut names = HashSet::new();

    for line in stdout.lines() {
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() < 3 || fields[0].is_empty() {
            if !line.trim().is_empty() {
                trace!("Skipping dpkg-query line: {:?}", line);
            }
            continue;
        }

        if let Some(status) = fields.get(3) {
            if *status != "installed" {
                continue;
            }
        }

        // Multi-arch packages may be printed as name:arch
        let name = fields[0].split(':').next().unwrap_or(fields[0]);
        if !name.is_empty() {
            names.insert(name.to_string());
        }
    }

    names
}
