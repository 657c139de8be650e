//! `googet installed` output parsing

use std::collections::HashSet;
use tracing::trace;

/// Parse the listing printed by `googet.exe installed`:
///
/// ```text
/// Installed Packages:
/// foo.x86_64 1.2.3@4
/// bar.noarch 1.2.3@4
/// ```
///
/// Only the part of the first column before the first `.` is kept. Lines that
/// are not `name.arch version` pairs, such as the header, are skipped.
pub fn parse_installed(stdout: &str) -> HashSet<String> {
    let mut names = HashSet::new();

    for line in stdout.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let parsed = match fields.as_slice() {
            [package, _version] => package
                .split_once('.')
                .filter(|(name, arch)| !name.is_empty() && !arch.is_empty())
                .map(|(name, _)| name),
            _ => None,
        };

        match parsed {
            Some(name) => {
                names.insert(name.to_string());
            }
            None if !line.trim().is_empty() => trace!("Skipping googet line: {:?}", line),
            None => {}
        }
    }

    names
}
