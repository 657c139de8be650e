//! rpmquery output parsing, shared by yum and zypper

use std::collections::HashSet;
use tracing::trace;

/// Parse `rpmquery --queryformat '%{NAME} %{ARCH} %{VERSION}-%{RELEASE}\n' -a`.
pub fn parse_installed(stdout: &str) -> HashSet<String> {
    let mut names = HashSet::new();

    for line in stdout.lines() {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(name), Some(_arch), Some(_version), None) => {
                names.insert(name.to_string());
            }
            _ if line.trim().is_empty() => {}
            _ => trace!("Skipping rpmquery line: {:?}", line),
        }
    }

    names
}
