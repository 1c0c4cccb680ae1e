//! Formatted output helpers for CLI commands.

use std::fmt::Write;

use hcnproxy_core::Policy;

const HEADER: [&str; 8] = [
    "PORT",
    "PROTOCOL",
    "PRIORITY",
    "USER SID",
    "LOCAL ADDR",
    "REMOTE ADDR",
    "LOCAL PORTS",
    "REMOTE PORTS",
];

/// Renders policies as an aligned table, one row per policy.
#[must_use]
pub fn policy_table(policies: &[Policy]) -> String {
    let rows: Vec<[String; 8]> = policies.iter().map(policy_row).collect();

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    write_row(&mut out, &HEADER.map(str::to_owned), &widths);
    for row in &rows {
        write_row(&mut out, row, &widths);
    }
    out
}

fn policy_row(policy: &Policy) -> [String; 8] {
    let cell = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_owned());
    [
        policy.proxy_port.clone(),
        policy.protocol.to_string(),
        policy.priority.to_string(),
        cell(&policy.user_sid),
        cell(&policy.local_addresses),
        cell(&policy.remote_addresses),
        cell(&policy.local_ports),
        cell(&policy.remote_ports),
    ]
}

fn write_row(out: &mut String, row: &[String; 8], widths: &[usize; 8]) {
    let line = row
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}
