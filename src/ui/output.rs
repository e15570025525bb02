//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Results go to stdout, one record per line, tab separated so they can be
//! piped into `cut` or `awk`. Diagnostics go through `tracing` to stderr.

use std::fmt::Display;
use std::io::{self, Write};

use crate::cloud::{GroupSummary, RouteTableSummary, VcnSummary};
use crate::engine::PeeringReport;

/// A value printable as one tab-separated listing line.
pub trait ListingRow {
    /// Columns: OCID, display name, lifecycle state, then any extras.
    fn columns(&self) -> Vec<String>;
}

impl ListingRow for VcnSummary {
    fn columns(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.display_name.clone(),
            self.lifecycle_state.clone(),
            self.cidr_blocks.join(","),
        ]
    }
}

impl ListingRow for GroupSummary {
    fn columns(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.lifecycle_state.clone(),
        ]
    }
}

impl ListingRow for RouteTableSummary {
    fn columns(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.display_name.clone(),
            self.lifecycle_state.clone(),
            self.vcn_id.to_string(),
        ]
    }
}

/// Format one listing line.
pub fn format_row(row: &impl ListingRow) -> String {
    row.columns().join("\t")
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write every row to `out`, one per line.
pub fn write_rows<W: Write, R: ListingRow>(out: &mut W, rows: &[R]) -> io::Result<()> {
    for row in rows {
        writeln!(out, "{}", format_row(row))?;
    }
    Ok(())
}

/// Print rows to stdout.
pub fn print_rows<R: ListingRow>(rows: &[R]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_rows(&mut lock, rows)
}

/// Summarize a finished peering run.
pub fn format_report(report: &PeeringReport) -> String {
    let lines = [
        format!(
            "requestor: {} via {} ({})",
            report.request.requestor_vcn, report.requestor_lpg, report.request.requestor_route_table
        ),
        format!(
            "acceptor: {} via {} ({})",
            report.request.acceptor_vcn, report.acceptor_lpg, report.request.acceptor_route_table
        ),
    ];
    format!("Peering established\n{}", format_list(&lines, "  "))
}

/// Print a message to stdout.
pub fn print(message: impl Display) {
    println!("{}", message);
}
