//! Terminal presenter — renders the neighbour table on a timer.
//!
//! Read-only consumer of the table: it takes a snapshot, clears the screen,
//! and prints a fixed-width columnar view. An empty snapshot renders as an
//! empty table, never an error.

use std::io::Write;
use std::time::Duration;

use lantern_services::{NeighbourEntry, NeighbourTable};

const COL_WIDTH: usize = 20;

/// Clear the terminal and home the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Redraw the neighbour view every `refresh`, showing entries heard from
/// within `window`.
///
/// Runs forever — cancel by dropping the task handle.
pub async fn presenter_loop(table: NeighbourTable, refresh: Duration, window: Duration) {
    let mut interval = tokio::time::interval(refresh);

    loop {
        interval.tick().await;

        let entries = table.snapshot(window);
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "{CLEAR_SCREEN}{}", render(&entries));
        let _ = out.flush();
    }
}

/// Render the snapshot as a columnar table.
fn render(entries: &[NeighbourEntry]) -> String {
    let mut out = String::new();
    out.push_str(&fmt_row(&[
        "IP Address",
        "Hostname",
        "Platform",
        "Free Memory (MB)",
    ]));
    out.push('\n');
    out.push_str(&fmt_row(&[
        "-------------------",
        "-------------------",
        "-------------------",
        "-------------------",
    ]));
    out.push('\n');

    for entry in entries {
        out.push_str(&fmt_row(&[
            &entry.addr.to_string(),
            &entry.hostname,
            &entry.platform,
            &entry.free_memory_mb.to_string(),
        ]));
        out.push('\n');
    }

    out
}

/// Pad each cell to the column width and join with a separator.
fn fmt_row(cells: &[&str]) -> String {
    cells
        .iter()
        .map(|cell| format!("{:<width$}", cell, width = COL_WIDTH))
        .collect::<Vec<_>>()
        .join("| ")
}
