use anyhow::Result;

use crate::schedule::{Clock, SystemClock, format_date, window};

/// CLI command: print the range of dates a generated commit can get today.
///
/// Example output:
/// ```text
/// from 2025-10-19T14:02:11+02:00
/// to   2026-10-30T14:02:11+02:00
/// ```
pub fn cmd_window() -> Result<()> {
    let (start, end) = window(&SystemClock.now())?;
    println!("from {}", format_date(&start));
    println!("to   {}", format_date(&end));
    Ok(())
}
