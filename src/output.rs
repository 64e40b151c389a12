//! Output formatting for lookup results and verification reports

use crate::mapper::stats::VerifyReport;
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// One answered query, in either direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lookup {
    /// The query as the user gave it
    pub query: String,
    pub key: Option<String>,
    pub position: Option<u64>,
    pub found: bool,
}

impl Lookup {
    /// Result of mapping a key to a position
    pub fn encoded(key: &str, position: Option<u64>) -> Self {
        Self {
            query: key.to_string(),
            key: Some(key.to_string()),
            found: position.is_some(),
            position,
        }
    }

    /// Result of mapping a position to a key
    pub fn decoded(query: &str, position: Option<u64>, key: Option<String>) -> Self {
        Self {
            query: query.to_string(),
            found: key.is_some(),
            key,
            position,
        }
    }
}

fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print lookups as `position<TAB>key`, flagging misses
pub fn print_lookups(lookups: &[Lookup], color: bool) -> io::Result<()> {
    let mut out = stdout(color);
    write_lookups(&mut out, lookups)
}

/// Write lookups to any color-capable writer
pub fn write_lookups<W: WriteColor>(out: &mut W, lookups: &[Lookup]) -> io::Result<()> {
    for lookup in lookups {
        if lookup.found {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            write!(out, "{}", lookup.position.unwrap_or_default())?;
            out.reset()?;
            writeln!(out, "\t{}", lookup.key.as_deref().unwrap_or_default())?;
        } else {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(out, "not found")?;
            out.reset()?;
            writeln!(out, "\t{}", lookup.query)?;
        }
    }
    Ok(())
}

/// Print lookups as a JSON array
pub fn print_lookups_json(lookups: &[Lookup]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, lookups)?;
    writeln!(out)
}

/// Print a verification report, or its JSON form
pub fn print_verify_report(report: &VerifyReport, color: bool, json: bool) -> io::Result<()> {
    if json {
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, report)?;
        return writeln!(out);
    }

    let mut out = stdout(color);
    write_verify_report(&mut out, report)
}

/// Write a verification report to any color-capable writer
pub fn write_verify_report<W: WriteColor>(out: &mut W, report: &VerifyReport) -> io::Result<()> {
    let stats = &report.stats;
    writeln!(out, "Checked {} lines ({} bytes)", report.checked, stats.size)?;

    let problem = |out: &mut W, msg: String| -> io::Result<()> {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(out, "warning")?;
        out.reset()?;
        writeln!(out, ": {}", msg)
    };

    if let Some(offset) = stats.first_unsorted {
        problem(&mut *out, format!("store is not sorted (first break at byte {})", offset))?;
    }
    if stats.duplicate_lines > 0 {
        problem(&mut *out, format!("{} duplicate lines", stats.duplicate_lines))?;
    }
    if stats.empty_lines > 0 {
        problem(&mut *out, format!("{} empty lines", stats.empty_lines))?;
    }
    if stats.trailing_bytes > 0 {
        problem(&mut *out, format!("{} bytes after the last newline", stats.trailing_bytes))?;
    }

    for m in &report.mismatches {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(out, "mismatch")?;
        out.reset()?;
        writeln!(
            out,
            " [{}] {:?}@{}: encode={:?} decode={:?}",
            m.strategy, m.entry.key, m.entry.position, m.encoded, m.decoded
        )?;
    }

    if report.is_ok() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        writeln!(out, "OK")?;
        out.reset()?;
    }

    Ok(())
}
