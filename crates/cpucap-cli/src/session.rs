//! Line-oriented attribute session
//!
//! Each input line is one operation on the attribute:
//!
//! ```text
//! set 0-3:1024,4-7:512   write side
//! get                    read side
//! table                  dump current and saved values
//! quit                   teardown (also on end of input)
//! ```

use cpucap::{CapacityAttribute, ModuleLifecycle, OverrideController, TableReport};
use std::io::{self, BufRead, Write};

/// Output format of `table`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableFormat {
    Text,
    Json,
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Set(&'a str),
    Get,
    Table,
    Quit,
    Unknown(&'a str),
}

fn parse_command(line: &str) -> Option<Command<'_>> {
    let trimmed = line.trim_start();
    let word = trimmed.split_whitespace().next()?;

    Some(match word {
        "set" => {
            // Everything after "set " is the raw attribute write
            let rest = &trimmed[word.len()..];
            Command::Set(rest.strip_prefix(' ').unwrap_or(rest))
        }
        "get" => Command::Get,
        "table" => Command::Table,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other),
    })
}

/// Drive `controller` from `input` until `quit` or end of input, then tear down
///
/// Teardown runs even when reading or writing fails part way.
///
/// # Errors
/// Returns I/O errors from `input` or `out`
pub(crate) fn run<R: BufRead, W: Write>(
    controller: &OverrideController,
    input: R,
    out: &mut W,
    format: TableFormat,
) -> io::Result<()> {
    let served = serve(controller, input, out, format);
    controller.on_unload();
    served?;
    write_table(out, &controller.table(), format)
}

fn serve<R: BufRead, W: Write>(
    controller: &OverrideController,
    input: R,
    out: &mut W,
    format: TableFormat,
) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        let Some(command) = parse_command(&line) else {
            continue;
        };

        match command {
            Command::Set(raw) => match controller.store(Some(raw)) {
                Ok(()) => writeln!(out, "ok")?,
                Err(e) => writeln!(out, "error {}: {e}", e.errno())?,
            },
            Command::Get => write!(out, "{}", controller.show())?,
            Command::Table => write_table(out, &controller.table(), format)?,
            Command::Quit => break,
            Command::Unknown(word) => writeln!(out, "error: unknown command '{word}'")?,
        }
    }
    Ok(())
}

pub(crate) fn write_table<W: Write>(
    out: &mut W,
    report: &TableReport,
    format: TableFormat,
) -> io::Result<()> {
    match format {
        TableFormat::Json => {
            serde_json::to_writer(&mut *out, report)?;
            writeln!(out)
        }
        TableFormat::Text => {
            for (unit, value) in report.values.iter().enumerate() {
                match report.snapshot.as_ref().map(|saved| saved[unit]) {
                    Some(original) if original != *value => {
                        writeln!(out, "unit {unit}: {value} (was {original})")?;
                    }
                    _ => writeln!(out, "unit {unit}: {value}")?,
                }
            }
            Ok(())
        }
    }
}
