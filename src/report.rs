//! Output formatting for extraction results.
//!
//! Supports two output formats:
//! - JSON: the ordered snippet list, for the downstream reviewer
//! - Pretty: colored terminal listing grouped by file

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use colored::*;

use crate::detect::{ExtractionResult, Snippet};

/// Output formats accepted by `--format`.
pub const FORMATS: &[&str] = &["json", "pretty"];

/// Render snippets as a pretty-printed JSON array.
pub fn render_json(snippets: &[Snippet]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(snippets)?)
}

/// Write the snippets as JSON to `output`, or to stdout when absent.
pub fn write_json(result: &ExtractionResult, output: Option<&Path>) -> anyhow::Result<()> {
    let json = render_json(&result.snippets)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, format!("{}\n", json))?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{}", json)?;
        }
    }
    Ok(())
}

/// Write results in pretty (human-readable) format.
pub fn write_pretty(
    out: &mut dyn Write,
    path: &str,
    rules_path: &str,
    result: &ExtractionResult,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "  {} v{}",
        "rulesnip".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out)?;
    writeln!(out, "  {}{}", "Scanning: ".dimmed(), path)?;
    writeln!(out, "  {}{}", "Rules:    ".dimmed(), rules_path)?;
    writeln!(out)?;

    write_summary(out, result)?;
    writeln!(out)?;

    if !result.snippets.is_empty() {
        write_snippets(out, &result.snippets)?;
    }

    if !result.skipped.is_empty() {
        writeln!(out, "  {} ({}):", "Skipped".yellow(), result.skipped.len())?;
        for skipped in &result.skipped {
            writeln!(out, "    {}  {}", skipped.path.blue(), skipped.reason.dimmed())?;
        }
        writeln!(out)?;
    }

    let counts = result.counts_by_rule();
    if !counts.is_empty() {
        writeln!(out, "  {}", "By rule:".bold())?;
        for (rule, count) in counts {
            let plural = if count != 1 { "s" } else { "" };
            writeln!(out, "    {:<12} {:>4} snippet{}", rule, count, plural)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_summary(out: &mut dyn Write, result: &ExtractionResult) -> io::Result<()> {
    write!(
        out,
        "  {} snippets from {} files",
        result.snippets.len().to_string().green().bold(),
        result.scanned
    )?;
    if !result.skipped.is_empty() {
        write!(
            out,
            "  {}",
            format!("({} skipped)", result.skipped.len()).yellow()
        )?;
    }
    writeln!(out)
}

/// Snippets grouped by file, keeping their order.
fn write_snippets(out: &mut dyn Write, snippets: &[Snippet]) -> io::Result<()> {
    let mut current_file: Option<&str> = None;
    for snippet in snippets {
        if current_file != Some(snippet.file_path.as_str()) {
            if current_file.is_some() {
                writeln!(out)?;
            }
            writeln!(out, "  {}", snippet.file_path.blue().bold())?;
            current_file = Some(&snippet.file_path);
        }

        let location = if snippet.line > 0 {
            format!(":{}", snippet.line)
        } else {
            String::new()
        };
        writeln!(
            out,
            "    {:<10}{:<7}{}",
            snippet.rule_id.cyan(),
            location.dimmed(),
            snippet.subject_name
        )?;
        for line in snippet.code.lines() {
            writeln!(out, "        {}", line.dimmed())?;
        }
    }
    writeln!(out)
}
