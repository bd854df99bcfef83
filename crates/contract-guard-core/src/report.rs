use std::fmt::Write;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::analyzer::{Analysis, DocumentStats};
use crate::catalog::AnalysisContext;
use crate::matcher::Match;
use crate::summary::{summarize, Summary};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Format styles supported by the report renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Everything a caller shows after analyzing one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub context: AnalysisContext,
    pub stats: DocumentStats,
    pub summary: Summary,
    pub matches: Vec<Match>,
}

impl AnalysisReport {
    pub fn new(context: AnalysisContext, analysis: Analysis) -> Self {
        Self {
            context,
            stats: analysis.stats,
            summary: summarize(&analysis.matches),
            matches: analysis.matches,
        }
    }
}

/// Produce a report string using the desired format.
pub fn render_report(report: &AnalysisReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_human(report),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn render_human(report: &AnalysisReport) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "Rating: {} ({} critical)",
        report.summary.severity_rating, report.summary.critical_count
    )?;
    writeln!(out, "Summary: {}", report.summary.synopsis)?;
    writeln!(
        out,
        "Context: {} / {}",
        report.context.sector, report.context.role
    )?;
    writeln!(
        out,
        "Document: {} chars, {} words",
        report.stats.chars, report.stats.words
    )?;
    writeln!(out)?;

    if report.summary.is_clean() {
        writeln!(out, "No risky clauses detected.")?;
        return Ok(out);
    }

    writeln!(out, "Findings:")?;
    for found in &report.matches {
        writeln!(out, "  - [{}] {}", found.severity, found.title)?;
        writeln!(out, "    {}", found.explanation)?;
        if !found.evidence.trim().is_empty() {
            writeln!(out, "    \"{}\"", flatten(&found.evidence))?;
        }
        writeln!(out, "    Suggestion: {}", found.suggestion)?;
    }
    Ok(out)
}

/// Collapse line breaks and runs of whitespace so excerpts fit on one line.
pub fn flatten(input: &str) -> String {
    WHITESPACE_RUN.replace_all(input.trim(), " ").into_owned()
}
