//! Output formatting for CLI commands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cli::args::{HalberdArgs, OutputFormat};
use crate::error::Result;
use crate::search::TermsFacet;

/// One returned hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitOutput {
    pub doc_id: u64,
    pub score: f32,
    pub fields: BTreeMap<String, String>,
}

/// Result structure for search operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutput {
    pub query: String,
    pub hits: Vec<HitOutput>,
    pub total_hits: u64,
    pub max_score: f32,
    pub timed_out: bool,
    pub took_ms: u64,
    pub facets: Vec<TermsFacet>,
}

/// Statistics of one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldStatsOutput {
    pub name: String,
    pub doc_count: u64,
    pub total_terms: u64,
    pub avg_length: f64,
}

/// Index statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsOutput {
    pub documents: u64,
    pub segments: usize,
    pub fields: Vec<FieldStatsOutput>,
}

/// Print a search result.
pub fn output_search(result: &SearchOutput, args: &HalberdArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(result, args),
        OutputFormat::Human => {
            println!(
                "{} hits for '{}' ({} ms{})",
                result.total_hits,
                result.query,
                result.took_ms,
                if result.timed_out { ", timed out" } else { "" }
            );
            for hit in &result.hits {
                println!("  [{}] {:.4}  {}", hit.doc_id, hit.score, format_fields(&hit.fields));
            }
            for facet in &result.facets {
                println!("facet {} ({}):", facet.name, facet.field);
                for entry in &facet.terms {
                    println!("  {:<20} {}", entry.term, entry.count);
                }
                if facet.missing > 0 {
                    println!("  {:<20} {}", "(missing)", facet.missing);
                }
            }
            Ok(())
        }
    }
}

/// Print index statistics.
pub fn output_stats(stats: &StatsOutput, args: &HalberdArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(stats, args),
        OutputFormat::Human => {
            println!("documents: {}", stats.documents);
            println!("segments:  {}", stats.segments);
            for field in &stats.fields {
                println!(
                    "  {:<20} docs={} terms={} avg_len={:.2}",
                    field.name, field.doc_count, field.total_terms, field.avg_length
                );
            }
            Ok(())
        }
    }
}

fn output_json<T: Serialize>(result: &T, args: &HalberdArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

fn format_fields(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(name, value)| format!("{name}={}", truncate(value, 60)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut truncated: String = value.chars().take(max_chars).collect();
        truncated.push_str("...");
        truncated
    }
}
