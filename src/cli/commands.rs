//! Command implementations for the Halberd CLI.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::{info, warn};
use parking_lot::Mutex;
use serde_json::Value;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{HalberdError, Result};
use crate::index::{IndexSnapshot, IndexWriter, IndexWriterConfig, StoredDocument, tokenize};
use crate::query::{BooleanQuery, Filter, PrefixQuery, Query, TermFilter, TermQuery};
use crate::search::{
    ContextIndexSearcher, QueryPhase, Scope, SearchConfig, SearchContext, TermsFacetCollector,
};

/// Execute a CLI command.
pub fn execute_command(args: HalberdArgs) -> Result<()> {
    match &args.command {
        Command::Search(search_args) => {
            let result = run_search(search_args)?;
            output_search(&result, &args)
        }
        Command::Stats(stats_args) => {
            let stats = run_stats(stats_args)?;
            output_stats(&stats, &args)
        }
    }
}

/// Index the document file and run one query phase over it.
pub fn run_search(args: &SearchArgs) -> Result<SearchOutput> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::from_file(path)?,
        None => SearchConfig::default(),
    };
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_timeout(Duration::from_millis(timeout_ms));
    }
    let from = args.from.unwrap_or(config.from);
    let size = args.size.unwrap_or(config.size);
    config = config.with_window(from, size);

    let snapshot = load_documents(&args.docs, args.segment_size)?;
    let query = build_query(&args.field, &args.query, args.prefix)?;

    let mut context = SearchContext::new(query).with_window(config.from, config.size);
    if let Some(timeout) = config.timeout() {
        context = context.with_timeout(timeout);
    }
    if let Some(filter) = &args.filter {
        context = context.with_filter(parse_filter(filter)?);
    }

    let started = Instant::now();
    let mut searcher = ContextIndexSearcher::with_config(snapshot, context, &config);

    let facet = args.facet.as_ref().map(|field| {
        Arc::new(Mutex::new(TermsFacetCollector::new(
            field.clone(),
            field.clone(),
            args.facet_size,
        )))
    });
    if let Some(facet) = &facet {
        let scope = if args.global_facet { Scope::GLOBAL } else { Scope::MAIN };
        searcher.add_collector(scope, Box::new(Arc::clone(facet)));
    }

    let outcome = QueryPhase::from_config(&config).execute(&mut searcher)?;
    if outcome.is_timed_out() {
        warn!("search timed out; returning partial results");
    }
    let took_ms = started.elapsed().as_millis() as u64;

    let result = searcher.context().query_result();
    let hits = result
        .top_docs
        .iter()
        .map(|hit| HitOutput {
            doc_id: hit.doc_id,
            score: hit.score,
            fields: searcher
                .snapshot()
                .document(hit.doc_id)
                .map(|doc| doc.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
        })
        .collect();

    info!(
        "query '{}' matched {} docs in {} ms",
        args.query, result.total_hits, took_ms
    );

    Ok(SearchOutput {
        query: args.query.clone(),
        hits,
        total_hits: result.total_hits,
        max_score: result.max_score,
        timed_out: result.timed_out,
        took_ms,
        facets: facet.iter().map(|f| f.lock().facet()).collect(),
    })
}

/// Index the document file and summarise it.
pub fn run_stats(args: &StatsArgs) -> Result<StatsOutput> {
    let snapshot = load_documents(&args.docs, args.segment_size)?;

    let names: BTreeSet<&str> = snapshot
        .segments()
        .iter()
        .flat_map(|segment| segment.field_names())
        .collect();
    let fields = names
        .into_iter()
        .filter_map(|name| {
            let stats = snapshot.field_stats(name)?;
            Some(FieldStatsOutput {
                name: name.to_string(),
                doc_count: stats.doc_count,
                total_terms: stats.total_terms,
                avg_length: stats.avg_length().unwrap_or(0.0),
            })
        })
        .collect();

    Ok(StatsOutput {
        documents: snapshot.num_docs(),
        segments: snapshot.segments().len(),
        fields,
    })
}

/// Read a JSON lines file into a snapshot. Strings, numbers and booleans
/// become stored and indexed text; other values are skipped.
pub fn load_documents(path: &Path, segment_size: usize) -> Result<IndexSnapshot> {
    let file = File::open(path)?;
    let mut writer = IndexWriter::with_config(IndexWriterConfig {
        max_buffered_docs: segment_size,
    });

    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid JSON", path.display(), line_no + 1))?;
        let Value::Object(object) = value else {
            return Err(HalberdError::invalid_argument(format!(
                "{}:{}: expected a JSON object",
                path.display(),
                line_no + 1
            )));
        };

        let doc: StoredDocument = object
            .into_iter()
            .filter_map(|(name, value)| match value {
                Value::String(s) => Some((name, s)),
                Value::Number(n) => Some((name, n.to_string())),
                Value::Bool(b) => Some((name, b.to_string())),
                _ => None,
            })
            .collect();
        if doc.is_empty() {
            warn!("{}:{}: no indexable fields", path.display(), line_no + 1);
            continue;
        }
        writer.add_document(doc)?;
    }

    Ok(writer.snapshot())
}

/// One word gives a term query; several give a disjunction. With `prefix`
/// the last word matches as a prefix.
pub fn build_query(field: &str, text: &str, prefix: bool) -> Result<Arc<dyn Query>> {
    let words = tokenize(text);
    let Some((last, rest)) = words.split_last() else {
        return Err(HalberdError::query(format!("query '{text}' has no terms")));
    };

    let last: Arc<dyn Query> = if prefix {
        Arc::new(PrefixQuery::new(field, last.as_str()))
    } else {
        Arc::new(TermQuery::new(field, last.as_str()))
    };
    if rest.is_empty() {
        return Ok(last);
    }

    let mut query = BooleanQuery::new();
    for word in rest {
        query.add_should(Arc::new(TermQuery::new(field, word.as_str())))?;
    }
    query.add_should(last)?;
    Ok(Arc::new(query))
}

fn parse_filter(arg: &str) -> Result<Arc<dyn Filter>> {
    let (field, value) = arg
        .split_once(':')
        .filter(|(field, value)| !field.is_empty() && !value.is_empty())
        .ok_or_else(|| HalberdError::invalid_argument(format!("filter '{arg}' is not FIELD:VALUE")))?;
    Ok(Arc::new(TermFilter::new(field, value.to_lowercase())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docs_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"title": "Rust search engine", "tags": "rust search", "lang": "en"}}"#).unwrap();
        writeln!(file, r#"{{"title": "Rusty nails", "tags": "hardware", "lang": "en"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"title": "Java search", "tags": "java search", "year": 2010}}"#).unwrap();
        writeln!(file, r#"{{"title": "Rust in practice", "tags": "rust", "lang": "de"}}"#).unwrap();
        file
    }

    fn search_args(docs: &Path, query: &str) -> SearchArgs {
        SearchArgs {
            docs: docs.to_path_buf(),
            query: query.to_string(),
            field: "title".to_string(),
            prefix: false,
            filter: None,
            size: None,
            from: None,
            timeout_ms: None,
            facet: None,
            facet_size: 10,
            global_facet: false,
            segment_size: 2,
            config: None,
        }
    }

    #[test]
    fn test_load_documents() {
        let file = docs_file();
        let snapshot = load_documents(file.path(), 2).unwrap();
        assert_eq!(snapshot.num_docs(), 4);
        assert_eq!(snapshot.segments().len(), 2);
        assert_eq!(
            snapshot.document(2).and_then(|d| d.get("year")).map(String::as_str),
            Some("2010")
        );
    }

    #[test]
    fn test_invalid_line_reports_position() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"title": "ok"}}"#).unwrap();
        writeln!(file, "not json").unwrap();
        let err = load_documents(file.path(), 10).unwrap_err();
        assert!(err.to_string().contains(":2: invalid JSON"));
    }

    #[test]
    fn test_run_search_with_facet() {
        let file = docs_file();
        let mut args = search_args(file.path(), "rust");
        args.facet = Some("tags".to_string());

        let result = run_search(&args).unwrap();
        assert_eq!(result.total_hits, 2);
        assert!(!result.timed_out);
        let ids: BTreeSet<u64> = result.hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, BTreeSet::from([0, 3]));

        let facet = &result.facets[0];
        assert_eq!(facet.total, 2);
        assert_eq!(facet.terms[0].term, "rust");
        assert_eq!(facet.terms[0].count, 2);
    }

    #[test]
    fn test_run_search_prefix_and_filter() {
        let file = docs_file();
        let mut args = search_args(file.path(), "rust");
        args.prefix = true;
        args.filter = Some("lang:en".to_string());

        let result = run_search(&args).unwrap();
        let ids: BTreeSet<u64> = result.hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, BTreeSet::from([0, 1]));
    }

    #[test]
    fn test_global_facet_counts_every_document() {
        let file = docs_file();
        let mut args = search_args(file.path(), "java");
        args.facet = Some("lang".to_string());
        args.global_facet = true;

        let result = run_search(&args).unwrap();
        assert_eq!(result.total_hits, 1);
        let facet = &result.facets[0];
        assert_eq!(facet.total, 4);
        assert_eq!(facet.missing, 1);
        assert_eq!(facet.terms[0].term, "en");
    }

    #[test]
    fn test_config_file_and_overrides() {
        let file = docs_file();
        let mut config = tempfile::NamedTempFile::new().unwrap();
        write!(config, r#"{{"size": 1}}"#).unwrap();

        let mut args = search_args(file.path(), "rust search");
        args.config = Some(config.path().to_path_buf());
        let result = run_search(&args).unwrap();
        assert_eq!(result.hits.len(), 1);
        assert_eq!(result.total_hits, 3);

        args.size = Some(5);
        let result = run_search(&args).unwrap();
        assert_eq!(result.hits.len(), 3);
    }

    #[test]
    fn test_run_stats() {
        let file = docs_file();
        let stats = run_stats(&StatsArgs {
            docs: file.path().to_path_buf(),
            segment_size: 3,
        })
        .unwrap();
        assert_eq!(stats.documents, 4);
        assert_eq!(stats.segments, 2);
        let names: Vec<_> = stats.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["lang", "tags", "title", "year"]);
    }

    #[test]
    fn test_build_query_shapes() {
        assert_eq!(build_query("t", "Rust", false).unwrap().description(), "t:rust");
        assert_eq!(
            build_query("t", "rust sea", true).unwrap().description(),
            "(t:rust t:sea*)"
        );
        assert!(build_query("t", "  ", false).is_err());
        assert!(parse_filter("nocolon").is_err());
    }
}
