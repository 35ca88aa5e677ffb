//! Filter command implementation.
//!
//! Opens a timeline, composes the preset, filter files and ad-hoc filter
//! into one query, and streams every matching record to stdout.

use std::io::{self, Write};
use std::path::PathBuf;

use timeline_filter::filter::{find_preset, FilterSet, QueryEvaluator};
use timeline_filter::{Dataset, Format};
use tracing::debug;

use super::{CommandContext, CommandError, Result};
use crate::cli::OutputFormat;
use crate::output::record_writer;

/// Options for the filter command.
#[derive(Debug)]
pub struct FilterOptions {
    /// Timeline file.
    pub source: PathBuf,
    /// Explicit input format; inferred from the extension when `None`.
    pub format: Option<Format>,
    /// Ad-hoc filter query.
    pub filter: Option<String>,
    /// Files holding filter fragments.
    pub filter_files: Vec<PathBuf>,
    /// Built-in preset name.
    pub preset: Option<String>,
    /// Comma-separated field selection.
    pub fields: Option<String>,
    /// Output format.
    pub output: OutputFormat,
    /// Maximum number of records to print.
    pub limit: Option<usize>,
}

/// Outcome of a filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    /// Records written.
    pub matched: usize,
}

/// Executes the filter command, writing to stdout.
///
/// A closed stdout (e.g. piping into `head`) ends the pass quietly.
///
/// # Errors
///
/// Returns an error if the input cannot be read or decoded, or if the
/// query is invalid or fails on a record.
pub fn execute(ctx: &CommandContext, opts: &FilterOptions) -> Result<()> {
    let stdout = io::stdout();
    match run(opts, stdout.lock(), ctx.use_colors) {
        Ok(summary) => {
            debug!(matched = summary.matched, "filter pass finished");
            Ok(())
        }
        Err(CommandError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(e),
    }
}

/// Builds the composite filter for `opts`.
fn compose(opts: &FilterOptions) -> Result<FilterSet> {
    let mut set = FilterSet::new();

    if let Some(name) = &opts.preset {
        set = set.with_preset(find_preset(name)?.query);
    }

    for path in &opts.filter_files {
        set = set.with_fragment_file(path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("failed to read filter file '{}': {e}", path.display()),
            )
        })?;
    }

    if let Some(filter) = &opts.filter {
        set = set.with_filter(filter.as_str());
    }

    Ok(set)
}

/// Runs one filter pass, writing matching records to `out`.
pub fn run<W: Write>(opts: &FilterOptions, out: W, use_colors: bool) -> Result<FilterSummary> {
    let dataset = Dataset::open(&opts.source, opts.format)?;
    let query = compose(opts)?.compose();

    let Some(schema) = dataset.schema()? else {
        // No field names to check against, but the query must still parse.
        if let Some(query) = &query {
            QueryEvaluator::check_syntax(query)?;
        }
        debug!(path = %dataset.path().display(), "dataset has no records");
        return Ok(FilterSummary { matched: 0 });
    };

    let fields = match &opts.fields {
        Some(list) => schema.select_list(list)?,
        None => schema.fields().to_vec(),
    };

    let evaluator = match &query {
        Some(query) => QueryEvaluator::new(query, &schema)?,
        None => QueryEvaluator::pass_all(),
    };

    debug!(
        format = %dataset.format(),
        output = opts.output.name(),
        fields = fields.len(),
        "filtering"
    );
    let mut writer = record_writer(opts.output, out, fields, use_colors);
    let mut matched = 0;

    let records = dataset
        .filter(&evaluator)?
        .take(opts.limit.unwrap_or(usize::MAX));
    for record in records {
        writer.write_record(&record?)?;
        matched += 1;
    }
    writer.finish()?;

    Ok(FilterSummary { matched })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use timeline_filter::filter::FilterError;
    use timeline_filter::SourceError;

    const EVENTS: &str = "\
{\"msg\": \"Prefetch {X}\", \"user\": \"alice\"}
{\"msg\": \"hello\", \"user\": \"bob\"}
{\"msg\": \"Prefetch {Y}\", \"user\": \"bob\"}
";

    fn options(source: PathBuf) -> FilterOptions {
        FilterOptions {
            source,
            format: None,
            filter: None,
            filter_files: Vec::new(),
            preset: None,
            fields: None,
            output: OutputFormat::Csv,
            limit: None,
        }
    }

    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.json_line");
        fs::write(&path, EVENTS).unwrap();
        (dir, path)
    }

    fn run_to_string(opts: &FilterOptions) -> Result<(FilterSummary, String)> {
        let mut buf = Vec::new();
        let summary = run(opts, &mut buf, false)?;
        Ok((summary, String::from_utf8(buf).unwrap()))
    }

    #[test]
    fn test_no_filter_emits_everything() {
        let (_dir, path) = setup();
        let (summary, out) = run_to_string(&options(path)).unwrap();
        assert_eq!(summary.matched, 3);
        assert_eq!(out.lines().next(), Some("msg,user"));
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn test_adhoc_filter_and_field_selection() {
        let (_dir, path) = setup();
        let opts = FilterOptions {
            filter: Some(r#"msg contains "Prefetch""#.into()),
            fields: Some("user".into()),
            ..options(path)
        };
        let (summary, out) = run_to_string(&opts).unwrap();
        assert_eq!(summary.matched, 2);
        assert_eq!(out, "user\nalice\nbob\n");
    }

    #[test]
    fn test_filter_file_is_anded_with_filter() {
        let (dir, path) = setup();
        let fragment = dir.path().join("bob.filter");
        fs::write(&fragment, r#"user == "bob""#).unwrap();
        let opts = FilterOptions {
            filter: Some(r#"msg contains "Prefetch""#.into()),
            filter_files: vec![fragment],
            fields: Some("msg".into()),
            ..options(path)
        };
        let (_, out) = run_to_string(&opts).unwrap();
        assert_eq!(out, "msg\nPrefetch {Y}\n");
    }

    #[test]
    fn test_limit() {
        let (_dir, path) = setup();
        let opts = FilterOptions {
            limit: Some(1),
            ..options(path)
        };
        assert_eq!(run_to_string(&opts).unwrap().0.matched, 1);
    }

    #[test]
    fn test_unknown_selected_field() {
        let (_dir, path) = setup();
        let opts = FilterOptions {
            fields: Some("msg,usr".into()),
            ..options(path)
        };
        assert!(matches!(
            run_to_string(&opts),
            Err(CommandError::Filter(FilterError::UnknownField { .. }))
        ));
    }

    #[test]
    fn test_unknown_preset() {
        let (_dir, path) = setup();
        let opts = FilterOptions {
            preset: Some("prefetc".into()),
            ..options(path)
        };
        assert!(matches!(
            run_to_string(&opts),
            Err(CommandError::Filter(FilterError::UnknownPreset { .. }))
        ));
    }

    #[test]
    fn test_missing_filter_file() {
        let (dir, path) = setup();
        let opts = FilterOptions {
            filter_files: vec![dir.path().join("missing.filter")],
            ..options(path)
        };
        match run_to_string(&opts) {
            Err(CommandError::Io(e)) => assert!(e.to_string().contains("missing.filter")),
            other => panic!("expected I/O error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let opts = options(dir.path().join("nope.json"));
        assert!(matches!(
            run_to_string(&opts),
            Err(CommandError::Source(SourceError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_empty_dataset_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.l2tcsv");
        fs::write(&path, "").unwrap();
        let (summary, out) = run_to_string(&options(path)).unwrap();
        assert_eq!(summary.matched, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_dataset_still_rejects_broken_query() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("header-only.l2tcsv");
        fs::write(&path, "a,b\n").unwrap();

        let opts = FilterOptions {
            filter: Some(r#"a == "1" and ("#.into()),
            ..options(path.clone())
        };
        assert!(matches!(
            run_to_string(&opts),
            Err(CommandError::Filter(FilterError::UnexpectedEndOfInput))
        ));

        let opts = FilterOptions {
            filter: Some(r#"anything == "1""#.into()),
            ..options(path)
        };
        assert_eq!(run_to_string(&opts).unwrap().0.matched, 0);
    }
}
