//! End-to-end tests: timeline files on disk through schema discovery,
//! filter composition and evaluation.

use std::fs;

use tempfile::TempDir;
use timeline_filter::filter::{find_preset, FilterError, FilterSet, QueryEvaluator};
use timeline_filter::{Dataset, Error, Format, Record, SourceError};

const L2TCSV: &str = "\
date,time,timezone,MACB,source,sourcetype,type,user,host,short,desc,version,filename,inode,notes,format,extra
06/01/2020,10:15:00,UTC,..C.,LOG,Prefetch,Creation Time,-,WKS01,CMD.EXE was executed,Prefetch {CMD.EXE} was executed,2,C:/Windows/Prefetch/CMD.EXE-4A81B364.pf,0,-,prefetch,-
06/01/2020,10:16:00,UTC,M...,FILE,NTFS,Modification Time,-,WKS01,notes.txt,C:/Users/alice/notes.txt,2,C:/Users/alice/notes.txt,1,-,filestat,-
06/02/2020,08:00:00,UTC,..C.,LOG,Prefetch,Creation Time,-,WKS01,SVCHOST.EXE was executed,Prefetch {SVCHOST.EXE} was executed,2,C:/Windows/Prefetch/SVCHOST.EXE-1.pf,2,-,prefetch,-
";

fn write(dir: &TempDir, name: &str, content: &str) -> Dataset {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    Dataset::open(path, None).unwrap()
}

fn run(dataset: &Dataset, query: Option<&str>) -> timeline_filter::Result<Vec<Record>> {
    let schema = dataset.schema()?.expect("dataset has records");
    let evaluator = match query {
        Some(query) => QueryEvaluator::new(query, &schema)?,
        None => QueryEvaluator::pass_all(),
    };
    let records = dataset
        .filter(&evaluator)?
        .collect::<timeline_filter::Result<Vec<_>>>()?;
    Ok(records)
}

// ============================================================================
// Format Tests
// ============================================================================

#[test]
fn test_json_message_filter_emits_first_record_only() {
    let dir = TempDir::new().unwrap();
    let dataset = write(
        &dir,
        "events.json",
        r#"{"0": {"msg": "Prefetch {X}"}, "1": {"msg": "hello"}}"#,
    );

    let records = run(&dataset, Some(r#"msg contains "Prefetch""#)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("msg"), Some("Prefetch {X}"));
}

#[test]
fn test_json_line_source() {
    let dir = TempDir::new().unwrap();
    let dataset = write(
        &dir,
        "events.json_line",
        "{\"msg\": \"Prefetch {X}\"}\n{\"msg\": \"hello\"}\n",
    );

    let records = run(&dataset, Some(r#"msg not contains "Prefetch""#)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("msg"), Some("hello"));
}

#[test]
fn test_l2tcsv_schema_and_filter() {
    let dir = TempDir::new().unwrap();
    let dataset = write(&dir, "wks01.l2tcsv", L2TCSV);
    assert_eq!(dataset.format(), Format::L2tCsv);

    let schema = dataset.schema().unwrap().unwrap();
    assert_eq!(schema.len(), 17);
    assert_eq!(schema.fields()[3], "MACB");

    let records = run(
        &dataset,
        Some(r#"sourcetype == "Prefetch" and not short contains "SVCHOST""#),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("short"), Some("CMD.EXE was executed"));
}

#[test]
fn test_schema_discovery_ignores_later_rows() {
    let dir = TempDir::new().unwrap();
    let dataset = write(&dir, "abc.dynamic", "a,b,c\n1,2,3\nx,y,z\nonly\n");
    let schema = dataset.schema().unwrap().unwrap();
    assert_eq!(schema.fields(), ["a", "b", "c"]);
}

#[test]
fn test_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.csv");
    fs::write(&path, "a,b\n").unwrap();
    assert!(matches!(
        Dataset::open(&path, None),
        Err(SourceError::UnknownFormat { .. })
    ));
}

// ============================================================================
// Query Tests
// ============================================================================

#[test]
fn test_empty_filter_emits_every_record() {
    let dir = TempDir::new().unwrap();
    let dataset = write(&dir, "wks01.l2tcsv", L2TCSV);

    assert_eq!(run(&dataset, None).unwrap().len(), 3);
    assert_eq!(run(&dataset, Some("  ")).unwrap().len(), 3);
}

#[test]
fn test_any_field_iregex() {
    let dir = TempDir::new().unwrap();
    let dataset = write(&dir, "wks01.l2tcsv", L2TCSV);

    let records = run(&dataset, Some(r#"ANY iregex "alice""#)).unwrap();
    assert_eq!(records.len(), 1);
    let records = run(&dataset, Some(r#"ANY regex "ALICE""#)).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_unknown_field_is_fatal_before_any_record() {
    let dir = TempDir::new().unwrap();
    let dataset = write(&dir, "wks01.l2tcsv", L2TCSV);

    let err = run(&dataset, Some(r#"dsc contains "x""#)).unwrap_err();
    match err {
        Error::Filter(FilterError::UnknownField { field, suggestion }) => {
            assert_eq!(field, "dsc");
            assert_eq!(suggestion.as_deref(), Some("desc"));
        }
        other => panic!("expected unknown field, got {other:?}"),
    }
}

#[test]
fn test_date_parse_failure_propagates() {
    let dir = TempDir::new().unwrap();
    // l2tcsv dates are MM/DD/YYYY, not ISO-8601.
    let dataset = write(&dir, "wks01.l2tcsv", L2TCSV);

    let err = run(&dataset, Some(r#"date > "2020-01-01T00:00:00""#)).unwrap_err();
    assert!(matches!(err, Error::Filter(FilterError::DateParse { .. })));
}

#[test]
fn test_date_range_on_iso_timestamps() {
    let dir = TempDir::new().unwrap();
    let dataset = write(
        &dir,
        "events.json_line",
        concat!(
            "{\"datetime\": \"2019-01-01T00:00:00\", \"n\": \"1\"}\n",
            "{\"datetime\": \"2020-06-01T00:00:00\", \"n\": \"2\"}\n",
            "{\"datetime\": \"2021-06-01T00:00:00+00:00\", \"n\": \"3\"}\n",
        ),
    );

    let records = run(
        &dataset,
        Some(r#"datetime > "2020-01-01T00:00:00" and datetime < "2021-01-01""#),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("n"), Some("2"));
}

// ============================================================================
// Composition Tests
// ============================================================================

#[test]
fn test_fragment_file_and_adhoc_filter() {
    let dir = TempDir::new().unwrap();
    let fragment = dir.path().join("a.filter");
    fs::write(&fragment, "a == \"1\"\n").unwrap();
    let dataset = write(
        &dir,
        "ab.json_line",
        "{\"a\": \"1\", \"b\": \"2\"}\n{\"a\": \"1\", \"b\": \"3\"}\n{\"a\": \"0\", \"b\": \"2\"}\n",
    );

    let query = FilterSet::new()
        .with_fragment_file(&fragment)
        .unwrap()
        .with_filter(r#"b == "2""#)
        .compose()
        .unwrap();
    assert_eq!(query, r#"(a == "1") and (b == "2")"#);

    let records = run(&dataset, Some(&query)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("b"), Some("2"));
}

#[test]
fn test_prefetch_preset_on_l2tcsv() {
    let dir = TempDir::new().unwrap();
    let dataset = write(&dir, "wks01.l2tcsv", L2TCSV);

    let query = FilterSet::new()
        .with_preset(find_preset("prefetch").unwrap().query)
        .compose()
        .unwrap();
    let records = run(&dataset, Some(&query)).unwrap();
    assert_eq!(records.len(), 2);
}
