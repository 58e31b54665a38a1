//! End-to-end runs over temporary files.

use std::fs;
use std::path::{Path, PathBuf};

use matterload::{
    format_profile, profile_file, read_file, transform_file, write_report, CaseMode, ColumnMap,
    DuplicatePolicy, IssueKind, MappingError, NullTokens, PipelineError, ProfileOptions,
    TransformConfig, TransformError,
};

fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_end_to_end_proper_case() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(
        dir.path(),
        "matters.csv",
        b"Name,Code\n alice ,12345.1\nBOB,12345.67890\n",
    );
    let output = dir.path().join("upload.csv");

    let config = TransformConfig::new(ColumnMap::parse(["Name:Name", "Code:ClientMatterCode"]).unwrap())
        .with_case(CaseMode::Proper)
        .with_duplicates(DuplicatePolicy::Error);
    let outcome = transform_file(&input, &output, &config).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Name,ClientMatterCode\nAlice,12345.1\nBob,12345.67890\n"
    );
    let issues = &outcome.result.issues;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::LikelyTruncated);
    assert_eq!(issues[0].row_index, 0);
    assert_eq!(issues[0].row_number(), 2);
}

#[test]
fn test_keep_first_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(
        dir.path(),
        "matters.csv",
        b"ClientMatterCode;Client\n\
          11111.11111;A\n\
          22222.22222;B\n\
          11111.11111;A again\n\
          33333.33333;C\n\
          22222.22222;B again\n",
    );
    let output = dir.path().join("out").join("upload.csv");

    let config = TransformConfig::new(ColumnMap::parse(["ClientMatterCode", "Client"]).unwrap())
        .with_duplicates(DuplicatePolicy::KeepFirst);
    let outcome = transform_file(&input, &output, &config).unwrap();

    assert_eq!(outcome.result.rows_in, 5);
    assert_eq!(outcome.result.rows_out, 3);
    let dropped: Vec<usize> = outcome
        .result
        .issues_of(IssueKind::DuplicateKey)
        .map(|i| i.row_index)
        .collect();
    assert_eq!(dropped, vec![2, 4]);

    // The written file reads back as the surviving rows
    let written = read_file(&output).unwrap().table;
    let clients: Vec<_> = written.column_values(1).collect();
    assert_eq!(clients, vec![Some("A"), Some("B"), Some("C")]);
}

#[test]
fn test_duplicate_error_names_row_and_key() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(
        dir.path(),
        "matters.csv",
        b"ClientMatterCode\nA\nB\nA\nC\nB\n",
    );
    let output = dir.path().join("upload.csv");

    let config = TransformConfig::new(ColumnMap::parse(["ClientMatterCode"]).unwrap());
    let err = transform_file(&input, &output, &config).unwrap_err();

    match &err {
        PipelineError::Transform(TransformError::DuplicateKey { row_index, key }) => {
            assert_eq!(*row_index, 2);
            assert_eq!(key, "A");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("row 4"));
    assert!(!output.exists());
}

#[test]
fn test_unknown_source_column_produces_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "matters.csv", b"Name,Code\na,12345.67890\n");
    let output = dir.path().join("upload.csv");

    let config = TransformConfig::new(ColumnMap::parse(["Name", "Matter:ClientMatterCode"]).unwrap());
    let err = transform_file(&input, &output, &config).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Mapping(MappingError::UnknownSourceColumn(ref c)) if c == "Matter"
    ));
    assert!(!output.exists());
}

#[test]
fn test_strict_mode_lists_every_bad_key() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(
        dir.path(),
        "matters.csv",
        b"ClientMatterCode\n12345.67890\n12345.1\n\nNULL\n99999.00000\n",
    );
    let output = dir.path().join("upload.csv");

    let config = TransformConfig::new(ColumnMap::parse(["ClientMatterCode"]).unwrap()).strict(true);
    let err = transform_file(&input, &output, &config).unwrap_err();

    match err {
        PipelineError::Transform(TransformError::InvalidKeys(issues)) => {
            // The blank line is skipped on read, so NULL is the third data row
            let rows: Vec<usize> = issues.iter().map(|i| i.row_index).collect();
            assert_eq!(rows, vec![1, 2]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_latin1_input_written_as_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(
        dir.path(),
        "matters.csv",
        b"ClientMatterCode,Client\n12345.67890,Soci\xe9t\xe9 G\xe9n\xe9rale et Associ\xe9s\n",
    );
    let output = dir.path().join("upload.csv");

    let config = TransformConfig::new(ColumnMap::parse(["ClientMatterCode", "Client"]).unwrap());
    let outcome = transform_file(&input, &output, &config).unwrap();

    assert_ne!(outcome.source.encoding.as_deref(), Some("UTF-8"));
    // Whatever the guess, the output must be valid UTF-8
    let bytes = fs::read(&output).unwrap();
    assert!(String::from_utf8(bytes).is_ok());
}

#[test]
fn test_custom_null_tokens_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(
        dir.path(),
        "matters.tsv",
        b"ClientMatterCode\tNote\n12345.67890\t-\n-\tkeep\n",
    );
    let output = dir.path().join("upload.csv");
    let report = dir.path().join("report.json");

    let config = TransformConfig::new(ColumnMap::parse(["ClientMatterCode", "Note"]).unwrap())
        .with_null_tokens(NullTokens::new(["-"]));
    let outcome = transform_file(&input, &output, &config).unwrap();
    write_report(&outcome.report(&config), &report).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "ClientMatterCode,Note\n12345.67890,\n,keep\n"
    );

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["source"]["delimiter"], "\t");
    assert_eq!(json["issues"][0]["kind"], "null_key");
    assert_eq!(json["issues"][0]["rawValue"], "-");
    assert_eq!(json["config"]["nullTokens"][0], "-");
}

#[test]
fn test_profile_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(
        dir.path(),
        "matters.csv",
        b"ClientMatterCode,Client\n\
          12345.67890,Acme\n\
          12345.1,Acme\n\
          12345.67890,\n\
          N/A,Globex\n",
    );

    let (report, source) = profile_file(&input, &ProfileOptions::default()).unwrap();
    assert_eq!(source.columns, vec!["ClientMatterCode", "Client"]);

    let client = report.column("Client").unwrap();
    assert_eq!(client.null_count, 1);
    assert_eq!(client.distinct_count, 2);

    let key = report.key.as_ref().unwrap();
    assert_eq!(key.duplicated_values, vec!["12345.67890"]);
    assert_eq!(key.tally.valid, 2);
    assert_eq!(key.tally.likely_truncated, 1);
    assert_eq!(key.tally.null, 1);

    let text = format_profile(&report);
    assert!(text.contains("Rows: 4"));
    assert!(text.contains("Row 3: '12345.1' - possible truncation"));
}

#[test]
fn test_profile_missing_key_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "people.csv", b"Name\nAlice\n");

    let options = ProfileOptions::default().with_key_column("ClientMatterCode");
    let (report, _) = profile_file(&input, &options).unwrap();

    assert!(report.key.is_none());
    assert_eq!(report.warnings.len(), 1);
}
