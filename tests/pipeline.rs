use std::fs;

use csv_to_db::LoadError;
use csv_to_db::config::LoadConfig;
use csv_to_db::loader::LoaderOptions;
use csv_to_db::pipeline::run;
use rusqlite::Connection;

#[test]
fn run_writes_one_table_per_csv() {
    let out = tempfile::tempdir().unwrap();
    let config = LoadConfig {
        sources: vec!["tests/fixtures/people.csv".into(), "tests/fixtures/customers.csv".into()],
        output_dir: out.path().to_path_buf(),
        database_name: "warehouse".to_string(),
        ..Default::default()
    };

    let summary = run(&config, LoaderOptions::default()).unwrap();
    assert_eq!(summary.database_path, out.path().join("warehouse.db"));
    assert!(summary.report.is_complete());
    assert_eq!(summary.report.rows_inserted(), 5);

    let conn = Connection::open(&summary.database_path).unwrap();
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .unwrap();
    let tables: Vec<String> = stmt
        .query_map([], |r| r.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(tables, vec!["customers".to_string(), "people".to_string()]);
}

#[test]
fn run_replaces_a_previous_database() {
    let out = tempfile::tempdir().unwrap();
    let config = LoadConfig {
        sources: vec!["tests/fixtures/people.csv".into()],
        output_dir: out.path().to_path_buf(),
        ..Default::default()
    };

    run(&config, LoaderOptions::default()).unwrap();
    let summary = run(&config, LoaderOptions::default()).unwrap();
    assert_eq!(summary.database_path, out.path().join("database.db"));

    let conn = Connection::open(&summary.database_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM people", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn empty_csv_halts_before_the_database_is_created() {
    let out = tempfile::tempdir().unwrap();
    let config = LoadConfig {
        sources: vec!["tests/fixtures/people.csv".into(), "tests/fixtures/empty.csv".into()],
        output_dir: out.path().to_path_buf(),
        ..Default::default()
    };

    let err = run(&config, LoaderOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::EmptyFile { .. }));
    assert!(!out.path().join("database.db").exists());
}

#[test]
fn paths_file_drives_a_run() {
    let out = tempfile::tempdir().unwrap();
    let paths = out.path().join("paths.txt");
    fs::write(
        &paths,
        format!("tests/fixtures/orders.csv\n{}\nshop\n", out.path().display()),
    )
    .unwrap();

    let config = LoadConfig::from_paths_file(&paths).unwrap();
    let summary = run(&config, LoaderOptions::default()).unwrap();
    assert_eq!(summary.database_path, out.path().join("shop.db"));
    assert_eq!(summary.report.table("orders").unwrap().rows_inserted, 3);
}

#[test]
fn listing_a_file_twice_is_a_schema_conflict() {
    let out = tempfile::tempdir().unwrap();
    let config = LoadConfig {
        sources: vec!["tests/fixtures/people.csv".into(), "tests/fixtures/people.csv".into()],
        output_dir: out.path().to_path_buf(),
        ..Default::default()
    };

    let err = run(&config, LoaderOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::SchemaConflict { ref table, .. } if table == "people"));
}

#[test]
fn missing_inputs_are_a_configuration_error() {
    let config = LoadConfig::new(["tests/fixtures/nope*.csv"]);
    let err = run(&config, LoaderOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Configuration { .. }));
}
