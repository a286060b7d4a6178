//! Backfill tests driven by an in-process stub geocoder.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use geocoder::backfill::{backfill, BackfillOptions};
use geocoder::geocode::{Coordinates, Geocoder};
use geocoder::table::Table;
use geocoder::template::{QueryTemplate, DEFAULT_TEMPLATE};

const EXPORT: &str = "\
Address,State,City,New customer records,Latitude,Longitude,Country 
100 Prairie Ln,KS,Hays,5,,,USA
1 Broadway,NY,New York,12,40.7,-74.0,USA
9 Unknown Rd,ZZ,Nowhere,4,,,USA
2 Ocean Dr,FL,Miami,3,25.77,,USA
";

/// Answers from a fixed table, errors for queries containing "Miami".
struct StubGeocoder {
    answers: HashMap<String, Coordinates>,
    queries: Mutex<Vec<String>>,
}

impl StubGeocoder {
    fn new() -> Self {
        let mut answers = HashMap::new();
        answers.insert(
            "Hays, KS, USA".to_string(),
            Coordinates {
                lat: "38.8791".to_string(),
                lon: "-99.3268".to_string(),
            },
        );
        Self {
            answers,
            queries: Mutex::new(Vec::new()),
        }
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>> {
        self.queries.lock().unwrap().push(query.to_string());
        if query.contains("Miami") {
            return Err(anyhow!("connection reset"));
        }
        Ok(self.answers.get(query).cloned())
    }
}

fn options() -> BackfillOptions {
    BackfillOptions {
        lat_column: "Latitude".to_string(),
        lon_column: "Longitude".to_string(),
        template: QueryTemplate::parse(DEFAULT_TEMPLATE).unwrap(),
        delay: Duration::ZERO,
        keep_existing: false,
        dry_run: false,
        output: None,
    }
}

// ============================================================================
// Lookups
// ============================================================================

#[tokio::test]
async fn test_fills_missing_rows_only() {
    let mut table = Table::from_csv_str(EXPORT).unwrap();
    let stub = StubGeocoder::new();

    let summary = backfill(&mut table, &stub, &options()).await.unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.resolved, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        stub.queries(),
        vec!["Hays, KS, USA", "Nowhere, ZZ, USA", "Miami, FL, USA"]
    );

    assert_eq!(table.get_named(0, "Latitude"), Some("38.8791"));
    assert_eq!(table.get_named(0, "Longitude"), Some("-99.3268"));
    // Untouched row keeps its text exactly.
    assert_eq!(table.get_named(1, "Longitude"), Some("-74.0"));
}

#[tokio::test]
async fn test_empty_result_blanks_and_continues() {
    let mut table = Table::from_csv_str(EXPORT).unwrap();
    let stub = StubGeocoder::new();

    backfill(&mut table, &stub, &options()).await.unwrap();

    assert_eq!(table.get_named(2, "Latitude"), Some(""));
    assert_eq!(table.get_named(2, "Longitude"), Some(""));
    // The failing row after it was still attempted, and blanked.
    assert_eq!(table.get_named(3, "Latitude"), Some(""));
}

#[tokio::test]
async fn test_keep_existing_on_failure() {
    let mut table = Table::from_csv_str(EXPORT).unwrap();
    let stub = StubGeocoder::new();
    let opts = BackfillOptions {
        keep_existing: true,
        ..options()
    };

    let summary = backfill(&mut table, &stub, &opts).await.unwrap();
    assert_eq!(summary.failed, 2);
    assert_eq!(table.get_named(3, "Latitude"), Some("25.77"));
}

#[tokio::test]
async fn test_alternate_columns_and_template() {
    let csv = "Address,City,State,Zip,Lat,Lon\n1 Main St,Hays,KS,67601,,\n";
    let mut table = Table::from_csv_str(csv).unwrap();
    let stub = StubGeocoder::new();
    let opts = BackfillOptions {
        lat_column: "Lat".to_string(),
        lon_column: "Lon".to_string(),
        template: QueryTemplate::parse("{Address}, {City}, {State} {Zip}").unwrap(),
        ..options()
    };

    let summary = backfill(&mut table, &stub, &opts).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(stub.queries(), vec!["1 Main St, Hays, KS 67601"]);
}

#[tokio::test]
async fn test_dry_run_makes_no_calls() {
    let mut table = Table::from_csv_str(EXPORT).unwrap();
    let before = table.clone();
    let stub = StubGeocoder::new();
    let opts = BackfillOptions {
        dry_run: true,
        ..options()
    };

    let summary = backfill(&mut table, &stub, &opts).await.unwrap();
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.resolved, 0);
    assert!(stub.queries().is_empty());
    assert_eq!(table, before);
}

#[tokio::test]
async fn test_latin1_row_does_not_stop_backfill() {
    let mut bytes = b"Address,State,City,Latitude,Longitude,Country \n".to_vec();
    bytes.extend_from_slice(b"2 Caf\xe9 Rd,MO,Kansas City,39.10,-94.58,USA\n");
    bytes.extend_from_slice(b"100 Prairie Ln,KS,Hays,,,USA\n");
    let mut table = Table::from_reader(&bytes[..]).unwrap();
    let stub = StubGeocoder::new();

    let summary = backfill(&mut table, &stub, &options()).await.unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.resolved, 1);
    assert_eq!(table.get_named(1, "Latitude"), Some("38.8791"));
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_table_written_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("datall.csv");
    std::fs::write(&path, EXPORT).unwrap();

    let mut table = Table::read(&path).unwrap();
    let stub = StubGeocoder::new();
    let opts = BackfillOptions {
        output: Some(path.clone()),
        ..options()
    };
    backfill(&mut table, &stub, &opts).await.unwrap();

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.starts_with(
        "Address,State,City,New customer records,Latitude,Longitude,Country \n"
    ));
    assert!(saved.contains("100 Prairie Ln,KS,Hays,5,38.8791,-99.3268,USA\n"));
    assert!(saved.contains("1 Broadway,NY,New York,12,40.7,-74.0,USA\n"));
    assert_eq!(Table::read(&path).unwrap(), table);
}

#[tokio::test]
async fn test_missing_coordinate_columns_are_added() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let mut table = Table::from_csv_str("City,State,Country \nHays,KS,USA\n").unwrap();
    let stub = StubGeocoder::new();
    let opts = BackfillOptions {
        output: Some(path.clone()),
        ..options()
    };

    backfill(&mut table, &stub, &opts).await.unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "City,State,Country ,Latitude,Longitude\nHays,KS,USA,38.8791,-99.3268\n"
    );
}
