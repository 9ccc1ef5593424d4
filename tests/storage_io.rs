use prosperity_rs::models::{GroupType, Observation};
use prosperity_rs::storage;
use std::fs;

fn sample(n: usize) -> Vec<Observation> {
    (0..n)
        .map(|i| Observation {
            region_code: "DEU".into(),
            region_name: "Germany".into(),
            year: 2000 + i as i32,
            gdp_per_capita: 100.0 + i as f64,
            group_type: GroupType::Country,
        })
        .collect()
}

#[test]
fn save_csv_and_json() {
    let rows = sample(3);
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("countries.csv");
    storage::save_csv(&rows, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("region_code,region_name,"));
    assert_eq!(csv_txt.lines().count(), 1 + rows.len());

    let json_path = dir.path().join("countries.json");
    storage::save_json(&rows, &json_path).unwrap();
    let json_txt = fs::read_to_string(&json_path).unwrap();
    let back: Vec<Observation> = serde_json::from_str(&json_txt).unwrap();
    assert_eq!(back, rows);
    assert!(json_txt.contains("\"group_type\": \"country\""));
}

// Region labels come from upstream data; cells starting with =, +, - or @
// would be evaluated as formulas by spreadsheet software, so they are
// written with a leading single quote.
#[test]
fn csv_cells_are_prefixed_to_avoid_formulas() {
    let rows = vec![Observation {
        region_code: "=HYPERLINK(\"http://evil\")".into(),
        region_name: "@foo".into(),
        year: 2020,
        gdp_per_capita: 1.0,
        group_type: GroupType::Country,
    }];
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("injection.csv");
    storage::save_csv(&rows, &path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let row = rdr.records().next().expect("one data row expected").unwrap();
    assert_eq!(&row[0], "'=HYPERLINK(\"http://evil\")");
    assert_eq!(&row[1], "'@foo");
    assert_eq!(&row[2], "2020");
}
