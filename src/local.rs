//! Reader for the World Bank SDMX-style CSV export used as offline fallback.
//!
//! Only four columns are used and they are looked up by header name, so
//! extra columns and column order do not matter:
//!
//! | file column      | canonical field  |
//! |------------------|------------------|
//! | `REF_AREA`       | `region_code`    |
//! | `REF_AREA_LABEL` | `region_name`    |
//! | `TIME_PERIOD`    | `year`           |
//! | `OBS_VALUE`      | `gdp_per_capita` |

use crate::error::SourceError;
use crate::models::{RawBatch, RawRow, parse_value, parse_year};
use csv::ReaderBuilder;
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const COL_CODE: &str = "REF_AREA";
pub const COL_NAME: &str = "REF_AREA_LABEL";
pub const COL_YEAR: &str = "TIME_PERIOD";
pub const COL_VALUE: &str = "OBS_VALUE";

/// Read and normalize a fallback CSV file.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<RawBatch, SourceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let batch = read_csv_from(file, path)?;
    debug!(
        "read {} rows from {}, dropped {}",
        batch.rows.len(),
        path.display(),
        batch.dropped
    );
    Ok(batch)
}

/// Same as [`read_csv`] over any reader; `origin` is only used in errors.
pub fn read_csv_from<R: Read>(reader: R, origin: &Path) -> Result<RawBatch, SourceError> {
    let csv_err = |source: csv::Error| SourceError::Csv {
        path: origin.to_path_buf(),
        source,
    };
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().map_err(csv_err)?.clone();

    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim().trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| SourceError::MissingColumn {
                path: origin.to_path_buf(),
                column: name,
            })
    };
    let code_idx = column(COL_CODE)?;
    let name_idx = column(COL_NAME)?;
    let year_idx = column(COL_YEAR)?;
    let value_idx = column(COL_VALUE)?;

    let mut batch = RawBatch::default();
    for record in rdr.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                debug!("skipping unreadable CSV record: {e}");
                batch.dropped += 1;
                continue;
            }
        };
        let year = record.get(year_idx).and_then(parse_year);
        let value = record.get(value_idx).and_then(parse_value);
        match (record.get(code_idx), record.get(name_idx), year, value) {
            (Some(code), Some(name), Some(year), Some(gdp_per_capita)) => {
                batch.rows.push(RawRow {
                    region_code: code.to_string(),
                    region_name: name.to_string(),
                    year,
                    gdp_per_capita,
                })
            }
            _ => batch.dropped += 1,
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_found_by_name_in_any_order() {
        let data = "\
OBS_VALUE,UNIT,TIME_PERIOD,REF_AREA_LABEL,REF_AREA
1200.5,USD,2001,Kenya,KEN
";
        let batch = read_csv_from(data.as_bytes(), Path::new("mem.csv")).unwrap();
        assert_eq!(
            batch.rows,
            vec![RawRow {
                region_code: "KEN".into(),
                region_name: "Kenya".into(),
                year: 2001,
                gdp_per_capita: 1200.5,
            }]
        );
        assert_eq!(batch.dropped, 0);
    }

    #[test]
    fn short_rows_are_dropped() {
        let data = "REF_AREA,REF_AREA_LABEL,TIME_PERIOD,OBS_VALUE\nKEN,Kenya\n";
        let batch = read_csv_from(data.as_bytes(), Path::new("mem.csv")).unwrap();
        assert!(batch.rows.is_empty());
        assert_eq!(batch.dropped, 1);
    }
}
