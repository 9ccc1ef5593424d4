use crate::models::Observation;
use anyhow::Result;
use csv::WriterBuilder;
use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix cells that a spreadsheet would evaluate as a formula.
fn safe_cell(s: &str) -> Cow<'_, str> {
    match s.chars().next() {
        Some('=' | '+' | '-' | '@') => Cow::Owned(format!("'{s}")),
        _ => Cow::Borrowed(s),
    }
}

/// Save the canonical table as CSV with header.
pub fn save_csv<P: AsRef<Path>>(observations: &[Observation], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["region_code", "region_name", "year", "gdp_per_capita", "group_type"])?;
    for o in observations {
        wtr.serialize((
            safe_cell(&o.region_code),
            safe_cell(&o.region_name),
            o.year,
            o.gdp_per_capita,
            o.group_type.as_str(),
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the canonical table as pretty JSON array.
pub fn save_json<P: AsRef<Path>>(observations: &[Observation], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(observations)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
