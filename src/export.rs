//! CSV export of insight rows, and the reload used by the visualizer.

use crate::error::Result;
use crate::models::{CategorizedInsight, InsightRecord};
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// `{results_dir}/{repo}_insights_extracted.csv`, holding the extracted rows
pub fn extracted_csv_path(results_dir: &Path, repo: &str) -> PathBuf {
    results_dir.join(format!("{}_insights_extracted.csv", repo))
}

/// `{results_dir}/{repo}_insights.csv`, holding the categorized rows
pub fn categorized_csv_path(results_dir: &Path, repo: &str) -> PathBuf {
    results_dir.join(format!("{}_insights.csv", repo))
}

/// A row type with a fixed column order
pub trait CsvRecord: Serialize {
    /// Header row, in serialization order
    const FIELDS: &'static [&'static str];
}

impl CsvRecord for InsightRecord {
    const FIELDS: &'static [&'static str] = &InsightRecord::FIELDS;
}

impl CsvRecord for CategorizedInsight {
    const FIELDS: &'static [&'static str] = &CategorizedInsight::FIELDS;
}

/// Writes `records` with a header row of field names
///
/// The header is written even when there are no rows.
pub fn write_records<T: CsvRecord>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        writer.write_record(T::FIELDS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Reads back a file written by [`write_records`], in file order
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn header_lists_field_names_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("repo_insights_extracted.csv");
        write_records(&path, &[InsightRecord::default()]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, InsightRecord::FIELDS.join(","));
    }

    #[test]
    fn empty_export_still_has_a_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo_insights.csv");
        write_records::<CategorizedInsight>(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.lines().next(),
            Some("name,country,city,email,occupation,programming_languages,social_media,technical_areas")
        );
        let reloaded: Vec<CategorizedInsight> = read_records(&path).unwrap();
        assert!(reloaded.is_empty());
    }

    #[test]
    fn reload_preserves_values_and_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo_insights.csv");
        let rows = vec![
            CategorizedInsight {
                name: "Ada \"Countess\" Lovelace".into(),
                country: "United Kingdom".into(),
                city: "London".into(),
                email: "ada@example.org".into(),
                occupation: "Analyst, Engines".into(),
                programming_languages: "Python, C++".into(),
                social_media: "https://ada.dev, https://x.com/ada".into(),
                technical_areas: "Machine Learning, Databases".into(),
            },
            CategorizedInsight {
                name: "N/A".into(),
                country: "N/A".into(),
                city: "N/A".into(),
                email: "N/A".into(),
                occupation: "line one\nline two".into(),
                programming_languages: "N/A".into(),
                social_media: "N/A".into(),
                technical_areas: "N/A".into(),
            },
        ];

        write_records(&path, &rows).unwrap();
        let reloaded: Vec<CategorizedInsight> = read_records(&path).unwrap();
        assert_eq!(reloaded, rows);
    }
}
