//! Charts of the exported insights: a word cloud of interests and a pie of technical areas.

/// Pie chart of technical areas
pub mod pie;
/// Word cloud of interest terms
pub mod wordcloud;

use crate::error::{InsightError, Result};
use crate::export::{categorized_csv_path, extracted_csv_path, read_records};
use crate::models::{CategorizedInsight, InsightRecord, TechnicalArea, NOT_AVAILABLE};
use log::info;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Label of rows matching none of the technical areas
pub const OTHER: &str = "Other";

/// Files written by [`visualize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPaths {
    /// Word cloud image
    pub wordcloud: PathBuf,
    /// Pie chart image
    pub pie_chart: PathBuf,
}

pub(crate) fn chart_error<E: Display>(e: E) -> InsightError {
    InsightError::Chart(e.to_string())
}

/// Maps a free-form categorization onto the known areas by substring, or `Other`
pub fn clean_area_labels(row: &str) -> Vec<&'static str> {
    let lowered = row.to_lowercase();
    let labels: Vec<&'static str> = TechnicalArea::ALL
        .iter()
        .map(|area| area.label())
        .filter(|label| lowered.contains(&label.to_lowercase()))
        .collect();

    if labels.is_empty() {
        vec![OTHER]
    } else {
        labels
    }
}

/// Occurrences of every cleaned label, most frequent first
///
/// Ties keep the order of [`TechnicalArea::ALL`] with `Other` last.
pub fn area_counts(rows: &[CategorizedInsight]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for row in rows {
        for label in clean_area_labels(&row.technical_areas) {
            *counts.entry(label).or_insert(0) += 1;
        }
    }

    let mut ordered: Vec<(String, usize)> = TechnicalArea::ALL
        .iter()
        .map(|area| area.label())
        .chain(std::iter::once(OTHER))
        .filter_map(|label| counts.get(label).map(|count| (label.to_string(), *count)))
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1));
    ordered
}

/// Frequencies of comma-separated interest terms, most frequent first
///
/// Terms are grouped case-insensitively under their first spelling; `N/A`
/// values are skipped. Ties are ordered alphabetically.
pub fn topic_frequencies(rows: &[InsightRecord]) -> Vec<(String, usize)> {
    let mut spelling: HashMap<String, String> = HashMap::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for row in rows {
        for term in row.topics_of_interest.split(',').map(str::trim) {
            if term.is_empty() || term.eq_ignore_ascii_case(NOT_AVAILABLE) {
                continue;
            }
            let key = term.to_lowercase();
            spelling.entry(key.clone()).or_insert_with(|| term.to_string());
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    let mut terms: Vec<(String, usize)> = counts
        .into_iter()
        .filter_map(|(key, count)| spelling.remove(&key).map(|term| (term, count)))
        .collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    terms
}

/// Renders both charts from the CSV files of a previous run
pub fn visualize(results_dir: &Path, images_dir: &Path, repo: &str) -> Result<ChartPaths> {
    let extracted: Vec<InsightRecord> = read_records(&extracted_csv_path(results_dir, repo))?;
    let categorized: Vec<CategorizedInsight> = read_records(&categorized_csv_path(results_dir, repo))?;
    std::fs::create_dir_all(images_dir)?;

    let paths = ChartPaths {
        wordcloud: images_dir.join(format!("{}_topics_wordcloud.png", repo)),
        pie_chart: images_dir.join(format!("{}_topics_pie_chart.png", repo)),
    };

    wordcloud::render_wordcloud(
        &paths.wordcloud,
        &format!("Word Cloud of {} user interests", repo),
        &topic_frequencies(&extracted),
    )?;
    info!("Saved word cloud to {}", paths.wordcloud.display());

    pie::render_pie(
        &paths.pie_chart,
        &format!("Topics of Interest Distribution for {} users", repo),
        &area_counts(&categorized),
    )?;
    info!("Saved pie chart to {}", paths.pie_chart.display());

    Ok(paths)
}
