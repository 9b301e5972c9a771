//! LLM stages: per-row attribute extraction and batched interest categorization.
//!
//! Both stages validate the model's answers before anything is stored. An
//! answer of the wrong shape is an [`InsightError::Contract`] and stops the
//! run rather than silently misaligning rows.

use crate::error::{InsightError, Result};
use crate::llm::LanguageModel;
use crate::models::{CategorizedInsight, InsightRecord, ScrapedText, TechnicalArea, TechnicalAreas, NOT_AVAILABLE};
use crate::parallel::ParallelProcessor;
use crate::parser::parse_insight;
use crate::prompts::{categorization_prompt, EXTRACTION_PROMPT};
use crate::ui::ProgressManager;
use log::{debug, info};
use regex::Regex;
use std::sync::Arc;

/// Extracts the 8 insight fields from every scraped row, keeping input order
///
/// Up to `workers` calls run at once. Rows carrying a scrape error
/// placeholder are sent like any other row; the model answers them with `N/A`s.
pub async fn extract_insights(
    model: Arc<dyn LanguageModel>,
    rows: &[ScrapedText],
    workers: usize,
    progress: &ProgressManager,
) -> Result<Vec<InsightRecord>> {
    info!("Extracting insights from {} profiles with {}", rows.len(), model.name());
    let bar = progress.create_row_bar(rows.len(), "extracting insights");
    let pool = ParallelProcessor::new(workers);

    let texts: Vec<(String, String)> = rows
        .iter()
        .map(|r| (r.username.clone(), r.extracted_text.clone()))
        .collect();
    let results = pool
        .map(texts, |(username, text)| {
            let model = model.clone();
            let bar = bar.clone();
            async move {
                let answer = model.complete(EXTRACTION_PROMPT, &text).await?;
                bar.inc(1);
                parse_insight(&answer).map_err(|e| match e {
                    InsightError::Contract(msg) => InsightError::Contract(format!("{}: {}", username, msg)),
                    other => other,
                })
            }
        })
        .await;
    bar.finish_with_message("insights extracted");

    let insights = results.into_iter().collect::<Result<Vec<_>>>()?;
    info!("Extracted {} insight rows", insights.len());
    Ok(insights)
}

/// Parses one categorization row such as `[Machine Learning, Databases]` or `N/A`
pub fn parse_category_row(row: &str) -> Result<TechnicalAreas> {
    let marker = Regex::new(r"^\s*(?:[-*]|\d+[.)])\s+").map_err(|e| InsightError::Parse(e.to_string()))?;
    let cleaned = marker.replace(row, "");
    let cleaned = cleaned
        .trim()
        .trim_end_matches('.')
        .trim_matches(|c: char| c == '[' || c == ']')
        .trim();

    if cleaned.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return Ok(TechnicalAreas::not_applicable());
    }

    let mut areas = Vec::new();
    for label in cleaned.split(',').map(str::trim).filter(|l| !l.is_empty()) {
        if label.eq_ignore_ascii_case(NOT_AVAILABLE) {
            return Err(InsightError::Contract(format!("row mixes N/A with labels: {:?}", row)));
        }
        match TechnicalArea::from_label(label) {
            Some(area) => areas.push(area),
            None => {
                return Err(InsightError::Contract(format!(
                    "unknown technical area {:?} in row {:?}",
                    label, row
                )))
            }
        }
    }

    if areas.is_empty() {
        return Err(InsightError::Contract(format!("empty categorization row: {:?}", row)));
    }
    Ok(TechnicalAreas::new(areas))
}

/// Splits a categorization answer into exactly `expected` rows
///
/// Rows are separated by blank lines. Only an answer with no blank line at
/// all is split on single newlines instead.
pub fn parse_categories(answer: &str, expected: usize) -> Result<Vec<TechnicalAreas>> {
    let blank_line = Regex::new(r"\n\s*\n").map_err(|e| InsightError::Parse(e.to_string()))?;
    let mut rows: Vec<&str> = blank_line
        .split(answer.trim())
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect();

    if rows.len() == 1 && expected > 1 {
        debug!("categorization answer used single newlines between rows");
        rows = answer.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    }

    if rows.len() != expected {
        return Err(InsightError::Contract(format!(
            "categorization returned {} rows for {} inputs",
            rows.len(),
            expected
        )));
    }

    rows.into_iter().map(parse_category_row).collect()
}

fn topic_row(topics: &str) -> String {
    let flat = topics.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        flat
    }
}

/// Categorizes interest strings in batches of `batch_size`, one call per batch
pub async fn categorize_topics(
    model: &dyn LanguageModel,
    topics: &[String],
    batch_size: usize,
) -> Result<Vec<TechnicalAreas>> {
    let batch_size = batch_size.max(1);
    let mut categories = Vec::with_capacity(topics.len());

    for (index, batch) in topics.chunks(batch_size).enumerate() {
        let input = batch.iter().map(|t| topic_row(t)).collect::<Vec<_>>().join("\n\n");
        debug!("categorization batch {} ({} rows)", index + 1, batch.len());

        let answer = model.complete(&categorization_prompt(batch.len()), &input).await?;
        let parsed = parse_categories(&answer, batch.len())
            .map_err(|e| InsightError::Contract(format!("batch {}: {}", index + 1, e)))?;
        categories.extend(parsed);
    }

    Ok(categories)
}

/// Replaces every insight's free-text interests by its technical areas
pub async fn categorize_insights(
    model: &dyn LanguageModel,
    insights: Vec<InsightRecord>,
    batch_size: usize,
) -> Result<Vec<CategorizedInsight>> {
    info!("Categorizing interests of {} rows with {}", insights.len(), model.name());
    let topics: Vec<String> = insights.iter().map(|i| i.topics_of_interest.clone()).collect();
    let categories = categorize_topics(model, &topics, batch_size).await?;

    Ok(insights
        .into_iter()
        .zip(categories.iter())
        .map(|(insight, areas)| CategorizedInsight::from_insight(insight, areas))
        .collect())
}
