use mockito::{Matcher, ServerGuard};
use pretty_assertions::assert_eq;
use stargazer_insights::cache::{Stage, StageCache};
use stargazer_insights::error::InsightError;
use stargazer_insights::export::read_records;
use stargazer_insights::models::{CategorizedInsight, InsightRecord, ScrapedText};
use stargazer_insights::orchestrator::{Components, Pipeline};
use stargazer_insights::ui::ProgressManager;
use stargazer_insights::Config;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::TempDir;

mod common;
use common::test_helpers::*;
use common::{StubCategorizer, StubExtractor, StubRenderer};

async fn mock_github() -> ServerGuard {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rate_limit")
        .with_body(rate_limit_json())
        .create_async()
        .await;
    server
        .mock("GET", "/repos/octo/widgets/stargazers")
        .match_query(Matcher::Any)
        .with_body(stargazers_json(&["ada".into(), "broken".into(), "linus".into()]))
        .create_async()
        .await;

    for (login, id) in [("ada", 1), ("broken", 2), ("linus", 3)] {
        server
            .mock("GET", format!("/users/{}", login).as_str())
            .with_body(user_json(login, id))
            .create_async()
            .await;
        for suffix in ["repos", "starred"] {
            server
                .mock("GET", format!("/users/{}/{}", login, suffix).as_str())
                .match_query(Matcher::Any)
                .with_body("[]")
                .create_async()
                .await;
        }
    }
    server
}

fn pipeline(config: Config, extractor: Arc<StubExtractor>, categorizer: StubCategorizer, fresh: bool) -> Pipeline {
    let components = Components {
        github: github_client(&config.endpoints.github_api),
        renderer: Arc::new(StubRenderer { failing: vec!["broken".into()] }),
        extractor,
        categorizer: Arc::new(categorizer),
    };
    Pipeline::with_components(config, components, fresh, ProgressManager::hidden()).unwrap()
}

#[tokio::test]
async fn failing_scrape_keeps_its_row_through_every_stage() {
    setup_test_logger();
    let server = mock_github().await;
    let output = TempDir::new().unwrap();
    let config = create_test_config(&server.url(), output.path());
    let results_dir = config.output.results_dir.clone();

    let summary = pipeline(config, Arc::new(StubExtractor::new()), StubCategorizer::new(false), true)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.stargazers, 3);
    assert_eq!(summary.details_found, 3);
    assert_eq!(summary.scraped, 3);
    assert_eq!(summary.insights, 3);

    let cache = StageCache::new(&results_dir, "widgets", false);
    let scraped: Vec<ScrapedText> = cache.get(Stage::StargazerScrapedDetails).await.unwrap().unwrap();
    assert_eq!(scraped[0].extracted_text, "ada 12 contributions in the last year");
    assert_eq!(
        scraped[1].extracted_text,
        "Error extracting text from broken: Browser error: session for broken crashed"
    );

    let extracted: Vec<InsightRecord> = read_records(&summary.extracted_csv).unwrap();
    let names: Vec<&str> = extracted.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["ada", "N/A", "linus"]);
    assert_eq!(extracted[0].social_media, "https://github.com/ada");

    let categorized: Vec<CategorizedInsight> = read_records(&summary.categorized_csv).unwrap();
    let areas: Vec<&str> = categorized.iter().map(|r| r.technical_areas.as_str()).collect();
    assert_eq!(areas, vec!["Databases, Web development", "N/A", "Databases, Web development"]);
    assert!(summary.categorized_csv.ends_with("widgets_insights.csv"));
}

#[tokio::test]
async fn rerun_reuses_stage_snapshots() {
    let server = mock_github().await;
    let output = TempDir::new().unwrap();
    let config = create_test_config(&server.url(), output.path());

    pipeline(config.clone(), Arc::new(StubExtractor::new()), StubCategorizer::new(false), false)
        .run()
        .await
        .unwrap();

    // A categorizer that breaks the row contract is never called on rerun.
    let extractor = Arc::new(StubExtractor::new());
    let summary = pipeline(config, extractor.clone(), StubCategorizer::new(true), false)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.insights, 3);
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn lost_categorization_row_fails_the_run() {
    let server = mock_github().await;
    let output = TempDir::new().unwrap();
    let config = create_test_config(&server.url(), output.path());
    let results_dir = config.output.results_dir.clone();

    let result = pipeline(config, Arc::new(StubExtractor::new()), StubCategorizer::new(true), true)
        .run()
        .await;

    assert!(matches!(result, Err(InsightError::Contract(_))));
    let cache = StageCache::new(&results_dir, "widgets", false);
    assert!(cache.path(Stage::StargazerInsights).exists());
    assert!(!cache.path(Stage::StargazerInsightsCategorized).exists());
}

#[test]
fn missing_repository_is_rejected_before_any_stage() {
    let output = TempDir::new().unwrap();
    let mut config = create_test_config("http://127.0.0.1:9", output.path());
    config.repo_url = None;

    let components = Components {
        github: github_client("http://127.0.0.1:9"),
        renderer: Arc::new(StubRenderer { failing: vec![] }),
        extractor: Arc::new(StubExtractor::new()),
        categorizer: Arc::new(StubCategorizer::new(false)),
    };
    let result = Pipeline::with_components(config, components, false, ProgressManager::hidden());
    assert!(matches!(result, Err(InsightError::Config(_))));
}
