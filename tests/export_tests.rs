use pretty_assertions::assert_eq;
use stargazer_insights::charts::{self, area_counts};
use stargazer_insights::export::{categorized_csv_path, extracted_csv_path, read_records, write_records};
use stargazer_insights::models::{CategorizedInsight, InsightRecord, TechnicalArea, TechnicalAreas};
use tempfile::TempDir;

fn insight(name: &str, topics: &str) -> InsightRecord {
    InsightRecord {
        name: name.into(),
        country: "United States".into(),
        city: "New York".into(),
        email: format!("{}@example.com", name),
        occupation: "Engineer, Data".into(),
        programming_languages: "Python, Java".into(),
        topics_of_interest: topics.into(),
        social_media: "https://example.com/a:b".into(),
    }
}

#[test]
fn export_then_reload_preserves_rows() {
    let dir = TempDir::new().unwrap();
    let path = extracted_csv_path(dir.path(), "widgets");
    let rows = vec![
        insight("ada", "Postgres, \"vector\" search"),
        InsightRecord::default(),
        insight("linus", "kernels\nfilesystems"),
    ];

    write_records(&path, &rows).unwrap();
    let reloaded: Vec<InsightRecord> = read_records(&path).unwrap();

    assert_eq!(reloaded, rows);
}

#[test]
fn categorized_rows_feed_the_pie_counts() {
    let dir = TempDir::new().unwrap();
    let path = categorized_csv_path(dir.path(), "widgets");
    let ml_db = TechnicalAreas::new(vec![TechnicalArea::Databases, TechnicalArea::MachineLearning]);
    let rows = vec![
        CategorizedInsight::from_insight(insight("ada", "x"), &ml_db),
        CategorizedInsight::from_insight(insight("bob", "y"), &TechnicalAreas::not_applicable()),
        CategorizedInsight::from_insight(insight("cy", "z"), &TechnicalAreas::new(vec![TechnicalArea::Databases])),
    ];

    write_records(&path, &rows).unwrap();
    let reloaded: Vec<CategorizedInsight> = read_records(&path).unwrap();

    assert_eq!(
        area_counts(&reloaded),
        vec![
            ("Databases".to_string(), 2),
            ("Machine Learning".to_string(), 1),
            ("Other".to_string(), 1),
        ]
    );
}

#[test]
fn visualize_requires_previous_results() {
    let dir = TempDir::new().unwrap();
    let result = charts::visualize(&dir.path().join("results"), &dir.path().join("images"), "widgets");
    assert!(result.is_err());
}
