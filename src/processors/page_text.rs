//! Visible-text extraction from rendered GitHub profile pages.
//!
//! A profile page is reduced to the text of four regions, each found by the
//! class of its first matching element. Text is gathered the way a browser's
//! `innerText` would lay it out: block elements break lines, runs of
//! whitespace collapse, and hidden or non-rendered elements are skipped.

use crate::browser::PageRenderer;
use crate::error::{InsightError, Result};
use crate::models::{ScrapedText, StargazerRecord};
use crate::parallel::ParallelProcessor;
use crate::ui::ProgressManager;
use ego_tree::iter::Edge;
use ego_tree::NodeId;
use log::{debug, info, warn};
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::Arc;

/// How lines of a region are filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineRule {
    /// Every line
    All,
    /// Lines up to, not including, the first one containing the marker
    StopBefore(&'static str),
    /// Only lines containing one of the markers
    KeepMatching(&'static [&'static str]),
}

struct Region {
    name: &'static str,
    class: &'static str,
    rule: LineRule,
}

const REGIONS: [Region; 4] = [
    Region {
        name: "name-card",
        class: "h-card",
        rule: LineRule::StopBefore("Achievements"),
    },
    Region {
        name: "intro-card",
        class: "markdown-body",
        rule: LineRule::All,
    },
    Region {
        name: "pinned-repos",
        class: "js-pinned-items-reorder-container",
        rule: LineRule::All,
    },
    Region {
        name: "contributions",
        class: "js-yearly-contributions",
        rule: LineRule::KeepMatching(&["contributions in the last year", "Contributed to"]),
    },
];

const SKIPPED_TAGS: [&str; 5] = ["script", "style", "template", "noscript", "head"];

const BLOCK_TAGS: [&str; 28] = [
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "nav", "ol", "p", "section", "ul",
];

/// Returns the joined text of the profile regions found in `html`
///
/// Missing regions contribute nothing; a page without any of them yields an
/// empty string.
pub fn extract_profile_text(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();

    for region in &REGIONS {
        let selector = Selector::parse(&format!(".{}", region.class))
            .map_err(|e| InsightError::Parse(format!("bad selector for {}: {:?}", region.name, e)))?;
        let Some(element) = document.select(&selector).next() else {
            debug!("region {} not present", region.name);
            continue;
        };
        lines.extend(apply_rule(visible_lines(element), region.rule));
    }

    Ok(lines.join(" ").trim().to_string())
}

fn apply_rule(lines: Vec<String>, rule: LineRule) -> Vec<String> {
    match rule {
        LineRule::All => lines,
        LineRule::StopBefore(marker) => lines.into_iter().take_while(|l| !l.contains(marker)).collect(),
        LineRule::KeepMatching(markers) => lines
            .into_iter()
            .filter(|l| markers.iter().any(|m| l.contains(m)))
            .collect(),
    }
}

/// Non-empty rendered lines below `root`
pub fn visible_lines(root: ElementRef<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut pending_space = false;
    let mut skipping: Option<NodeId> = None;

    for edge in root.traverse() {
        match edge {
            Edge::Open(node) => {
                if skipping.is_some() {
                    continue;
                }
                match node.value() {
                    Node::Element(el) => {
                        if SKIPPED_TAGS.contains(&el.name()) || el.attr("hidden").is_some() {
                            skipping = Some(node.id());
                        } else if BLOCK_TAGS.contains(&el.name()) {
                            flush_line(&mut lines, &mut current);
                            pending_space = false;
                        }
                    }
                    Node::Text(text) => {
                        for c in text.chars() {
                            if c.is_whitespace() {
                                pending_space = true;
                            } else {
                                if pending_space && !current.is_empty() {
                                    current.push(' ');
                                }
                                pending_space = false;
                                current.push(c);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Edge::Close(node) => {
                if skipping == Some(node.id()) {
                    skipping = None;
                    continue;
                }
                if skipping.is_none() {
                    if let Node::Element(el) = node.value() {
                        if BLOCK_TAGS.contains(&el.name()) {
                            flush_line(&mut lines, &mut current);
                            pending_space = false;
                        }
                    }
                }
            }
        }
    }
    flush_line(&mut lines, &mut current);
    lines
}

fn flush_line(lines: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        lines.push(std::mem::take(current));
    }
}

/// Renders one profile page and extracts its region text
pub async fn scrape_profile(renderer: &dyn PageRenderer, profile_base: &str, username: &str) -> Result<String> {
    let url = format!("{}/{}", profile_base.trim_end_matches('/'), username);
    let html = renderer.render(&url).await?;
    extract_profile_text(&html)
}

/// Placeholder stored for a row whose page could not be scraped
pub fn error_placeholder(username: &str, error: &InsightError) -> String {
    format!("Error extracting text from {}: {}", username, error)
}

/// Scrapes every stargazer's profile with at most `workers` sessions open
///
/// Always returns one row per input, in input order; failed rows carry the
/// [`error_placeholder`] text.
pub async fn scrape_profiles(
    renderer: Arc<dyn PageRenderer>,
    profile_base: &str,
    stargazers: &[StargazerRecord],
    workers: usize,
    progress: &ProgressManager,
) -> Vec<ScrapedText> {
    info!("Scraping {} profile pages with {} browser sessions", stargazers.len(), workers);
    let bar = progress.create_row_bar(stargazers.len(), "scraping profiles");
    let pool = ParallelProcessor::new(workers);

    let usernames: Vec<String> = stargazers.iter().map(|s| s.username.clone()).collect();
    let results = pool
        .map(usernames.clone(), |username| {
            let renderer = renderer.clone();
            let base = profile_base.to_string();
            let bar = bar.clone();
            async move {
                let result = scrape_profile(renderer.as_ref(), &base, &username).await;
                bar.inc(1);
                result
            }
        })
        .await;
    bar.finish_with_message("profiles scraped");

    let mut failures = 0;
    let rows: Vec<ScrapedText> = usernames
        .into_iter()
        .zip(results)
        .map(|(username, result)| {
            let extracted_text = match result {
                Ok(text) => text,
                Err(e) => {
                    failures += 1;
                    warn!("Scrape of {} failed: {}", username, e);
                    error_placeholder(&username, &e)
                }
            };
            ScrapedText { username, extracted_text }
        })
        .collect();

    info!("Scraped {} profiles ({} failed)", rows.len(), failures);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    const PROFILE: &str = r#"
        <html><head><title>octo</title><script>var x = 1;</script></head><body>
        <div class="h-card">
            <h1><span class="p-name">Octo   Cat</span> <span class="p-nickname">octocat</span></h1>
            <div class="p-note">Building <b>databases</b> at Example Corp</div>
            <ul><li><span>San Francisco</span></li><li><a href="https://octo.dev">octo.dev</a></li></ul>
            <h2>Achievements</h2>
            <div>Pull Shark x2</div>
        </div>
        <article class="markdown-body">
            <p>Hi, I like <em>machine learning</em>.</p>
            <template><p>never shown</p></template>
        </article>
        <div class="js-pinned-items-reorder-container">
            <ol><li><span>vector-db</span><p>An embedded vector store</p></li></ol>
            <div hidden>drafts</div>
        </div>
        <div class="js-yearly-contributions">
            <h2>1,234 contributions
                in the last year</h2>
            <div>Less More</div>
            <div>Contributed to <a>rust-lang/rust</a></div>
        </div>
        </body></html>
    "#;

    #[test]
    fn extracts_regions_with_line_rules() {
        let text = extract_profile_text(PROFILE).unwrap();
        assert_eq!(
            text,
            "Octo Cat octocat Building databases at Example Corp San Francisco octo.dev \
             Hi, I like machine learning. \
             vector-db An embedded vector store \
             1,234 contributions in the last year Contributed to rust-lang/rust"
        );
    }

    #[test]
    fn skips_hidden_and_non_rendered_elements() {
        let document = Html::parse_fragment(
            r#"<div id="root">shown<style>.a{}</style><span hidden>secret</span><p>next</p></div>"#,
        );
        let selector = Selector::parse("#root").unwrap();
        let root = document.select(&selector).next().unwrap();
        assert_eq!(visible_lines(root), vec!["shown".to_string(), "next".to_string()]);
    }

    #[test]
    fn page_without_regions_is_empty() {
        assert_eq!(extract_profile_text("<html><body><p>404</p></body></html>").unwrap(), "");
    }

    struct FixedPages;

    #[async_trait]
    impl PageRenderer for FixedPages {
        async fn render(&self, url: &str) -> Result<String> {
            if url.ends_with("/broken") {
                return Err(InsightError::Browser("session crashed".into()));
            }
            Ok(format!(r#"<div class="h-card"><h1>{}</h1></div>"#, url))
        }
    }

    #[tokio::test]
    async fn failed_scrapes_become_placeholders_in_order() {
        let stargazers: Vec<StargazerRecord> = ["ada", "broken", "linus"]
            .iter()
            .map(|u| StargazerRecord { username: u.to_string() })
            .collect();

        let rows = scrape_profiles(
            Arc::new(FixedPages),
            "https://github.com/",
            &stargazers,
            2,
            &ProgressManager::hidden(),
        )
        .await;

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].extracted_text, "https://github.com/ada");
        assert_eq!(rows[1].username, "broken");
        assert_eq!(
            rows[1].extracted_text,
            "Error extracting text from broken: Browser error: session crashed"
        );
        assert_eq!(rows[2].extracted_text, "https://github.com/linus");
    }
}
