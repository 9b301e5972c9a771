//! Headless browser sessions used to render profile pages.

use async_trait::async_trait;
use fantoccini::ClientBuilder;
use log::{debug, warn};
use serde_json::json;

use crate::error::{InsightError, Result};

/// Anything that can turn a URL into the HTML of the rendered page
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Loads `url` and returns the page source after rendering
    async fn render(&self, url: &str) -> Result<String>;
}

/// Drives a WebDriver server (geckodriver, chromedriver) with one session per page
#[derive(Debug, Clone)]
pub struct WebDriverRenderer {
    webdriver_url: String,
}

impl WebDriverRenderer {
    /// Renderer talking to the WebDriver server at `webdriver_url`
    pub fn new(webdriver_url: &str) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
        }
    }

    fn capabilities() -> serde_json::Map<String, serde_json::Value> {
        let caps = json!({
            "moz:firefoxOptions": { "args": ["-headless"] },
            "goog:chromeOptions": { "args": ["--headless=new", "--disable-gpu", "--no-sandbox"] },
        });
        match caps {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        }
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(Self::capabilities());
        let client = builder.connect(&self.webdriver_url).await.map_err(|e| {
            InsightError::Browser(format!("cannot open session on {}: {}", self.webdriver_url, e))
        })?;

        debug!("rendering {}", url);
        let page = async {
            client.goto(url).await?;
            Ok::<_, InsightError>(client.source().await?)
        }
        .await;

        // The session is closed whether or not the page loaded.
        if let Err(e) = client.close().await {
            warn!("failed to close browser session for {}: {}", url, e);
        }
        page
    }
}
