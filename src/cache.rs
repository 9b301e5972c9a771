use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use serde::{de::DeserializeOwned, Serialize};
use log::{debug, info};
use crate::error::Result;

/// Pipeline stages whose output is snapshotted between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Stargazer logins
    StargazerList,
    /// Profile detail lookups
    StargazerDetails,
    /// Scraped profile page text
    StargazerScrapedDetails,
    /// Extracted 8-field insights
    StargazerInsights,
    /// Insights with technical areas
    StargazerInsightsCategorized,
}

impl Stage {
    /// Name used in snapshot file names
    pub fn name(&self) -> &'static str {
        match self {
            Stage::StargazerList => "StargazerList",
            Stage::StargazerDetails => "StargazerDetails",
            Stage::StargazerScrapedDetails => "StargazerScrapedDetails",
            Stage::StargazerInsights => "StargazerInsights",
            Stage::StargazerInsightsCategorized => "StargazerInsightsCategorized",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// JSON snapshots of stage outputs, one file per repository and stage
///
/// A snapshot is written once a stage completes and is loaded instead of
/// recomputing the stage on the next run, unless the store is `fresh`.
#[derive(Debug, Clone)]
pub struct StageCache {
    results_dir: PathBuf,
    repo: String,
    fresh: bool,
}

impl StageCache {
    /// Creates a store for `repo` under `results_dir`
    pub fn new(results_dir: impl Into<PathBuf>, repo: &str, fresh: bool) -> Self {
        Self {
            results_dir: results_dir.into(),
            repo: repo.to_string(),
            fresh,
        }
    }

    /// Path of the snapshot file for `stage`
    pub fn path(&self, stage: Stage) -> PathBuf {
        self.results_dir.join(format!("{}_{}.json", self.repo, stage))
    }

    /// Loads the snapshot of `stage`, if one exists and reuse is allowed
    pub async fn get<T: DeserializeOwned>(&self, stage: Stage) -> Result<Option<T>> {
        if self.fresh {
            return Ok(None);
        }
        let path = self.path(stage);
        if !path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let value = serde_json::from_str(&content)?;
        debug!("loaded snapshot {}", path.display());
        Ok(Some(value))
    }

    /// Writes the snapshot of `stage`, replacing any previous one
    pub async fn set<T: Serialize>(&self, stage: Stage, value: &T) -> Result<PathBuf> {
        let path = self.path(stage);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        write_atomically(&path, serde_json::to_string_pretty(value)?.as_bytes()).await?;
        debug!("saved snapshot {}", path.display());
        Ok(path)
    }

    /// Returns the stored output of `stage`, or computes and stores it
    pub async fn get_or_compute<T, F, Fut>(&self, stage: Stage, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get(stage).await? {
            info!("Stage {}: reusing snapshot {}", stage, self.path(stage).display());
            return Ok(value);
        }

        info!("Stage {}: running", stage);
        let value = compute().await?;
        self.set(stage, &value).await?;
        info!("Stage {}: done", stage);
        Ok(value)
    }
}

async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn snapshot_path_names_repo_and_stage() {
        let cache = StageCache::new("results", "octo-repo", false);
        assert_eq!(
            cache.path(Stage::StargazerScrapedDetails),
            PathBuf::from("results/octo-repo_StargazerScrapedDetails.json")
        );
    }

    #[tokio::test]
    async fn computes_once_then_reuses_snapshot() {
        let dir = tempdir().unwrap();
        let cache = StageCache::new(dir.path(), "repo", false);

        let first: Vec<String> = cache
            .get_or_compute(Stage::StargazerList, || async { Ok(vec!["ada".to_string()]) })
            .await
            .unwrap();
        let second: Vec<String> = cache
            .get_or_compute(Stage::StargazerList, || async { Err(crate::error::InsightError::new("stage should not rerun")) })
            .await
            .unwrap();

        assert_eq!(first, second);
        assert!(cache.path(Stage::StargazerList).exists());
    }

    #[tokio::test]
    async fn fresh_store_ignores_existing_snapshots() {
        let dir = tempdir().unwrap();
        StageCache::new(dir.path(), "repo", false)
            .set(Stage::StargazerList, &vec!["old".to_string()])
            .await
            .unwrap();

        let fresh = StageCache::new(dir.path(), "repo", true);
        let value: Vec<String> = fresh
            .get_or_compute(Stage::StargazerList, || async { Ok(vec!["new".to_string()]) })
            .await
            .unwrap();
        assert_eq!(value, vec!["new".to_string()]);
    }

    #[tokio::test]
    async fn failed_stage_writes_nothing() {
        let dir = tempdir().unwrap();
        let cache = StageCache::new(dir.path(), "repo", false);
        let result: Result<Vec<String>> = cache
            .get_or_compute(Stage::StargazerInsights, || async {
                Err(crate::error::InsightError::Contract("bad answer".into()))
            })
            .await;
        assert!(result.is_err());
        assert!(!cache.path(Stage::StargazerInsights).exists());
    }
}
