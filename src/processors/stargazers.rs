use crate::config::RepoTarget;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::models::StargazerRecord;
use log::info;

/// Lists up to `cap` users who starred `repo`, in API order
///
/// Failures here are fatal for the run: without stargazers there is nothing to enrich.
pub async fn list_stargazers(
    client: &GitHubClient,
    repo: &RepoTarget,
    cap: usize,
) -> Result<Vec<StargazerRecord>> {
    info!("Listing stargazers of {} (cap {})", repo, cap);
    let logins = client.list_stargazers(repo, cap).await?;
    info!("Found {} stargazers", logins.len());

    Ok(logins
        .into_iter()
        .map(|username| StargazerRecord { username })
        .collect())
}
