use crate::config::RepoFilter;
use crate::error::{ErrorClass, Result};
use crate::github::{GitHubClient, GitHubRepo};
use crate::models::{ProfileDetail, ProfileLookup, RepoSummary, StargazerRecord};
use crate::parallel::ParallelProcessor;
use log::{info, warn};

fn summarize(repo: &GitHubRepo) -> RepoSummary {
    RepoSummary {
        name: repo.name.clone(),
        description: repo.description.clone(),
        url: repo.html_url.clone(),
        primary_language: repo.language.clone(),
    }
}

/// Non-fork repositories with more than `owned_min_stars` stars
pub fn filter_owned(repos: &[GitHubRepo], filter: &RepoFilter) -> Vec<RepoSummary> {
    repos
        .iter()
        .filter(|repo| !repo.fork && repo.stargazers_count > filter.owned_min_stars)
        .map(summarize)
        .collect()
}

/// Among the first `starred_scan_limit` starred repositories, those with more than `starred_min_stars` stars
pub fn filter_starred(repos: &[GitHubRepo], filter: &RepoFilter) -> Vec<RepoSummary> {
    repos
        .iter()
        .take(filter.starred_scan_limit)
        .filter(|repo| repo.stargazers_count > filter.starred_min_stars)
        .map(summarize)
        .collect()
}

/// Fetches account fields and the filtered repository lists of one user
pub async fn fetch_profile(client: &GitHubClient, username: &str, filter: &RepoFilter) -> Result<ProfileDetail> {
    let user = client.get_user(username).await?;
    let owned = client.list_user_repos(username).await?;
    let starred = client.list_starred(username, filter.starred_scan_limit).await?;

    Ok(ProfileDetail {
        name: user.name,
        login: user.login,
        following_count: user.following,
        follower_count: user.followers,
        email: user.email,
        id: user.id,
        location: user.location,
        bio: user.bio,
        company: user.company,
        blog: user.blog.filter(|b| !b.is_empty()),
        profile_url: user.html_url,
        twitter_handle: user.twitter_username,
        owned_repos: filter_owned(&owned, filter),
        starred_repos: filter_starred(&starred, filter),
    })
}

/// Fetches details for the first `limit` stargazers through a pool of `workers`
///
/// Rows whose lookup is not found, unauthorized or still failing after the
/// retry policy gave up are kept as [`ProfileLookup::Failed`]. Errors that no
/// retry can fix abort the stage. Output order follows the input.
pub async fn fetch_profile_details(
    client: &GitHubClient,
    stargazers: &[StargazerRecord],
    limit: usize,
    workers: usize,
    filter: RepoFilter,
) -> Result<Vec<ProfileLookup>> {
    let usernames: Vec<String> = stargazers
        .iter()
        .take(limit)
        .map(|s| s.username.clone())
        .collect();
    info!("Downloading details of {} users with {} workers", usernames.len(), workers);

    let pool = ParallelProcessor::new(workers);
    let results = pool
        .map(usernames.clone(), |username| {
            let client = client.clone();
            async move { fetch_profile(&client, &username, &filter).await }
        })
        .await;

    let mut lookups = Vec::with_capacity(results.len());
    for (username, result) in usernames.into_iter().zip(results) {
        match result {
            Ok(detail) => lookups.push(ProfileLookup::Found(detail)),
            Err(e) if e.class() == ErrorClass::Fatal => return Err(e),
            Err(e) => {
                warn!("Skipping details of {}: {}", username, e);
                lookups.push(ProfileLookup::Failed {
                    username,
                    reason: e.to_string(),
                });
            }
        }
    }

    let found = lookups.iter().filter(|l| l.detail().is_some()).count();
    info!("Fetched details of {}/{} users", found, lookups.len());
    Ok(lookups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn repo(name: &str, stars: u64, fork: bool) -> GitHubRepo {
        GitHubRepo {
            name: name.to_string(),
            description: None,
            html_url: format!("https://github.com/someone/{}", name),
            language: Some("Rust".to_string()),
            stargazers_count: stars,
            fork,
        }
    }

    fn names(repos: &[RepoSummary]) -> Vec<&str> {
        repos.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn owned_filter_drops_forks_and_small_repos() {
        let repos = vec![
            repo("popular", 11, false),
            repo("borderline", 10, false),
            repo("popular-fork", 500, true),
            repo("tiny", 0, false),
            repo("huge", 9000, false),
        ];
        let kept = filter_owned(&repos, &RepoFilter::default());
        assert_eq!(names(&kept), vec!["popular", "huge"]);
    }

    #[test]
    fn starred_filter_only_scans_leading_repos() {
        let mut repos: Vec<GitHubRepo> = (0..10)
            .map(|i| repo(&format!("star-{}", i), if i % 2 == 0 { 101 } else { 100 }, false))
            .collect();
        repos.push(repo("late-but-famous", 100_000, false));

        let kept = filter_starred(&repos, &RepoFilter::default());
        assert_eq!(names(&kept), vec!["star-0", "star-2", "star-4", "star-6", "star-8"]);
    }

    #[test]
    fn starred_filter_keeps_forks() {
        let repos = vec![repo("forked-star", 1000, true)];
        assert_eq!(filter_starred(&repos, &RepoFilter::default()).len(), 1);
    }

    #[test]
    fn thresholds_are_configurable() {
        let filter = RepoFilter { owned_min_stars: 0, starred_min_stars: 0, starred_scan_limit: 1 };
        let repos = vec![repo("a", 1, false), repo("b", 1, false)];
        assert_eq!(filter_owned(&repos, &filter).len(), 2);
        assert_eq!(filter_starred(&repos, &filter).len(), 1);
    }
}
