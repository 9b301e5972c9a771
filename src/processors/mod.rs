//! The pipeline stages, each a function from the previous stage's records to its own.

/// Module for listing the stargazers of a repository
pub mod stargazers;
/// Module for fetching profile details and repository lists
pub mod profiles;
/// Module for scraping visible text from profile pages
pub mod page_text;
/// Module for LLM extraction and categorization
pub mod insights;

pub use insights::{categorize_insights, extract_insights};
pub use page_text::scrape_profiles;
pub use profiles::fetch_profile_details;
pub use stargazers::list_stargazers;
