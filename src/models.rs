//! Records flowing between the pipeline stages.
//!
//! Every record is produced once by its stage and only read afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value used for any field the profile did not reveal
pub const NOT_AVAILABLE: &str = "N/A";

/// A user who starred the analysed repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StargazerRecord {
    /// GitHub login
    pub username: String,
}

/// Short description of a repository attached to a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSummary {
    /// Repository name
    pub name: String,
    /// Repository description
    pub description: Option<String>,
    /// Repository page URL
    pub url: String,
    /// Primary language
    pub primary_language: Option<String>,
}

/// Account fields and notable repositories of one stargazer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetail {
    /// Display name
    pub name: Option<String>,
    /// Account login
    pub login: String,
    /// Accounts this user follows
    pub following_count: u64,
    /// Accounts following this user
    pub follower_count: u64,
    /// Public email
    pub email: Option<String>,
    /// Numeric account id
    pub id: u64,
    /// Free-form location
    pub location: Option<String>,
    /// Profile bio
    pub bio: Option<String>,
    /// Company
    pub company: Option<String>,
    /// Website
    pub blog: Option<String>,
    /// Profile page URL
    pub profile_url: String,
    /// Twitter handle
    pub twitter_handle: Option<String>,
    /// Non-fork repositories above the owned star threshold
    pub owned_repos: Vec<RepoSummary>,
    /// Leading starred repositories above the starred star threshold
    pub starred_repos: Vec<RepoSummary>,
}

/// Outcome of the detail fetch for one username
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProfileLookup {
    /// The lookup succeeded
    Found(ProfileDetail),
    /// The lookup failed and the row keeps only the login
    Failed {
        /// Login the lookup was made for
        username: String,
        /// Error message of the last attempt
        reason: String,
    },
}

impl ProfileLookup {
    /// Login the lookup was made for
    pub fn username(&self) -> &str {
        match self {
            ProfileLookup::Found(detail) => &detail.login,
            ProfileLookup::Failed { username, .. } => username,
        }
    }

    /// The detail, when the lookup succeeded
    pub fn detail(&self) -> Option<&ProfileDetail> {
        match self {
            ProfileLookup::Found(detail) => Some(detail),
            ProfileLookup::Failed { .. } => None,
        }
    }
}

/// Visible text of one rendered profile page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedText {
    /// GitHub login
    pub username: String,
    /// Concatenated region text, or an error placeholder when the scrape failed
    pub extracted_text: String,
}

/// The 8 attributes pulled out of a profile's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightRecord {
    /// Display name
    pub name: String,
    /// Country
    pub country: String,
    /// City
    pub city: String,
    /// Email address
    pub email: String,
    /// Occupation
    pub occupation: String,
    /// Known languages among Python, C++, JavaScript and Java
    pub programming_languages: String,
    /// Free-text technical interests
    pub topics_of_interest: String,
    /// Websites and social profiles
    pub social_media: String,
}

impl InsightRecord {
    /// Field names in column order
    pub const FIELDS: [&'static str; 8] = [
        "name",
        "country",
        "city",
        "email",
        "occupation",
        "programming_languages",
        "topics_of_interest",
        "social_media",
    ];
}

impl Default for InsightRecord {
    fn default() -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            name: na(),
            country: na(),
            city: na(),
            email: na(),
            occupation: na(),
            programming_languages: na(),
            topics_of_interest: na(),
            social_media: na(),
        }
    }
}

/// Closed set of labels the categorization step may answer with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TechnicalArea {
    /// Machine Learning
    MachineLearning,
    /// Databases
    Databases,
    /// Web development
    WebDevelopment,
}

impl TechnicalArea {
    /// Every area, in display order
    pub const ALL: [TechnicalArea; 3] = [
        TechnicalArea::MachineLearning,
        TechnicalArea::Databases,
        TechnicalArea::WebDevelopment,
    ];

    /// Label used in prompts, answers and charts
    pub fn label(&self) -> &'static str {
        match self {
            TechnicalArea::MachineLearning => "Machine Learning",
            TechnicalArea::Databases => "Databases",
            TechnicalArea::WebDevelopment => "Web development",
        }
    }

    /// Case-insensitive exact match on the label
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|area| area.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for TechnicalArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Categorization of one row: some of the three areas, or none (`N/A`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnicalAreas(Vec<TechnicalArea>);

impl TechnicalAreas {
    /// Deduplicates and sorts the given areas; an empty list means `N/A`
    pub fn new(mut areas: Vec<TechnicalArea>) -> Self {
        areas.sort();
        areas.dedup();
        Self(areas)
    }

    /// No area applies
    pub fn not_applicable() -> Self {
        Self(Vec::new())
    }
}

impl fmt::Display for TechnicalAreas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(NOT_AVAILABLE);
        }
        let labels: Vec<&str> = self.0.iter().map(|a| a.label()).collect();
        f.write_str(&labels.join(", "))
    }
}

/// Insight row with the free-text interests replaced by technical areas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedInsight {
    /// Display name
    pub name: String,
    /// Country
    pub country: String,
    /// City
    pub city: String,
    /// Email address
    pub email: String,
    /// Occupation
    pub occupation: String,
    /// Known programming languages
    pub programming_languages: String,
    /// Websites and social profiles
    pub social_media: String,
    /// Comma-joined labels, or `N/A`
    pub technical_areas: String,
}

impl CategorizedInsight {
    /// Field names in column order
    pub const FIELDS: [&'static str; 8] = [
        "name",
        "country",
        "city",
        "email",
        "occupation",
        "programming_languages",
        "social_media",
        "technical_areas",
    ];

    /// Replaces the interests of `insight` with `areas`
    pub fn from_insight(insight: InsightRecord, areas: &TechnicalAreas) -> Self {
        Self {
            name: insight.name,
            country: insight.country,
            city: insight.city,
            email: insight.email,
            occupation: insight.occupation,
            programming_languages: insight.programming_languages,
            social_media: insight.social_media,
            technical_areas: areas.to_string(),
        }
    }
}
