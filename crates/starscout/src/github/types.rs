//! GitHub API data types.
//!
//! Repository records keep every field the search API returns: the handful
//! the pipeline relies on are typed, the rest ride along in `extra` so the
//! persisted file is as complete as the API response.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of account that owns a repository.
///
/// GitHub reports `Organization` or `User` (and occasionally `Bot`); unknown
/// kinds are kept verbatim so they survive a round trip through the JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OwnerType {
    Organization,
    User,
    Other(String),
}

impl OwnerType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Organization => "Organization",
            Self::User => "User",
            Self::Other(kind) => kind,
        }
    }

    #[must_use]
    pub fn is_organization(&self) -> bool {
        matches!(self, Self::Organization)
    }
}

impl From<String> for OwnerType {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "Organization" => Self::Organization,
            "User" => Self::User,
            _ => Self::Other(kind),
        }
    }
}

impl From<OwnerType> for String {
    fn from(kind: OwnerType) -> Self {
        match kind {
            OwnerType::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `owner` sub-record of a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
    #[serde(rename = "type")]
    pub kind: OwnerType,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A repository as returned by the search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// `owner/name`, unique across GitHub.
    pub full_name: String,
    pub stargazers_count: u64,
    pub owner: Owner,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of `GET /search/repositories`. Only `items` is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<Repository>,
}

/// The subset of `GET /orgs/{org}` and `GET /users/{user}` we care about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OwnerProfile {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl OwnerProfile {
    /// The declared blog/homepage, falling back to the profile page.
    #[must_use]
    pub fn website(&self) -> Option<String> {
        self.blog
            .as_deref()
            .filter(|blog| !blog.is_empty())
            .or(self.html_url.as_deref())
            .map(String::from)
    }
}
