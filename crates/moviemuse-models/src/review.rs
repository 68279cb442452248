use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: String,
    pub author: String,
    pub author_details: ReviewAuthor,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewAuthor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    pub avatar_path: Option<String>,
    pub rating: Option<f64>,
}
