//! News article records before and after classification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Article as delivered by the news-fetch collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub url: String,
    pub published_at: DateTime<Utc>,
    /// Set when the article came back from a plant-targeted query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_code: Option<String>,
}

impl RawArticle {
    /// Identifier that is identical every time the same article is fetched
    pub fn stable_id(&self) -> String {
        let key = if self.url.trim().is_empty() {
            format!("{}|{}", self.title.trim(), self.published_at.to_rfc3339())
        } else {
            self.url.trim().to_string()
        };
        Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()).to_string()
    }

    /// Title, description and body joined for keyword scanning
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(
            self.title.len() + self.description.len() + self.content.as_ref().map_or(0, |c| c.len()) + 2,
        );
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.description);
        if let Some(content) = &self.content {
            text.push(' ');
            text.push_str(content);
        }
        text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicTag {
    Outage,
    Regulatory,
    Financial,
    Weather,
    Construction,
    Other,
}

impl TopicTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicTag::Outage => "outage",
            TopicTag::Regulatory => "regulatory",
            TopicTag::Financial => "financial",
            TopicTag::Weather => "weather",
            TopicTag::Construction => "construction",
            TopicTag::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "outage" => Some(TopicTag::Outage),
            "regulatory" => Some(TopicTag::Regulatory),
            "financial" => Some(TopicTag::Financial),
            "weather" => Some(TopicTag::Weather),
            "construction" => Some(TopicTag::Construction),
            "other" => Some(TopicTag::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

/// Classified article; immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub matched_plant_codes: BTreeSet<String>,
    pub topics: BTreeSet<TopicTag>,
    pub sentiment: Sentiment,
}

impl NewsArticle {
    /// Negative or outage-tagged
    pub fn is_impactful(&self) -> bool {
        self.sentiment == Sentiment::Negative || self.topics.contains(&TopicTag::Outage)
    }
}
