//! Topic and sentiment tagging for news articles

use crate::models::news::{NewsArticle, RawArticle, Sentiment, TopicTag};
use crate::news::keywords::{count_occurrences, NEGATIVE_WORDS, POSITIVE_WORDS, TOPIC_KEYWORDS};
use crate::news::matcher::PlantDirectory;
use std::collections::BTreeSet;

/// Every topic whose keyword list hits; `Other` when none do
pub fn classify_topics(text: &str) -> BTreeSet<TopicTag> {
    let lowered = text.to_lowercase();
    let mut topics: BTreeSet<TopicTag> = TOPIC_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(tag, _)| *tag)
        .collect();
    if topics.is_empty() {
        topics.insert(TopicTag::Other);
    }
    topics
}

/// Lexicon vote; ties are neutral
pub fn classify_sentiment(text: &str) -> Sentiment {
    let lowered = text.to_lowercase();
    let negative = count_occurrences(&lowered, NEGATIVE_WORDS);
    let positive = count_occurrences(&lowered, POSITIVE_WORDS);
    if negative > positive {
        Sentiment::Negative
    } else if positive > negative {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    }
}

pub struct ArticleClassifier;

impl ArticleClassifier {
    /// Match plants, tag topics and score sentiment for one article
    pub fn classify(raw: &RawArticle, directory: &PlantDirectory) -> NewsArticle {
        let text = raw.text();
        NewsArticle {
            id: raw.stable_id(),
            title: raw.title.clone(),
            description: raw.description.clone(),
            url: raw.url.clone(),
            published_at: raw.published_at,
            matched_plant_codes: directory.match_article(&text, raw.plant_code.as_deref()),
            topics: classify_topics(&text),
            sentiment: classify_sentiment(&text),
        }
    }
}
