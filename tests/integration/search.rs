//! Semantic-search seam: ranked ids must join back to tagged articles

use crate::fixtures::{article, named_plant};
use async_trait::async_trait;
use plantwatch::news::PlantDirectory;
use plantwatch::pipeline::tag_articles;
use plantwatch::services::search::{ArticleSearch, RankedArticle};

/// Brute-force cosine ranking over precomputed embeddings
struct InMemorySearch {
    rows: Vec<(String, String, Vec<f32>)>,
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm = |v: &[f32]| v.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (norm(a) * norm(b))
}

#[async_trait]
impl ArticleSearch for InMemorySearch {
    async fn similar_articles(
        &self,
        plant_code: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<RankedArticle>, Box<dyn std::error::Error + Send + Sync>> {
        let mut ranked: Vec<RankedArticle> = self
            .rows
            .iter()
            .filter(|(_, code, _)| code == plant_code)
            .map(|(id, _, vector)| RankedArticle {
                article_id: id.clone(),
                score: cosine(embedding, vector),
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);
        Ok(ranked)
    }
}

#[tokio::test]
async fn ranked_ids_resolve_to_tagged_articles() {
    let directory = PlantDirectory::from_plants(&[named_plant("300", "Sandstone Wind", "Orsted Onshore", "TX")]);
    let tagged = tag_articles(
        vec![
            article("Sandstone Wind outage", "Gearbox failure", 2),
            article("Sandstone Wind expansion", "New turbines approved", 9),
        ],
        &directory,
    );
    let search = InMemorySearch {
        rows: vec![
            (tagged[0].id.clone(), "300".to_string(), vec![1.0, 0.0]),
            (tagged[1].id.clone(), "300".to_string(), vec![0.0, 1.0]),
        ],
    };

    let hits = search.similar_articles("300", &[0.9, 0.1], 1).await.unwrap();

    assert_eq!(hits.len(), 1);
    let hit = tagged.iter().find(|a| a.id == hits[0].article_id).expect("id joins back");
    assert_eq!(hit.title, "Sandstone Wind outage");
}
