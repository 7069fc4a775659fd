//! Scene data contract.
//!
//! `SceneData` is produced by an external loader (a JSON fixture, or the
//! search-log [`ingest`] pipeline) and is immutable once handed to the scene.
//! Field names follow the camelCase JSON the loaders exchange.

pub mod ingest;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// One declared topic cluster. Declaration order defines the stable color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicLane {
    pub topic: String,
    pub lane: usize,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMetadata {
    pub start: String,
    pub end: String,
    pub bucket_minutes: u32,
    pub topics: Vec<TopicLane>,
}

/// Sparse height sample of the terrain profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainPoint {
    pub bucket: usize,
    pub x: f32,
    pub height: f32,
    #[serde(default)]
    pub top_topics: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMetrics {
    pub clicks: u32,
    pub dwell_seconds: f32,
    pub results: u32,
    pub engagement: f32,
}

/// One search event; the source record of one plotted marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryNode {
    pub query: String,
    pub topic: String,
    pub timestamp: String,
    pub session_id: String,
    #[serde(default)]
    pub metrics: QueryMetrics,
    /// Source-space position [x, y, z]
    pub position: [f32; 3],
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl QueryNode {
    pub fn id(&self) -> QueryId {
        QueryId::of(self)
    }
}

/// Hover / highlight identity of a query: `(timestamp, query text)`.
///
/// Stable under reordering of `queries`, but two literal duplicates sharing a
/// timestamp collide (they hover together).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryId {
    pub timestamp: String,
    pub query: String,
}

impl QueryId {
    pub fn of(node: &QueryNode) -> Self {
        Self {
            timestamp: node.timestamp.clone(),
            query: node.query.clone(),
        }
    }

    /// Cheap comparison against a node without cloning its strings.
    pub fn matches(&self, node: &QueryNode) -> bool {
        self.timestamp == node.timestamp && self.query == node.query
    }
}

impl std::fmt::Display for QueryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.timestamp, self.query)
    }
}

/// Complete scene payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneData {
    pub metadata: SceneMetadata,
    pub terrain_profile: Vec<TerrainPoint>,
    pub queries: Vec<QueryNode>,
}

impl SceneData {
    /// Parse and validate a scene from JSON text.
    pub fn from_json_str(src: &str) -> SceneResult<Self> {
        let data: Self = serde_json::from_str(src)?;
        data.validate()?;
        Ok(data)
    }

    /// Load and validate a scene JSON file.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)?;
        let data = Self::from_json_str(&src)?;
        log::info!(
            "Loaded scene {}: {} queries, {} profile samples, {} topics",
            path.display(),
            data.queries.len(),
            data.terrain_profile.len(),
            data.metadata.topics.len()
        );
        Ok(data)
    }

    /// Reject profiles whose `x` ever decreases.
    pub fn validate(&self) -> SceneResult<()> {
        if let Some(index) = self
            .terrain_profile
            .windows(2)
            .position(|w| w[1].x < w[0].x)
        {
            return Err(SceneError::UnorderedProfile { index: index + 1 });
        }
        Ok(())
    }

    /// Declared topic names in lane order.
    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.metadata.topics.iter().map(|t| t.topic.as_str())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn node(query: &str, topic: &str, timestamp: &str, position: [f32; 3]) -> QueryNode {
        QueryNode {
            query: query.to_string(),
            topic: topic.to_string(),
            timestamp: timestamp.to_string(),
            session_id: "s1".to_string(),
            metrics: QueryMetrics::default(),
            position,
            embedding: Vec::new(),
        }
    }

    pub fn point(x: f32, height: f32) -> TerrainPoint {
        TerrainPoint {
            bucket: 0,
            x,
            height,
            top_topics: Vec::new(),
        }
    }

    pub fn scene(topics: &[&str], profile: Vec<TerrainPoint>, queries: Vec<QueryNode>) -> SceneData {
        SceneData {
            metadata: SceneMetadata {
                start: "2024-03-01T09:00:00".to_string(),
                end: "2024-03-01T17:00:00".to_string(),
                bucket_minutes: 60,
                topics: topics
                    .iter()
                    .enumerate()
                    .map(|(lane, t)| TopicLane {
                        topic: t.to_string(),
                        lane,
                        embedding: Vec::new(),
                    })
                    .collect(),
            },
            terrain_profile: profile,
            queries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "metadata": {
            "start": "2024-03-01T09:00:00",
            "end": "2024-03-01T11:00:00",
            "bucketMinutes": 60,
            "topics": [{ "topic": "rust", "lane": 0, "embedding": [0.1, 0.2, 0.3] }]
        },
        "terrainProfile": [
            { "bucket": 0, "x": 0.0, "height": 2.0, "topTopics": ["rust"] },
            { "bucket": 1, "x": 120.0, "height": 8.5, "topTopics": [] }
        ],
        "queries": [{
            "query": "borrow checker",
            "topic": "rust",
            "timestamp": "2024-03-01T09:12:00",
            "sessionId": "a",
            "metrics": { "clicks": 2, "dwellSeconds": 40.0, "results": 10, "engagement": 0.7 },
            "position": [12.0, 28.0, 0.0],
            "embedding": [0.5, 0.5, 0.5]
        }]
    }"#;

    #[test]
    fn parses_camel_case_contract() {
        let data = SceneData::from_json_str(SAMPLE).unwrap();
        assert_eq!(data.metadata.bucket_minutes, 60);
        assert_eq!(data.terrain_profile[0].top_topics, vec!["rust"]);
        assert_eq!(data.queries[0].session_id, "a");
        assert_eq!(data.queries[0].metrics.dwell_seconds, 40.0);
        assert_eq!(data.topic_names().collect::<Vec<_>>(), vec!["rust"]);
    }

    #[test]
    fn rejects_unordered_profile() {
        let data = fixtures::scene(
            &["a"],
            vec![fixtures::point(0.0, 0.0), fixtures::point(10.0, 1.0), fixtures::point(5.0, 2.0)],
            Vec::new(),
        );
        assert!(matches!(data.validate(), Err(SceneError::UnorderedProfile { index: 2 })));
    }

    #[test]
    fn equal_x_samples_are_allowed() {
        let data = fixtures::scene(
            &["a"],
            vec![fixtures::point(0.0, 0.0), fixtures::point(0.0, 1.0)],
            Vec::new(),
        );
        assert!(data.validate().is_ok());
    }

    #[test]
    fn identity_ignores_session_and_position() {
        let a = fixtures::node("q", "t", "2024-03-01T09:00:00", [0.0; 3]);
        let mut b = a.clone();
        b.session_id = "other".into();
        b.position = [5.0, 5.0, 5.0];
        assert_eq!(a.id(), b.id());
        assert!(a.id().matches(&b));
        assert_eq!(a.id().to_string(), "2024-03-01T09:00:00-q");
    }
}
