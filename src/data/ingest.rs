//! Search-log ingest: raw query events → [`SceneData`].
//!
//! Pipeline: sort → topic lanes (first appearance) → per-query engagement and
//! position → time buckets → moving-average smoothing → terrain profile.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use super::{QueryMetrics, QueryNode, SceneData, SceneMetadata, TerrainPoint, TopicLane};
use crate::error::{SceneError, SceneResult};

/// Raw log row, as exported by the search front end (CSV or JSON).
///
/// Metric columns may be missing, empty or null; all read as zero.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryEvent {
    pub timestamp: String,
    pub query: String,
    pub intent_topic: String,
    pub session_id: String,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub clicks: u32,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub dwell_seconds: f64,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub result_count: u32,
}

fn empty_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// Ingest parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub bucket_minutes: u32,
    /// Scene length (x extent) the timeline is stretched over
    pub length_units: f64,
    /// Depth distance between adjacent topic lanes
    pub topic_spread: f64,
    pub max_height: f64,
    /// Centered moving-average window over bucket heights (1 = off)
    pub smoothing_window: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            bucket_minutes: 60,
            length_units: 120.0,
            topic_spread: 10.0,
            max_height: 40.0,
            smoothing_window: 1,
        }
    }
}

/// Read a search log: CSV with a header row when the extension is `.csv`,
/// otherwise a JSON array.
pub fn load_events(path: impl AsRef<Path>) -> SceneResult<Vec<QueryEvent>> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let events = if is_csv {
        parse_events_csv(std::fs::File::open(path)?)?
    } else {
        parse_events_json(&std::fs::read_to_string(path)?)?
    };
    log::info!("Read {} events from {}", events.len(), path.display());
    Ok(events)
}

/// CSV log with columns `timestamp,query,intent_topic,session_id,clicks,
/// dwell_seconds,result_count` (any order, metric columns optional).
pub fn parse_events_csv<R: Read>(reader: R) -> SceneResult<Vec<QueryEvent>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let events = rdr.deserialize().collect::<Result<Vec<QueryEvent>, _>>()?;
    Ok(events)
}

pub fn parse_events_json(src: &str) -> SceneResult<Vec<QueryEvent>> {
    Ok(serde_json::from_str(src)?)
}

/// Accepts `2024-03-01T09:00:00`, fractional seconds, a space separator, or
/// an RFC 3339 offset (converted to UTC).
pub fn parse_timestamp(value: &str) -> SceneResult<NaiveDateTime> {
    let value = value.trim();
    value
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.naive_utc()))
        .map_err(|_| SceneError::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// ISO-8601 without zone; fractional seconds only when present.
fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

fn round3(v: f64) -> f32 {
    ((v * 1000.0).round() / 1000.0) as f32
}

fn minutes_between(from: &NaiveDateTime, to: &NaiveDateTime) -> f64 {
    (*to - *from).num_milliseconds() as f64 / 60_000.0
}

/// Deterministic pseudo-embedding of a label (LCG over the code points).
pub fn pseudo_embedding(label: &str, dims: usize) -> Vec<f32> {
    let mut seed: u64 = label
        .chars()
        .enumerate()
        .map(|(idx, ch)| ch as u64 * (idx as u64 + 1))
        .sum();
    (0..dims)
        .map(|i| {
            seed = 1_103_515_245u64
                .wrapping_mul(seed.wrapping_add(i as u64))
                .wrapping_add(12_345)
                & 0x7FFF_FFFF;
            round3((seed % 1000) as f64 / 1000.0)
        })
        .collect()
}

/// Centered moving average; `window <= 1` returns the input untouched.
pub fn smooth(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }
    let half = window / 2;
    (0..values.len())
        .map(|idx| {
            let start = idx.saturating_sub(half);
            let end = (idx + half + 1).min(values.len());
            let slice = &values[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

struct Parsed<'a> {
    at: NaiveDateTime,
    event: &'a QueryEvent,
}

/// Build a complete scene from raw events.
pub fn build_scene(events: &[QueryEvent], cfg: &IngestConfig) -> SceneResult<SceneData> {
    if events.is_empty() {
        return Err(SceneError::NoEvents);
    }

    let mut parsed = events
        .iter()
        .map(|event| {
            Ok(Parsed {
                at: parse_timestamp(&event.timestamp)?,
                event,
            })
        })
        .collect::<SceneResult<Vec<_>>>()?;
    parsed.sort_by_key(|p| p.at);

    let bucket_minutes = cfg.bucket_minutes.max(1);
    let bucket_width = bucket_minutes as f64;
    let start = parsed[0].at;
    let end = parsed[parsed.len() - 1].at;
    let total_minutes = minutes_between(&start, &end).max(bucket_width);
    let bucket_count = (total_minutes / bucket_width).ceil().max(1.0) as usize;

    let max_clicks = parsed.iter().map(|p| p.event.clicks).max().unwrap_or(0).max(1) as f64;
    let max_dwell = parsed
        .iter()
        .map(|p| p.event.dwell_seconds)
        .fold(0.0_f64, f64::max);
    let max_dwell = if max_dwell > 0.0 { max_dwell } else { 1.0 };

    // Lanes in order of first appearance
    let mut lanes: Vec<String> = Vec::new();
    let mut lane_of: HashMap<String, usize> = HashMap::new();
    for p in &parsed {
        let topic = p.event.intent_topic.trim();
        if !lane_of.contains_key(topic) {
            lane_of.insert(topic.to_string(), lanes.len());
            lanes.push(topic.to_string());
        }
    }

    let queries: Vec<QueryNode> = parsed
        .iter()
        .map(|p| {
            let e = p.event;
            let topic = e.intent_topic.trim();
            let lane = lane_of.get(topic).copied().unwrap_or(0);
            let click_ratio = e.clicks as f64 / max_clicks;
            let dwell_ratio = e.dwell_seconds / max_dwell;
            let engagement = 0.4 * click_ratio + 0.6 * dwell_ratio;
            let x_ratio = minutes_between(&start, &p.at) / total_minutes;
            QueryNode {
                query: e.query.trim().to_string(),
                topic: topic.to_string(),
                timestamp: format_timestamp(&p.at),
                session_id: e.session_id.trim().to_string(),
                metrics: QueryMetrics {
                    clicks: e.clicks,
                    dwell_seconds: e.dwell_seconds as f32,
                    results: e.result_count,
                    engagement: round3(engagement),
                },
                position: [
                    round3(x_ratio * cfg.length_units),
                    round3(engagement * cfg.max_height),
                    round3(lane as f64 * cfg.topic_spread),
                ],
                embedding: pseudo_embedding(e.query.trim(), 3),
            }
        })
        .collect();

    // Bucket aggregates; topic contributions keep insertion order for ties
    let mut heights = vec![0.0_f64; bucket_count];
    let mut bucket_topics: Vec<Vec<(String, f64)>> = vec![Vec::new(); bucket_count];
    for p in &parsed {
        let idx = ((minutes_between(&start, &p.at) / bucket_width).floor() as usize).min(bucket_count - 1);
        let contribution =
            (p.event.clicks as f64 / max_clicks + p.event.dwell_seconds / max_dwell) / 2.0;
        heights[idx] += contribution;
        let topic = p.event.intent_topic.trim();
        match bucket_topics[idx].iter_mut().find(|(t, _)| t == topic) {
            Some(entry) => entry.1 += contribution,
            None => bucket_topics[idx].push((topic.to_string(), contribution)),
        }
    }

    let heights = smooth(&heights, cfg.smoothing_window.max(1));
    let denom = bucket_count.saturating_sub(1).max(1) as f64;
    let event_count = parsed.len() as f64;

    let terrain_profile = heights
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let mut top = bucket_topics[i].clone();
            top.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            TerrainPoint {
                bucket: i,
                x: round3(i as f64 / denom * cfg.length_units),
                height: round3((h / event_count).min(1.0) * cfg.max_height),
                top_topics: top.into_iter().take(3).map(|(t, _)| t).collect(),
            }
        })
        .collect();

    let metadata = SceneMetadata {
        start: format_timestamp(&start),
        end: format_timestamp(&end),
        bucket_minutes,
        topics: lanes
            .iter()
            .enumerate()
            .map(|(lane, topic)| TopicLane {
                topic: topic.clone(),
                lane,
                embedding: pseudo_embedding(topic, 3),
            })
            .collect(),
    };

    log::info!(
        "Ingested {} events into {} buckets across {} topics",
        parsed.len(),
        bucket_count,
        lanes.len()
    );

    Ok(SceneData {
        metadata,
        terrain_profile,
        queries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(ts: &str, query: &str, topic: &str, clicks: u32, dwell: f64) -> QueryEvent {
        QueryEvent {
            timestamp: ts.to_string(),
            query: query.to_string(),
            intent_topic: topic.to_string(),
            session_id: "s".to_string(),
            clicks,
            dwell_seconds: dwell,
            result_count: 10,
        }
    }

    #[test]
    fn empty_log_is_an_error() {
        assert!(matches!(
            build_scene(&[], &IngestConfig::default()),
            Err(SceneError::NoEvents)
        ));
    }

    #[test]
    fn bad_timestamp_is_reported() {
        let events = vec![event("yesterday", "q", "t", 0, 0.0)];
        assert!(matches!(
            build_scene(&events, &IngestConfig::default()),
            Err(SceneError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn accepts_common_timestamp_shapes() {
        assert!(parse_timestamp("2024-03-01T09:00:00").is_ok());
        assert!(parse_timestamp("2024-03-01 09:00:00").is_ok());
        assert!(parse_timestamp("2024-03-01T09:00:00.250").is_ok());
        assert!(parse_timestamp("2024-03-01T09:00:00+02:00").is_ok());
    }

    #[test]
    fn positions_lanes_and_buckets() {
        // Out of order on purpose: ingest sorts by time.
        let events = vec![
            event("2024-03-01T11:00:00", "tokio select", "async", 2, 30.0),
            event("2024-03-01T09:00:00", "lifetimes", "rust", 4, 120.0),
            event("2024-03-01T10:00:00", "pin", "async", 0, 0.0),
        ];
        let scene = build_scene(&events, &IngestConfig::default()).unwrap();

        let topics: Vec<_> = scene.topic_names().collect();
        assert_eq!(topics, vec!["rust", "async"]);

        // 120 minutes span → 2 buckets of 60
        assert_eq!(scene.terrain_profile.len(), 2);
        assert_eq!(scene.terrain_profile[0].x, 0.0);
        assert_eq!(scene.terrain_profile[1].x, 120.0);

        let first = &scene.queries[0];
        assert_eq!(first.query, "lifetimes");
        assert_eq!(first.position[0], 0.0);
        assert!((first.metrics.engagement - 1.0).abs() < 1e-6);
        assert!((first.position[1] - 40.0).abs() < 1e-4);
        assert_eq!(first.position[2], 0.0);

        let last = &scene.queries[2];
        assert_eq!(last.position[0], 120.0);
        assert_eq!(last.position[2], 10.0);

        // Last event lands in the clamped final bucket
        assert_eq!(scene.terrain_profile[1].top_topics, vec!["async"]);
    }

    #[test]
    fn heights_are_capped_at_max() {
        let events = vec![event("2024-03-01T09:00:00", "a", "t", 5, 50.0)];
        let scene = build_scene(&events, &IngestConfig::default()).unwrap();
        assert_eq!(scene.terrain_profile.len(), 1);
        assert!((scene.terrain_profile[0].height - 40.0).abs() < 1e-4);
    }

    #[test]
    fn top_topics_sorted_and_truncated() {
        let events = vec![
            event("2024-03-01T09:00:00", "a", "low", 0, 1.0),
            event("2024-03-01T09:01:00", "b", "high", 10, 100.0),
            event("2024-03-01T09:02:00", "c", "mid", 5, 50.0),
            event("2024-03-01T09:03:00", "d", "tiny", 0, 0.0),
        ];
        let scene = build_scene(&events, &IngestConfig::default()).unwrap();
        assert_eq!(scene.terrain_profile[0].top_topics, vec!["high", "mid", "low"]);
    }

    #[test]
    fn smoothing_averages_neighbours() {
        let out = smooth(&[0.0, 3.0, 0.0], 3);
        assert_eq!(out, vec![1.5, 1.0, 1.5]);
        assert_eq!(smooth(&[1.0, 2.0], 1), vec![1.0, 2.0]);
    }

    #[test]
    fn sub_second_events_keep_distinct_identities() {
        let events = vec![
            event("2024-03-01T09:00:00.250", "same", "t", 1, 1.0),
            event("2024-03-01T09:00:00.750", "same", "t", 1, 1.0),
            event("2024-03-01T09:00:01", "same", "t", 1, 1.0),
        ];
        let scene = build_scene(&events, &IngestConfig::default()).unwrap();
        let stamps: Vec<&str> = scene.queries.iter().map(|q| q.timestamp.as_str()).collect();
        assert_eq!(
            stamps,
            vec!["2024-03-01T09:00:00.250", "2024-03-01T09:00:00.750", "2024-03-01T09:00:01"]
        );
        assert_ne!(scene.queries[0].id(), scene.queries[1].id());
    }

    const CSV_LOG: &str = "\
timestamp,query,intent_topic,session_id,clicks,dwell_seconds,result_count
2024-03-01T09:00:00, borrow checker ,rust,s1,4,120.0,12
2024-03-01T10:00:00,tokio select,async,s1,,,
2024-03-01T11:00:00,pin,async,s2,2,30.5,8
2024-03-01T12:00:00,lifetimes,rust,s3,0,0,3
";

    #[test]
    fn csv_log_parses_with_blank_metrics() {
        let events = parse_events_csv(CSV_LOG.as_bytes()).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].query, "borrow checker");
        assert_eq!(events[0].clicks, 4);
        assert_eq!(events[1].clicks, 0);
        assert_eq!(events[1].dwell_seconds, 0.0);
        assert_eq!(events[1].result_count, 0);
        assert_eq!(events[2].dwell_seconds, 30.5);
    }

    #[test]
    fn csv_log_honours_smoothing_window() {
        let events = parse_events_csv(CSV_LOG.as_bytes()).unwrap();
        let raw = build_scene(&events, &IngestConfig::default()).unwrap();
        let smoothed = build_scene(
            &events,
            &IngestConfig {
                smoothing_window: 3,
                ..IngestConfig::default()
            },
        )
        .unwrap();

        let raw_h: Vec<f32> = raw.terrain_profile.iter().map(|p| p.height).collect();
        let smooth_h: Vec<f32> = smoothed.terrain_profile.iter().map(|p| p.height).collect();
        assert_eq!(raw_h.len(), 3);
        assert_ne!(raw_h, smooth_h);
        // Middle bucket becomes the mean of all three raw buckets
        let mean = raw_h.iter().sum::<f32>() / 3.0;
        assert!((smooth_h[1] - mean).abs() < 1e-2, "{smooth_h:?} vs mean {mean}");
    }

    #[test]
    fn json_log_accepts_null_metrics() {
        let events = parse_events_json(
            r#"[{ "timestamp": "2024-03-01T09:00:00", "query": "q", "intent_topic": "t",
                  "session_id": "s", "clicks": null }]"#,
        )
        .unwrap();
        assert_eq!(events[0].clicks, 0);
        assert_eq!(events[0].result_count, 0);
    }

    #[test]
    fn pseudo_embedding_is_deterministic() {
        let a = pseudo_embedding("rust", 3);
        assert_eq!(a, pseudo_embedding("rust", 3));
        assert_eq!(a.len(), 3);
        assert!(a.iter().all(|v| (0.0..1.0).contains(v)));
        assert_ne!(a, pseudo_embedding("async", 3));
    }
}
