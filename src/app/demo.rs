//! Built-in search log used when no scene is given on the command line.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use searchscape::data::ingest::QueryEvent;

const TOPICS: &[(&str, &[&str])] = &[
    ("rust async", &["tokio select", "async trait objects", "pin projection", "spawn_blocking"]),
    ("gpu shaders", &["wgsl storage buffer", "compute dispatch size", "sdf raymarching"]),
    ("databases", &["sqlite wal mode", "btree page split", "postgres vacuum"]),
    ("networking", &["quic handshake", "tcp nodelay", "http2 flow control"]),
    ("ui toolkits", &["egui painter mesh", "immediate mode layout", "font atlas"]),
];

const EVENT_COUNT: usize = 140;
const SESSIONS: u32 = 9;

/// Two days of synthetic events, reproducible across runs.
pub fn events() -> Vec<QueryEvent> {
    let Some(start) = NaiveDate::from_ymd_opt(2024, 5, 6).and_then(|d| d.and_hms_opt(8, 0, 0)) else {
        return Vec::new();
    };
    let mut rng = StdRng::seed_from_u64(0x5ea7c4);
    let mut minutes = 0i64;

    (0..EVENT_COUNT)
        .map(|_| {
            minutes += rng.gen_range(3..40);
            let (topic, queries) = TOPICS[rng.gen_range(0..TOPICS.len())];
            let query = queries[rng.gen_range(0..queries.len())];
            QueryEvent {
                timestamp: (start + Duration::minutes(minutes))
                    .format("%Y-%m-%dT%H:%M:%S")
                    .to_string(),
                query: query.to_string(),
                intent_topic: topic.to_string(),
                session_id: format!("s{:02}", rng.gen_range(0..SESSIONS)),
                clicks: rng.gen_range(0..6),
                dwell_seconds: rng.gen_range(2.0..180.0),
                result_count: rng.gen_range(5..60),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchscape::data::ingest::{build_scene, IngestConfig};

    #[test]
    fn demo_log_ingests() {
        let events = events();
        assert_eq!(events.len(), EVENT_COUNT);
        let scene = build_scene(&events, &IngestConfig::default()).unwrap();
        assert_eq!(scene.queries.len(), EVENT_COUNT);
        assert!(scene.metadata.topics.len() <= TOPICS.len());
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn demo_log_is_reproducible() {
        let a: Vec<String> = events().into_iter().map(|e| e.query).collect();
        let b: Vec<String> = events().into_iter().map(|e| e.query).collect();
        assert_eq!(a, b);
    }
}
