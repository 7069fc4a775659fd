//! Error type for the loader boundary (scene JSON, search logs, config files).
//!
//! The scene core itself never fails: empty profiles, unknown topics and
//! missing pointers all degrade gracefully. Only data that has the wrong
//! shape is rejected here, before it reaches the core.

/// Everything that can go wrong while getting data into the scene.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `terrainProfile[index].x` is smaller than the sample before it.
    #[error("terrain profile is not ordered by x at sample {index}")]
    UnorderedProfile { index: usize },

    #[error("no events found in log")]
    NoEvents,

    #[error("invalid timestamp: {value:?}")]
    InvalidTimestamp { value: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl SceneError {
    /// Short category prefix used in log lines and the viewer status bar.
    pub fn category(&self) -> &'static str {
        match self {
            SceneError::Io(_) => "io",
            SceneError::Json(_) => "json",
            SceneError::Csv(_) => "csv",
            SceneError::UnorderedProfile { .. } => "profile",
            SceneError::NoEvents | SceneError::InvalidTimestamp { .. } => "ingest",
            SceneError::InvalidConfig(_) => "config",
        }
    }
}

pub type SceneResult<T> = Result<T, SceneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_index() {
        let err = SceneError::UnorderedProfile { index: 3 };
        assert!(err.to_string().contains('3'));
        assert_eq!(err.category(), "profile");
    }

    #[test]
    fn json_errors_convert() {
        let parsed: Result<u32, _> = serde_json::from_str("not json");
        let err: SceneError = parsed.unwrap_err().into();
        assert_eq!(err.category(), "json");
    }

    #[test]
    fn csv_errors_convert() {
        let mut rdr = csv::ReaderBuilder::new().from_reader("a,b\n1,2,3\n".as_bytes());
        let err: SceneError = rdr.records().find_map(Result::err).unwrap().into();
        assert_eq!(err.category(), "csv");
    }
}
