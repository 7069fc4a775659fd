pub mod config;
pub mod data;
pub mod error;
pub mod geometry;
pub mod picking;
pub mod render;
pub mod scene;

pub use config::SceneConfig;
pub use data::{QueryId, QueryNode, SceneData};
pub use error::{SceneError, SceneResult};
pub use scene::controller::SceneController;
