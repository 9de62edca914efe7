pub mod engine;
pub mod health;
pub mod indices;
pub mod normalizer;

pub use engine::RecommendationEngine;
