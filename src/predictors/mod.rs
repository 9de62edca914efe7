pub mod forest;

pub use forest::TreeEnsemble;

use crate::error::Result;
use crate::models::{FeatureSet, FeatureVector};

/// A pre-trained model: fixed-length numeric vector in, single label out
pub trait Predictor: Send + Sync {
    /// Feature set the model was trained on
    fn feature_set(&self) -> FeatureSet;

    /// Predict a label. Fails with `Inference` when the vector does not fit the model.
    fn predict(&self, features: &FeatureVector) -> Result<String>;
}
