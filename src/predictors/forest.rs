use super::Predictor;
use crate::error::{CropLensError, Result};
use crate::models::{FeatureSet, FeatureVector};
use serde::Deserialize;
use std::path::Path;

/// Tree ensemble exported from a fitted classifier.
///
/// Artifact layout (JSON):
///
/// ```json
/// {
///   "feature_set": "crop",
///   "n_features": 7,
///   "classes": ["rice", "maize"],
///   "trees": [
///     { "nodes": [
///         { "feature": 6, "threshold": 150.0, "left": 1, "right": 2 },
///         { "value": [0.0, 12.0] },
///         { "value": [30.0, 1.0] }
///     ] }
///   ]
/// }
/// ```
///
/// Splits send `x[feature] <= threshold` left. Leaves hold per-class weights.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    feature_set: FeatureSet,
    n_features: usize,
    classes: Vec<String>,
    trees: Vec<Tree>,
}

#[derive(Debug, Clone, Deserialize)]
struct EnsembleArtifact {
    feature_set: FeatureSet,
    n_features: usize,
    classes: Vec<String>,
    trees: Vec<Tree>,
}

#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

impl TreeEnsemble {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CropLensError::ModelLoad(format!("{}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
            .map_err(|e| CropLensError::ModelLoad(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let artifact: EnsembleArtifact = serde_json::from_str(content)
            .map_err(|e| CropLensError::ModelLoad(format!("malformed artifact: {}", e)))?;

        Self::validate(&artifact)?;

        Ok(Self {
            feature_set: artifact.feature_set,
            n_features: artifact.n_features,
            classes: artifact.classes,
            trees: artifact.trees,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn validate(artifact: &EnsembleArtifact) -> Result<()> {
        let expected = artifact.feature_set.columns().len();
        if artifact.n_features != expected {
            return Err(CropLensError::ModelLoad(format!(
                "{} model declares {} features, expected {}",
                artifact.feature_set, artifact.n_features, expected
            )));
        }
        if artifact.classes.is_empty() {
            return Err(CropLensError::ModelLoad("artifact has no classes".into()));
        }
        if artifact.trees.is_empty() {
            return Err(CropLensError::ModelLoad("artifact has no trees".into()));
        }

        for (t, tree) in artifact.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(CropLensError::ModelLoad(format!("tree {} is empty", t)));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        // Children always come after their parent, so traversal terminates
                        let in_range = |c: usize| c > i && c < tree.nodes.len();
                        if *feature >= artifact.n_features
                            || !threshold.is_finite()
                            || !in_range(*left)
                            || !in_range(*right)
                        {
                            return Err(CropLensError::ModelLoad(format!(
                                "tree {} node {} is not a valid split",
                                t, i
                            )));
                        }
                    }
                    TreeNode::Leaf { value } => {
                        let total: f64 = value.iter().sum();
                        if value.len() != artifact.classes.len()
                            || value.iter().any(|v| !v.is_finite() || *v < 0.0)
                            || total <= 0.0
                        {
                            return Err(CropLensError::ModelLoad(format!(
                                "tree {} node {} has an invalid class distribution",
                                t, i
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn leaf<'a>(&self, tree: &'a Tree, x: &[f64]) -> &'a [f64] {
        let mut idx = 0;
        loop {
            match &tree.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }

    /// Mean class probabilities across trees
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        if features.set() != self.feature_set {
            return Err(CropLensError::Inference(format!(
                "{} model received a {} feature vector",
                self.feature_set,
                features.set()
            )));
        }
        if features.len() != self.n_features {
            return Err(CropLensError::Inference(format!(
                "{} model expects {} features, got {}",
                self.feature_set,
                self.n_features,
                features.len()
            )));
        }
        let x = features.values();
        if let Some(pos) = x.iter().position(|v| !v.is_finite()) {
            return Err(CropLensError::Inference(format!(
                "feature '{}' is not a finite number",
                self.feature_set.columns()[pos]
            )));
        }

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let value = self.leaf(tree, x);
            let total: f64 = value.iter().sum();
            for (p, v) in proba.iter_mut().zip(value) {
                *p += v / total;
            }
        }

        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        Ok(proba)
    }
}

impl Predictor for TreeEnsemble {
    fn feature_set(&self) -> FeatureSet {
        self.feature_set
    }

    fn predict(&self, features: &FeatureVector) -> Result<String> {
        let proba = self.predict_proba(features)?;

        // Ties go to the lowest class index
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }

        Ok(self.classes[best].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Rainfall (index 6) splits rice from maize; a second tree looks at nitrogen
    const CROP_FOREST: &str = r#"{
        "feature_set": "crop",
        "n_features": 7,
        "classes": ["maize", "rice"],
        "trees": [
            { "nodes": [
                { "feature": 6, "threshold": 150.0, "left": 1, "right": 2 },
                { "value": [10.0, 0.0] },
                { "value": [1.0, 9.0] }
            ] },
            { "nodes": [
                { "feature": 0, "threshold": 60.0, "left": 1, "right": 2 },
                { "value": [4.0, 4.0] },
                { "value": [2.0, 6.0] }
            ] }
        ]
    }"#;

    fn crop_vector(n: f64, rainfall: f64) -> FeatureVector {
        FeatureVector::from_raw(
            FeatureSet::Crop,
            vec![n, 42.0, 43.0, 20.9, 82.0, 6.5, rainfall],
        )
    }

    #[test]
    fn loads_valid_artifact() {
        let model = TreeEnsemble::from_json(CROP_FOREST).unwrap();
        assert_eq!(model.feature_set(), FeatureSet::Crop);
        assert_eq!(model.tree_count(), 2);
        assert_eq!(model.classes(), &["maize".to_string(), "rice".to_string()]);
    }

    #[test]
    fn predicts_by_averaged_probability() {
        let model = TreeEnsemble::from_json(CROP_FOREST).unwrap();

        // Tree 1: [0.1, 0.9], tree 2: [0.25, 0.75]
        let proba = model.predict_proba(&crop_vector(90.0, 200.0)).unwrap();
        assert!((proba[0] - 0.175).abs() < 1e-9);
        assert!((proba[1] - 0.825).abs() < 1e-9);
        assert_eq!(model.predict(&crop_vector(90.0, 200.0)).unwrap(), "rice");

        // Tree 1: [1.0, 0.0], tree 2: [0.5, 0.5]
        assert_eq!(model.predict(&crop_vector(30.0, 80.0)).unwrap(), "maize");
    }

    #[test]
    fn threshold_goes_left() {
        let model = TreeEnsemble::from_json(CROP_FOREST).unwrap();
        // rainfall == 150 follows the left branch of tree 1
        let proba = model.predict_proba(&crop_vector(30.0, 150.0)).unwrap();
        assert!((proba[0] - 0.75).abs() < 1e-9);
    }

    #[test]
    fn tie_goes_to_first_class() {
        let json = r#"{
            "feature_set": "crop", "n_features": 7, "classes": ["a", "b"],
            "trees": [ { "nodes": [ { "value": [5.0, 5.0] } ] } ]
        }"#;
        let model = TreeEnsemble::from_json(json).unwrap();
        assert_eq!(model.predict(&crop_vector(1.0, 1.0)).unwrap(), "a");
    }

    #[test]
    fn rejects_vector_for_other_model() {
        let model = TreeEnsemble::from_json(CROP_FOREST).unwrap();
        let fert = FeatureVector::from_raw(FeatureSet::Fertilizer, vec![0.0; 7]);
        assert!(matches!(
            model.predict(&fert),
            Err(CropLensError::Inference(_))
        ));
    }

    #[test]
    fn rejects_wrong_length_and_non_finite() {
        let model = TreeEnsemble::from_json(CROP_FOREST).unwrap();
        let short = FeatureVector::from_raw(FeatureSet::Crop, vec![0.0; 6]);
        assert!(matches!(
            model.predict(&short),
            Err(CropLensError::Inference(_))
        ));
        assert!(matches!(
            model.predict(&crop_vector(f64::NAN, 100.0)),
            Err(CropLensError::Inference(_))
        ));
    }

    #[test]
    fn rejects_malformed_artifacts() {
        // child pointing backwards would loop forever
        let cyclic = r#"{
            "feature_set": "crop", "n_features": 7, "classes": ["a"],
            "trees": [ { "nodes": [ { "feature": 0, "threshold": 1.0, "left": 0, "right": 1 },
                                    { "value": [1.0] } ] } ]
        }"#;
        // split on a feature the model doesn't have
        let bad_feature = r#"{
            "feature_set": "crop", "n_features": 7, "classes": ["a"],
            "trees": [ { "nodes": [ { "feature": 9, "threshold": 1.0, "left": 1, "right": 2 },
                                    { "value": [1.0] }, { "value": [1.0] } ] } ]
        }"#;
        let wrong_width = r#"{
            "feature_set": "fertilizer", "n_features": 5, "classes": ["a"],
            "trees": [ { "nodes": [ { "value": [1.0] } ] } ]
        }"#;
        let leaf_mismatch = r#"{
            "feature_set": "crop", "n_features": 7, "classes": ["a", "b"],
            "trees": [ { "nodes": [ { "value": [1.0] } ] } ]
        }"#;
        let no_trees = r#"{
            "feature_set": "crop", "n_features": 7, "classes": ["a"], "trees": []
        }"#;

        for json in [cyclic, bad_feature, wrong_width, leaf_mismatch, no_trees, "{}"] {
            assert!(matches!(
                TreeEnsemble::from_json(json),
                Err(CropLensError::ModelLoad(_))
            ));
        }
    }

    #[test]
    fn missing_file_is_load_error() {
        let result = TreeEnsemble::load(Path::new("/nonexistent/croplens/crop.json"));
        assert!(matches!(result, Err(CropLensError::ModelLoad(_))));
    }
}
