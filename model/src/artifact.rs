use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Feature, ModelErr, Result};

/// Fitted scaler statistics as stored in the artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Fitted regression parameters as stored in the artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearParams {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Bookkeeping written by the training pipeline next to the parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_r2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_rmse: Option<f64>,
}

/// The pre-computed model consumed by the inference engine.
///
/// `feature_names` is the column order the scaler and the regression were
/// fitted on; both parameter vectors follow it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub scaler: ScalerParams,
    pub model: LinearParams,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl ModelArtifact {
    /// Reads an artifact from a JSON file.
    ///
    /// # Arguments
    /// * `path` - Location of the artifact.
    ///
    /// # Errors
    /// Returns `ModelErr::Io` if the file cannot be read and `ModelErr::Parse`
    /// if it is not a valid artifact document.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ModelErr::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Resolves the artifact's column order into features.
    ///
    /// # Returns
    /// The feature stored at each column of the artifact.
    ///
    /// # Errors
    /// Returns `ModelErr::Artifact` unless the names are a permutation of the
    /// canonical feature names.
    pub(crate) fn layout(&self) -> Result<[Feature; Feature::COUNT]> {
        if self.feature_names.len() != Feature::COUNT {
            return Err(ModelErr::Artifact(format!(
                "expected {} feature names, got {}",
                Feature::COUNT,
                self.feature_names.len()
            )));
        }

        let mut layout = Feature::ALL;
        let mut seen = HashSet::with_capacity(Feature::COUNT);

        for (slot, name) in layout.iter_mut().zip(&self.feature_names) {
            let feature = Feature::from_name(name)
                .ok_or_else(|| ModelErr::Artifact(format!("unknown feature '{name}'")))?;

            if !seen.insert(feature) {
                return Err(ModelErr::Artifact(format!("duplicated feature '{name}'")));
            }

            *slot = feature;
        }

        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(names: &[&str]) -> ModelArtifact {
        ModelArtifact {
            feature_names: names.iter().map(|s| s.to_string()).collect(),
            scaler: ScalerParams {
                mean: vec![0.0; names.len()],
                scale: vec![1.0; names.len()],
            },
            model: LinearParams {
                coefficients: vec![0.0; names.len()],
                intercept: 0.5,
            },
            metadata: None,
        }
    }

    #[test]
    fn layout_follows_artifact_order() {
        let names = [
            "CGPA",
            "GRE_Score",
            "TOEFL_Score",
            "University_Rating",
            "SOP",
            "LOR",
            "Research",
        ];
        let layout = artifact(&names).layout().unwrap();

        assert_eq!(layout[0], Feature::Cgpa);
        assert_eq!(layout[1], Feature::GreScore);
        assert_eq!(layout[6], Feature::Research);
    }

    #[test]
    fn layout_rejects_duplicates_and_unknown_names() {
        let mut names: Vec<&str> = Feature::ALL.iter().map(|f| f.name()).collect();
        names[6] = "CGPA";
        assert!(artifact(&names).layout().is_err());

        names[6] = "Serial_No";
        assert!(artifact(&names).layout().is_err());

        assert!(artifact(&names[..6]).layout().is_err());
    }

    #[test]
    fn parses_without_metadata() {
        let json = r#"{
            "feature_names": ["GRE_Score"],
            "scaler": { "mean": [300.0], "scale": [10.0] },
            "model": { "coefficients": [0.1], "intercept": 0.5 }
        }"#;

        let artifact = ModelArtifact::from_json(json).unwrap();
        assert!(artifact.metadata.is_none());
        assert_eq!(artifact.model.intercept, 0.5);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ModelArtifact::from_path("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ModelErr::Io { .. }));
    }
}
