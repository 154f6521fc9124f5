use std::path::Path;

use log::{debug, info};
use ndarray::Array1;
use serde::Serialize;

use crate::{
    Feature, LinearRegression, ModelArtifact, ModelErr, Result, StandardScaler, StudentProfile,
};

const DEFAULT_NAME: &str = "admission_predictor";
const DEFAULT_VERSION: &str = "unversioned";

/// Descriptive data about the loaded model, reported on the health surface.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    pub features: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_r2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_rmse: Option<f64>,
}

/// Scaler plus linear model, bound to the column order they were fitted on.
///
/// Read-only after construction, so one instance can serve any number of
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    layout: [Feature; Feature::COUNT],
    scaler: StandardScaler,
    regression: LinearRegression,
    info: ModelInfo,
}

impl InferenceEngine {
    /// Loads the artifact at `path` and builds an engine from it.
    ///
    /// # Errors
    /// Returns a `ModelErr` if the artifact cannot be read, parsed or is inconsistent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let engine = Self::from_artifact(ModelArtifact::from_path(path)?)?;
        info!(
            version = engine.info.version.as_str();
            "model artifact loaded from {}",
            path.display()
        );
        Ok(engine)
    }

    /// Builds an engine from an in-memory artifact.
    ///
    /// # Arguments
    /// * `artifact` - The fitted scaler and regression with their column order.
    ///
    /// # Returns
    /// A new `InferenceEngine`.
    ///
    /// # Errors
    /// Returns `ModelErr::Artifact` if the column order is not a permutation
    /// of the canonical features or any parameter vector has the wrong length.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        let layout = artifact.layout()?;

        let ModelArtifact {
            scaler,
            model,
            metadata,
            ..
        } = artifact;

        let scaler = StandardScaler::new(scaler.mean, scaler.scale)?;
        let regression = LinearRegression::new(model.coefficients, model.intercept)?;

        if scaler.len() != Feature::COUNT || regression.len() != Feature::COUNT {
            return Err(ModelErr::Artifact(format!(
                "expected {} scaler and model parameters, got {} and {}",
                Feature::COUNT,
                scaler.len(),
                regression.len()
            )));
        }

        let features = layout.iter().map(|feature| feature.name()).collect();
        let info = match metadata {
            Some(meta) => ModelInfo {
                name: meta.name,
                version: meta.version,
                features,
                trained_at: meta.trained_at,
                test_r2: meta.test_r2,
                test_rmse: meta.test_rmse,
            },
            None => ModelInfo {
                name: DEFAULT_NAME.to_string(),
                version: DEFAULT_VERSION.to_string(),
                features,
                trained_at: None,
                test_r2: None,
                test_rmse: None,
            },
        };

        Ok(Self {
            layout,
            scaler,
            regression,
            info,
        })
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// Predicts the admission chance of a validated profile.
    ///
    /// # Arguments
    /// * `profile` - The student profile.
    ///
    /// # Returns
    /// The regression output clamped to `[0, 1]`.
    ///
    /// # Errors
    /// Returns `ModelErr::NonFiniteOutput` if the regression output is not finite.
    pub fn predict(&self, profile: &StudentProfile) -> Result<f64> {
        let raw: Array1<f64> = self
            .layout
            .iter()
            .map(|&feature| profile.value(feature))
            .collect();

        let scaled = self.scaler.transform(raw.view());
        let y = self.regression.predict(scaled.view());

        if !y.is_finite() {
            return Err(ModelErr::NonFiniteOutput);
        }

        // The regression is unbounded, extreme profiles land outside [0, 1].
        let chance = y.clamp(0.0, 1.0);
        debug!(raw = y, chance = chance; "prediction");
        Ok(chance)
    }

    /// Predicts every profile in order, stopping at the first failure.
    pub fn predict_many(&self, profiles: &[StudentProfile]) -> Result<Vec<f64>> {
        profiles.iter().map(|profile| self.predict(profile)).collect()
    }
}
