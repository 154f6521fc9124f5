mod artifact;
mod engine;
pub mod error;
mod linear;
mod profile;
mod scaler;
mod validation;

pub use artifact::{LinearParams, ModelArtifact, ModelMetadata, ScalerParams};
pub use engine::{InferenceEngine, ModelInfo};
pub use error::{ModelErr, Result, ValidationErr};
pub use linear::LinearRegression;
pub use profile::{Feature, FeatureKind, StudentProfile};
pub use scaler::StandardScaler;
pub use validation::validate;
