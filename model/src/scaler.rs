use ndarray::{Array1, ArrayView1};

use crate::{ModelErr, Result};

/// Per-feature standardization fitted on the training data.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Creates a new `StandardScaler`.
    ///
    /// # Arguments
    /// * `mean` - The fitted mean of every feature.
    /// * `scale` - The fitted scale of every feature.
    ///
    /// # Returns
    /// A new `StandardScaler` or an artifact error if the statistics are unusable.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if mean.len() != scale.len() {
            return Err(ModelErr::Artifact(format!(
                "scaler mean has {} values but scale has {}",
                mean.len(),
                scale.len()
            )));
        }

        if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
            return Err(ModelErr::Artifact(format!(
                "scaler mean {i} is not finite"
            )));
        }

        if let Some(i) = scale.iter().position(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ModelErr::Artifact(format!(
                "scaler scale {i} must be finite and positive, got {}",
                scale[i]
            )));
        }

        Ok(Self {
            mean: Array1::from(mean),
            scale: Array1::from(scale),
        })
    }

    /// Amount of features this scaler was fitted on.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Standardizes a raw feature vector.
    ///
    /// # Arguments
    /// * `x` - Raw features, in the order the scaler was fitted on.
    ///
    /// # Returns
    /// `(x - mean) / scale`, element wise.
    pub fn transform(&self, x: ArrayView1<f64>) -> Array1<f64> {
        (&x - &self.mean) / &self.scale
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn transform_standardizes_each_feature() {
        let scaler = StandardScaler::new(vec![10.0, 0.0], vec![2.0, 0.5]).unwrap();
        let x = array![14.0, -1.0];

        assert_eq!(scaler.transform(x.view()), array![2.0, -2.0]);
    }

    #[test]
    fn rejects_non_positive_scale() {
        assert!(StandardScaler::new(vec![0.0], vec![0.0]).is_err());
        assert!(StandardScaler::new(vec![0.0], vec![-1.0]).is_err());
        assert!(StandardScaler::new(vec![0.0], vec![f64::NAN]).is_err());
    }

    #[test]
    fn rejects_mismatched_lengths() {
        assert!(StandardScaler::new(vec![0.0, 1.0], vec![1.0]).is_err());
    }
}
