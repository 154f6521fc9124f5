use ndarray::{Array1, ArrayView1};

use crate::{ModelErr, Result};

/// A fitted ordinary least squares model over standardized features.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl LinearRegression {
    /// Creates a new `LinearRegression`.
    ///
    /// # Arguments
    /// * `coefficients` - One weight per standardized feature.
    /// * `intercept` - The bias term.
    ///
    /// # Returns
    /// A new model or an artifact error if any parameter is not finite.
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        if !intercept.is_finite() {
            return Err(ModelErr::Artifact("intercept is not finite".into()));
        }

        if let Some(i) = coefficients.iter().position(|w| !w.is_finite()) {
            return Err(ModelErr::Artifact(format!(
                "coefficient {i} is not finite"
            )));
        }

        Ok(Self {
            coefficients: Array1::from(coefficients),
            intercept,
        })
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Evaluates `intercept + w · x`.
    ///
    /// # Arguments
    /// * `x` - Standardized features, same length and order as the coefficients.
    ///
    /// # Returns
    /// The raw, unbounded regression output.
    pub fn predict(&self, x: ArrayView1<f64>) -> f64 {
        self.intercept + self.coefficients.dot(&x)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn predict_is_intercept_plus_dot_product() {
        let model = LinearRegression::new(vec![0.5, -2.0], 1.0).unwrap();
        let y = model.predict(array![2.0, 0.25].view());

        assert!((y - 1.5).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_finite_parameters() {
        assert!(LinearRegression::new(vec![f64::INFINITY], 0.0).is_err());
        assert!(LinearRegression::new(vec![1.0], f64::NAN).is_err());
    }
}
