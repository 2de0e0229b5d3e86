//! Polynomial least squares fitting shared by the baseline estimator
//! and the polynomial smoothers.
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error)]
pub enum FitError {
    #[error("Failed to solve for coefficients: {0}")]
    FailedToSolveCoefficients(&'static str),
    #[error("Cannot fit a polynomial of order {0} to {1} data points")]
    TooFewPoints(usize, usize),
}

/// A polynomial stored as coefficients in ascending degree order,
/// `c[0] + c[1] x + c[2] x^2 + ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn into_coefficients(self) -> Vec<f64> {
        self.coefficients
    }

    pub fn order(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn eval_at(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .enumerate()
            .fold(0.0, |y, (i, c)| y + c * x.powi(i as i32))
    }

    pub fn eval(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| self.eval_at(*v)).collect()
    }

    /// Fit a degree-`order` polynomial to `(x, y)` by least squares.
    pub fn fit(x: &[f64], y: &[f64], order: usize) -> Result<Self, FitError> {
        Self::fit_weighted(x, y, None, order)
    }

    /// Fit a degree-`order` polynomial to `(x, y)` by weighted least
    /// squares. Rows are scaled by the square root of their weight,
    /// so a zero weight removes a point from the fit entirely.
    pub fn fit_weighted(
        x: &[f64],
        y: &[f64],
        weights: Option<&[f64]>,
        order: usize,
    ) -> Result<Self, FitError> {
        let nc = order + 1;
        let nr = x.len();
        if nr < nc {
            return Err(FitError::TooFewPoints(order, nr));
        }

        // Vandermonde system of equations for the polynomial
        let mut system = DMatrix::<f64>::zeros(nr, nc);
        let mut rhs = DVector::from_row_slice(y);
        x.iter().enumerate().for_each(|(row_i, x)| {
            let scale = weights.map(|w| w[row_i].sqrt()).unwrap_or(1.0);
            (0..nc).for_each(|col_j| {
                system[(row_i, col_j)] = scale * x.powi(col_j as i32);
            });
            rhs[row_i] *= scale;
        });

        let decomp = nalgebra::linalg::SVD::new(system, true, true);
        let coefficients = match decomp.solve(&rhs, 1e-12) {
            Ok(val) => val.as_slice().to_vec(),
            Err(e) => return Err(FitError::FailedToSolveCoefficients(e)),
        };
        Ok(Self::new(coefficients))
    }
}

impl AsRef<[f64]> for Polynomial {
    fn as_ref(&self) -> &[f64] {
        &self.coefficients
    }
}
