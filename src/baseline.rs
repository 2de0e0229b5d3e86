//! Baseline estimation by iterative modified polynomial fitting.
//!
//! The working signal is fit with a low-order polynomial, then clipped
//! down to the fit wherever it exceeds it so that peaks stop pulling
//! the next round's fit upward. After enough rounds the fit settles on
//! the fluorescence background rather than the Raman signal.
use log::debug;
use thiserror::Error;

use crate::fit::{FitError, Polynomial};
use crate::spectrum::Spectrum;

#[derive(Debug, Clone, Copy, Error)]
pub enum BaselineError {
    #[error("The polynomial order {0} must be smaller than the number of data points {1}")]
    OrderTooLarge(usize, usize),
    #[error(transparent)]
    Fit(#[from] FitError),
}

/// An iterative polynomial baseline estimator
#[derive(Debug, Clone, Copy)]
pub struct BaselineFitter {
    /// The degree of the background polynomial
    pub order: usize,
    /// How many fit-and-clip rounds to run. Zero rounds leaves the
    /// baseline at all zeros.
    pub iterations: usize,
}

impl Default for BaselineFitter {
    fn default() -> Self {
        Self {
            order: 2,
            iterations: 100,
        }
    }
}

impl BaselineFitter {
    pub fn new(order: usize, iterations: usize) -> Self {
        Self { order, iterations }
    }

    /// Estimate the baseline under `intensity` along the `shift` axis.
    ///
    /// Returns the baseline values and the final fitted polynomial.
    pub fn estimate(
        &self,
        shift: &[f64],
        intensity: &[f64],
    ) -> Result<(Vec<f64>, Polynomial), BaselineError> {
        let n = shift.len();
        if self.order >= n {
            return Err(BaselineError::OrderTooLarge(self.order, n));
        }
        if self.iterations == 0 {
            // Unfit baseline, defined as the zero polynomial
            return Ok((vec![0.0; n], Polynomial::new(vec![0.0; self.order + 1])));
        }

        let mut working = intensity.to_vec();
        let mut poly = Polynomial::fit(shift, &working, self.order)?;
        let mut fitted = poly.eval(shift);
        for round in 1..self.iterations {
            working
                .iter_mut()
                .zip(fitted.iter())
                .for_each(|(w, f)| *w = w.min(*f));
            poly = Polynomial::fit(shift, &working, self.order)?;
            fitted = poly.eval(shift);
            debug!("Baseline round {round}: c0 = {}", poly.coefficients()[0]);
        }
        Ok((fitted, poly))
    }

    /// Estimate the baseline of `spectrum`, returning a new spectrum
    /// whose `baseline` holds the fit and whose `intensity` is the
    /// baseline-corrected `raw_intensity`, along with the polynomial
    /// coefficients in ascending degree order.
    pub fn fit_spectrum(&self, spectrum: &Spectrum) -> Result<(Spectrum, Vec<f64>), BaselineError> {
        let (baseline, poly) = self.estimate(spectrum.shift(), spectrum.intensity())?;
        let corrected: Vec<f64> = spectrum
            .raw_intensity()
            .iter()
            .zip(baseline.iter())
            .map(|(raw, b)| raw - b)
            .collect();
        let next = spectrum.with_baseline("fit_baseline", baseline, corrected);
        Ok((next, poly.into_coefficients()))
    }
}

/// Fit and subtract a polynomial baseline, see [`BaselineFitter`].
pub fn fit_baseline(
    spectrum: &Spectrum,
    order: usize,
    iterations: usize,
) -> Result<(Spectrum, Vec<f64>), BaselineError> {
    BaselineFitter::new(order, iterations).fit_spectrum(spectrum)
}
