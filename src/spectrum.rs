//! The [`Spectrum`] data entity shared by every preprocessing transform.
//!
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All the ways constructing a [`Spectrum`] from raw arrays can fail
#[derive(Debug, Clone, Error)]
pub enum SpectrumError {
    #[error("The shift and intensity arrays do not match in length, {0} vs {1}")]
    LengthMismatch(usize, usize),
    #[error("The spectrum arrays must not be empty")]
    Empty,
    #[error("Encountered a non-finite value at index {0}")]
    NonFiniteValue(usize),
}

/// A single detected peak, a point on the (shift, intensity) plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakEntry {
    pub shift: f64,
    pub intensity: f64,
}

impl PeakEntry {
    pub fn new(shift: f64, intensity: f64) -> Self {
        Self { shift, intensity }
    }
}

impl fmt::Display for PeakEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PeakEntry({}, {})", self.shift, self.intensity)
    }
}

impl From<PeakEntry> for (f64, f64) {
    fn from(peak: PeakEntry) -> Self {
        (peak.shift, peak.intensity)
    }
}

/// The peak list characterizing a spectrum, tagged by whether peak
/// detection has run yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Fingerprint {
    #[default]
    Unprocessed,
    Processed(Vec<PeakEntry>),
}

impl Fingerprint {
    pub fn is_processed(&self) -> bool {
        matches!(self, Self::Processed(_))
    }

    /// The detected peaks, or `None` if peak detection has not run
    pub fn peaks(&self) -> Option<&[PeakEntry]> {
        match self {
            Self::Unprocessed => None,
            Self::Processed(peaks) => Some(peaks),
        }
    }
}

/// A Raman spectrum, pairing a wavenumber shift axis with an intensity
/// array and the derived products of preprocessing.
///
/// The shift axis and the as-constructed intensity are frozen at
/// construction. Transforms never modify a `Spectrum` in place, they
/// return a new value with the working `intensity` (or `baseline`,
/// or `fingerprint`) replaced and the operation appended to
/// [`Spectrum::processing_history`].
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub name: String,
    shift: Vec<f64>,
    raw_intensity: Vec<f64>,
    intensity: Vec<f64>,
    baseline: Vec<f64>,
    fingerprint: Fingerprint,
    processing_history: Vec<String>,
}

impl Spectrum {
    /// Create a new spectrum from paired shift and intensity arrays.
    ///
    /// The arrays must be non-empty, of equal length, and hold only
    /// finite values.
    pub fn new<S: Into<String>>(
        name: S,
        shift: Vec<f64>,
        intensity: Vec<f64>,
    ) -> Result<Self, SpectrumError> {
        if shift.len() != intensity.len() {
            return Err(SpectrumError::LengthMismatch(shift.len(), intensity.len()));
        }
        if shift.is_empty() {
            return Err(SpectrumError::Empty);
        }
        for (i, (s, y)) in shift.iter().zip(intensity.iter()).enumerate() {
            if !s.is_finite() || !y.is_finite() {
                return Err(SpectrumError::NonFiniteValue(i));
            }
        }
        let n = shift.len();
        Ok(Self {
            name: name.into(),
            shift,
            raw_intensity: intensity.clone(),
            intensity,
            baseline: vec![0.0; n],
            fingerprint: Fingerprint::default(),
            processing_history: Vec::new(),
        })
    }

    /// The number of points in the spectrum
    pub fn len(&self) -> usize {
        self.shift.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shift.is_empty()
    }

    /// The wavenumber shift axis, fixed at construction
    pub fn shift(&self) -> &[f64] {
        &self.shift
    }

    /// The intensity array as it was at construction
    pub fn raw_intensity(&self) -> &[f64] {
        &self.raw_intensity
    }

    /// The current working intensity array
    pub fn intensity(&self) -> &[f64] {
        &self.intensity
    }

    /// The estimated baseline, all zeros until a baseline fit runs
    pub fn baseline(&self) -> &[f64] {
        &self.baseline
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// The ordered log of operations applied so far
    pub fn processing_history(&self) -> &[String] {
        &self.processing_history
    }

    /// Produce a copy of this spectrum with `intensity` replaced and
    /// `operation` appended to the history.
    pub(crate) fn with_intensity(&self, operation: &str, intensity: Vec<f64>) -> Self {
        debug_assert_eq!(intensity.len(), self.len());
        let mut next = self.clone();
        next.intensity = intensity;
        next.processing_history.push(operation.to_string());
        next
    }

    /// Produce a copy with both the baseline and the corrected
    /// intensity replaced.
    pub(crate) fn with_baseline(
        &self,
        operation: &str,
        baseline: Vec<f64>,
        corrected: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(baseline.len(), self.len());
        debug_assert_eq!(corrected.len(), self.len());
        let mut next = self.clone();
        next.baseline = baseline;
        next.intensity = corrected;
        next.processing_history.push(operation.to_string());
        next
    }

    /// Produce a copy with the fingerprint replaced by a detected peak list.
    pub(crate) fn with_fingerprint(&self, operation: &str, peaks: Vec<PeakEntry>) -> Self {
        let mut next = self.clone();
        next.fingerprint = Fingerprint::Processed(peaks);
        next.processing_history.push(operation.to_string());
        next
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_construction() {
        let spectrum =
            Spectrum::new("caffeine", vec![100.0, 200.0, 300.0], vec![1.0, 5.0, 2.0]).unwrap();
        assert_eq!(spectrum.len(), 3);
        assert_eq!(spectrum.intensity(), spectrum.raw_intensity());
        assert_eq!(spectrum.baseline(), &[0.0, 0.0, 0.0]);
        assert!(!spectrum.fingerprint().is_processed());
        assert!(spectrum.processing_history().is_empty());
    }

    #[test]
    fn test_length_mismatch() {
        let err = Spectrum::new("bad", vec![100.0, 200.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, SpectrumError::LengthMismatch(2, 1)));
    }

    #[test]
    fn test_empty() {
        let err = Spectrum::new("bad", vec![], vec![]).unwrap_err();
        assert!(matches!(err, SpectrumError::Empty));
    }

    #[test]
    fn test_non_finite() {
        let err = Spectrum::new("bad", vec![100.0, 200.0], vec![1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, SpectrumError::NonFiniteValue(1)));
    }

    #[test]
    fn test_functional_update() {
        let spectrum = Spectrum::new("s", vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]).unwrap();
        let updated = spectrum.with_intensity("moving_average", vec![3.5, 4.0, 4.5]);
        assert_eq!(spectrum.intensity(), &[3.0, 4.0, 5.0]);
        assert_eq!(updated.intensity(), &[3.5, 4.0, 4.5]);
        assert_eq!(updated.raw_intensity(), &[3.0, 4.0, 5.0]);
        assert_eq!(updated.processing_history(), &["moving_average".to_string()]);
    }
}
