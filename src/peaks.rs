//! Peak detection over a spectrum's working intensity, producing its
//! fingerprint.
//!
//! Local maxima are located with a plateau-aware scan, then filtered
//! by topographic prominence and by height relative to the tallest
//! point in the signal. Both thresholds must pass for a peak to be
//! kept.
use log::debug;
use thiserror::Error;

use crate::arrayops::minmax;
use crate::spectrum::{PeakEntry, Spectrum};

#[derive(Debug, Clone, Copy, Error)]
pub enum PeakError {
    #[error("The prominence threshold must be positive, received {0}")]
    NonPositiveProminence(f64),
}

/// Find the indices of local maxima in `data`.
///
/// A flat run of equal values bounded by strictly lower neighbors
/// counts as a single maximum at the plateau midpoint. The first and
/// last samples can never be maxima.
pub fn local_maxima(data: &[f64]) -> Vec<usize> {
    let n = data.len();
    let mut maxima = Vec::new();
    if n < 3 {
        return maxima;
    }
    let mut i = 1;
    while i < n - 1 {
        if data[i - 1] < data[i] {
            let mut ahead = i + 1;
            while ahead < n - 1 && data[ahead] == data[i] {
                ahead += 1;
            }
            if data[ahead] < data[i] {
                // Midpoint of the plateau [i, ahead - 1]
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
            i = ahead;
        } else {
            i += 1;
        }
    }
    maxima
}

/// Topographic prominence of the maximum at `peak`: its height above
/// the higher of the two lowest points separating it from higher
/// terrain (or from the signal boundary) on either side.
pub fn prominence_at(data: &[f64], peak: usize) -> f64 {
    let height = data[peak];

    let mut left_min = height;
    let mut i = peak;
    while i > 0 {
        i -= 1;
        if data[i] > height {
            break;
        }
        left_min = left_min.min(data[i]);
    }

    let mut right_min = height;
    let mut i = peak;
    while i < data.len() - 1 {
        i += 1;
        if data[i] > height {
            break;
        }
        right_min = right_min.min(data[i]);
    }

    height - left_min.max(right_min)
}

/// A peak detector over the working intensity of a spectrum
#[derive(Debug, Clone, Copy)]
pub struct PeakDetector {
    /// The minimum topographic prominence for a maximum to be kept
    pub prominence: f64,
    /// Minimum height as a fraction of the tallest intensity value
    pub relative_height_threshold: f64,
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self {
            prominence: 1.0,
            relative_height_threshold: 0.1,
        }
    }
}

impl PeakDetector {
    pub fn new(prominence: f64, relative_height_threshold: f64) -> Self {
        Self {
            prominence,
            relative_height_threshold,
        }
    }

    /// Detect peaks in paired `shift` and `intensity` arrays, in
    /// increasing shift order. An empty result is valid.
    pub fn detect(&self, shift: &[f64], intensity: &[f64]) -> Result<Vec<PeakEntry>, PeakError> {
        if self.prominence <= 0.0 {
            return Err(PeakError::NonPositiveProminence(self.prominence));
        }
        let (_, tallest) = minmax(intensity);
        let height_floor = self.relative_height_threshold * tallest;

        let peaks: Vec<PeakEntry> = local_maxima(intensity)
            .into_iter()
            .filter(|i| {
                intensity[*i] >= height_floor && prominence_at(intensity, *i) >= self.prominence
            })
            .map(|i| PeakEntry::new(shift[i], intensity[i]))
            .collect();
        debug!("Detected {} peaks", peaks.len());
        Ok(peaks)
    }

    /// Detect peaks in `spectrum`, returning a new spectrum whose
    /// fingerprint holds the detected peak list.
    pub fn detect_spectrum(&self, spectrum: &Spectrum) -> Result<Spectrum, PeakError> {
        let peaks = self.detect(spectrum.shift(), spectrum.intensity())?;
        Ok(spectrum.with_fingerprint("detect_peaks", peaks))
    }
}

/// Detect peaks with the default relative height threshold of 0.1,
/// see [`PeakDetector`].
pub fn detect_peaks(spectrum: &Spectrum, prominence: f64) -> Result<Spectrum, PeakError> {
    PeakDetector::new(prominence, 0.1).detect_spectrum(spectrum)
}
