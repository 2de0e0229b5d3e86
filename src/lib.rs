//! `ramanprep` is a library for preprocessing Raman spectra: baseline
//! correction, denoising, normalization, and peak detection over
//! paired wavenumber-shift and intensity arrays.
//!
//! Every transform is a stateless, single-pass operation on a
//! [`Spectrum`]. Transforms never mutate their input, they return a
//! new spectrum value with the working intensity (or baseline, or
//! fingerprint) replaced, so a caller can chain them freely without
//! aliasing surprises.
//!
//! # Usage
//! ```
//! use ramanprep::{fit_baseline, detect_peaks, Spectrum};
//!
//! let shift: Vec<f64> = (0..64).map(|i| 400.0 + i as f64 * 10.0).collect();
//! let intensity: Vec<f64> = shift
//!     .iter()
//!     .map(|x| 50.0 + 0.01 * x + if (x - 720.0).abs() < 5.0 { 200.0 } else { 0.0 })
//!     .collect();
//! let spectrum = Spectrum::new("demo", shift, intensity).unwrap();
//!
//! let (corrected, _coefficients) = fit_baseline(&spectrum, 1, 50).unwrap();
//! let fingerprinted = detect_peaks(&corrected, 10.0).unwrap();
//! assert_eq!(fingerprinted.fingerprint().peaks().unwrap().len(), 1);
//! ```
//!
//! The [`dispatch`] module exposes the same operations behind a typed,
//! serializable request/response boundary for embedding in a server.
pub mod arrayops;
pub mod baseline;
pub mod denoise;
pub mod dispatch;
pub mod fit;
pub mod normalize;
pub mod peaks;
pub mod spectrum;

pub use crate::baseline::{fit_baseline, BaselineFitter};
pub use crate::dispatch::{apply, ProcessError, TransformRequest, TransformResponse};
pub use crate::peaks::{detect_peaks, PeakDetector};
pub use crate::spectrum::{Fingerprint, PeakEntry, Spectrum, SpectrumError};
