//! The typed request/response boundary around the transforms.
//!
//! Each request carries one spectrum payload and the parameters of
//! exactly one transform; [`apply`] constructs the [`Spectrum`], runs
//! the transform, and reads the result back out into a serializable
//! response. Every call is stateless and independent.
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::baseline::{self, BaselineError};
use crate::denoise::{self, DenoiseError};
use crate::normalize::{self, NormalizeError};
use crate::peaks::{self, PeakError};
use crate::spectrum::{Spectrum, SpectrumError};

/// Why a request was rejected. Rejections are total: no partial
/// result is ever produced.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] SpectrumError),
    #[error("invalid parameter: {0}")]
    Baseline(#[from] BaselineError),
    #[error("invalid parameter: {0}")]
    Denoise(#[from] DenoiseError),
    #[error("invalid parameter: {0}")]
    Normalize(#[from] NormalizeError),
    #[error("invalid parameter: {0}")]
    Peaks(#[from] PeakError),
}

/// The raw arrays of a request's `spectrum` object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumPayload {
    pub shift: Vec<f64>,
    pub intensity: Vec<f64>,
}

impl SpectrumPayload {
    fn into_spectrum(self) -> Result<Spectrum, SpectrumError> {
        Spectrum::new("request", self.shift, self.intensity)
    }
}

impl From<&Spectrum> for SpectrumPayload {
    fn from(spectrum: &Spectrum) -> Self {
        Self {
            shift: spectrum.shift().to_vec(),
            intensity: spectrum.intensity().to_vec(),
        }
    }
}

fn default_relative_height_threshold() -> f64 {
    0.1
}

/// One transform invocation, tagged by operation name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformRequest {
    Baseline {
        spectrum: SpectrumPayload,
        order: usize,
        iterations: usize,
    },
    MovingAverage {
        spectrum: SpectrumPayload,
        window: usize,
    },
    SavitzkyGolay {
        spectrum: SpectrumPayload,
        order: usize,
        window: usize,
    },
    Lowess {
        spectrum: SpectrumPayload,
        order: usize,
        window: usize,
    },
    MinMax {
        spectrum: SpectrumPayload,
        height: f64,
    },
    L1Norm {
        spectrum: SpectrumPayload,
    },
    L2Norm {
        spectrum: SpectrumPayload,
    },
    LInfNorm {
        spectrum: SpectrumPayload,
    },
    Snv {
        spectrum: SpectrumPayload,
    },
    FindPeaks {
        spectrum: SpectrumPayload,
        prominence: f64,
        #[serde(default = "default_relative_height_threshold")]
        threshold: f64,
    },
}

impl TransformRequest {
    /// The operation name this request is tagged with
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Baseline { .. } => "baseline",
            Self::MovingAverage { .. } => "moving_average",
            Self::SavitzkyGolay { .. } => "savitzky_golay",
            Self::Lowess { .. } => "lowess",
            Self::MinMax { .. } => "min_max",
            Self::L1Norm { .. } => "l1_norm",
            Self::L2Norm { .. } => "l2_norm",
            Self::LInfNorm { .. } => "l_inf_norm",
            Self::Snv { .. } => "snv",
            Self::FindPeaks { .. } => "find_peaks",
        }
    }
}

/// The result of a successful transform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformResponse {
    Baseline {
        intensity: Vec<f64>,
        baseline: Vec<f64>,
        polynomial: Vec<f64>,
    },
    Intensity {
        intensity: Vec<f64>,
    },
    Peaks {
        peaks: Vec<(f64, f64)>,
    },
}

/// Apply the one transform named by `request` and collect its result.
pub fn apply(request: TransformRequest) -> Result<TransformResponse, ProcessError> {
    debug!("Dispatching {}", request.operation());
    let response = match request {
        TransformRequest::Baseline {
            spectrum,
            order,
            iterations,
        } => {
            let spectrum = spectrum.into_spectrum()?;
            let (fitted, polynomial) = baseline::fit_baseline(&spectrum, order, iterations)?;
            TransformResponse::Baseline {
                intensity: fitted.intensity().to_vec(),
                baseline: fitted.baseline().to_vec(),
                polynomial,
            }
        }
        TransformRequest::MovingAverage { spectrum, window } => {
            let spectrum = spectrum.into_spectrum()?;
            let smoothed = denoise::moving_average(&spectrum, window)?;
            TransformResponse::Intensity {
                intensity: smoothed.intensity().to_vec(),
            }
        }
        TransformRequest::SavitzkyGolay {
            spectrum,
            order,
            window,
        } => {
            let spectrum = spectrum.into_spectrum()?;
            let smoothed = denoise::savitzky_golay(&spectrum, order, window)?;
            TransformResponse::Intensity {
                intensity: smoothed.intensity().to_vec(),
            }
        }
        TransformRequest::Lowess {
            spectrum,
            order,
            window,
        } => {
            let spectrum = spectrum.into_spectrum()?;
            let smoothed = denoise::lowess(&spectrum, order, window)?;
            TransformResponse::Intensity {
                intensity: smoothed.intensity().to_vec(),
            }
        }
        TransformRequest::MinMax { spectrum, height } => {
            let spectrum = spectrum.into_spectrum()?;
            let scaled = normalize::min_max(&spectrum, height)?;
            TransformResponse::Intensity {
                intensity: scaled.intensity().to_vec(),
            }
        }
        TransformRequest::L1Norm { spectrum } => {
            let spectrum = spectrum.into_spectrum()?;
            TransformResponse::Intensity {
                intensity: normalize::l1_norm(&spectrum).intensity().to_vec(),
            }
        }
        TransformRequest::L2Norm { spectrum } => {
            let spectrum = spectrum.into_spectrum()?;
            TransformResponse::Intensity {
                intensity: normalize::l2_norm(&spectrum).intensity().to_vec(),
            }
        }
        TransformRequest::LInfNorm { spectrum } => {
            let spectrum = spectrum.into_spectrum()?;
            TransformResponse::Intensity {
                intensity: normalize::l_inf_norm(&spectrum).intensity().to_vec(),
            }
        }
        TransformRequest::Snv { spectrum } => {
            let spectrum = spectrum.into_spectrum()?;
            TransformResponse::Intensity {
                intensity: normalize::snv(&spectrum).intensity().to_vec(),
            }
        }
        TransformRequest::FindPeaks {
            spectrum,
            prominence,
            threshold,
        } => {
            let spectrum = spectrum.into_spectrum()?;
            let detector = peaks::PeakDetector::new(prominence, threshold);
            let detected = detector.detect_spectrum(&spectrum)?;
            let peaks = detected
                .fingerprint()
                .peaks()
                .unwrap_or_default()
                .iter()
                .map(|p| (*p).into())
                .collect();
            TransformResponse::Peaks { peaks }
        }
    };
    Ok(response)
}

#[cfg(test)]
mod test {
    use super::*;

    fn payload(shift: Vec<f64>, intensity: Vec<f64>) -> SpectrumPayload {
        SpectrumPayload { shift, intensity }
    }

    #[test]
    fn test_request_parsing() {
        let request: TransformRequest = serde_json::from_str(
            r#"{"op": "savitzky_golay", "spectrum": {"shift": [0.0, 1.0, 2.0], "intensity": [1.0, 2.0, 1.0]}, "order": 1, "window": 3}"#,
        )
        .unwrap();
        assert_eq!(request.operation(), "savitzky_golay");
        assert!(matches!(
            request,
            TransformRequest::SavitzkyGolay {
                order: 1,
                window: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_operation_is_rejected_at_parse() {
        let result: Result<TransformRequest, _> = serde_json::from_str(
            r#"{"op": "resample", "spectrum": {"shift": [0.0], "intensity": [0.0]}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_find_peaks_threshold_defaults() {
        let request: TransformRequest = serde_json::from_str(
            r#"{"op": "find_peaks", "spectrum": {"shift": [0.0], "intensity": [0.0]}, "prominence": 1.0}"#,
        )
        .unwrap();
        match request {
            TransformRequest::FindPeaks { threshold, .. } => {
                assert!((threshold - 0.1).abs() < 1e-12)
            }
            other => panic!("parsed the wrong operation: {other:?}"),
        }
    }

    #[test]
    fn test_apply_baseline_response_shape() {
        let request = TransformRequest::Baseline {
            spectrum: payload(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]),
            order: 0,
            iterations: 1,
        };
        match apply(request).unwrap() {
            TransformResponse::Baseline {
                intensity,
                baseline,
                polynomial,
            } => {
                assert_eq!(intensity.len(), 3);
                assert_eq!(baseline.len(), 3);
                assert!((baseline[0] - 2.0).abs() < 1e-10);
                assert_eq!(polynomial.len(), 1);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn test_apply_find_peaks() {
        let request = TransformRequest::FindPeaks {
            spectrum: payload(
                vec![0.0, 1.0, 2.0, 3.0, 4.0],
                vec![0.0, 0.0, 10.0, 0.0, 0.0],
            ),
            prominence: 1.0,
            threshold: 0.1,
        };
        match apply(request).unwrap() {
            TransformResponse::Peaks { peaks } => {
                assert_eq!(peaks, vec![(2.0, 10.0)]);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn test_peaks_serialize_as_pairs() {
        let response = TransformResponse::Peaks {
            peaks: vec![(2.0, 10.0)],
        };
        let text = serde_json::to_string(&response).unwrap();
        assert_eq!(text, r#"{"peaks":[[2.0,10.0]]}"#);
    }

    #[test]
    fn test_mismatched_arrays_are_malformed_input() {
        let request = TransformRequest::Snv {
            spectrum: payload(vec![0.0, 1.0], vec![1.0]),
        };
        let err = apply(request).unwrap_err();
        assert!(matches!(err, ProcessError::MalformedInput(_)));
    }

    #[test]
    fn test_invalid_window_is_rejected() {
        let request = TransformRequest::SavitzkyGolay {
            spectrum: payload(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0, 4.0]),
            order: 3,
            window: 3,
        };
        let err = apply(request).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Denoise(DenoiseError::OrderTooLarge(3, 3))
        ));
    }

    #[test]
    fn test_statelessness_across_calls() {
        let spike = payload(
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![0.0, 0.0, 10.0, 0.0, 0.0],
        );
        let bad = TransformRequest::MinMax {
            spectrum: payload(vec![0.0], vec![1.0]),
            height: -1.0,
        };
        assert!(apply(bad).is_err());
        // A rejected call leaves no trace for the next one
        let ok = TransformRequest::MinMax {
            spectrum: spike,
            height: 5.0,
        };
        match apply(ok).unwrap() {
            TransformResponse::Intensity { intensity } => {
                assert!((intensity[2] - 5.0).abs() < 1e-12)
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }
}
