//! Intensity scaling strategies. Each one is stateless and
//! independently selectable; degenerate inputs (zero norm, zero
//! variance, all-equal values) resolve to an all-zero result instead
//! of erroring.
use thiserror::Error;

use crate::arrayops::{mean, minmax};
use crate::spectrum::Spectrum;

#[derive(Debug, Clone, Copy, Error)]
pub enum NormalizeError {
    #[error("The target height must be positive, received {0}")]
    NonPositiveHeight(f64),
}

fn scale_by(data: &[f64], divisor: f64) -> Vec<f64> {
    if divisor == 0.0 {
        vec![0.0; data.len()]
    } else {
        data.iter().map(|y| y / divisor).collect()
    }
}

/// Rescale so the minimum maps to 0 and the maximum to `height`.
/// All-equal input maps to all zeros.
pub fn min_max_scale(data: &[f64], height: f64) -> Result<Vec<f64>, NormalizeError> {
    if height <= 0.0 {
        return Err(NormalizeError::NonPositiveHeight(height));
    }
    let (min, max) = minmax(data);
    if max == min {
        return Ok(vec![0.0; data.len()]);
    }
    Ok(data
        .iter()
        .map(|y| (y - min) / (max - min) * height)
        .collect())
}

/// Divide by the sum of absolute values.
pub fn l1_scale(data: &[f64]) -> Vec<f64> {
    scale_by(data, data.iter().map(|y| y.abs()).sum())
}

/// Divide by the Euclidean norm.
pub fn l2_scale(data: &[f64]) -> Vec<f64> {
    scale_by(data, data.iter().map(|y| y * y).sum::<f64>().sqrt())
}

/// Divide by the maximum absolute value.
pub fn l_inf_scale(data: &[f64]) -> Vec<f64> {
    scale_by(data, data.iter().map(|y| y.abs()).fold(0.0, f64::max))
}

/// Standard normal variate: subtract the mean, divide by the
/// population standard deviation. Zero variance maps to all zeros.
pub fn snv_scale(data: &[f64]) -> Vec<f64> {
    let center = mean(data);
    let variance = data.iter().map(|y| (y - center).powi(2)).sum::<f64>() / data.len() as f64;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        vec![0.0; data.len()]
    } else {
        data.iter().map(|y| (y - center) / std_dev).collect()
    }
}

/// Min-max normalization of `spectrum` onto `[0, height]`.
pub fn min_max(spectrum: &Spectrum, height: f64) -> Result<Spectrum, NormalizeError> {
    let scaled = min_max_scale(spectrum.intensity(), height)?;
    Ok(spectrum.with_intensity("min_max", scaled))
}

/// L1 normalization of `spectrum`.
pub fn l1_norm(spectrum: &Spectrum) -> Spectrum {
    spectrum.with_intensity("l1_norm", l1_scale(spectrum.intensity()))
}

/// L2 normalization of `spectrum`.
pub fn l2_norm(spectrum: &Spectrum) -> Spectrum {
    spectrum.with_intensity("l2_norm", l2_scale(spectrum.intensity()))
}

/// L-infinity normalization of `spectrum`.
pub fn l_inf_norm(spectrum: &Spectrum) -> Spectrum {
    spectrum.with_intensity("l_inf_norm", l_inf_scale(spectrum.intensity()))
}

/// Standard normal variate normalization of `spectrum`.
pub fn snv(spectrum: &Spectrum) -> Spectrum {
    spectrum.with_intensity("snv", snv_scale(spectrum.intensity()))
}
