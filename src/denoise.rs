//! Remove high-frequency noise from a spectrum with one of three
//! independent smoothers: a centered moving average, a Savitzky-Golay
//! filter, or locally weighted polynomial regression (LOWESS).
use nalgebra::DMatrix;
use thiserror::Error;

use crate::fit::{FitError, Polynomial};
use crate::spectrum::Spectrum;

#[derive(Debug, Clone, Copy, Error)]
pub enum DenoiseError {
    #[error("The window length must be at least 1, received {0}")]
    WindowTooSmall(usize),
    #[error("The window length must be an odd number, received {0}")]
    WindowNotOdd(usize),
    #[error(
        "The window length must be no longer than the data, received {0} window with {1} data points"
    )]
    WindowTooLong(usize, usize),
    #[error("The polynomial order {0} must be less than the window size {1}")]
    OrderTooLarge(usize, usize),
    #[error(transparent)]
    Fit(#[from] FitError),
}

fn validate_window(window: usize, n: usize) -> Result<(), DenoiseError> {
    if window == 0 {
        Err(DenoiseError::WindowTooSmall(window))
    } else if window % 2 == 0 {
        Err(DenoiseError::WindowNotOdd(window))
    } else if window > n {
        Err(DenoiseError::WindowTooLong(window, n))
    } else {
        Ok(())
    }
}

fn validate_window_and_order(window: usize, order: usize, n: usize) -> Result<(), DenoiseError> {
    validate_window(window, n)?;
    if order >= window {
        Err(DenoiseError::OrderTooLarge(order, window))
    } else {
        Ok(())
    }
}

/// Replace each sample with the mean of a centered window, clipped at
/// the signal boundaries. `window` must be odd; a window of 1 is the
/// identity.
pub fn moving_average_smooth(data: &[f64], window: usize) -> Result<Vec<f64>, DenoiseError> {
    let n = data.len();
    if window == 0 {
        return Err(DenoiseError::WindowTooSmall(window));
    }
    if window % 2 == 0 {
        return Err(DenoiseError::WindowNotOdd(window));
    }
    let half = window / 2;
    let smoothed = (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(n - 1);
            let segment = &data[lo..=hi];
            segment.iter().sum::<f64>() / segment.len() as f64
        })
        .collect();
    Ok(smoothed)
}

/// Compute the Savitzky-Golay convolution kernel for a centered window.
///
/// The kernel is the row of the least-squares hat matrix that evaluates
/// the fitted polynomial at the window center, so convolving with it
/// reproduces any polynomial of degree `order` or less exactly.
fn savitzky_golay_kernel(window: usize, order: usize) -> Result<Vec<f64>, FitError> {
    let half = window / 2;
    // Vandermonde matrix over centered offsets
    let design = DMatrix::from_fn(window, order + 1, |j, k| {
        (j as f64 - half as f64).powi(k as i32)
    });
    let decomp = nalgebra::linalg::SVD::new(design, true, true);
    let pinv = decomp
        .pseudo_inverse(1e-12)
        .map_err(FitError::FailedToSolveCoefficients)?;
    Ok(pinv.row(0).iter().copied().collect())
}

/// Smooth by local polynomial least squares over a sliding window.
///
/// Interior points are convolved with the precomputed kernel; the
/// half-window at each edge is filled by evaluating a polynomial fit
/// to the first (respectively last) full window.
pub fn savitzky_golay_smooth(
    data: &[f64],
    order: usize,
    window: usize,
) -> Result<Vec<f64>, DenoiseError> {
    let n = data.len();
    validate_window_and_order(window, order, n)?;

    let half = window / 2;
    let kernel = savitzky_golay_kernel(window, order)?;
    let mut smoothed: Vec<f64> = data
        .windows(window)
        .map(|seg| seg.iter().zip(kernel.iter()).map(|(y, c)| y * c).sum())
        .collect();

    // Edge halves come from polynomial fits to the terminal windows
    let offsets: Vec<f64> = (0..window).map(|i| i as f64).collect();
    let head = Polynomial::fit(&offsets, &data[..window], order)?;
    let tail = Polynomial::fit(&offsets, &data[n - window..], order)?;
    let leading: Vec<f64> = (0..half).map(|i| head.eval_at(i as f64)).collect();
    let trailing = (0..half).map(|i| tail.eval_at((window - half + i) as f64));
    smoothed.splice(0..0, leading);
    smoothed.extend(trailing);
    debug_assert_eq!(smoothed.len(), n);
    Ok(smoothed)
}

fn tricube(u: f64) -> f64 {
    if u >= 1.0 {
        0.0
    } else {
        let w = 1.0 - u * u * u;
        w * w * w
    }
}

/// Smooth by locally weighted polynomial regression.
///
/// Each sample is replaced by the value at its own shift of a
/// polynomial fit to its `window` nearest neighbors, weighted by
/// tricube distance along the shift axis.
pub fn lowess_smooth(
    shift: &[f64],
    data: &[f64],
    order: usize,
    window: usize,
) -> Result<Vec<f64>, DenoiseError> {
    let n = data.len();
    validate_window_and_order(window, order, n)?;

    let half = window / 2;
    let mut smoothed = Vec::with_capacity(n);
    for i in 0..n {
        // Centered neighborhood of exactly `window` points, shifted
        // inward at the boundaries
        let lo = i.saturating_sub(half).min(n - window);
        let xs = &shift[lo..lo + window];
        let ys = &data[lo..lo + window];
        let center = shift[i];

        let max_distance = xs
            .iter()
            .map(|x| (x - center).abs())
            .fold(0.0f64, f64::max);
        let weights: Vec<f64> = if max_distance > 0.0 {
            // Widen slightly so the farthest neighbor keeps a little weight
            xs.iter()
                .map(|x| tricube((x - center).abs() / (max_distance * 1.0001)))
                .collect()
        } else {
            vec![1.0; window]
        };
        let local = Polynomial::fit_weighted(xs, ys, Some(&weights), order)?;
        smoothed.push(local.eval_at(center));
    }
    Ok(smoothed)
}

/// Moving-average denoising of `spectrum`, returning a new spectrum
/// with the smoothed working intensity.
pub fn moving_average(spectrum: &Spectrum, window: usize) -> Result<Spectrum, DenoiseError> {
    let smoothed = moving_average_smooth(spectrum.intensity(), window)?;
    Ok(spectrum.with_intensity("moving_average", smoothed))
}

/// Savitzky-Golay denoising of `spectrum`.
pub fn savitzky_golay(
    spectrum: &Spectrum,
    order: usize,
    window: usize,
) -> Result<Spectrum, DenoiseError> {
    let smoothed = savitzky_golay_smooth(spectrum.intensity(), order, window)?;
    Ok(spectrum.with_intensity("savitzky_golay", smoothed))
}

/// LOWESS denoising of `spectrum`.
pub fn lowess(spectrum: &Spectrum, order: usize, window: usize) -> Result<Spectrum, DenoiseError> {
    let smoothed = lowess_smooth(spectrum.shift(), spectrum.intensity(), order, window)?;
    Ok(spectrum.with_intensity("lowess", smoothed))
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    fn spectrum(intensity: Vec<f64>) -> Spectrum {
        let shift = (0..intensity.len()).map(|i| i as f64).collect();
        Spectrum::new("test", shift, intensity).unwrap()
    }

    #[test]
    fn test_moving_average_window_one_is_identity() {
        let s = spectrum(vec![1.0, 5.0, 2.0, 8.0]);
        let smoothed = moving_average(&s, 1).unwrap();
        assert_eq!(smoothed.intensity(), s.intensity());
    }

    #[test]
    fn test_moving_average_clips_at_boundaries() {
        let s = spectrum(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let smoothed = moving_average(&s, 3).unwrap();
        let expected = [1.5, 2.0, 3.0, 4.0, 4.5];
        for (y, e) in smoothed.intensity().iter().zip(expected) {
            assert!((y - e).abs() < 1e-12);
        }
        assert_eq!(smoothed.len(), s.len());
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    fn test_moving_average_rejects_bad_window(#[case] window: usize) {
        let s = spectrum(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(moving_average(&s, window).is_err());
    }

    #[test]
    fn test_savitzky_golay_preserves_polynomial_signal() {
        // A degree-2 signal passes through a degree-2 filter unchanged,
        // including the edge fits.
        let data: Vec<f64> = (0..15)
            .map(|i| {
                let x = i as f64;
                1.0 + 0.3 * x - 0.05 * x * x
            })
            .collect();
        let smoothed = savitzky_golay_smooth(&data, 2, 5).unwrap();
        assert_eq!(smoothed.len(), data.len());
        for (y, e) in smoothed.iter().zip(data.iter()) {
            assert!((y - e).abs() < 1e-6, "{y} != {e}");
        }
    }

    #[test]
    fn test_savitzky_golay_flattens_noise() {
        let data: Vec<f64> = (0..25)
            .map(|i| 10.0 + if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        let smoothed = savitzky_golay_smooth(&data, 1, 5).unwrap();
        let interior_spread = smoothed[2..23]
            .iter()
            .map(|y| (y - 10.0).abs())
            .fold(0.0f64, f64::max);
        assert!(interior_spread < 0.25);
    }

    #[rstest]
    #[case(2, 2)] // window == order
    #[case(2, 5)] // window < order
    #[case(3, 4)] // window even
    #[case(31, 2)] // window longer than data
    fn test_savitzky_golay_rejects_bad_parameters(#[case] window: usize, #[case] order: usize) {
        let s = spectrum((0..20).map(|i| i as f64).collect());
        assert!(savitzky_golay(&s, order, window).is_err());
    }

    #[test]
    fn test_lowess_preserves_linear_signal() {
        let s = spectrum((0..12).map(|i| 2.0 * i as f64 + 1.0).collect());
        let smoothed = lowess(&s, 1, 5).unwrap();
        for (y, e) in smoothed.intensity().iter().zip(s.intensity()) {
            assert!((y - e).abs() < 1e-6, "{y} != {e}");
        }
    }

    #[test]
    fn test_lowess_rejects_window_not_larger_than_order() {
        let s = spectrum((0..20).map(|i| i as f64).collect());
        let err = lowess(&s, 5, 5).unwrap_err();
        assert!(matches!(err, DenoiseError::OrderTooLarge(5, 5)));
    }

    #[test]
    fn test_smoothing_leaves_shift_and_raw_untouched() {
        let s = spectrum(vec![1.0, 4.0, 2.0, 6.0, 3.0, 5.0, 2.0]);
        let smoothed = savitzky_golay(&s, 1, 3).unwrap();
        assert_eq!(smoothed.shift(), s.shift());
        assert_eq!(smoothed.raw_intensity(), s.raw_intensity());
        assert_eq!(smoothed.baseline(), s.baseline());
        assert!(!smoothed.fingerprint().is_processed());
    }
}
