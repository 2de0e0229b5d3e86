//! Small shared helpers over raw arrays.
use num_traits::Float;

/// The minimum and maximum of `values` in one pass.
pub fn minmax<T: Float>(values: &[T]) -> (T, T) {
    let mut max = -T::infinity();
    let mut min = T::infinity();

    for v in values.iter() {
        if *v > max {
            max = *v;
        }
        if *v < min {
            min = *v;
        }
    }
    (min, max)
}

/// The arithmetic mean of `values`.
pub fn mean<T: Float>(values: &[T]) -> T {
    values.iter().fold(T::zero(), |acc, v| acc + *v) / T::from(values.len()).unwrap()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_minmax() {
        assert_eq!(minmax(&[3.0, -1.0, 7.0, 2.0]), (-1.0, 7.0));
    }

    #[test]
    fn test_mean() {
        assert!((mean(&[1.0f64, 2.0, 3.0, 4.0]) - 2.5).abs() < 1e-12);
    }
}
