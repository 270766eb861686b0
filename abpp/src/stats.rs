/// Arithmetic mean of a slice, NaN if empty
#[inline]
pub fn mean(slice: &[f64]) -> f64 {
    slice.iter().sum::<f64>() / slice.len() as f64
}

/// Calculate the standard deviation (sample, n - 1) of a slice
#[inline]
pub fn stddev(slice: &[f64]) -> f64 {
    let n = slice.len() as f64;
    let m = mean(slice);
    (slice.iter().fold(0.0, |acc, x| acc + (x - m).powi(2)) / (n - 1.0)).sqrt()
}

/// Sample quantile with linear interpolation between order statistics
/// (Hyndman & Fan type 7, R's default). `None` if the slice is empty
pub fn quantile(slice: &[f64], q: f64) -> Option<f64> {
    if slice.is_empty() {
        return None;
    }
    let mut v = slice.to_vec();
    v.sort_unstable_by(|a, b| a.total_cmp(b));

    let h = (v.len() - 1) as f64 * q.max(0.0).min(1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(v[lo] + (h - lo as f64) * (v[hi] - v[lo]))
}

#[inline]
pub fn median(slice: &[f64]) -> Option<f64> {
    quantile(slice, 0.5)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn moments() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&v) - 5.0).abs() < 1e-12);
        assert!((stddev(&v) - 2.138089935299395).abs() < 1e-12);
        assert!(stddev(&[1.0]).is_nan());
    }

    #[test]
    fn quantiles() {
        let v = [5.0, 1.0, 3.0, 2.0, 4.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 1.0), Some(5.0));
        assert_eq!(median(&v), Some(3.0));
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        // R: quantile(1:5, 0.01) == 1.04
        assert!((quantile(&v, 0.01).unwrap() - 1.04).abs() < 1e-12);
        assert_eq!(quantile(&[], 0.5), None);
    }
}
