//! Coefficient-domain noise suppression
//!
//! Two independent stages operate on `[cA_n, cD_n, ..., cD_1]`:
//! 1. Background suppression: levels whose kurtosis is indistinguishable from
//!    Gaussian noise are moved wholesale into the noise set.
//! 2. Pre-event thresholding: each detail level is soft-thresholded with a
//!    cutoff estimated from the coefficients preceding the event origin.
//!
//! Both return `(cleaned, noise)` with the input's level count and lengths.

use crate::error::{Result, SeisError};

/// Coefficient arrays, coarse to fine
pub type Levels = Vec<Vec<f64>>;

/// Normalizer turning a median absolute deviation into a Gaussian std
const MAD_SCALE: f64 = 0.6745;

/// Excess kurtosis `Σ(c-μ)^4 / (N σ^4) - 3` with the population std
///
/// Fails on empty input and on constant non-zero input.
pub fn kurtosis(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(SeisError::EmptySignal);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let m2 = values.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
    let m4 = values.iter().map(|c| (c - mean).powi(4)).sum::<f64>() / n;

    let scale = values.iter().fold(0.0_f64, |acc, c| acc.max(c.abs()));
    if m2.sqrt() <= scale * 1e-12 {
        return Err(SeisError::Degenerate(format!(
            "kurtosis undefined for {} constant values",
            values.len()
        )));
    }
    Ok(m4 / (m2 * m2) - 3.0)
}

/// Kurtosis magnitude under which a level of `n` coefficients counts as noise
pub fn kurtosis_threshold(n: usize) -> f64 {
    (24.0 / (n as f64 * 0.1)).sqrt()
}

/// Move Gaussian-looking levels into the noise set
///
/// Every level, approximation included, is tested. An all-zero level is
/// noise with zero content, so the operation is idempotent. A level with a
/// single coefficient has no defined kurtosis and is kept as signal.
pub fn suppress_background(levels: &[Vec<f64>]) -> Result<(Levels, Levels)> {
    let mut cleaned = Vec::with_capacity(levels.len());
    let mut noise = Vec::with_capacity(levels.len());

    for (index, level) in levels.iter().enumerate() {
        let zeros = vec![0.0; level.len()];
        if level.iter().all(|c| *c == 0.0) {
            cleaned.push(zeros.clone());
            noise.push(zeros);
            continue;
        }
        if level.len() < 2 {
            log::debug!("level {}: single coefficient, kept as signal", index);
            cleaned.push(level.clone());
            noise.push(zeros);
            continue;
        }

        let kurt = kurtosis(level).map_err(|e| match e {
            SeisError::Degenerate(msg) => {
                SeisError::Degenerate(format!("level {}: {}", index, msg))
            }
            other => other,
        })?;
        let threshold = kurtosis_threshold(level.len());

        if kurt.abs() <= threshold {
            log::debug!(
                "level {}: kurtosis {:.4} within ±{:.4}, treated as noise",
                index,
                kurt,
                threshold
            );
            cleaned.push(zeros);
            noise.push(level.clone());
        } else {
            log::debug!(
                "level {}: kurtosis {:.4} exceeds ±{:.4}, kept as signal",
                index,
                kurt,
                threshold
            );
            cleaned.push(level.clone());
            noise.push(zeros);
        }
    }

    Ok((cleaned, noise))
}

/// Median of the absolute values
fn median_abs(values: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = values.iter().map(|v| v.abs()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Soft-threshold detail levels against their pre-event noise floor
///
/// The approximation (index 0) passes through. For detail index `i` the
/// decomposition depth is `levels.len() - i`, which maps the pre-event window
/// onto `floor(pre_event_seconds * sampling_rate / 2^depth)` coefficients,
/// capped at the level length.
pub fn suppress_pre_event_noise(
    levels: &[Vec<f64>],
    pre_event_seconds: f64,
    sampling_rate: f64,
    reduction_factor: f64,
) -> Result<(Levels, Levels)> {
    if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
        return Err(SeisError::InvalidParameter(format!(
            "sampling rate must be positive, got {}",
            sampling_rate
        )));
    }
    if !(reduction_factor.is_finite() && reduction_factor > 0.0) {
        return Err(SeisError::InvalidParameter(format!(
            "reduction factor must be positive, got {}",
            reduction_factor
        )));
    }
    if !(pre_event_seconds.is_finite() && pre_event_seconds >= 0.0) {
        return Err(SeisError::InvalidParameter(format!(
            "pre-event window must be non-negative, got {}",
            pre_event_seconds
        )));
    }

    let n_levels = levels.len();
    let mut cleaned = Vec::with_capacity(n_levels);
    let mut noise = Vec::with_capacity(n_levels);

    for (i, level) in levels.iter().enumerate() {
        if i == 0 {
            cleaned.push(level.clone());
            noise.push(vec![0.0; level.len()]);
            continue;
        }

        let depth = (n_levels - i) as i32;
        let n_pre = (pre_event_seconds * sampling_rate / 2f64.powi(depth)).floor() as usize;
        let window = &level[..n_pre.min(level.len())];
        if window.is_empty() {
            log::warn!(
                "detail level {} has no pre-event coefficients, left untouched",
                depth
            );
            cleaned.push(level.clone());
            noise.push(vec![0.0; level.len()]);
            continue;
        }

        let std = median_abs(window) / MAD_SCALE;
        let threshold = std * (window.len() as f64).ln() * 2.0 / reduction_factor;
        log::debug!(
            "detail level {}: {} pre-event coefficients, threshold {:.6e}",
            depth,
            window.len(),
            threshold
        );

        let mut kept = Vec::with_capacity(level.len());
        let mut removed = Vec::with_capacity(level.len());
        for &c in level {
            if c.abs() < threshold {
                kept.push(0.0);
                removed.push(c);
            } else {
                let shift = threshold * c.signum();
                kept.push(c - shift);
                removed.push(shift);
            }
        }
        cleaned.push(kept);
        noise.push(removed);
    }

    Ok((cleaned, noise))
}

fn check_same_shape(a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<()> {
    if a.len() != b.len() {
        return Err(SeisError::InvalidParameter(format!(
            "level count mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        if x.len() != y.len() {
            return Err(SeisError::InvalidParameter(format!(
                "level {} length mismatch: {} vs {}",
                i,
                x.len(),
                y.len()
            )));
        }
    }
    Ok(())
}

/// Element-wise sum of two coefficient sets of identical shape
pub fn add_levels(a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<Levels> {
    check_same_shape(a, b)?;
    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| x.iter().zip(y).map(|(p, q)| p + q).collect())
        .collect())
}

/// RMS ratio of cleaned to noise coefficients
///
/// Only positions where the cleaned coefficient is non-zero take part.
/// Returns `None` when no noise is present there.
pub fn signal_to_noise_ratio(cleaned: &[Vec<f64>], noise: &[Vec<f64>]) -> Result<Option<f64>> {
    check_same_shape(cleaned, noise)?;

    let mut count = 0usize;
    let mut signal_sq = 0.0;
    let mut noise_sq = 0.0;
    for (s, n) in cleaned.iter().flatten().zip(noise.iter().flatten()) {
        if *s != 0.0 {
            count += 1;
            signal_sq += s * s;
            noise_sq += n * n;
        }
    }

    if count == 0 || noise_sq == 0.0 {
        return Ok(None);
    }
    let signal_rms = (signal_sq / count as f64).sqrt();
    let noise_rms = (noise_sq / count as f64).sqrt();
    Ok(Some(signal_rms / noise_rms))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three-point pattern with excess kurtosis exactly zero
    fn gaussian_like(n: usize, amp: f64) -> Vec<f64> {
        let pattern = [-1.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        (0..n).map(|i| pattern[i % pattern.len()] * amp).collect()
    }

    fn spiky(n: usize) -> Vec<f64> {
        let mut v = vec![0.01; n];
        v[n / 2] = 5.0;
        v[n / 3] = -3.0;
        v
    }

    #[test]
    fn test_kurtosis_values() {
        assert!(kurtosis(&gaussian_like(600, 2.0)).unwrap().abs() < 1e-9);
        assert!(kurtosis(&spiky(200)).unwrap() > 10.0);
        assert!(matches!(kurtosis(&[]), Err(SeisError::EmptySignal)));
        assert!(matches!(
            kurtosis(&[0.1, 0.1, 0.1]),
            Err(SeisError::Degenerate(_))
        ));
    }

    #[test]
    fn test_background_classification() {
        let levels = vec![spiky(120), gaussian_like(240, 0.5), vec![0.0; 50]];
        let (cleaned, noise) = suppress_background(&levels).unwrap();

        assert_eq!(cleaned[0], levels[0]);
        assert!(noise[0].iter().all(|c| *c == 0.0));

        assert!(cleaned[1].iter().all(|c| *c == 0.0));
        assert_eq!(noise[1], levels[1]);

        assert_eq!(cleaned[2].len(), 50);
        assert!(cleaned[2].iter().chain(noise[2].iter()).all(|c| *c == 0.0));
    }

    #[test]
    fn test_background_is_idempotent() {
        let levels = vec![spiky(64), gaussian_like(128, 1.0), spiky(256)];
        let (once, _) = suppress_background(&levels).unwrap();
        let (twice, noise) = suppress_background(&once).unwrap();
        assert_eq!(once, twice);
        assert!(noise.iter().flatten().all(|c| *c == 0.0));
    }

    #[test]
    fn test_background_rejects_constant_level() {
        let levels = vec![spiky(64), vec![3.0; 32]];
        assert!(matches!(
            suppress_background(&levels),
            Err(SeisError::Degenerate(_))
        ));
    }

    #[test]
    fn test_background_keeps_single_coefficient_levels() {
        use crate::wavelet::{decompose, ExtensionMode, Wavelet};

        let mut x: Vec<f64> = (0..1024)
            .map(|i| (0.05 * i as f64).sin() + 0.3 * (0.31 * i as f64).sin())
            .collect();
        x[700] += 4.0;
        let dec = decompose(&x, Wavelet::Haar, ExtensionMode::Symmetric, None).unwrap();
        assert_eq!(dec.levels[0].len(), 1);
        assert_eq!(dec.levels[1].len(), 1);

        let (cleaned, noise) = suppress_background(&dec.levels).unwrap();
        for index in 0..2 {
            assert_eq!(cleaned[index], dec.levels[index]);
            assert_eq!(noise[index], vec![0.0]);
        }
        assert_eq!(cleaned.len(), dec.levels.len());
    }

    #[test]
    fn test_pre_event_threshold_and_tie() {
        // Single detail level at depth 1; 6 s at 2 Hz spans 6 coefficients
        let thr = (1.0 / MAD_SCALE) * 6f64.ln() * 2.0 / 2.0;
        let detail = vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0, thr, -thr, 10.0, 0.5 * thr];
        let levels = vec![vec![7.0; 10], detail.clone()];

        let (cleaned, noise) = suppress_pre_event_noise(&levels, 6.0, 2.0, 2.0).unwrap();

        assert_eq!(cleaned[0], levels[0]);
        for i in 0..6 {
            assert_eq!(cleaned[1][i], 0.0);
            assert_eq!(noise[1][i], detail[i]);
        }
        // Exact ties shrink toward zero
        assert!(cleaned[1][6].abs() < 1e-12);
        assert!((noise[1][6] - thr).abs() < 1e-12);
        assert!(cleaned[1][7].abs() < 1e-12);
        assert!((noise[1][7] + thr).abs() < 1e-12);

        assert!((cleaned[1][8] - (10.0 - thr)).abs() < 1e-12);
        assert!((noise[1][8] - thr).abs() < 1e-12);
        assert_eq!(cleaned[1][9], 0.0);
        assert_eq!(noise[1][9], 0.5 * thr);

        // cleaned + noise reproduces the input
        for (i, c) in detail.iter().enumerate() {
            assert!((cleaned[1][i] + noise[1][i] - c).abs() < 1e-12);
        }
    }

    #[test]
    fn test_pre_event_empty_window_leaves_level() {
        let levels = vec![vec![1.0; 4], vec![2.0, -3.0, 4.0, 0.5]];
        let (cleaned, noise) = suppress_pre_event_noise(&levels, 0.0, 100.0, 2.0).unwrap();
        assert_eq!(cleaned, levels);
        assert!(noise.iter().flatten().all(|c| *c == 0.0));
    }

    #[test]
    fn test_pre_event_rejects_bad_parameters() {
        let levels = vec![vec![1.0; 4], vec![1.0; 4]];
        assert!(suppress_pre_event_noise(&levels, 1.0, 0.0, 2.0).is_err());
        assert!(suppress_pre_event_noise(&levels, 1.0, 100.0, 0.0).is_err());
        assert!(suppress_pre_event_noise(&levels, -1.0, 100.0, 2.0).is_err());
    }

    #[test]
    fn test_snr() {
        let cleaned = vec![vec![2.0, 0.0], vec![2.0, 2.0]];
        let noise = vec![vec![1.0, 9.0], vec![1.0, 1.0]];
        let snr = signal_to_noise_ratio(&cleaned, &noise).unwrap().unwrap();
        assert!((snr - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_snr_without_noise_is_none() {
        let cleaned = vec![vec![2.0, 1.0], vec![0.0, 3.0]];
        let noise = vec![vec![0.0, 0.0], vec![5.0, 0.0]];
        assert_eq!(signal_to_noise_ratio(&cleaned, &noise).unwrap(), None);
        let all_zero = vec![vec![0.0; 3]];
        assert_eq!(
            signal_to_noise_ratio(&all_zero, &all_zero).unwrap(),
            None
        );
    }

    #[test]
    fn test_snr_shape_mismatch() {
        let a = vec![vec![1.0, 2.0]];
        let b = vec![vec![1.0]];
        assert!(matches!(
            signal_to_noise_ratio(&a, &b),
            Err(SeisError::InvalidParameter(_))
        ));
        assert!(add_levels(&a, &b).is_err());
    }
}
