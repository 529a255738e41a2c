//! Baseline drift correction of acceleration records
//!
//! `correct_baseline` removes the pre-event offset and a two-segment
//! acceleration step so that the integrated velocity returns to zero over the
//! tail of the record. The remaining functions are simpler corrections and
//! integrators used when inspecting strong-motion data.

use crate::error::{Result, SeisError};
use crate::fitting::{detrend, fit_line, polyfit};

/// Minimum |acceleration| marking the onset of strong shaking
pub const STRONG_MOTION_THRESHOLD: f64 = 0.05;

/// Fitted parameters of a baseline correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineFit {
    /// Tail velocity at `t2`
    pub v0: f64,
    /// Tail acceleration offset
    pub af: f64,
    /// Onset of strong motion, relative to origin
    pub t1: f64,
    /// Start of the tail window, relative to origin
    pub t2: f64,
    /// Mean acceleration offset over `(t1, t2]`
    pub am: f64,
}

fn check_delta(delta: f64) -> Result<()> {
    if delta.is_finite() && delta > 0.0 {
        Ok(())
    } else {
        Err(SeisError::InvalidParameter(format!(
            "sample interval must be positive, got {}",
            delta
        )))
    }
}

/// Cumulative trapezoidal integral with a leading zero
pub fn cumulative_trapezoid(samples: &[f64], delta: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(samples.len());
    let mut acc = 0.0;
    if let Some(&first) = samples.first() {
        out.push(0.0);
        let mut prev = first;
        for &x in &samples[1..] {
            acc += delta * (prev + x) / 2.0;
            out.push(acc);
            prev = x;
        }
    }
    out
}

/// Remove pre-event offset and drift from an acceleration record
///
/// `origin_offset` is the event origin in seconds after the first sample;
/// the tail window covers the last `tail_window` seconds of the record.
pub fn correct_baseline(
    samples: &[f64],
    delta: f64,
    origin_offset: f64,
    tail_window: f64,
) -> Result<Vec<f64>> {
    let mut acc = samples.to_vec();
    correct_baseline_in_place(&mut acc, delta, origin_offset, tail_window)?;
    Ok(acc)
}

/// In-place variant of [`correct_baseline`], returning the fitted parameters
pub fn correct_baseline_in_place(
    acc: &mut [f64],
    delta: f64,
    origin_offset: f64,
    tail_window: f64,
) -> Result<BaselineFit> {
    if acc.is_empty() {
        return Err(SeisError::EmptySignal);
    }
    check_delta(delta)?;
    if !tail_window.is_finite() {
        return Err(SeisError::InvalidParameter(format!(
            "tail window must be finite, got {}",
            tail_window
        )));
    }

    let n = acc.len();
    let eps = delta * 1e-6;
    let ipre = (0..n)
        .find(|&k| k as f64 * delta >= origin_offset - eps)
        .ok_or_else(|| {
            SeisError::InvalidParameter(format!(
                "origin offset {:.3} s is beyond the end of the record ({:.3} s)",
                origin_offset,
                (n - 1) as f64 * delta
            ))
        })?;
    if ipre == 0 {
        return Err(SeisError::Degenerate(format!(
            "no pre-event samples before origin offset {:.3} s",
            origin_offset
        )));
    }

    let pre_mean = acc[..ipre].iter().sum::<f64>() / ipre as f64;
    acc.iter_mut().for_each(|a| *a -= pre_mean);

    let vel = cumulative_trapezoid(acc, delta);
    let t: Vec<f64> = (0..n).map(|k| k as f64 * delta - origin_offset).collect();

    let t_end = t[n - 1];
    let t2 = t_end - tail_window;
    let (tail_t, tail_v): (Vec<f64>, Vec<f64>) = t
        .iter()
        .zip(&vel)
        .filter(|(ti, _)| **ti >= t2)
        .map(|(ti, vi)| (ti - t2, *vi))
        .unzip();
    if tail_t.len() < 2 {
        return Err(SeisError::Degenerate(format!(
            "tail window of {:.3} s holds {} sample(s), need at least 2",
            tail_window,
            tail_t.len()
        )));
    }
    let (v0, af) = fit_line(&tail_t, &tail_v)?;

    let i1 = acc
        .iter()
        .position(|a| a.abs() >= STRONG_MOTION_THRESHOLD)
        .ok_or_else(|| {
            SeisError::Degenerate(format!(
                "no sample reaches |acc| >= {}",
                STRONG_MOTION_THRESHOLD
            ))
        })?;
    let t1 = t[i1];
    if t2 - t1 <= 0.0 {
        return Err(SeisError::Degenerate(format!(
            "strong motion onset {:.3} s is not before tail start {:.3} s",
            t1, t2
        )));
    }
    let am = v0 / (t2 - t1);

    for (a, &ti) in acc.iter_mut().zip(&t) {
        if ti > t1 && ti <= t2 {
            *a -= am;
        } else if ti > t2 {
            *a -= af;
        }
    }

    log::debug!(
        "baseline fit: v0={:.4e} af={:.4e} t1={:.3} t2={:.3} am={:.4e}",
        v0,
        af,
        t1,
        t2,
        am
    );
    Ok(BaselineFit { v0, af, t1, t2, am })
}

/// Subtract the mean acceleration of the first `window` seconds
///
/// The mean is taken as the slope of a line fitted to the integrated
/// pre-event window.
pub fn correct_pre_event_only(samples: &mut [f64], delta: f64, window: f64) -> Result<()> {
    check_delta(delta)?;
    if samples.is_empty() {
        return Err(SeisError::EmptySignal);
    }
    let count = (1 + (window / delta) as usize).min(samples.len());
    let t: Vec<f64> = (0..count).map(|k| k as f64 * delta).collect();
    let vel = cumulative_trapezoid(&samples[..count], delta);
    let (_, slope) = fit_line(&t, &vel)?;
    samples.iter_mut().for_each(|a| *a -= slope);
    Ok(())
}

/// Subtract the constant acceleration implied by a quadratic displacement trend
pub fn correct_constant(samples: &mut [f64], delta: f64) -> Result<()> {
    check_delta(delta)?;
    let t: Vec<f64> = (0..samples.len()).map(|k| k as f64 * delta).collect();
    let vel = cumulative_trapezoid(samples, delta);
    let disp = cumulative_trapezoid(&vel, delta);
    let c = polyfit(&t, &disp, 2)?;
    let offset = 2.0 * c[2];
    samples.iter_mut().for_each(|a| *a -= offset);
    Ok(())
}

/// Integrate acceleration twice, removing the quadratic displacement trend
///
/// Returns `(velocity, displacement)`.
pub fn integrate_acceleration(samples: &[f64], delta: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    check_delta(delta)?;
    let t: Vec<f64> = (0..samples.len()).map(|k| k as f64 * delta).collect();
    let mut vel = cumulative_trapezoid(samples, delta);
    let mut disp = cumulative_trapezoid(&vel, delta);
    let c = polyfit(&t, &disp, 2)?;

    for ((v, d), &ti) in vel.iter_mut().zip(disp.iter_mut()).zip(&t) {
        *v -= 2.0 * c[2] * ti + c[1];
        *d -= c[2] * ti * ti + c[1] * ti + c[0];
    }
    Ok((vel, disp))
}

/// Integrate velocity to displacement and remove the linear trend
pub fn integrate_velocity(samples: &[f64], delta: f64) -> Result<Vec<f64>> {
    check_delta(delta)?;
    let t: Vec<f64> = (0..samples.len()).map(|k| k as f64 * delta).collect();
    let mut disp = cumulative_trapezoid(samples, delta);
    detrend(&t, &mut disp, 1)?;
    Ok(disp)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.01;

    /// 30 s record: 10 s of small noise, a 10 s triangle-ish pulse, constant offset
    fn drifting_record() -> Vec<f64> {
        (0..3000)
            .map(|k| {
                let t = k as f64 * DT;
                let a = if t < 10.0 {
                    0.001 * (1.3 * k as f64).sin()
                } else if t < 12.0 {
                    (t - 10.0) / 2.0
                } else if t < 20.0 {
                    1.0 - (t - 12.0) / 8.0
                } else {
                    0.0
                };
                a + 0.002
            })
            .collect()
    }

    fn tail_slope(acc: &[f64], tail: f64) -> f64 {
        let vel = cumulative_trapezoid(acc, DT);
        let n = acc.len();
        let start = n - (tail / DT) as usize - 1;
        let t: Vec<f64> = (start..n).map(|k| k as f64 * DT).collect();
        fit_line(&t, &vel[start..]).unwrap().1
    }

    #[test]
    fn test_cumulative_trapezoid() {
        let v = cumulative_trapezoid(&[1.0, 1.0, 3.0], 0.5);
        assert_eq!(v, vec![0.0, 0.5, 1.5]);
        assert!(cumulative_trapezoid(&[], 1.0).is_empty());
    }

    #[test]
    fn test_correction_removes_drift() {
        let raw = drifting_record();
        let mut acc = raw.clone();
        let fit = correct_baseline_in_place(&mut acc, DT, 10.0, 5.0).unwrap();

        let pre_mean = acc[..1000].iter().sum::<f64>() / 1000.0;
        assert!(pre_mean.abs() < 1e-12);
        assert!((fit.t1 - 0.11).abs() < 1e-9);
        assert!((fit.v0 - 5.0).abs() < 0.01);

        let before = tail_slope(&raw, 5.0);
        let after = tail_slope(&acc, 5.0);
        assert!(after.abs() < 0.01 * before.abs());

        let vel = cumulative_trapezoid(&acc, DT);
        let tail_mean = vel[2500..].iter().sum::<f64>() / 500.0;
        assert!(tail_mean.abs() < 1e-3);
    }

    #[test]
    fn test_correction_errors() {
        let raw = drifting_record();
        assert!(matches!(
            correct_baseline(&raw, DT, 0.0, 5.0),
            Err(SeisError::Degenerate(_))
        ));
        assert!(matches!(
            correct_baseline(&raw, DT, 40.0, 5.0),
            Err(SeisError::InvalidParameter(_))
        ));
        assert!(matches!(
            correct_baseline(&vec![0.001; 3000], DT, 10.0, 5.0),
            Err(SeisError::Degenerate(_))
        ));
        // Tail window reaching back before strong motion onset
        assert!(matches!(
            correct_baseline(&raw, DT, 10.0, 25.0),
            Err(SeisError::Degenerate(_))
        ));
        assert!(matches!(
            correct_baseline(&raw, DT, 10.0, 0.0),
            Err(SeisError::Degenerate(_))
        ));
        assert!(matches!(
            correct_baseline(&[], DT, 1.0, 1.0),
            Err(SeisError::EmptySignal)
        ));
    }

    #[test]
    fn test_pre_event_only() {
        let mut acc: Vec<f64> = (0..500).map(|k| 0.3 + if k > 300 { 1.0 } else { 0.0 }).collect();
        correct_pre_event_only(&mut acc, DT, 2.0).unwrap();
        assert!(acc[..300].iter().all(|a| a.abs() < 1e-9));
        assert!((acc[400] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_offset_removed() {
        let mut acc = vec![0.25; 400];
        correct_constant(&mut acc, DT).unwrap();
        assert!(acc.iter().all(|a| a.abs() < 1e-6));
    }

    #[test]
    fn test_integrators() {
        let acc = vec![0.5; 300];
        let (vel, disp) = integrate_acceleration(&acc, DT).unwrap();
        assert!(vel.iter().chain(disp.iter()).all(|v| v.abs() < 1e-6));

        let vel = vec![2.0; 300];
        let disp = integrate_velocity(&vel, DT).unwrap();
        assert!(disp.iter().all(|d| d.abs() < 1e-9));
    }
}
