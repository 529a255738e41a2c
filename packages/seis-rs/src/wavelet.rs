//! Multilevel discrete wavelet transform
//!
//! Decomposes a sample sequence into `[cA_n, cD_n, ..., cD_1]` (coarse to fine)
//! and reconstructs it again. Every level convolves with the analysis filters
//! over an extended signal and keeps every other output, so each level carries
//! `floor((N + F - 1) / 2)` coefficients for a filter of length `F`.
//! Reconstruction is exact for every extension mode; it may produce one extra
//! trailing sample, which `Decomposition::reconstruct_truncated` drops.

use crate::error::{Result, SeisError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analysis basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wavelet {
    Haar,
    Db2,
    Db4,
    Sym4,
    Coif1,
}

/// Registry entry describing one basis
#[derive(Debug, Clone, Serialize)]
pub struct WaveletMetadata {
    pub name: &'static str,
    pub family: &'static str,
    pub filter_length: usize,
    pub vanishing_moments: usize,
    #[serde(skip)]
    pub wavelet: Wavelet,
    pub documentation: &'static str,
}

pub const WAVELET_REGISTRY: &[WaveletMetadata] = &[
    WaveletMetadata {
        name: "haar",
        family: "Haar",
        filter_length: 2,
        vanishing_moments: 1,
        wavelet: Wavelet::Haar,
        documentation: "Step-like basis; shortest support, best for abrupt offsets.",
    },
    WaveletMetadata {
        name: "db2",
        family: "Daubechies",
        filter_length: 4,
        vanishing_moments: 2,
        wavelet: Wavelet::Db2,
        documentation: "Compact asymmetric basis, suppresses linear trends.",
    },
    WaveletMetadata {
        name: "db4",
        family: "Daubechies",
        filter_length: 8,
        vanishing_moments: 4,
        wavelet: Wavelet::Db4,
        documentation: "General purpose smooth basis for strong-motion records.",
    },
    WaveletMetadata {
        name: "sym4",
        family: "Symlets",
        filter_length: 8,
        vanishing_moments: 4,
        wavelet: Wavelet::Sym4,
        documentation: "Near-symmetric variant of db4, less phase distortion.",
    },
    WaveletMetadata {
        name: "coif1",
        family: "Coiflets",
        filter_length: 6,
        vanishing_moments: 2,
        wavelet: Wavelet::Coif1,
        documentation: "Coiflet with vanishing scaling-function moments.",
    },
];

const HAAR_DEC_LO: [f64; 2] = [0.7071067811865476, 0.7071067811865476];

const DB2_DEC_LO: [f64; 4] = [
    -0.12940952255126037,
    0.2241438680420134,
    0.8365163037378079,
    0.48296291314453416,
];

const DB4_DEC_LO: [f64; 8] = [
    -0.010597401784997278,
    0.032883011666982945,
    0.030841381835986965,
    -0.18703481171888114,
    -0.02798376941698385,
    0.6308807679295904,
    0.7148465705525415,
    0.23037781330885523,
];

const SYM4_DEC_LO: [f64; 8] = [
    -0.07576571478927333,
    -0.02963552764599851,
    0.49761866763201545,
    0.8037387518059161,
    0.29785779560527736,
    -0.09921954357684722,
    -0.012603967262037833,
    0.032223100604042702,
];

const COIF1_DEC_LO: [f64; 6] = [
    -0.01565572813546454,
    -0.0727326195128539,
    0.38486484686420286,
    0.8525720202122554,
    0.3378976624578092,
    -0.0727326195128539,
];

impl Wavelet {
    /// Look up a basis by name (case-insensitive)
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        WAVELET_REGISTRY
            .iter()
            .find(|m| m.name == lower)
            .map(|m| m.wavelet)
            .ok_or_else(|| SeisError::UnknownWavelet(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        self.metadata().name
    }

    /// Registry entries are stored in declaration order
    pub fn metadata(&self) -> &'static WaveletMetadata {
        &WAVELET_REGISTRY[*self as usize]
    }

    /// Lowpass decomposition filter
    pub fn dec_lo(&self) -> &'static [f64] {
        match self {
            Wavelet::Haar => &HAAR_DEC_LO,
            Wavelet::Db2 => &DB2_DEC_LO,
            Wavelet::Db4 => &DB4_DEC_LO,
            Wavelet::Sym4 => &SYM4_DEC_LO,
            Wavelet::Coif1 => &COIF1_DEC_LO,
        }
    }

    pub fn filter_length(&self) -> usize {
        self.dec_lo().len()
    }

    pub fn filter_bank(&self) -> FilterBank {
        FilterBank::new(self.dec_lo())
    }

    pub fn all() -> impl Iterator<Item = Wavelet> {
        WAVELET_REGISTRY.iter().map(|m| m.wavelet)
    }
}

impl Default for Wavelet {
    fn default() -> Self {
        Wavelet::Db4
    }
}

impl FromStr for Wavelet {
    type Err = SeisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for Wavelet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signal extension used past either edge of the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionMode {
    /// Zero padding
    Zero,
    /// Repeat the edge sample
    Constant,
    /// Half-sample mirror: ... x1 x0 | x0 x1 ... x(n-1) | x(n-1) x(n-2) ...
    Symmetric,
    /// Wrap around
    Periodic,
}

impl ExtensionMode {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "zero" | "zpd" => Ok(Self::Zero),
            "constant" | "sp0" => Ok(Self::Constant),
            "symmetric" | "sym" => Ok(Self::Symmetric),
            "periodic" | "ppd" => Ok(Self::Periodic),
            _ => Err(SeisError::UnknownExtensionMode(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Constant => "constant",
            Self::Symmetric => "symmetric",
            Self::Periodic => "periodic",
        }
    }
}

impl Default for ExtensionMode {
    fn default() -> Self {
        Self::Symmetric
    }
}

impl FromStr for ExtensionMode {
    type Err = SeisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for ExtensionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Analysis and synthesis filters of an orthogonal basis
#[derive(Debug, Clone)]
pub struct FilterBank {
    pub dec_lo: Vec<f64>,
    pub dec_hi: Vec<f64>,
    pub rec_lo: Vec<f64>,
    pub rec_hi: Vec<f64>,
}

impl FilterBank {
    fn new(dec_lo: &[f64]) -> Self {
        let rec_lo: Vec<f64> = dec_lo.iter().rev().copied().collect();
        // Quadrature mirror: rec_hi[k] = (-1)^k dec_lo[k]
        let rec_hi: Vec<f64> = dec_lo
            .iter()
            .enumerate()
            .map(|(k, &h)| if k % 2 == 0 { h } else { -h })
            .collect();
        let dec_hi: Vec<f64> = rec_hi.iter().rev().copied().collect();
        Self {
            dec_lo: dec_lo.to_vec(),
            dec_hi,
            rec_lo,
            rec_hi,
        }
    }

    pub fn len(&self) -> usize {
        self.dec_lo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dec_lo.is_empty()
    }
}

/// Coefficient arrays of one trace, coarse to fine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    /// `[cA_n, cD_n, ..., cD_1]`
    pub levels: Vec<Vec<f64>>,
    pub wavelet: Wavelet,
    pub mode: ExtensionMode,
    /// Sample count of the decomposed signal
    pub original_len: usize,
}

impl Decomposition {
    /// Number of detail levels
    pub fn depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Same basis and length, different coefficients
    pub fn with_levels(&self, levels: Vec<Vec<f64>>) -> Self {
        Self {
            levels,
            wavelet: self.wavelet,
            mode: self.mode,
            original_len: self.original_len,
        }
    }

    pub fn reconstruct(&self) -> Result<Vec<f64>> {
        reconstruct(self)
    }

    /// Reconstruct and drop any boundary excess beyond the original length
    pub fn reconstruct_truncated(&self) -> Result<Vec<f64>> {
        let mut samples = reconstruct(self)?;
        if samples.len() < self.original_len {
            return Err(SeisError::InvalidParameter(format!(
                "Reconstruction produced {} samples, expected at least {}",
                samples.len(),
                self.original_len
            )));
        }
        samples.truncate(self.original_len);
        Ok(samples)
    }
}

/// Deepest useful decomposition level for a signal length
pub fn max_level(len: usize, wavelet: Wavelet) -> usize {
    let filter_len = wavelet.filter_length();
    if filter_len < 2 || len < filter_len - 1 {
        return 0;
    }
    let ratio = len as f64 / (filter_len - 1) as f64;
    ratio.log2().floor() as usize
}

/// Multilevel forward transform
///
/// `level` defaults to `max_level`. Fails on empty input or when the signal
/// is too short for the requested depth.
pub fn decompose(
    samples: &[f64],
    wavelet: Wavelet,
    mode: ExtensionMode,
    level: Option<usize>,
) -> Result<Decomposition> {
    if samples.is_empty() {
        return Err(SeisError::EmptySignal);
    }

    let deepest = max_level(samples.len(), wavelet);
    let level = level.unwrap_or(deepest);
    if level == 0 || level > deepest {
        let required = u32::try_from(level.max(1))
            .ok()
            .and_then(|shift| 1usize.checked_shl(shift))
            .and_then(|scale| scale.checked_mul(wavelet.filter_length() - 1))
            .unwrap_or(usize::MAX);
        return Err(SeisError::SignalTooShort {
            len: samples.len(),
            required,
            wavelet: wavelet.name().to_string(),
            level: level.max(1),
        });
    }

    let bank = wavelet.filter_bank();
    let mut approx = samples.to_vec();
    let mut details = Vec::with_capacity(level);
    for _ in 0..level {
        let (a, d) = dwt_single(&approx, &bank, mode);
        details.push(d);
        approx = a;
    }

    let mut levels = Vec::with_capacity(level + 1);
    levels.push(approx);
    levels.extend(details.into_iter().rev());

    Ok(Decomposition {
        levels,
        wavelet,
        mode,
        original_len: samples.len(),
    })
}

/// Multilevel inverse transform
pub fn reconstruct(decomposition: &Decomposition) -> Result<Vec<f64>> {
    let (first, rest) = decomposition
        .levels
        .split_first()
        .ok_or(SeisError::EmptySignal)?;
    let bank = decomposition.wavelet.filter_bank();

    let mut approx = first.clone();
    for detail in rest {
        // A level's approximation may carry one boundary sample more than its detail
        if approx.len() == detail.len() + 1 {
            approx.truncate(detail.len());
        }
        if approx.len() != detail.len() {
            return Err(SeisError::InvalidParameter(format!(
                "Coefficient length mismatch: approximation {} vs detail {}",
                approx.len(),
                detail.len()
            )));
        }
        approx = idwt_single(&approx, detail, &bank)?;
    }
    Ok(approx)
}

#[inline]
fn extended(x: &[f64], k: isize, mode: ExtensionMode) -> f64 {
    let n = x.len() as isize;
    if (0..n).contains(&k) {
        return x[k as usize];
    }
    match mode {
        ExtensionMode::Zero => 0.0,
        ExtensionMode::Constant => {
            if k < 0 {
                x[0]
            } else {
                x[x.len() - 1]
            }
        }
        ExtensionMode::Symmetric => {
            let k = k.rem_euclid(2 * n);
            if k < n {
                x[k as usize]
            } else {
                x[(2 * n - 1 - k) as usize]
            }
        }
        ExtensionMode::Periodic => x[k.rem_euclid(n) as usize],
    }
}

/// One analysis step: filter and keep odd-indexed outputs
fn dwt_single(x: &[f64], bank: &FilterBank, mode: ExtensionMode) -> (Vec<f64>, Vec<f64>) {
    let f = bank.len();
    let out_len = (x.len() + f - 1) / 2;
    let mut approx = Vec::with_capacity(out_len);
    let mut detail = Vec::with_capacity(out_len);

    for o in 0..out_len {
        let i = (2 * o + 1) as isize;
        let mut lo = 0.0;
        let mut hi = 0.0;
        for j in 0..f {
            let v = extended(x, i - j as isize, mode);
            lo += bank.dec_lo[j] * v;
            hi += bank.dec_hi[j] * v;
        }
        approx.push(lo);
        detail.push(hi);
    }
    (approx, detail)
}

/// One synthesis step: upsample, filter, keep the valid part
fn idwt_single(approx: &[f64], detail: &[f64], bank: &FilterBank) -> Result<Vec<f64>> {
    let f = bank.len();
    let n_coef = approx.len();
    if 2 * n_coef + 2 < f {
        return Err(SeisError::InvalidParameter(format!(
            "{} coefficients are too few for a filter of length {}",
            n_coef, f
        )));
    }
    let out_len = 2 * n_coef + 2 - f;
    let mut out = Vec::with_capacity(out_len);

    for t in 0..out_len {
        let m = t + f - 2;
        // o ranges over coefficients whose filter tap m - 2o lies in [0, f)
        let o_min = (m + 2).saturating_sub(f) / 2;
        let o_max = (m / 2).min(n_coef - 1);
        let mut sum = 0.0;
        for o in o_min..=o_max {
            let k = m - 2 * o;
            if k < f {
                sum += bank.rec_lo[k] * approx[o] + bank.rec_hi[k] * detail[o];
            }
        }
        out.push(sum);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_signal(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64 * 0.01;
                (2.0 * std::f64::consts::PI * 1.5 * t).sin() + 0.3 * (17.0 * t).cos() + 0.01 * t
            })
            .collect()
    }

    fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_filters_are_orthonormal() {
        for wavelet in Wavelet::all() {
            let h = wavelet.dec_lo();
            let energy: f64 = h.iter().map(|v| v * v).sum();
            let sum: f64 = h.iter().sum();
            assert!((energy - 1.0).abs() < 1e-10, "{} energy {}", wavelet, energy);
            assert!((sum - std::f64::consts::SQRT_2).abs() < 1e-10, "{} sum {}", wavelet, sum);
        }
    }

    #[test]
    fn test_roundtrip_all_bases_and_modes() {
        let modes = [
            ExtensionMode::Zero,
            ExtensionMode::Constant,
            ExtensionMode::Symmetric,
            ExtensionMode::Periodic,
        ];
        for wavelet in Wavelet::all() {
            for mode in modes {
                for n in [33usize, 100, 257, 1000] {
                    let x = test_signal(n);
                    let dec = decompose(&x, wavelet, mode, None).unwrap();
                    let rec = dec.reconstruct().unwrap();
                    assert!(rec.len() == n || rec.len() == n + 1);
                    let rec = dec.reconstruct_truncated().unwrap();
                    assert_eq!(rec.len(), n);
                    let err = max_abs_diff(&rec, &x);
                    assert!(err < 1e-8, "{} {} n={} err={}", wavelet, mode, n, err);
                }
            }
        }
    }

    #[test]
    fn test_level_lengths_db4() {
        let x = test_signal(1000);
        let dec = decompose(&x, Wavelet::Db4, ExtensionMode::Symmetric, None).unwrap();
        let lengths: Vec<usize> = dec.levels.iter().map(Vec::len).collect();
        assert_eq!(lengths, vec![14, 14, 22, 38, 69, 131, 255, 503]);
        assert_eq!(dec.depth(), 7);
    }

    #[test]
    fn test_reconstruction_may_be_one_longer() {
        let x = test_signal(999);
        let dec = decompose(&x, Wavelet::Haar, ExtensionMode::Symmetric, Some(1)).unwrap();
        assert_eq!(dec.reconstruct().unwrap().len(), 1000);
        let trimmed = dec.reconstruct_truncated().unwrap();
        assert!(max_abs_diff(&trimmed, &x) < 1e-12);
    }

    #[test]
    fn test_haar_constant_signal() {
        let dec = decompose(&[1.0; 4], Wavelet::Haar, ExtensionMode::Symmetric, None).unwrap();
        assert_eq!(dec.levels.len(), 3);
        assert!((dec.levels[0][0] - 2.0).abs() < 1e-12);
        assert!(dec.levels[1..].iter().flatten().all(|c| c.abs() < 1e-12));
    }

    #[test]
    fn test_short_and_empty_signals_fail() {
        assert!(matches!(
            decompose(&[], Wavelet::Db4, ExtensionMode::Symmetric, None),
            Err(SeisError::EmptySignal)
        ));
        assert!(matches!(
            decompose(&[1.0; 5], Wavelet::Db4, ExtensionMode::Symmetric, None),
            Err(SeisError::SignalTooShort { .. })
        ));
        assert!(matches!(
            decompose(&test_signal(100), Wavelet::Db4, ExtensionMode::Symmetric, Some(6)),
            Err(SeisError::SignalTooShort { .. })
        ));
    }

    #[test]
    fn test_excessive_level_is_an_error() {
        let x = test_signal(1000);
        for level in [64, 65, usize::MAX] {
            match decompose(&x, Wavelet::Db4, ExtensionMode::Symmetric, Some(level)) {
                Err(SeisError::SignalTooShort { required, .. }) => {
                    assert_eq!(required, usize::MAX)
                }
                other => panic!("expected SignalTooShort, got {:?}", other.map(|d| d.depth())),
            }
        }
    }

    #[test]
    fn test_names_parse() {
        assert_eq!("DB4".parse::<Wavelet>().unwrap(), Wavelet::Db4);
        assert_eq!(Wavelet::from_name("coif1").unwrap(), Wavelet::Coif1);
        assert!(matches!(
            Wavelet::from_name("coif4"),
            Err(SeisError::UnknownWavelet(_))
        ));
        assert_eq!(
            ExtensionMode::from_name("constant").unwrap(),
            ExtensionMode::Constant
        );
        assert!(ExtensionMode::from_name("reflect").is_err());
    }

    #[test]
    fn test_mismatched_levels_rejected() {
        let x = test_signal(256);
        let mut dec = decompose(&x, Wavelet::Db2, ExtensionMode::Zero, Some(3)).unwrap();
        dec.levels[2].truncate(3);
        assert!(dec.reconstruct().is_err());
    }
}
