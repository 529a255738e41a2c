use crate::error::{Result, SeisError};
use nalgebra::{DMatrix, DVector};

/// Least-squares polynomial fit, coefficients in ascending powers
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>> {
    if x.len() != y.len() {
        return Err(SeisError::InvalidParameter(format!(
            "polyfit needs equal lengths, got {} and {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() <= degree {
        return Err(SeisError::Degenerate(format!(
            "degree {} fit needs more than {} points",
            degree,
            x.len()
        )));
    }

    // Center abscissae to keep the Vandermonde matrix well conditioned
    let x0 = x.iter().sum::<f64>() / x.len() as f64;
    let design = DMatrix::from_fn(x.len(), degree + 1, |i, j| (x[i] - x0).powi(j as i32));
    let rhs = DVector::from_column_slice(y);

    let svd = design.svd(true, true);
    let centered = svd
        .solve(&rhs, 1e-12)
        .map_err(|e| SeisError::Degenerate(format!("least-squares solve failed: {}", e)))?;

    Ok(uncenter(centered.as_slice(), x0))
}

/// Expand `Σ c_j (x - x0)^j` into ascending powers of `x`
fn uncenter(centered: &[f64], x0: f64) -> Vec<f64> {
    let mut out = vec![0.0; centered.len()];
    for (j, &c) in centered.iter().enumerate() {
        let mut binom = 1.0;
        for k in 0..=j {
            // (x - x0)^j contributes binom(j, k) * x^k * (-x0)^(j-k)
            out[k] += c * binom * (-x0).powi((j - k) as i32);
            binom = binom * (j - k) as f64 / (k + 1) as f64;
        }
    }
    out
}

/// Evaluate ascending-power coefficients at `x`
pub fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Fit `y = intercept + slope * x`; returns `(intercept, slope)`
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<(f64, f64)> {
    let c = polyfit(x, y, 1)?;
    Ok((c[0], c[1]))
}

/// Subtract the best-fit polynomial of `degree` from `y` in place
pub fn detrend(x: &[f64], y: &mut [f64], degree: usize) -> Result<()> {
    let c = polyfit(x, y, degree)?;
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi -= polyval(&c, xi);
    }
    Ok(())
}
