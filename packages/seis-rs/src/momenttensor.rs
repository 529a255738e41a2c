use crate::error::{Result, SeisError};
use crate::event::{MomentTensor, Tensor};
use nalgebra::{Matrix3, SymmetricEigen};

impl Tensor {
    pub fn to_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.m_rr, self.m_rt, self.m_rp, //
            self.m_rt, self.m_tt, self.m_tp, //
            self.m_rp, self.m_tp, self.m_pp,
        )
    }

    /// Symmetric part of `m` in tensor form
    pub fn from_matrix(m: &Matrix3<f64>) -> Self {
        Self {
            m_rr: m[(0, 0)],
            m_tt: m[(1, 1)],
            m_pp: m[(2, 2)],
            m_rt: 0.5 * (m[(0, 1)] + m[(1, 0)]),
            m_rp: 0.5 * (m[(0, 2)] + m[(2, 0)]),
            m_tp: 0.5 * (m[(1, 2)] + m[(2, 1)]),
        }
    }

    pub fn frobenius_norm(&self) -> f64 {
        self.to_matrix().norm()
    }
}

/// Moment magnitude from a scalar moment in Newton-meters
pub fn mw(scalar_moment: f64) -> f64 {
    (scalar_moment * 1.0e7).log10() / 1.5 - 10.7
}

/// Double-couple part of a moment tensor
///
/// Keeps the principal axes and replaces the eigenvalues `s1 <= s2 <= s3` with
/// `(-(s3-s1)/2, 0, (s3-s1)/2)`. With `rescale` the result is scaled to a
/// Frobenius norm equal to the scalar moment.
pub fn extract_dc(mt: &MomentTensor, rescale: bool) -> Result<Tensor> {
    let eigen = SymmetricEigen::new(mt.tensor.to_matrix());

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
    let s1 = eigen.eigenvalues[order[0]];
    let s3 = eigen.eigenvalues[order[2]];

    let rotation = Matrix3::from_columns(&[
        eigen.eigenvectors.column(order[0]).into_owned(),
        eigen.eigenvectors.column(order[1]).into_owned(),
        eigen.eigenvectors.column(order[2]).into_owned(),
    ]);
    let half = 0.5 * (s1 - s3);
    let principal = Matrix3::from_diagonal(&nalgebra::Vector3::new(half, 0.0, -half));
    let mut dc = rotation * principal * rotation.transpose();

    if rescale {
        let norm = dc.norm();
        if norm <= 1e-12 * mt.tensor.frobenius_norm() {
            return Err(SeisError::Degenerate(
                "moment tensor has no double-couple component".to_string(),
            ));
        }
        dc *= mt.scalar_moment / norm;
    }
    Ok(Tensor::from_matrix(&dc))
}

/// Scale the tensor to Frobenius norm `scalar_moment` (the tensor's own when `None`)
pub fn rescale(mt: &mut MomentTensor, scalar_moment: Option<f64>) -> Result<()> {
    let target = scalar_moment.unwrap_or(mt.scalar_moment);
    let norm = mt.tensor.frobenius_norm();
    if norm == 0.0 {
        return Err(SeisError::Degenerate("zero moment tensor".to_string()));
    }
    let m = mt.tensor.to_matrix() * (target / norm);
    mt.tensor = Tensor::from_matrix(&m);
    Ok(())
}
