use crate::linalg::matrix::Matrix;

impl Matrix {
    /// Row vector times matrix: `out[j] = Σ_k v[k] * self[(k, j)]`.
    pub fn vecmul(&self, v: &[f32], out: &mut [f32]) {
        assert_eq!(v.len(), self.rows, "vecmul: vector length vs matrix rows");
        assert_eq!(out.len(), self.cols, "vecmul: output length vs matrix cols");
        out.fill(0.0);
        for (k, &x) in v.iter().enumerate() {
            for (o, &w) in out.iter_mut().zip(self.row(k)) {
                *o += x * w;
            }
        }
    }

    /// Matrix times column vector over the leading `out.len()` rows:
    /// `out[j] = Σ_k self[(j, k)] * v[k]`.
    pub fn mulvec(&self, v: &[f32], out: &mut [f32]) {
        assert_eq!(v.len(), self.cols, "mulvec: vector length vs matrix cols");
        assert!(out.len() <= self.rows, "mulvec: output longer than matrix rows");
        for (j, o) in out.iter_mut().enumerate() {
            *o = self.row(j).iter().zip(v).map(|(&w, &x)| w * x).sum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_mult() -> Result<(), Box<dyn std::error::Error>> {
        let mat_a = Matrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3)?;
        let mut out = vec![f32::NAN; 3];
        mat_a.vecmul(&[1.0, 2.0], &mut out);
        assert_eq!(out, vec![9.0, 12.0, 15.0]);
        let mut out = vec![0.0; 2];
        mat_a.mulvec(&[1.0, 0.0, -1.0], &mut out);
        assert_eq!(out, vec![-2.0, -2.0]);
        // bias row left out
        let mut out = vec![0.0; 1];
        mat_a.mulvec(&[1.0, 1.0, 1.0], &mut out);
        assert_eq!(out, vec![6.0]);
        Ok(())
    }

    #[test]
    #[should_panic]
    fn test_vecmul_dimension_mismatch() {
        let mat_a = Matrix::zeros(2, 3);
        let mut out = vec![0.0; 3];
        mat_a.vecmul(&[1.0, 2.0, 3.0], &mut out);
    }
}
