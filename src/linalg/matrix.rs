use rand::prelude::*;
use rand_distr::Uniform;
use std::fmt;
use std::ops::{Index, IndexMut};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub data: Vec<f32>, // row-major order, i.e. data[row * cols + col]
    pub rows: usize,
    pub cols: usize,
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.data.is_empty() {
            return write!(f, "Dimension: rows={}; cols={}\n[]\n", self.rows, self.cols);
        }
        write!(
            f,
            "Dimension: rows={}; cols={}\n⎡\t{:.5} \t...\t{:.5} \t⎤\n⎢\t....... \t...\t....... \t⎥\n⎣\t{:.5} \t...\t {:.5}\t⎦\n",
            self.rows,
            self.cols,
            self[(0, 0)],
            self[(0, self.cols - 1)],
            self[(self.rows - 1, 0)],
            self[(self.rows - 1, self.cols - 1)]
        )
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum MatrixError {
    #[error("Matrix dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("Matrix distribution error: {0}")]
    Distribution(String),
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;
    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        debug_assert!(row < self.rows && col < self.cols);
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f32 {
        debug_assert!(row < self.rows && col < self.cols);
        &mut self.data[row * self.cols + col]
    }
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    pub fn from_vec(data: Vec<f32>, rows: usize, cols: usize) -> Result<Self, MatrixError> {
        if data.len() != rows * cols {
            return Err(MatrixError::DimensionMismatch(format!(
                "{} values cannot fill a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Draws every element uniformly from `[low, high)`.
    pub fn fill_uniform<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        low: f32,
        high: f32,
    ) -> Result<(), MatrixError> {
        let uniform =
            Uniform::new(low, high).map_err(|e| MatrixError::Distribution(e.to_string()))?;
        for x in self.data.iter_mut() {
            *x = uniform.sample(rng);
        }
        Ok(())
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn fill_row(&mut self, row: usize, value: f32) {
        self.row_mut(row).fill(value);
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha12Rng;
    use std::error::Error;
    #[test]
    fn test_matrix() -> Result<(), Box<dyn Error>> {
        let (n, p): (usize, usize) = (2, 3);
        let mat_zero = Matrix::zeros(n, p);
        assert_eq!(mat_zero.data, vec![0.0; n * p]);
        assert_eq!(mat_zero.shape(), (2, 3));
        let mut mat = Matrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], n, p)?;
        assert_eq!(mat[(0, 2)], 3.0);
        assert_eq!(mat[(1, 0)], 4.0);
        assert_eq!(mat.row(1), &[4.0, 5.0, 6.0]);
        mat[(1, 1)] = -5.0;
        assert_eq!(mat.data[4], -5.0);
        mat.fill_row(0, 0.0);
        assert_eq!(mat.row(0), &[0.0, 0.0, 0.0]);
        assert_eq!(mat.row(1), &[4.0, -5.0, 6.0]);
        println!("Matrix:\n{}", mat);
        assert!(matches!(
            Matrix::from_vec(vec![1.0; 5], n, p),
            Err(MatrixError::DimensionMismatch(_))
        ));
        Ok(())
    }

    #[test]
    fn test_fill_uniform() -> Result<(), Box<dyn Error>> {
        let mut rng = ChaCha12Rng::seed_from_u64(42);
        let mut mat = Matrix::zeros(20, 30);
        mat.fill_uniform(&mut rng, -0.5, 0.5)?;
        assert!(mat.data.iter().all(|&x| (-0.5..0.5).contains(&x)));
        assert!(mat.data.iter().any(|&x| x != 0.0));
        let mut rng = ChaCha12Rng::seed_from_u64(42);
        let mut other = Matrix::zeros(20, 30);
        other.fill_uniform(&mut rng, -0.5, 0.5)?;
        assert_eq!(mat, other);
        assert!(matches!(
            mat.fill_uniform(&mut rng, 1.0, -1.0),
            Err(MatrixError::Distribution(_))
        ));
        Ok(())
    }
}
