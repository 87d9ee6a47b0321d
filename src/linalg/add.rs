use crate::linalg::matrix::Matrix;

impl Matrix {
    /// Rank-one update: `self[(i, j)] += scale * rows[i] * cols[j]`.
    pub fn add_outer(&mut self, scale: f32, rows: &[f32], cols: &[f32]) {
        assert_eq!(rows.len(), self.rows, "add_outer: row vector vs matrix rows");
        assert_eq!(cols.len(), self.cols, "add_outer: column vector vs matrix cols");
        for (i, &r) in rows.iter().enumerate() {
            for (w, &c) in self.row_mut(i).iter_mut().zip(cols) {
                *w += scale * r * c;
            }
        }
    }
}
