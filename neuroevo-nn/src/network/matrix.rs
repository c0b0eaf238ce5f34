/// A dense row-major matrix of `f32`s.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Matrix {
    rows: usize,
    columns: usize,
    data: Box<[f32]>,
}

impl Matrix {
    pub(crate) fn zeros(rows: usize, columns: usize) -> Matrix {
        Matrix {
            rows,
            columns,
            data: vec![0.0; rows * columns].into(),
        }
    }

    pub(crate) fn from_fn(rows: usize, columns: usize, f: impl FnMut() -> f32) -> Matrix {
        Matrix {
            rows,
            columns,
            data: std::iter::repeat_with(f).take(rows * columns).collect(),
        }
    }

    /// Builds a matrix from row-major data.
    /// `data.len()` must be `rows * columns`.
    pub(crate) fn from_row_major(rows: usize, columns: usize, data: &[f32]) -> Matrix {
        debug_assert_eq!(data.len(), rows * columns);
        Matrix {
            rows,
            columns,
            data: data.into(),
        }
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn columns(&self) -> usize {
        self.columns
    }

    pub(crate) fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.columns..(row + 1) * self.columns]
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [f32] {
        &mut self.data[row * self.columns..(row + 1) * self.columns]
    }

    pub(crate) fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact(0) panics, and zero-width layers can't be built.
        self.data.chunks_exact(self.columns.max(1))
    }

    pub(crate) fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub(crate) fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|x| *x = value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_layout() {
        let m = Matrix::from_row_major(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.columns(), 3);
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m.iter_rows().count(), 2);
    }

    #[test]
    fn row_mut_and_fill() {
        let mut m = Matrix::zeros(3, 2);
        m.row_mut(1)[1] = 7.0;
        assert_eq!(m.as_slice(), &[0.0, 0.0, 0.0, 7.0, 0.0, 0.0]);
        m.fill(1.0);
        assert!(m.as_slice().iter().all(|&x| x == 1.0));
    }
}
