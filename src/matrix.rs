//! L2 — a dense row-major matrix over GF(p), reduced row echelon form, and
//! the rank-deficient solve used by the decoder (spec §4.2).

use crate::error::{FuzzyVaultError, Result};
use crate::field::Field;

/// An `r x c` grid of field elements, zero-based and bounds-checked.
/// Dimensions are fixed at construction; contents are mutable.
pub struct Matrix {
    rows: usize,
    cols: usize,
    buf: Vec<u32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(FuzzyVaultError::validation(
                "matrix dimensions must be positive",
            ));
        }
        Ok(Matrix {
            rows,
            cols,
            buf: vec![0; rows * cols],
        })
    }

    pub fn from_rows(rows: usize, cols: usize, values: &[u32]) -> Result<Self> {
        let mut m = Matrix::zeros(rows, cols)?;
        if values.len() != rows * cols {
            return Err(FuzzyVaultError::validation(
                "value count does not match matrix dimensions",
            ));
        }
        m.buf.copy_from_slice(values);
        Ok(m)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows {
            return Err(FuzzyVaultError::validation("row out of range"));
        }
        if col >= self.cols {
            return Err(FuzzyVaultError::validation("col out of range"));
        }
        Ok(row * self.cols + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<u32> {
        Ok(self.buf[self.offset(row, col)?])
    }

    pub fn set(&mut self, row: usize, col: usize, v: u32) -> Result<()> {
        let k = self.offset(row, col)?;
        self.buf[k] = v;
        Ok(())
    }

    pub fn swap_rows(&mut self, r1: usize, r2: usize) -> Result<()> {
        if r1 >= self.rows || r2 >= self.rows {
            return Err(FuzzyVaultError::validation("row out of range"));
        }
        if r1 == r2 {
            return Ok(());
        }
        for col in 0..self.cols {
            self.buf.swap(r1 * self.cols + col, r2 * self.cols + col);
        }
        Ok(())
    }

    pub fn transpose(&self) -> Result<Matrix> {
        let mut out = Matrix::zeros(self.cols, self.rows)?;
        for row in 0..self.rows {
            for col in 0..self.cols {
                out.set(col, row, self.get(row, col)?)?;
            }
        }
        Ok(out)
    }

    /// A matrix put in echelon form is singular if any diagonal entry is
    /// zero (spec §4.2).
    pub fn is_singular(&self) -> Result<bool> {
        let n = self.rows.min(self.cols);
        for i in 0..n {
            if self.get(i, i)? == 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Horizontal concatenation: `[self | rhs]`.
    pub fn augment(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.rows != rhs.rows {
            return Err(FuzzyVaultError::validation(
                "augment: matrices have different row counts",
            ));
        }
        let mut out = Matrix::zeros(self.rows, self.cols + rhs.cols)?;
        for row in 0..self.rows {
            for col in 0..self.cols {
                out.set(row, col, self.get(row, col)?)?;
            }
            for col in 0..rhs.cols {
                out.set(row, col + self.cols, rhs.get(row, col)?)?;
            }
        }
        Ok(out)
    }

    fn find_pivot_row(&self, h: usize, k: usize) -> Result<Option<usize>> {
        for i in h..self.rows {
            if self.get(i, k)? != 0 {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Gauss-Jordan elimination over GF(p): walks `(h, k)` forward,
    /// pivoting and eliminating below the pivot at each step (spec §4.2).
    pub fn echelon(&mut self, field: &Field) -> Result<()> {
        let mut h = 0;
        let mut k = 0;
        while h < self.rows && k < self.cols {
            match self.find_pivot_row(h, k)? {
                None => k += 1,
                Some(pivot_row) => {
                    self.swap_rows(h, pivot_row)?;
                    let scale = field.inv(self.get(h, k)?)?;
                    for col in k..self.cols {
                        let v = field.mul(scale, self.get(h, col)?);
                        self.set(h, col, v)?;
                    }
                    for row in (h + 1)..self.rows {
                        let factor = self.get(row, k)?;
                        self.set(row, k, 0)?;
                        for col in (k + 1)..self.cols {
                            let v = field.sub(self.get(row, col)?, field.mul(self.get(h, col)?, factor));
                            self.set(row, col, v)?;
                        }
                    }
                    h += 1;
                    k += 1;
                }
            }
        }
        Ok(())
    }

    /// Clears above each leading 1, producing full reduced row echelon
    /// form, assuming `self` is already in row echelon form with the last
    /// column carrying the augmented right-hand side.
    pub fn back_substitute(&mut self, field: &Field) -> Result<()> {
        let last = self.cols - 1;
        for row in (1..self.rows).rev() {
            for row1 in (0..row).rev() {
                let temp = field.mul(self.get(row1, row)?, self.get(row, last)?);
                self.set(row1, row, 0)?;
                let v = field.sub(self.get(row1, last)?, temp);
                self.set(row1, last, v)?;
            }
        }
        Ok(())
    }

    /// Number of all-zero rows at the bottom of this (echelon-form) matrix.
    pub fn count_null_rows(&self) -> Result<usize> {
        let mut count = 0;
        for row in (0..self.rows).rev() {
            let mut all_zero = true;
            for col in 0..self.cols {
                if self.get(row, col)? != 0 {
                    all_zero = false;
                    break;
                }
            }
            if !all_zero {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    fn find_leading_one(&self, row: usize) -> Result<usize> {
        for col in 0..self.cols {
            if self.get(row, col)? == 1 {
                return Ok(col);
            }
        }
        Err(FuzzyVaultError::NoSolution)
    }

    fn solve_normal_case(&mut self, field: &Field) -> Result<Matrix> {
        self.back_substitute(field)?;
        let mut x = Matrix::zeros(self.rows, 1)?;
        let last = self.cols - 1;
        for i in 0..self.rows {
            x.set(i, 0, self.get(i, last)?)?;
        }
        Ok(x)
    }

    /// A particular solution for a consistent but rank-deficient system:
    /// for each non-zero row from the bottom up, assign its leading
    /// variable the row's RHS and eliminate it from the rows above.
    /// Variables that never own a leading 1 stay zero (spec §4.2).
    fn solve_solvable_singular(&mut self, field: &Field, null_count: usize) -> Result<Matrix> {
        let n_vars = self.rows;
        let last = self.cols - 1;
        let mut x = Matrix::zeros(n_vars, 1)?;
        let mut row = self.rows as isize - null_count as isize - 1;
        while row >= 0 {
            let r = row as usize;
            let col = self.find_leading_one(r)?;
            x.set(col, 0, self.get(r, last)?)?;
            for row1 in (0..r).rev() {
                let factor = self.get(row1, col)?;
                self.set(row1, col, 0)?;
                for col1 in (col + 1)..self.cols {
                    let v = field.sub(self.get(row1, col1)?, field.mul(factor, self.get(r, col1)?));
                    self.set(row1, col1, v)?;
                }
            }
            row -= 1;
        }
        Ok(x)
    }

    fn solve_singular_case(&mut self, field: &Field) -> Result<Matrix> {
        if self.cols != self.rows + 1 {
            return Err(FuzzyVaultError::validation(
                "matrix not augmented correctly for solve",
            ));
        }
        let null_count = self.count_null_rows()?;
        if null_count == 0 {
            return Err(FuzzyVaultError::NoSolution);
        }
        self.solve_solvable_singular(field, null_count)
    }

    /// Returns the `X` such that `self * X = rhs`. Handles both the
    /// non-singular case (unique solution by back-substitution) and the
    /// rank-deficient case (a particular solution, or `NoSolution` if the
    /// system is inconsistent) — spec §4.2's solve dispatch.
    pub fn solve(&self, field: &Field, rhs: &Matrix) -> Result<Matrix> {
        let mut augmented = self.augment(rhs)?;
        augmented.echelon(field)?;
        if augmented.is_singular()? {
            augmented.solve_singular_case(field)
        } else {
            augmented.solve_normal_case(field)
        }
    }
}
