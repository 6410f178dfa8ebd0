#![allow(non_snake_case)]

use crate::algebra::{FloatT, SparseFormatError};

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Sparse matrix in standard Compressed Sparse Column (CSC) format
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [4.  1.  0.]
///     [1.  4.  1.]
///     [0.  1.  4.]
/// ```
///
/// ```no_run
/// use qpframe::algebra::CscMatrix;
///
/// let A : CscMatrix<f64> = CscMatrix::new(
///    3,                                // m
///    3,                                // n
///    vec![0, 2, 5, 7],                 //colptr
///    vec![0, 1, 0, 1, 2, 1, 2],        //rowval
///    vec![4., 1., 1., 4., 1., 1., 4.], //nzval
///  );
///
/// // optional correctness check
/// assert!(A.check_format().is_ok());
///
/// ```
///
/// Objective operators are stored in full (not triangular) form.

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// CSC format column pointer.
    ///
    /// Ths field should have length `n+1`. The last entry corresponds
    /// to the the number of nonzeros and should agree with the lengths
    /// of the `rowval` and `nzval` fields.
    pub colptr: Vec<usize>,
    /// vector of row indices
    pub rowval: Vec<usize>,
    /// vector of non-zero matrix elements
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.   This constructor does __not__
    /// ensure that rows indices are all in bounds or that data is arranged
    /// such that entries within each column appear in order of increasing
    /// row index.   Use [`check_format`](CscMatrix::check_format) for that.
    ///
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// allocate space for a sparse matrix with `nnz` elements
    pub fn spalloc(m: usize, n: usize, nnz: usize) -> Self {
        let mut colptr = vec![0; n + 1];
        let rowval = vec![0; nnz];
        let nzval = vec![T::zero(); nnz];
        colptr[n] = nnz;

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// Sparse matrix of size `(m,n)` with no structural entries
    pub fn zeros(size: (usize, usize)) -> Self {
        let (m, n) = size;
        CscMatrix::spalloc(m, n, 0)
    }

    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        CscMatrix::from_diagonal(&vec![T::one(); n])
    }

    /// Square diagonal matrix with the entries of `d` on the diagonal
    pub fn from_diagonal(d: &[T]) -> Self {
        let n = d.len();
        let colptr = (0usize..=n).collect();
        let rowval = (0usize..n).collect();
        let nzval = d.to_vec();

        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// number of rows
    pub fn nrows(&self) -> usize {
        self.m
    }

    /// number of columns
    pub fn ncols(&self) -> usize {
        self.n
    }

    /// matrix dimensions as `(m,n)`
    pub fn size(&self) -> (usize, usize) {
        (self.m, self.n)
    }

    /// true if the matrix has as many rows as columns
    pub fn is_square(&self) -> bool {
        self.m == self.n
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.is_empty()
            || (self.colptr.len() - 1) != self.n
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        //check for colptr monotonicity
        if self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        //check for rowval monotonicity within each column
        for col in 0..self.n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            if self.rowval[rng].windows(2).any(|c| c[0] >= c[1]) {
                return Err(SparseFormatError::BadRowOrdering { col });
            }
        }
        //check for row values out of bounds
        if let Some(&row) = self.rowval.iter().find(|&&r| r >= self.m) {
            return Err(SparseFormatError::BadRowval { row });
        }

        Ok(())
    }

    /// Returns the value at the given (row,col) index as an Option.
    /// Returns None if the given index is not a structural nonzero.
    ///
    /// # Panics
    /// Panics if the given index is out of bounds.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<T> {
        let (row, col) = idx;
        assert!(row < self.nrows() && col < self.ncols());

        let first = self.colptr[col];
        let last = self.colptr[col + 1];
        let rows_in_this_column = &self.rowval[first..last];
        match rows_in_this_column.binary_search(&row) {
            Ok(idx) => Some(self.nzval[first + idx]),
            Err(_) => None,
        }
    }
}

/// Build a sparse matrix from a dense row-major array, dropping zeros.
impl<T, const M: usize, const N: usize> From<&[[T; N]; M]> for CscMatrix<T>
where
    T: FloatT,
{
    fn from(rows: &[[T; N]; M]) -> Self {
        let mut colptr = Vec::with_capacity(N + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();

        colptr.push(0);
        for col in 0..N {
            for (row, vals) in rows.iter().enumerate() {
                let v = vals[col];
                if v != T::zero() {
                    rowval.push(row);
                    nzval.push(v);
                }
            }
            colptr.push(rowval.len());
        }
        CscMatrix::new(M, N, colptr, rowval, nzval)
    }
}

#[test]
fn test_csc_from_dense() {
    let A = CscMatrix::from(&[
        [4., 1., 0.], //
        [1., 4., 1.], //
        [0., 1., 4.], //
    ]);
    assert!(A.check_format().is_ok());
    assert_eq!(A.colptr, vec![0, 2, 5, 7]);
    assert_eq!(A.rowval, vec![0, 1, 0, 1, 2, 1, 2]);
    assert_eq!(A.get_entry((2, 1)), Some(1.));
    assert!(A.get_entry((2, 0)).is_none());
}

#[test]
fn test_csc_check_format() {
    let mut A = CscMatrix::<f64>::identity(3);
    assert!(A.check_format().is_ok());

    A.rowval[2] = 7;
    assert_eq!(A.check_format(), Err(SparseFormatError::BadRowval { row: 7 }));

    let B = CscMatrix {
        m: 2,
        n: 1,
        colptr: vec![0, 2],
        rowval: vec![1, 0],
        nzval: vec![1., 2.],
    };
    assert_eq!(
        B.check_format(),
        Err(SparseFormatError::BadRowOrdering { col: 0 })
    );

    let C = CscMatrix {
        m: 2,
        n: 2,
        colptr: vec![0, 2, 1],
        rowval: vec![0],
        nzval: vec![1.],
    };
    assert_eq!(C.check_format(), Err(SparseFormatError::BadColptr));
}
