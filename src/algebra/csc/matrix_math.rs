use crate::algebra::*;
use std::iter::zip;

impl<T: FloatT> MatrixVectorMultiply for CscMatrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_N(self, y, x, a, b);
    }

    fn quad_form(&self, y: &[T], x: &[T]) -> T {
        _csc_quad_form(self, y, x)
    }

    fn diag(&self, d: &mut [T]) {
        assert_eq!(d.len(), usize::min(self.m, self.n));
        d.fill(T::zero());
        for (col, di) in d.iter_mut().enumerate() {
            let first = self.colptr[col];
            let last = self.colptr[col + 1];
            for (&row, &v) in zip(&self.rowval[first..last], &self.nzval[first..last]) {
                if row == col {
                    *di += v;
                }
            }
        }
    }
}

// y^T*M*x for a full (non-triangular) matrix
#[allow(non_snake_case)]
fn _csc_quad_form<T: FloatT>(M: &CscMatrix<T>, y: &[T], x: &[T]) -> T {
    assert_eq!(x.len(), M.n);
    assert_eq!(y.len(), M.m);

    let mut out = T::zero();
    for (col, &xj) in x.iter().enumerate() {
        let first = M.colptr[col];
        let last = M.colptr[col + 1];
        let mut tmp = T::zero();
        for (&row, &Mv) in zip(&M.rowval[first..last], &M.nzval[first..last]) {
            tmp += Mv * y[row];
        }
        out += tmp * xj;
    }
    out
}

// sparse matrix-vector multiply, no transpose
#[allow(non_snake_case)]
fn _csc_axpby_N<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    assert_eq!(y.len(), A.m);

    //first do the b*y part
    if b == T::zero() {
        y.fill(T::zero());
    } else if b == T::one() {
    } else if b == -T::one() {
        y.negate();
    } else {
        y.scale(b);
    }

    // if a is zero, we're done
    if a == T::zero() {
        return;
    }

    assert_eq!(A.nzval.len(), A.nnz());
    assert_eq!(x.len(), A.n);

    //y += A*x
    if a == T::one() {
        for (j, xj) in x.iter().enumerate() {
            for i in A.colptr[j]..A.colptr[j + 1] {
                y[A.rowval[i]] += A.nzval[i] * *xj;
            }
        }
    } else if a == -T::one() {
        for (j, xj) in x.iter().enumerate() {
            for i in A.colptr[j]..A.colptr[j + 1] {
                y[A.rowval[i]] -= A.nzval[i] * *xj;
            }
        }
    } else {
        for (j, xj) in x.iter().enumerate() {
            for i in A.colptr[j]..A.colptr[j + 1] {
                y[A.rowval[i]] += a * A.nzval[i] * *xj;
            }
        }
    }
}
