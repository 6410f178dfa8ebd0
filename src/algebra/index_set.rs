use crate::error::{QpError, QpResult};
use std::iter::zip;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered set of distinct component indices.
///
/// Used to select the subset of variables a constraint handler acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexSet {
    indices: Vec<usize>,
}

impl IndexSet {
    /// Create an index set.  Indices must be strictly increasing.
    pub fn new(indices: Vec<usize>) -> QpResult<Self> {
        if indices.windows(2).any(|w| w[0] >= w[1]) {
            return Err(QpError::InvalidArgument(
                "index set entries must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { indices })
    }

    /// The contiguous range `first..first+n`
    pub fn stride(first: usize, n: usize) -> Self {
        Self {
            indices: (first..first + n).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Largest index in the set, if any
    pub fn max_index(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// `true` if every index is a valid position in a vector of length `n`
    pub fn fits(&self, n: usize) -> bool {
        self.max_index().map_or(true, |i| i < n)
    }

    /// Copy the selected components of `x` into `sub`
    pub fn gather<T: Copy>(&self, x: &[T], sub: &mut [T]) {
        assert_eq!(sub.len(), self.len());
        for (s, &i) in zip(sub, &self.indices) {
            *s = x[i];
        }
    }

    /// Allocating version of [`gather`](IndexSet::gather)
    pub fn subvector<T: Copy>(&self, x: &[T]) -> Vec<T> {
        self.indices.iter().map(|&i| x[i]).collect()
    }

    /// Write the components of `sub` back into the selected positions of `x`
    pub fn scatter<T: Copy>(&self, sub: &[T], x: &mut [T]) {
        assert_eq!(sub.len(), self.len());
        for (&s, &i) in zip(sub, &self.indices) {
            x[i] = s;
        }
    }
}

#[test]
fn test_index_set_gather_scatter() {
    let is = IndexSet::new(vec![0, 2, 3]).unwrap();
    let x = [1., 2., 3., 4., 5.];
    assert_eq!(is.subvector(&x), vec![1., 3., 4.]);

    let mut y = [0.; 5];
    is.scatter(&[7., 8., 9.], &mut y);
    assert_eq!(y, [7., 0., 8., 9., 0.]);

    assert!(is.fits(4));
    assert!(!is.fits(3));
}

#[test]
fn test_index_set_ordering() {
    assert!(IndexSet::new(vec![2, 1]).is_err());
    assert!(IndexSet::new(vec![1, 1]).is_err());
    assert_eq!(IndexSet::stride(2, 3).indices(), &[2, 3, 4]);
}
