//! Reference counted vectors shared between a caller and the objects
//! that hold on to them.
//!
//! Bound vectors attached to a constraint handler are owned jointly by
//! the caller and the handler.  The caller may keep its own handle and
//! continue to modify the values between solver iterations, so the data
//! lives behind an `Arc<RwLock<..>>`.  Element access is scoped: a
//! [`read`](SharedVector::read) or [`write`](SharedVector::write) guard
//! acquires the values and dropping the guard releases them.
//!
//! Each vector also carries a validity flag.  A vector that has been
//! [`invalidate`](SharedVector::invalidate)d holds values that have not
//! been computed yet (e.g. Lagrange multipliers before the first solve).
//! Acquiring a write guard marks the vector as valid again.

use super::FloatT;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
struct VectorData<T> {
    values: Vec<T>,
    valid: bool,
}

/// A shared, reference counted vector of [`FloatT`](crate::algebra::FloatT).
///
/// Cloning a `SharedVector` produces another handle to the same data.
/// Use [`duplicate`](SharedVector::duplicate) to allocate a new vector
/// with the same layout.
pub struct SharedVector<T> {
    inner: Arc<RwLock<VectorData<T>>>,
}

impl<T> Clone for SharedVector<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for SharedVector<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("SharedVector")
            .field("values", &data.values)
            .field("valid", &data.valid)
            .finish()
    }
}

impl<T> SharedVector<T>
where
    T: FloatT,
{
    /// Create a new shared vector taking ownership of `values`.
    pub fn new(values: Vec<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(VectorData {
                values,
                valid: true,
            })),
        }
    }

    /// Create a new shared vector with a copy of `values`.
    pub fn from_slice(values: &[T]) -> Self {
        Self::new(values.to_vec())
    }

    /// Vector of length `n` with all entries equal to `c`.
    pub fn constant(n: usize, c: T) -> Self {
        Self::new(vec![c; n])
    }

    /// A new, zero filled vector with the same layout as `self`.
    pub fn duplicate(&self) -> Self {
        Self::new(vec![T::zero(); self.len()])
    }

    pub fn len(&self) -> usize {
        self.data().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Acquire the values for reading.  Released when the guard is dropped.
    pub fn read(&self) -> VectorReadGuard<'_, T> {
        VectorReadGuard { guard: self.data() }
    }

    /// Acquire the values for writing.  Released when the guard is dropped.
    ///
    /// Acquiring write access marks the vector as valid.
    pub fn write(&self) -> VectorWriteGuard<'_, T> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.valid = true;
        VectorWriteGuard { guard }
    }

    /// Copy of the current values.
    pub fn to_vec(&self) -> Vec<T> {
        self.data().values.clone()
    }

    /// Overwrite all values with the contents of `values`.
    ///
    /// # Panics
    /// Panics if the lengths do not agree.
    pub fn assign(&self, values: &[T]) {
        self.write().copy_from_slice(values);
    }

    /// Mark the contents as not yet computed.
    pub fn invalidate(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .valid = false;
    }

    /// `false` if the vector has been invalidated and not written since.
    pub fn is_valid(&self) -> bool {
        self.data().valid
    }

    /// `true` if both handles refer to the same underlying vector.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Number of handles currently referencing the vector.
    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    fn data(&self) -> RwLockReadGuard<'_, VectorData<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read access to the values of a [`SharedVector`]
pub struct VectorReadGuard<'a, T> {
    guard: RwLockReadGuard<'a, VectorData<T>>,
}

impl<T> Deref for VectorReadGuard<'_, T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        &self.guard.values
    }
}

/// Write access to the values of a [`SharedVector`]
pub struct VectorWriteGuard<'a, T> {
    guard: RwLockWriteGuard<'a, VectorData<T>>,
}

impl<T> Deref for VectorWriteGuard<'_, T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        &self.guard.values
    }
}

impl<T> DerefMut for VectorWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.guard.values
    }
}
