use thiserror::Error;

/// Error type returned by [`CscMatrix::check_format`](crate::algebra::CscMatrix::check_format)
/// for malformed operator or constraint matrix data.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SparseFormatError {
    /// The dimensions disagree with the lengths of the data arrays
    #[error("Matrix dimensions do not agree with the lengths of colptr, rowval or nzval")]
    IncompatibleDimension,
    /// Column pointers are decreasing somewhere
    #[error("Column pointers must be nondecreasing")]
    BadColptr,
    #[error("Row indices in column {col} are not strictly increasing")]
    BadRowOrdering { col: usize },
    #[error("Row index {row} exceeds the matrix row dimension")]
    BadRowval { row: usize },
}
