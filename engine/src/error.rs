use thiserror::Error;

/// Failures raised while decoding coordinates or touching individual bits.
///
/// Illegal moves are not errors: `is_legal_move` answers `false` and
/// `apply_move` trusts its caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The coordinate text is not exactly two characters long.
    #[error("invalid position {0:?}: expected a column letter and a row digit, e.g. \"d3\"")]
    InvalidFormat(String),

    /// The coordinate decodes to a row or column outside `0..8`.
    #[error("position out of range: row {row}, column {column} (both must be 0-7)")]
    OutOfRange { row: isize, column: isize },
}
