use crate::table::PairKey;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while loading energy tables or classifying interaction changes.
#[derive(Debug, Error)]
pub enum PairdiffError {
    /// A column the table needs is absent.
    #[error("Table '{table}' is missing required column '{column}'")]
    MissingColumn {
        /// Name of the table.
        table: String,
        /// Name of the absent column.
        column: String,
    },

    /// A residue position is not an integer.
    #[error("Table '{table}' has a non-integer residue position '{value}' in column '{column}'")]
    InvalidPosition {
        /// Name of the table.
        table: String,
        /// Column holding the position.
        column: String,
        /// The offending value, as read.
        value: String,
    },

    /// An energy term holds a value that is not a number.
    #[error("Table '{table}' has a non-numeric value in energy term '{column}'")]
    InvalidTerm {
        /// Name of the table.
        table: String,
        /// Name of the term.
        column: String,
    },

    /// A row carries a different number of energy values than the table has terms.
    #[error("Row {pair} of table '{table}' has {found} energy values, expected {expected}")]
    RowWidth {
        /// Name of the table.
        table: String,
        /// Pair of the short or long row.
        pair: PairKey,
        /// Number of energy terms.
        expected: usize,
        /// Number of values in the row.
        found: usize,
    },

    /// The two tables do not carry the same energy terms in the same order.
    #[error("Variant and wild-type energy terms differ: {variant:?} vs {wild_type:?}")]
    SchemaMismatch {
        /// Terms of the variant table.
        variant: Vec<String>,
        /// Terms of the wild-type table.
        wild_type: Vec<String>,
    },

    /// A pair occurs more than once in a table classified with
    /// [`DuplicatePolicy::Reject`](crate::DuplicatePolicy::Reject).
    #[error("Table '{table}' contains the residue pair {pair} more than once")]
    DuplicatePair {
        /// Name of the table.
        table: String,
        /// The repeated pair.
        pair: PairKey,
    },

    /// Mutations cannot be read from structures of different lengths.
    #[error("Sequence lengths differ: wild-type has {wild_type} residues, variant {variant}")]
    SequenceLengthMismatch {
        /// Residues in the wild-type.
        wild_type: usize,
        /// Residues in the variant.
        variant: usize,
    },

    /// A residue has no entry in the depth map.
    #[error("No depth value for residue position {0}")]
    MissingDepth(i64),

    /// A silent file could not be turned into a table.
    #[error("Malformed energy breakdown output: {0}")]
    MalformedOutfile(String),

    /// [`pdbtbx`] could not open a structure.
    #[error("Failed to read structure '{path}': {message}")]
    Structure {
        /// Path of the structure file.
        path: String,
        /// The breaking errors reported by the parser.
        message: String,
    },

    /// DataFrame error.
    #[error(transparent)]
    Polars(#[from] PolarsError),

    /// File system error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type of the crate.
pub type Result<T> = std::result::Result<T, PairdiffError>;
