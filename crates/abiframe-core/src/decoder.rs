//! The `RowDecoder` trait and associated progress types.
//!
//! The row assembler is generic over `RowDecoder`: one implementation turns
//! transactions into decoded calls, another turns logs into decoded events.
//! Implementations must be `Send + Sync` so rows can be decoded on Rayon
//! worker threads.

use crate::error::DecodeWarning;
use crate::row::{Columns, RawRow};

/// Callback invoked by the assembler while a batch is decoded.
/// `decoded` is the number of rows finished so far; `total` is the batch size.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, decoded: usize, total: usize);
}

/// Blanket impl so closures can be used as progress callbacks.
impl<F: Fn(usize, usize) + Send + Sync> ProgressCallback for F {
    fn on_progress(&self, decoded: usize, total: usize) {
        self(decoded, total)
    }
}

/// One decoded row plus everything that went wrong while decoding it.
#[derive(Debug, Clone)]
pub struct RowOutcome<O> {
    pub output: O,
    pub warnings: Vec<DecodeWarning>,
}

impl<O> RowOutcome<O> {
    pub fn clean(output: O) -> Self {
        Self {
            output,
            warnings: Vec::new(),
        }
    }
}

/// Decodes one kind of raw row against a fixed contract schema.
pub trait RowDecoder: Send + Sync {
    type Row: RawRow + Sync;
    type Output: Columns + Send;

    /// Every schema-derived column this decoder can produce, ABI order.
    fn output_columns(&self) -> Vec<String>;

    /// Decode one row. Never fails: problems are reported as warnings and
    /// the affected fields are left out of the output.
    fn decode_row(&self, row: &Self::Row) -> RowOutcome<Self::Output>;
}
