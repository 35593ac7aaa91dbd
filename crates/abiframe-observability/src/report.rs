//! Per-batch warning summaries.
//!
//! Decoding never aborts a batch, so every warning it raised must reach the
//! user somewhere. `WarningReport` groups them by kind and logs one line per
//! kind with a representative message.

use abiframe_core::RowWarning;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindSummary {
    pub count: usize,
    /// Row index of the first occurrence.
    pub first_row: usize,
    /// Message of the first occurrence.
    pub example: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarningReport {
    pub total: usize,
    pub by_kind: BTreeMap<&'static str, KindSummary>,
}

impl WarningReport {
    pub fn from_warnings(warnings: &[RowWarning]) -> Self {
        let mut by_kind: BTreeMap<&'static str, KindSummary> = BTreeMap::new();
        for w in warnings {
            by_kind
                .entry(w.warning.kind())
                .and_modify(|s| s.count += 1)
                .or_insert_with(|| KindSummary {
                    count: 1,
                    first_row: w.row,
                    example: w.warning.to_string(),
                });
        }
        Self {
            total: warnings.len(),
            by_kind,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn count(&self, kind: &str) -> usize {
        self.by_kind.get(kind).map_or(0, |s| s.count)
    }

    /// Log one `warn!` line per kind.
    pub fn emit(&self, context: &str) {
        for (kind, summary) in &self.by_kind {
            warn!(
                context,
                kind,
                count = summary.count,
                first_row = summary.first_row,
                "{}",
                summary.example
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abiframe_core::DecodeWarning;

    fn unsupported(row: usize, ty: &str) -> RowWarning {
        RowWarning {
            row,
            warning: DecodeWarning::UnsupportedType {
                param: "p".into(),
                ty: ty.into(),
            },
        }
    }

    #[test]
    fn groups_by_kind_keeping_first_example() {
        let warnings = vec![
            unsupported(2, "string[]"),
            RowWarning {
                row: 3,
                warning: DecodeWarning::UnknownSelector {
                    selector: "0xdeadbeef".into(),
                },
            },
            unsupported(5, "address[][]"),
        ];
        let report = WarningReport::from_warnings(&warnings);
        assert_eq!(report.total, 3);
        assert_eq!(report.count("unsupported_type"), 2);
        assert_eq!(report.count("unknown_selector"), 1);
        assert_eq!(report.count("missing_topic"), 0);

        let s = &report.by_kind["unsupported_type"];
        assert_eq!(s.first_row, 2);
        assert_eq!(s.example, "string[] is not yet supported");
    }

    #[test]
    fn empty_batch() {
        let report = WarningReport::from_warnings(&[]);
        assert!(report.is_empty());
        report.emit("empty");
    }
}
