use serde::Serialize;
use thiserror::Error;

/// Fatal extraction failures. A table that trips one of these does not follow
/// the layout convention, and later rows depend on earlier state, so the
/// document is abandoned instead of guessed at.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("row {row_index} of table {table_index} is unclassifiable: {text:?}")]
    UnclassifiableRow {
        table_index: usize,
        row_index: usize,
        text: String,
    },

    #[error("malformed header table: {reason}")]
    MalformedHeader { reason: String },

    #[error("row {row_index} has an unexpected column layout: {cells:?}")]
    UnexpectedColumnLayout { row_index: usize, cells: Vec<String> },

    #[error("failed to compile pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl ExtractError {
    pub(crate) fn malformed_header(reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            reason: reason.into(),
        }
    }

    /// Attaches the table ordinal once the stitcher knows it.
    pub(crate) fn in_table(self, table: usize) -> Self {
        match self {
            Self::UnclassifiableRow { row_index, text, .. } => Self::UnclassifiableRow {
                table_index: table,
                row_index,
                text,
            },
            other => other,
        }
    }
}

/// Recoverable findings, reported alongside the output instead of dropping
/// data silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractWarning {
    AlignmentMismatch {
        table_index: usize,
        row_index: usize,
        paragraph: String,
        field: String,
        tab_stop: Option<i64>,
    },
}

impl std::fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlignmentMismatch {
                table_index,
                row_index,
                paragraph,
                field,
                tab_stop,
            } => match tab_stop {
                Some(stop) => write!(
                    f,
                    "table {table_index} row {row_index}: field {field:?} at tab stop {stop} matches no reference stop (paragraph {paragraph:?})"
                ),
                None => write!(
                    f,
                    "table {table_index} row {row_index}: field {field:?} has no tab stop (paragraph {paragraph:?})"
                ),
            },
        }
    }
}
