use thiserror::Error;

use super::model::Field;

/// Problems with the shape of a listings file, as opposed to I/O failures.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("the first sheet of the workbook is empty")]
    EmptySheet,

    #[error("no header row found")]
    MissingHeader,

    #[error("required column '{}' not found (accepted names: {})", .0.column_names()[0], .0.column_names().join(", "))]
    MissingColumn(Field),

    #[error("expected a top-level array of records")]
    NotRecords,
}
