use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The header row lacks one or more of the required columns.
    #[error(
        "the file must contain the columns: {}; missing: {}",
        .required.join(", "),
        .missing.join(", ")
    )]
    Schema {
        required: Vec<String>,
        missing: Vec<String>,
    },

    /// A cell could not be parsed, the whole dataset is rejected.
    /// `line` is the 1-based line in the file, header included.
    #[error("could not parse {column} at line {line}: {value:?} ({reason})")]
    Parse {
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    #[error("only .csv files are accepted, got {0:?}")]
    Extension(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("chart generation error: {0}")]
    Chart(String),
}
