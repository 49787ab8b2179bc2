use crate::table::RawTable;
use crate::Summary;
use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::Table;
use std::fmt;

/// The validation banner, exactly one is shown per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
    Warning(String),
}

impl Banner {
    pub fn validated() -> Banner {
        Banner::Success(String::from("file validated successfully"))
    }

    pub fn idle() -> Banner {
        Banner::Warning(String::from("please provide a CSV file to continue"))
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Banner::Success(m) => write!(f, "[ok] {}", m),
            Banner::Error(m) => write!(f, "[error] {}", m),
            Banner::Warning(m) => write!(f, "[warning] {}", m),
        }
    }
}

/// Render the header and the first `n` raw rows as a markdown-style table,
/// one line for the header, one rule, then one line per row.
pub fn preview_table(table: &RawTable, n: usize) -> String {
    let mut preview = Table::new();
    preview.load_preset(ASCII_MARKDOWN);
    preview.set_header(table.headers.iter());
    for record in table.preview(n).iter() {
        preview.add_row(record.iter());
    }
    let mut out = preview.to_string();
    out.push('\n');
    out
}

/// The two summary lines for the selected period.
pub fn summary_lines(summary: &Summary, currency: &str) -> [String; 2] {
    [summary.energy_line(), summary.cost_line(currency)]
}
