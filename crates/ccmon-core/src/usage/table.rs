//! Decoding of ccusage box-drawn tables into cleaned cells.

use once_cell::sync::Lazy;
use regex::Regex;

/// Column separator used by ccusage tables
pub const CELL_SEPARATOR: char = '│';

/// OSC sequences (hyperlinks, titles)
static OSC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)").unwrap());

/// CSI sequences and two-byte escapes (colors, cursor movement)
static ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").unwrap());

/// Remove terminal color/control sequences from a line.
pub fn strip_ansi(input: &str) -> String {
    let without_osc = OSC_RE.replace_all(input, "");
    ESCAPE_RE.replace_all(&without_osc, "").to_string()
}

/// One table line after escape removal and cell splitting.
///
/// Cell indexes follow the raw split, so index 0 is whatever precedes the
/// left border (normally empty) and the first column is index 1.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRow {
    /// The whole line with escapes removed
    pub text: String,
    /// Trimmed cells
    pub cells: Vec<String>,
}

impl DecodedRow {
    /// Number of split cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the line produced no cells at all
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at `index`, or "" when the row is too short
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    /// Whether the line contains a column separator at all
    pub fn is_table_line(&self) -> bool {
        self.text.contains(CELL_SEPARATOR)
    }

    /// Whether the cleaned line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }
}

/// Decode a single line into cleaned cells.
pub fn decode_row(line: &str) -> DecodedRow {
    let text = strip_ansi(line);
    let cells = text
        .split(CELL_SEPARATOR)
        .map(|cell| cell.trim().to_string())
        .collect();
    DecodedRow { text, cells }
}

/// Lazily decode every line of a report.
///
/// Double-ended, so callers can scan from the bottom for the most recent row.
pub fn decode_rows(text: &str) -> impl DoubleEndedIterator<Item = DecodedRow> + '_ {
    text.lines().map(decode_row)
}

/// Currency amount, optionally `$`-prefixed, thousands separators allowed
static COST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\s*(\d[\d,]*(?:\.\d+)?)").unwrap());

/// Interpret a cell as "no value" when empty or a `-` placeholder
pub fn non_placeholder(cell: &str) -> Option<&str> {
    match cell.trim() {
        "" | "-" | "--" | "…" => None,
        value => Some(value),
    }
}

/// Parse a token count such as `1,234`
pub fn parse_tokens(cell: &str) -> Option<u64> {
    let value = non_placeholder(cell)?;
    let digits: String = value.chars().filter(|c| *c != ',').collect();
    digits.parse().ok()
}

/// Parse a cost such as `$12.34` or `$1,024.50`
pub fn parse_cost(cell: &str) -> Option<f64> {
    let value = non_placeholder(cell)?;
    let caps = COST_RE.captures(value)?;
    let amount: String = caps[1].chars().filter(|c| *c != ',').collect();
    amount.parse().ok()
}
