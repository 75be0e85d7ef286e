use std::borrow::Cow;
use std::path::Path;

use anyhow::{bail, Context, Result};

use super::model::SweepTable;

/// Column holding the swept variable.
pub const SWEEP_COLUMN: usize = 0;
/// Column holding the measured drain current (column 1 is a duplicate sweep
/// column in current-sweep exports and is ignored).
pub const CURRENT_COLUMN: usize = 2;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a simulator result table from a file.
///
/// The file must have a header row and at least three columns. Tabs are the
/// usual delimiter; comma- and whitespace-separated exports are accepted too.
pub fn load_sweep_table(path: &Path) -> Result<SweepTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_sweep_table(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Parse the textual contents of a result table.
pub fn parse_sweep_table(text: &str) -> Result<SweepTable> {
    let header = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .context("table is empty")?;

    let (delimiter, body) = match sniff_delimiter(header) {
        Delimiter::Byte(b) => (b, Cow::Borrowed(text)),
        Delimiter::Whitespace => (b'\t', Cow::Owned(collapse_whitespace(text))),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let n_columns = reader.headers().context("reading table header")?.len();
    if n_columns <= CURRENT_COLUMN {
        bail!("expected at least {} columns, found {n_columns}", CURRENT_COLUMN + 1);
    }

    let mut table = SweepTable::default();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        table.sweep.push(parse_cell(&record, SWEEP_COLUMN, row_no)?);
        table.current.push(parse_cell(&record, CURRENT_COLUMN, row_no)?);
    }

    if table.is_empty() {
        bail!("table has a header but no data rows");
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Byte(u8),
    Whitespace,
}

fn sniff_delimiter(header: &str) -> Delimiter {
    if header.contains('\t') {
        Delimiter::Byte(b'\t')
    } else if header.contains(',') {
        Delimiter::Byte(b',')
    } else if header.contains(';') {
        Delimiter::Byte(b';')
    } else {
        Delimiter::Whitespace
    }
}

/// Rewrite runs of spaces as single tabs so the csv reader can split them.
fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_cell(record: &csv::StringRecord, col: usize, row: usize) -> Result<f64> {
    let cell = record
        .get(col)
        .with_context(|| format!("row {row}: missing column {col}"))?;
    cell.parse::<f64>()
        .with_context(|| format!("row {row}, column {col}: '{cell}' is not a number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_tab_delimited_columns_zero_and_two() {
        let text = "v(out)\tv(out)\tid(m1a)\n0.0\t0.0\t1e-6\n0.1\t0.1\t2e-6\n";
        let table = parse_sweep_table(text).unwrap();
        assert_eq!(table.sweep, vec![0.0, 0.1]);
        assert_eq!(table.current, vec![1e-6, 2e-6]);
    }

    #[test]
    fn reads_whitespace_and_comma_variants() {
        let spaced = "sweep   dup   id\n 0.0   0.0   5e-6\n 0.5  0.5  6e-6\n";
        let table = parse_sweep_table(spaced).unwrap();
        assert_eq!(table.current, vec![5e-6, 6e-6]);

        let comma = "sweep,dup,id\n1,1,3\n";
        let table = parse_sweep_table(comma).unwrap();
        assert_eq!(table.sweep, vec![1.0]);
        assert_eq!(table.current, vec![3.0]);
    }

    #[test]
    fn rejects_narrow_or_malformed_tables() {
        assert!(parse_sweep_table("").is_err());
        assert!(parse_sweep_table("a\tb\n1\t2\n").is_err());
        assert!(parse_sweep_table("a\tb\tc\n").is_err());
        assert!(parse_sweep_table("a\tb\tc\n1\t2\tnope\n").is_err());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tt_0_27");
        std::fs::write(&path, "a\tb\tc\n0\t0\t1\n").unwrap();
        let table = load_sweep_table(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert!(load_sweep_table(&dir.path().join("missing")).is_err());
    }
}
