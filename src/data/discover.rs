use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use super::model::{Corner, SweepKind};

/// A result file whose name matched the corner scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File name as found on disk, e.g. `tt_0_27_Iin`.
    pub name: String,
    pub corner: Corner,
}

/// Result files found in a results directory, grouped by sweep kind.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub voltage: Vec<SourceFile>,
    pub input_current: Vec<SourceFile>,
}

/// List `dir` and classify every regular file by its name.
///
/// Names outside the scheme are skipped silently (logged at debug level).
/// Both groups are returned in lexicographic name order.
pub fn find_result_files(dir: &Path) -> Result<Discovery> {
    let mut found = Discovery::default();

    let entries =
        std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };

        match Corner::parse_file_name(&name) {
            Ok((corner, kind)) => {
                let file = SourceFile { path, name, corner };
                match kind {
                    SweepKind::Voltage => found.voltage.push(file),
                    SweepKind::InputCurrent => found.input_current.push(file),
                }
            }
            Err(e) => debug!("skipping {name}: {e}"),
        }
    }

    found.voltage.sort_by(|a, b| a.name.cmp(&b.name));
    found.input_current.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_and_sorts_result_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "tt_0_27",
            "ss_01_0",
            "ff_10_50_Iin",
            "tt_0_27.txt",
            "xx_0_27",
            "tt_99_27",
            "notes",
        ] {
            std::fs::write(dir.path().join(name), "a\tb\tc\n").unwrap();
        }
        std::fs::create_dir(dir.path().join("ff_0_0")).unwrap();

        let found = find_result_files(dir.path()).unwrap();
        let voltage: Vec<&str> = found.voltage.iter().map(|f| f.name.as_str()).collect();
        let current: Vec<&str> = found
            .input_current
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(voltage, ["ss_01_0", "tt_0_27"]);
        assert_eq!(current, ["ff_10_50_Iin"]);
        assert_eq!(found.input_current[0].corner.file_stem(), "ff_10_50");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_result_files(&dir.path().join("nope")).is_err());
    }
}
