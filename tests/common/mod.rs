#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};
use wallet_sim::data::Value;
use wallet_sim::workbook::{Fill, Sheet};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Builds a sheet whose first row holds `headers`.
pub fn sheet(headers: &[&str], rows: Vec<Vec<Value>>) -> Sheet {
    let mut sheet = Sheet::new("Sheet");
    sheet.push_values(headers.iter().map(|h| Value::from(*h)));
    for row in rows {
        sheet.push_values(row);
    }
    sheet
}

/// String cells from literals; `""` becomes an empty cell.
pub fn row(values: &[&str]) -> Vec<Value> {
    values
        .iter()
        .map(|v| {
            if v.is_empty() {
                Value::Empty
            } else {
                Value::from(*v)
            }
        })
        .collect()
}

pub fn fills(cells: &[wallet_sim::workbook::Cell]) -> Vec<Fill> {
    cells.iter().map(|cell| cell.fill).collect()
}

pub const RECORDS_CSV: &str = "\
ua,rs,dwm,lzd,amt,tc,chain,ibt,lbt
0xaaa,r1,10 / 20,5,100,4,eth,2024-03-01 10:00:00,2024-06-10 08:00:00
0xbbb,r2,10 / 20,5,100,4,eth,2023-03-01 11:00:00,2024-07-11 09:00:00
0xccc,r3,3 / 9,1,7,7,sol,2022-12-25 00:00:00,2022-12-31 00:00:00
";

pub const WALLETS_TXT: &str = "0xBBB\n0xaaa\n0xmissing\n0xccc\n";
