//! CSV persistence: append-only history, rewrite-in-place latest, and a
//! plain reader for the sheet tools.

use std::fs::{File, OpenOptions};
use std::path::Path;

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use tracing::debug;

use crate::error::Result;
use crate::types::SnapshotRow;

/// Append one row, writing the header first if the file does not exist yet.
pub fn append_row(path: &Path, row: &SnapshotRow) -> Result<()> {
    ensure_parent_dir(path)?;
    let file_exists = path.exists();

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .terminator(Terminator::CRLF)
        .from_writer(file);
    writer.serialize(row)?;
    writer.flush()?;

    debug!(path = %path.display(), header = !file_exists, "appended snapshot row");
    Ok(())
}

/// Replace the file with a header plus `rows`. Prior content is discarded.
pub fn write_latest(path: &Path, rows: &[SnapshotRow]) -> Result<()> {
    ensure_parent_dir(path)?;

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(file);
    // serde only emits the header alongside the first record
    if rows.is_empty() {
        writer.write_record(crate::types::OUT_FIELDS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = rows.len(), "rewrote latest snapshot");
    Ok(())
}

/// A CSV file split into its first record and the remaining records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Header followed by data, the shape a bulk sheet update takes.
    pub fn all_rows(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(self.header.clone());
        out.extend(self.rows.iter().cloned());
        out
    }
}

pub fn read_table(path: &Path) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = reader
        .records()
        .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect::<Vec<_>>()));

    let header = match records.next() {
        Some(h) => h?,
        None => return Ok(CsvTable::default()),
    };
    let rows = records.collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(CsvTable { header, rows })
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OUT_FIELDS;

    fn row(ts: &str, slug: &str, yes: f64) -> SnapshotRow {
        SnapshotRow {
            ts_utc: ts.to_string(),
            market_name: format!("Market {slug}"),
            market_slug: slug.to_string(),
            market_id: "42".to_string(),
            yes_token_id: "111".to_string(),
            no_token_id: "222".to_string(),
            yes_price: yes,
            no_price: 1.0 - yes,
            volume: "1000.5".to_string(),
            liquidity: String::new(),
        }
    }

    #[test]
    fn append_writes_header_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/dir/history.csv");

        append_row(&path, &row("2026-10-18T12:00:00+00:00", "a", 0.25)).expect("append");
        append_row(&path, &row("2026-10-18T12:00:00+00:00", "b", 0.5)).expect("append");

        let table = read_table(&path).expect("read");
        assert_eq!(table.header, OUT_FIELDS.to_vec());
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][2], "a");
        assert_eq!(table.rows[0][6], "0.25");
        assert_eq!(table.rows[0][7], "0.75");
        assert_eq!(table.rows[0][9], "");
        assert_eq!(table.rows[1][2], "b");

        let raw = std::fs::read_to_string(&path).expect("read raw");
        assert!(raw.starts_with("ts_utc,market_name,market_slug,market_id,"));
        assert_eq!(raw.matches("ts_utc").count(), 1);
        assert!(raw.ends_with("\r\n"));
    }

    #[test]
    fn append_to_existing_file_skips_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.csv");
        std::fs::write(&path, "").expect("touch");

        append_row(&path, &row("t", "a", 0.5)).expect("append");
        let raw = std::fs::read_to_string(&path).expect("read raw");
        assert!(!raw.contains("ts_utc"));
    }

    #[test]
    fn latest_is_fully_replaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("latest.csv");

        write_latest(&path, &[row("t1", "a", 0.1), row("t1", "b", 0.2)]).expect("write");
        write_latest(&path, &[row("t2", "c", 0.3)]).expect("write");

        let table = read_table(&path).expect("read");
        assert_eq!(table.header, OUT_FIELDS.to_vec());
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], "t2");
        assert_eq!(table.rows[0][2], "c");
    }

    #[test]
    fn latest_with_no_rows_is_header_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("latest.csv");

        write_latest(&path, &[]).expect("write");
        let table = read_table(&path).expect("read");
        assert_eq!(table.header, OUT_FIELDS.to_vec());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn read_empty_file_is_empty_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").expect("touch");

        let table = read_table(&path).expect("read");
        assert!(table.is_empty());
        assert_eq!(table.width(), 0);
    }

    #[test]
    fn read_handles_quoted_and_ragged_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b\n\"x, y\",2\n3\n").expect("write");

        let table = read_table(&path).expect("read");
        assert_eq!(table.header, vec!["a", "b"]);
        assert_eq!(
            table.rows,
            vec![vec!["x, y".to_string(), "2".to_string()], vec!["3".to_string()]]
        );
        assert_eq!(
            table.all_rows()[0],
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(read_table(&dir.path().join("absent.csv")).is_err());
    }
}
