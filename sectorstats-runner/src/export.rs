//! Tabular export: CSV, XLSX and Parquet artifacts, and reading them back.
//!
//! Every table is first built as a [`Table`] (headers plus typed cells) and then
//! rendered. CSV is the canonical format read by downstream stages; floats are
//! written with Rust's shortest round-trip formatting so a re-read is exact and
//! re-running a stage produces byte-identical files. Undefined statistics are
//! empty cells in every format.
//!
//! Stages never write a file directly. They collect every rendered output in
//! a [`PendingWrites`] and commit it once nothing is left that can fail to
//! render.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polars::prelude::*;
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sectorstats_core::correlation::CorrelationMatrix;
use sectorstats_core::data::raw_file::parse_date;
use sectorstats_core::domain::{BalancedDataset, DatasetError, QuarterBucket, SplitEvent};
use sectorstats_core::pivot::{PivotCell, PivotTable};
use sectorstats_core::stats::StatRow;

/// Excel's limit on worksheet names.
pub const MAX_SHEET_NAME: usize = 31;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("missing {path}. Run `sectorstats {run_first}` first")]
    MissingInput {
        path: String,
        run_first: &'static str,
    },

    #[error("{path} has no '{column}' column. Columns: {available:?}")]
    MissingColumn {
        path: String,
        column: String,
        available: Vec<String>,
    },

    #[error("{path} line {line}: {reason}")]
    Malformed {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("csv error: {0}")]
    Csv(String),

    #[error("xlsx error: {0}")]
    Xlsx(String),

    #[error("parquet error: {0}")]
    Parquet(String),

    #[error("json error: {0}")]
    Json(String),

    #[error("failed to write {path}: {reason}")]
    Write { path: String, reason: String },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

// ─── Table model ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// `None` and non-finite values render as an empty cell.
    Number(Option<f64>),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(Some(v)) if v.is_finite() => v.to_string(),
            Cell::Number(_) => String::new(),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(Some(v))
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        Cell::Number(v)
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Headers plus rows of cells, rendered identically to CSV and XLSX.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

fn date_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `Date,<company>...`
pub fn balanced_table(ds: &BalancedDataset) -> Table {
    let mut headers = vec!["Date".to_string()];
    headers.extend(ds.companies().iter().cloned());
    let rows = (0..ds.len())
        .map(|i| {
            let mut row = vec![Cell::Text(date_text(ds.dates()[i]))];
            row.extend(ds.columns().iter().map(|col| Cell::from(col[i])));
            row
        })
        .collect();
    Table { headers, rows }
}

/// Statistic headers after the optional `Quarter` and the `Company` column.
pub const STAT_HEADERS: [&str; 14] = [
    "N (days)",
    "Mean",
    "SD",
    "Median",
    "Mode",
    "Min",
    "Max",
    "Range",
    "Q1",
    "Q2 (Median)",
    "Q3",
    "IQR",
    "Coeff. of Variation (SD/Mean)",
    "Slope (per day)",
];

/// `[Quarter,]Company,N (days),Mean,...`; the `Quarter` column is present
/// when `quarterly` is set.
pub fn stats_table(rows: &[StatRow], quarterly: bool) -> Table {
    let mut headers = Vec::new();
    if quarterly {
        headers.push("Quarter".to_string());
    }
    headers.push("Company".to_string());
    headers.extend(STAT_HEADERS.map(String::from));

    let rows = rows
        .iter()
        .map(|r| {
            let s = &r.summary;
            let mut row = Vec::with_capacity(headers.len());
            if quarterly {
                row.push(Cell::Text(r.bucket.map(|b| b.label()).unwrap_or_default()));
            }
            row.push(Cell::Text(r.company.clone()));
            row.extend([
                Cell::Text(s.count.to_string()),
                s.mean.into(),
                s.sd.into(),
                s.median.into(),
                s.mode.into(),
                s.min.into(),
                s.max.into(),
                s.range.into(),
                s.q1.into(),
                s.q2.into(),
                s.q3.into(),
                s.iqr.into(),
                s.cv.into(),
                s.slope.into(),
            ]);
            row
        })
        .collect();
    Table { headers, rows }
}

/// `Quarter,<company>...`
pub fn pivot_table(p: &PivotTable) -> Table {
    let mut headers = vec!["Quarter".to_string()];
    headers.extend(p.companies.iter().cloned());
    let rows = p
        .buckets
        .iter()
        .zip(&p.values)
        .map(|(bucket, values)| {
            let mut row = vec![Cell::Text(bucket.label())];
            row.extend(values.iter().map(|v| Cell::from(*v)));
            row
        })
        .collect();
    Table { headers, rows }
}

/// Company-by-company matrix with the row labels in the first column.
pub fn correlation_table(m: &CorrelationMatrix) -> Table {
    let mut headers = vec![String::new()];
    headers.extend(m.companies.iter().cloned());
    let rows = m
        .companies
        .iter()
        .zip(&m.values)
        .map(|(name, values)| {
            let mut row = vec![Cell::Text(name.clone())];
            row.extend(values.iter().map(|v| Cell::from(*v)));
            row
        })
        .collect();
    Table { headers, rows }
}

/// `Company,Ticker,SplitDate,SplitRatio`
pub fn splits_table(events: &[SplitEvent]) -> Table {
    Table {
        headers: ["Company", "Ticker", "SplitDate", "SplitRatio"]
            .map(String::from)
            .to_vec(),
        rows: events
            .iter()
            .map(|e| {
                vec![
                    Cell::Text(e.company.clone()),
                    Cell::Text(e.symbol.clone()),
                    Cell::Text(date_text(e.date)),
                    e.ratio.into(),
                ]
            })
            .collect(),
    }
}

// ─── CSV ────────────────────────────────────────────────────────────

pub fn table_csv_bytes(table: &Table) -> Result<Vec<u8>, ExportError> {
    let to_err = |e: csv::Error| ExportError::Csv(e.to_string());
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&table.headers).map_err(to_err)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(Cell::render)).map_err(to_err)?;
    }
    wtr.into_inner()
        .map_err(|e| ExportError::Csv(format!("flush: {e}")))
}

// ─── XLSX ───────────────────────────────────────────────────────────

/// Truncate to Excel's sheet-name limit on a character boundary.
pub fn sheet_name(name: &str) -> String {
    name.chars().take(MAX_SHEET_NAME).collect()
}

/// One workbook, one sheet per `(name, table)` pair, in order.
pub fn workbook_bytes(sheets: &[(&str, &Table)]) -> Result<Vec<u8>, ExportError> {
    let to_err = |e: rust_xlsxwriter::XlsxError| ExportError::Xlsx(e.to_string());
    let mut workbook = Workbook::new();

    for (name, table) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name(name)).map_err(to_err)?;
        for (c, header) in table.headers.iter().enumerate() {
            sheet.write_string(0, c as u16, header).map_err(to_err)?;
        }
        for (r, row) in table.rows.iter().enumerate() {
            let r = (r + 1) as u32;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    Cell::Text(s) => {
                        sheet.write_string(r, c, s).map_err(to_err)?;
                    }
                    Cell::Number(Some(v)) if v.is_finite() => {
                        sheet.write_number(r, c, *v).map_err(to_err)?;
                    }
                    Cell::Number(_) => {}
                }
            }
        }
    }

    workbook.save_to_buffer().map_err(to_err)
}

// ─── Parquet ────────────────────────────────────────────────────────

/// Balanced dataset as a DataFrame: `Date` (Date dtype) plus one Float64 per company.
pub fn balanced_dataframe(ds: &BalancedDataset) -> Result<DataFrame, ExportError> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    let days: Vec<i32> = ds
        .dates()
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();

    let mut columns = vec![Column::new("Date".into(), days)
        .cast(&DataType::Date)
        .map_err(|e| ExportError::Parquet(format!("date cast: {e}")))?];
    for (name, values) in ds.companies().iter().zip(ds.columns()) {
        columns.push(Column::new(name.as_str().into(), values.clone()));
    }
    DataFrame::new(columns).map_err(|e| ExportError::Parquet(format!("dataframe creation: {e}")))
}

pub fn balanced_parquet_bytes(ds: &BalancedDataset) -> Result<Vec<u8>, ExportError> {
    let mut df = balanced_dataframe(ds)?;
    let mut buf = Vec::new();
    ParquetWriter::new(&mut buf)
        .finish(&mut df)
        .map_err(|e| ExportError::Parquet(format!("write parquet: {e}")))?;
    Ok(buf)
}

// ─── Manifest ───────────────────────────────────────────────────────

/// Sidecar describing a balanced dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub dataset_name: String,
    pub companies: Vec<String>,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub rows_in_window: usize,
    pub balanced_rows: usize,
    pub dropped_rows: usize,
    /// BLAKE3 of the canonical CSV bytes.
    pub csv_blake3: String,
}

pub fn manifest_bytes(manifest: &DatasetManifest) -> Result<Vec<u8>, ExportError> {
    serde_json::to_vec_pretty(manifest).map_err(|e| ExportError::Json(e.to_string()))
}

// ─── Staged writes ──────────────────────────────────────────────────

fn write_err(path: &Path, e: impl ToString) -> ExportError {
    ExportError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Every output of one stage, committed together.
///
/// [`commit`](Self::commit) checks every destination, writes all temporary
/// files, and only then renames them into place and deletes stale outputs.
/// Temporaries of an abandoned or failed commit are removed on drop.
#[derive(Debug, Default)]
pub struct PendingWrites {
    files: Vec<(PathBuf, Vec<u8>)>,
    /// `(temporary, destination)` for files already drawn to disk.
    staged: Vec<(PathBuf, PathBuf)>,
    removals: Vec<PathBuf>,
}

impl PendingWrites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: PathBuf, bytes: Vec<u8>) {
        self.files.push((path, bytes));
    }

    /// A file already rendered to `tmp` that belongs at `path`.
    pub fn add_staged(&mut self, tmp: PathBuf, path: PathBuf) {
        self.staged.push((tmp, path));
    }

    /// Delete `path` on commit, if present.
    pub fn remove(&mut self, path: PathBuf) {
        self.removals.push(path);
    }

    /// Destinations in the order they were added: in-memory files, then staged ones.
    pub fn destinations(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .map(|(p, _)| p.clone())
            .chain(self.staged.iter().map(|(_, p)| p.clone()))
            .collect()
    }

    /// Write everything, returning [`destinations`](Self::destinations).
    pub fn commit(mut self) -> Result<Vec<PathBuf>, ExportError> {
        let destinations = self.destinations();
        for path in destinations.iter().chain(&self.removals) {
            if path.is_dir() {
                return Err(write_err(path, "destination is a directory"));
            }
        }
        for path in &destinations {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
            }
        }

        for (path, bytes) in std::mem::take(&mut self.files) {
            let tmp = tmp_sibling(&path);
            self.staged.push((tmp.clone(), path.clone()));
            fs::write(&tmp, &bytes).map_err(|e| write_err(&path, e))?;
        }

        let staged = std::mem::take(&mut self.staged);
        for (i, (tmp, path)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(tmp, path) {
                for (rest, _) in &staged[i..] {
                    let _ = fs::remove_file(rest);
                }
                return Err(write_err(path, e));
            }
        }

        for path in &self.removals {
            match fs::remove_file(path) {
                Ok(()) => tracing::info!(path = %path.display(), "removed stale output"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(write_err(path, e)),
            }
        }
        Ok(destinations)
    }
}

impl Drop for PendingWrites {
    fn drop(&mut self) {
        for (tmp, _) in &self.staged {
            let _ = fs::remove_file(tmp);
        }
    }
}

// ─── Reading back ───────────────────────────────────────────────────

fn open_csv(path: &Path, run_first: &'static str) -> Result<csv::Reader<std::fs::File>, ExportError> {
    if !path.exists() {
        return Err(ExportError::MissingInput {
            path: path.display().to_string(),
            run_first,
        });
    }
    csv::Reader::from_path(path).map_err(|e| ExportError::Csv(e.to_string()))
}

fn headers_of(rdr: &mut csv::Reader<std::fs::File>) -> Result<Vec<String>, ExportError> {
    Ok(rdr
        .headers()
        .map_err(|e| ExportError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect())
}

/// Read the canonical balanced CSV and re-validate it.
pub fn read_balanced_csv(path: &Path) -> Result<BalancedDataset, ExportError> {
    let display = path.display().to_string();
    let mut rdr = open_csv(path, "balance")?;
    let headers = headers_of(&mut rdr)?;
    if headers.first().map(String::as_str) != Some("Date") {
        return Err(ExportError::MissingColumn {
            path: display,
            column: "Date".into(),
            available: headers,
        });
    }

    let companies: Vec<String> = headers[1..].to_vec();
    let mut dates = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); companies.len()];

    for (i, record) in rdr.records().enumerate() {
        let line = i + 2;
        let malformed = |reason: String| ExportError::Malformed {
            path: display.clone(),
            line,
            reason,
        };
        let record = record.map_err(|e| malformed(e.to_string()))?;
        let raw_date = record.get(0).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| malformed(format!("bad date '{raw_date}'")))?;
        dates.push(date);
        for (c, column) in columns.iter_mut().enumerate() {
            let raw = record.get(c + 1).unwrap_or_default().trim();
            let value = raw
                .parse::<f64>()
                .map_err(|_| malformed(format!("bad close '{raw}' for {}", companies[c])))?;
            column.push(value);
        }
    }

    Ok(BalancedDataset::new(dates, companies, columns)?)
}

fn column_index(headers: &[String], name: &str, path: &str) -> Result<usize, ExportError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| ExportError::MissingColumn {
            path: path.to_string(),
            column: name.to_string(),
            available: headers.to_vec(),
        })
}

fn optional_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `Mean` and `SD` cells of the quarterly statistics CSV, located by header name.
pub fn read_quarterly_pivot_cells(path: &Path) -> Result<(Vec<PivotCell>, Vec<PivotCell>), ExportError> {
    let display = path.display().to_string();
    let mut rdr = open_csv(path, "quarterly-stats")?;
    let headers = headers_of(&mut rdr)?;
    let quarter = column_index(&headers, "Quarter", &display)?;
    let company = column_index(&headers, "Company", &display)?;
    let mean = column_index(&headers, "Mean", &display)?;
    let sd = column_index(&headers, "SD", &display)?;

    let mut means = Vec::new();
    let mut sds = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let line = i + 2;
        let record = record.map_err(|e| ExportError::Malformed {
            path: display.clone(),
            line,
            reason: e.to_string(),
        })?;
        let label = record.get(quarter).unwrap_or_default();
        let bucket: QuarterBucket = label.parse().map_err(|e| ExportError::Malformed {
            path: display.clone(),
            line,
            reason: format!("{e}"),
        })?;
        let name = record.get(company).unwrap_or_default().to_string();
        means.push(PivotCell {
            bucket,
            company: name.clone(),
            value: optional_number(record.get(mean).unwrap_or_default()),
        });
        sds.push(PivotCell {
            bucket,
            company: name,
            value: optional_number(record.get(sd).unwrap_or_default()),
        });
    }
    Ok((means, sds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectorstats_core::stats::{full_period_stats, quarterly_stats};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "sectorstats_export_test_{}_{id}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dataset() -> BalancedDataset {
        BalancedDataset::new(
            vec![d(2023, 4, 27), d(2023, 4, 28), d(2023, 5, 2)],
            vec!["HCL".into(), "TCS".into()],
            vec![vec![1040.5, 1041.25, 1039.0], vec![3200.1, 3180.0, 3190.75]],
        )
        .unwrap()
    }

    #[test]
    fn balanced_csv_layout_and_float_format() {
        let bytes = table_csv_bytes(&balanced_table(&dataset())).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,HCL,TCS");
        assert_eq!(lines[1], "2023-04-27,1040.5,3200.1");
        assert_eq!(lines[3], "2023-05-02,1039,3190.75");
    }

    #[test]
    fn balanced_csv_reads_back_exactly() {
        let dir = temp_dir();
        let path = dir.join("balanced.csv");
        fs::write(&path, table_csv_bytes(&balanced_table(&dataset())).unwrap()).unwrap();
        assert_eq!(read_balanced_csv(&path).unwrap(), dataset());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_balanced_csv_names_the_balance_stage() {
        let dir = temp_dir();
        let err = read_balanced_csv(&dir.join("nope.csv")).unwrap_err();
        assert!(err.to_string().contains("sectorstats balance"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn balanced_csv_with_a_gap_is_rejected() {
        let dir = temp_dir();
        let path = dir.join("gap.csv");
        std::fs::write(&path, "Date,A,B\n2024-01-02,1,2\n2024-01-03,,3\n").unwrap();
        let err = read_balanced_csv(&path).unwrap_err();
        assert!(matches!(err, ExportError::Malformed { line: 3, .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn stats_table_headers_and_blank_cells() {
        let ds = BalancedDataset::new(
            vec![d(2023, 1, 2)],
            vec!["HCL".into()],
            vec![vec![100.0]],
        )
        .unwrap();
        let t = stats_table(&full_period_stats(&ds), false);
        assert_eq!(t.headers.len(), 15);
        assert_eq!(t.headers[0], "Company");
        assert_eq!(t.headers[14], "Slope (per day)");

        let text = String::from_utf8(table_csv_bytes(&t).unwrap()).unwrap();
        let row = text.lines().nth(1).unwrap();
        // N, Mean, SD(blank), Median, Mode(blank), ...
        assert!(row.starts_with("HCL,1,100,,100,,100,100,0,"));
        assert!(row.ends_with(",0,,"));

        let q = stats_table(&quarterly_stats(&ds), true);
        assert_eq!(q.headers[0], "Quarter");
        assert_eq!(q.rows[0][0], Cell::Text("2023_Q1".into()));
    }

    #[test]
    fn quarterly_csv_feeds_pivot_cells() {
        let dir = temp_dir();
        let path = dir.join("q.csv");
        let table = stats_table(&quarterly_stats(&dataset()), true);
        fs::write(&path, table_csv_bytes(&table).unwrap()).unwrap();

        let (means, sds) = read_quarterly_pivot_cells(&path).unwrap();
        assert_eq!(means.len(), 4);
        let q1_hcl = means
            .iter()
            .find(|c| c.company == "HCL" && c.bucket.label() == "2023_Q1")
            .unwrap();
        assert_eq!(q1_hcl.value, Some((1040.5 + 1041.25) / 2.0));
        let q2_tcs = sds
            .iter()
            .find(|c| c.company == "TCS" && c.bucket.label() == "2023_Q2")
            .unwrap();
        assert_eq!(q2_tcs.value, None);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn quarterly_csv_without_sd_column_is_rejected() {
        let dir = temp_dir();
        let path = dir.join("q.csv");
        std::fs::write(&path, "Quarter,Company,Mean\n2023_Q1,HCL,1\n").unwrap();
        let err = read_quarterly_pivot_cells(&path).unwrap_err();
        assert!(matches!(err, ExportError::MissingColumn { ref column, .. } if column == "SD"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sheet_names_are_truncated() {
        let long = "a".repeat(40);
        assert_eq!(sheet_name(&long).len(), MAX_SHEET_NAME);
        assert_eq!(sheet_name("2023_Q1"), "2023_Q1");
    }

    #[test]
    fn workbook_and_parquet_are_produced() {
        let t = balanced_table(&dataset());
        let xlsx = workbook_bytes(&[("Pooled", &t), ("2023_Q1", &t)]).unwrap();
        // XLSX is a zip archive
        assert_eq!(&xlsx[..2], b"PK");

        let parquet = balanced_parquet_bytes(&dataset()).unwrap();
        assert_eq!(&parquet[..4], b"PAR1");

        let df = balanced_dataframe(&dataset()).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn commit_writes_every_file_and_removes_stale_ones() {
        let dir = temp_dir();
        let stale = dir.join("old.csv");
        fs::write(&stale, "x\n").unwrap();

        let mut pending = PendingWrites::new();
        pending.add(dir.join("a/one.csv"), b"1\n".to_vec());
        pending.add(dir.join("two.csv"), b"2\n".to_vec());
        pending.remove(stale.clone());
        pending.remove(dir.join("never_existed.csv"));
        let written = pending.commit().unwrap();

        assert_eq!(written, vec![dir.join("a/one.csv"), dir.join("two.csv")]);
        assert_eq!(fs::read(dir.join("a/one.csv")).unwrap(), b"1\n");
        assert_eq!(fs::read(dir.join("two.csv")).unwrap(), b"2\n");
        assert!(!stale.exists());
        assert!(!dir.join("two.csv.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn blocked_destination_writes_nothing() {
        let dir = temp_dir();
        fs::create_dir_all(dir.join("out.parquet/inner")).unwrap();
        let stale = dir.join("old.csv");
        fs::write(&stale, "x\n").unwrap();

        let mut pending = PendingWrites::new();
        pending.add(dir.join("out.csv"), b"1\n".to_vec());
        pending.add(dir.join("out.parquet"), b"PAR1".to_vec());
        pending.remove(stale.clone());
        let err = pending.commit().unwrap_err();

        assert!(matches!(err, ExportError::Write { .. }));
        assert!(!dir.join("out.csv").exists());
        assert!(!dir.join("out.csv.tmp").exists());
        assert!(stale.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn dropped_pending_writes_remove_staged_files() {
        let dir = temp_dir();
        let tmp = dir.join("chart.tmp.png");
        fs::write(&tmp, b"png").unwrap();

        let mut pending = PendingWrites::new();
        pending.add_staged(tmp.clone(), dir.join("chart.png"));
        drop(pending);

        assert!(!tmp.exists());
        assert!(!dir.join("chart.png").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn splits_table_layout() {
        let t = splits_table(&[SplitEvent {
            company: "Wipro".into(),
            symbol: "WIPRO.NS".into(),
            date: d(2024, 1, 5),
            ratio: 2.0,
        }]);
        let text = String::from_utf8(table_csv_bytes(&t).unwrap()).unwrap();
        assert_eq!(text, "Company,Ticker,SplitDate,SplitRatio\nWipro,WIPRO.NS,2024-01-05,2\n");
    }
}
