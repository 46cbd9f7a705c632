//! Columnar historic data decoded from `historicdata.csv`.

use crate::core::domain::error::{PrtgError, PrtgResult};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Header of the timestamp column.
pub const DATE_TIME_COLUMN: &str = "Date Time";

/// Format of `sdate`/`edate` query parameters.
pub const REQUEST_DATE_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Format of "Date Time" cells once their range suffix is stripped.
pub const CSV_DATE_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Start or end of a historic data query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoricDate {
    At(NaiveDateTime),
    /// Sent as is; expected in `YYYY-MM-DD-HH-MM-SS` form.
    Formatted(String),
}

impl HistoricDate {
    pub(crate) fn to_param(&self) -> String {
        match self {
            HistoricDate::At(at) => at.format(REQUEST_DATE_FORMAT).to_string(),
            HistoricDate::Formatted(text) => text.clone(),
        }
    }
}

impl From<NaiveDateTime> for HistoricDate {
    fn from(at: NaiveDateTime) -> Self {
        HistoricDate::At(at)
    }
}

impl From<&str> for HistoricDate {
    fn from(text: &str) -> Self {
        HistoricDate::Formatted(text.to_string())
    }
}

impl From<String> for HistoricDate {
    fn from(text: String) -> Self {
        HistoricDate::Formatted(text)
    }
}

/// Cells of one column, in row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HistoricColumn {
    Timestamps(Vec<NaiveDateTime>),
    Values(Vec<String>),
}

impl HistoricColumn {
    pub fn len(&self) -> usize {
        match self {
            HistoricColumn::Timestamps(cells) => cells.len(),
            HistoricColumn::Values(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Historic data keyed by column header.
///
/// The "Date Time" column holds parsed timestamps, every other column the
/// raw cell text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoricData {
    headers: Vec<String>,
    columns: BTreeMap<String, HistoricColumn>,
}

impl HistoricData {
    /// Column headers in document order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column(&self, header: &str) -> Option<&HistoricColumn> {
        self.columns.get(header)
    }

    pub fn columns(&self) -> &BTreeMap<String, HistoricColumn> {
        &self.columns
    }

    /// The parsed "Date Time" column.
    pub fn timestamps(&self) -> Option<&[NaiveDateTime]> {
        match self.columns.get(DATE_TIME_COLUMN)? {
            HistoricColumn::Timestamps(cells) => Some(cells),
            HistoricColumn::Values(_) => None,
        }
    }

    /// Raw cells of a value column.
    pub fn values(&self, header: &str) -> Option<&[String]> {
        match self.columns.get(header)? {
            HistoricColumn::Values(cells) => Some(cells),
            HistoricColumn::Timestamps(_) => None,
        }
    }

    /// Number of data rows, i.e. the length of the longest column.
    ///
    /// Rows shorter than the header only fill their leading columns, so a
    /// trailing column can be shorter than this.
    pub fn len(&self) -> usize {
        self.columns.values().map(HistoricColumn::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes a `historicdata.csv` body.
    ///
    /// The first row is the header. Trailing rows whose "Date Time" cell is
    /// not a timestamp (the server's `Averages` and `Sums` lines) are dropped.
    /// A data row with fewer cells than headers fills the leading columns
    /// only; the columns it lacks stay one cell shorter.
    ///
    /// # Errors
    /// `PrtgError::MalformedDocument` for invalid CSV, a header that appears
    /// twice, a data row with more cells than headers, or a timestamp that
    /// does not parse inside the body.
    pub fn from_csv(body: &str) -> PrtgResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(body.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record
                .map_err(|e| PrtgError::malformed(format!("Invalid historic CSV: {}", e)))?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            rows.push(record);
        }

        let mut rows = rows.into_iter();
        let Some(header_row) = rows.next() else {
            return Ok(Self::default());
        };
        let header_row: Vec<String> = header_row.iter().map(|cell| cell.trim().to_string()).collect();
        let date_index = header_row.iter().position(|header| header == DATE_TIME_COLUMN);

        let mut body: Vec<csv::StringRecord> = rows.collect();
        while let Some(last) = body.last() {
            if !is_footer(last, date_index) {
                break;
            }
            debug!(row = ?last, "Dropping historic data footer row");
            body.pop();
        }

        let mut data = Self::default();
        for header in &header_row {
            if data.columns.contains_key(header) {
                return Err(PrtgError::malformed(format!(
                    "Historic data header '{}' appears twice",
                    header
                )));
            }
            let column = if header == DATE_TIME_COLUMN {
                HistoricColumn::Timestamps(Vec::new())
            } else {
                HistoricColumn::Values(Vec::new())
            };
            data.headers.push(header.clone());
            data.columns.insert(header.clone(), column);
        }

        for (line, row) in body.iter().enumerate() {
            if row.len() > header_row.len() {
                return Err(PrtgError::malformed(format!(
                    "Historic data row {} has {} cells for {} headers",
                    line + 2,
                    row.len(),
                    header_row.len()
                )));
            }
            for (header, cell) in header_row.iter().zip(row.iter()) {
                match data.columns.get_mut(header) {
                    Some(HistoricColumn::Timestamps(cells)) => {
                        let at = parse_timestamp(cell).ok_or_else(|| {
                            PrtgError::malformed(format!(
                                "Historic data row {} has an invalid date: {}",
                                line + 2,
                                cell
                            ))
                        })?;
                        cells.push(at);
                    }
                    Some(HistoricColumn::Values(cells)) => cells.push(cell.to_string()),
                    None => {}
                }
            }
        }
        Ok(data)
    }
}

/// Parses a "Date Time" cell such as `1/2/2024 10:00:00 AM - 10:05:00 AM`.
fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let start = match cell.find(" -") {
        Some(index) => &cell[..index],
        None => cell,
    };
    NaiveDateTime::parse_from_str(start.trim(), CSV_DATE_FORMAT).ok()
}

fn is_footer(row: &csv::StringRecord, date_index: Option<usize>) -> bool {
    match date_index {
        Some(index) => row.get(index).and_then(parse_timestamp).is_none(),
        None => row
            .get(0)
            .map(|cell| {
                let cell = cell.trim();
                cell.starts_with("Averages") || cell.starts_with("Sums")
            })
            .unwrap_or(false),
    }
}
