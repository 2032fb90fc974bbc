//! Spreadsheet glue that turns workbook rows into [`InputRecord`]s.
//!
//! The core pipeline only requires an ordered sequence of flat records; this
//! module is the one external collaborator that produces it. The header row
//! of the worksheet maps column names to fields, so column order in the
//! workbook does not matter.

use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use thiserror::Error;
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::types::InputRecord;

const GROUP_NAME_COLUMN: &str = "groupname";
const GROUP_DESCRIPTION_COLUMN: &str = "group_description";
const LOCATION_NAME_COLUMN: &str = "locationname";
const LOCATION_ADDRESS_COLUMN: &str = "location_address";
const CITY_COLUMN: &str = "city";
const COUNTRY_COLUMN: &str = "country";
const USER_NAME_COLUMN: &str = "user_name";
const EMAIL_COLUMN: &str = "email";
const PHONE_NUMBER_COLUMN: &str = "phone_number";

/// Errors that can occur while reading the input workbook.
///
/// Any of these aborts the run before a single chunk is dispatched.
#[derive(Debug, Error)]
pub enum SourceReadError {
    /// The workbook could not be opened or the worksheet could not be read.
    #[error(transparent)]
    Workbook(#[from] calamine::Error),

    /// The workbook contains no sheets at all.
    #[error("the workbook contains no sheets")]
    NoSheets,

    /// The worksheet has no header row.
    #[error("the worksheet is empty")]
    EmptyWorksheet,

    /// A required column is missing from the header row.
    #[error("missing required column `{0}` in the header row")]
    MissingColumn(&'static str),
}

/// Reads an ordered sequence of [`InputRecord`]s from a workbook file.
#[derive(Debug, Clone)]
pub struct SpreadsheetSource {
    path: PathBuf,
    sheet: Option<String>,
}

impl SpreadsheetSource {
    /// Creates a source for the given workbook path.
    ///
    /// When `sheet` is `None` the first sheet in the workbook is read.
    pub fn new(path: impl AsRef<Path>, sheet: Option<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet,
        }
    }

    /// Reads and materializes all records, in worksheet order.
    ///
    /// Blank rows are skipped; everything else is fatal per
    /// [`SyncError::SourceRead`].
    pub fn read(&self) -> SyncResult<Vec<InputRecord>> {
        self.read_rows().map_err(|source| SyncError::SourceRead {
            path: self.path.clone(),
            source,
        })
    }

    fn read_rows(&self) -> Result<Vec<InputRecord>, SourceReadError> {
        let mut workbook = open_workbook_auto(&self.path)?;

        let sheet_name = match &self.sheet {
            Some(name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or(SourceReadError::NoSheets)?,
        };

        let range = workbook.worksheet_range(&sheet_name)?;
        let mut rows = range.rows();

        let header = rows.next().ok_or(SourceReadError::EmptyWorksheet)?;
        let columns = ColumnMap::from_header(header)?;

        let mut records = Vec::new();
        for row in rows {
            if let Some(record) = columns.record_from_row(row) {
                records.push(record);
            }
        }

        debug!(
            sheet = %sheet_name,
            records = records.len(),
            "materialized input records from worksheet"
        );

        Ok(records)
    }
}

/// Column indexes resolved from the worksheet header row.
#[derive(Debug)]
struct ColumnMap {
    group_name: usize,
    group_description: usize,
    location_name: usize,
    location_address: usize,
    city: usize,
    country: usize,
    user_name: usize,
    email: usize,
    phone_number: usize,
}

impl ColumnMap {
    fn from_header(header: &[Data]) -> Result<Self, SourceReadError> {
        let position = |name: &'static str| {
            header
                .iter()
                .position(|cell| cell_text(cell).eq_ignore_ascii_case(name))
                .ok_or(SourceReadError::MissingColumn(name))
        };

        Ok(Self {
            group_name: position(GROUP_NAME_COLUMN)?,
            group_description: position(GROUP_DESCRIPTION_COLUMN)?,
            location_name: position(LOCATION_NAME_COLUMN)?,
            location_address: position(LOCATION_ADDRESS_COLUMN)?,
            city: position(CITY_COLUMN)?,
            country: position(COUNTRY_COLUMN)?,
            user_name: position(USER_NAME_COLUMN)?,
            email: position(EMAIL_COLUMN)?,
            phone_number: position(PHONE_NUMBER_COLUMN)?,
        })
    }

    /// Builds a record from one data row. Returns `None` for blank rows.
    fn record_from_row(&self, row: &[Data]) -> Option<InputRecord> {
        let field = |index: usize| row.get(index).map(cell_text).unwrap_or_default();

        let record = InputRecord {
            group_name: field(self.group_name),
            group_description: field(self.group_description),
            location_name: field(self.location_name),
            location_address: field(self.location_address),
            city: field(self.city),
            country: field(self.country),
            user_name: field(self.user_name),
            email: field(self.email),
            phone_number: field(self.phone_number),
        };

        let blank = record.group_name.is_empty()
            && record.location_name.is_empty()
            && record.email.is_empty();
        (!blank).then_some(record)
    }
}

/// Renders one cell as trimmed text.
///
/// Numeric cells are common for phone numbers; integral floats are rendered
/// without the trailing `.0` the float formatting would add.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_owned(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string().trim().to_owned(),
    }
}
