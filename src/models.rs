use crate::constants::MONTHS;
use crate::errors::{AppError, AppResult};
use chrono::NaiveDateTime;
use std::path::PathBuf;

/// Canonical form of a human-entered period.
///
/// Produced by [`crate::downloader::parse_period`]. A field left `None` means
/// the corresponding listing filter is skipped, not that parsing failed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Period {
    /// Four-digit year, e.g. "2024"
    pub year: Option<String>,
    /// Two-digit month number, e.g. "03"
    pub month_number: Option<String>,
    /// Lowercase Portuguese month name, e.g. "marco"
    pub month_name: Option<&'static str>,
}

impl Period {
    /// Concatenated `YYYYMM` filter key, available only when both the year
    /// and the month number were resolved.
    pub fn digit_key(&self) -> Option<String> {
        match (&self.year, &self.month_number) {
            (Some(year), Some(month)) => Some(format!("{year}{month}")),
            _ => None,
        }
    }

    /// Short label for log lines, e.g. "marco/2024".
    pub fn display_label(&self) -> String {
        let month = self
            .month_name
            .map(str::to_string)
            .or_else(|| self.month_number.clone())
            .unwrap_or_else(|| "?".to_string());
        let year = self.year.as_deref().unwrap_or("?");
        format!("{month}/{year}")
    }

    /// Looks up the Portuguese month name for a two-digit month number.
    pub(crate) fn month_name_for(number: &str) -> Option<&'static str> {
        MONTHS
            .iter()
            .find(|(num, _)| *num == number)
            .map(|(_, name)| *name)
    }
}

/// The candidate selected as the authoritative latest version, together with
/// the modification timestamp observed on its metadata probe (if the server
/// provided one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub link: String,
    pub last_modified: Option<NaiveDateTime>,
}

/// Outcome of a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Data file format recognized for downstream conversion.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileKind {
    Csv,
    Xlsx,
}

impl FileKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    /// Classifies a filename by its final extension segment.
    ///
    /// Only `.csv` and `.xlsx` files can be handed to the downstream
    /// conversion step; anything else is rejected up front.
    pub fn from_filename(filename: &str) -> AppResult<Self> {
        let extension = filename
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase();

        if extension.contains("csv") {
            Ok(Self::Csv)
        } else if extension.contains("xlsx") {
            Ok(Self::Xlsx)
        } else {
            Err(AppError::UnsupportedFileType(filename.to_string()))
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
