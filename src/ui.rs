use crate::errors::{AppError, AppResult};
use indicatif::{ProgressBar, ProgressStyle};

/// Creates a progress bar for a download stream.
///
/// When the server advertised a `Content-Length`, a byte-accurate bar is
/// shown; otherwise a spinner with a running byte counter is used.
///
/// # Arguments
///
/// * `total_bytes` - Advertised body size, if known
///
/// # Returns
///
/// Returns a configured `ProgressBar` ready for use, or an error if template creation fails.
pub fn create_download_bar(total_bytes: Option<u64>) -> AppResult<ProgressBar> {
    let pb = match total_bytes {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} {msg}",
                    )
                    .map_err(|e| {
                        AppError::IoError(format!("Failed to create progress bar template: {e}"))
                    })?
                    .progress_chars("#>-"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {bytes} {msg}")
                    .map_err(|e| {
                        AppError::IoError(format!("Failed to create progress bar template: {e}"))
                    })?,
            );
            pb
        }
    };
    Ok(pb)
}
