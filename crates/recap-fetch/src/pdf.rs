//! PDF text extraction using `pdftotext` (poppler-utils).

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

use recap_core::defaults::EXTRACTION_CMD_TIMEOUT_SECS;
use recap_core::{Error, Result};

/// Page separator emitted by `pdftotext`.
const PAGE_BREAK: char = '\u{c}';

/// Default `pdftotext` program name, resolved through `PATH`.
pub const PDFTOTEXT: &str = "pdftotext";

/// Extract the text of every page of a PDF, in page order.
pub async fn extract_pdf_text(data: &[u8]) -> Result<String> {
    extract_pdf_text_with(PDFTOTEXT, data).await
}

/// Extract PDF text with an explicit `pdftotext` program.
///
/// The bytes are written to a temporary file because `pdftotext` reads from a
/// path. Each invocation is guarded by [`EXTRACTION_CMD_TIMEOUT_SECS`].
pub async fn extract_pdf_text_with(program: &str, data: &[u8]) -> Result<String> {
    if data.is_empty() {
        return Err(Error::Extraction(
            "Cannot extract text from empty PDF data".to_string(),
        ));
    }
    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::Extraction(
            "Response is not a valid PDF (missing %PDF header)".to_string(),
        ));
    }

    let mut tmpfile = NamedTempFile::new()
        .map_err(|e| Error::Internal(format!("Failed to create temp file: {}", e)))?;
    tmpfile
        .write_all(data)
        .map_err(|e| Error::Internal(format!("Failed to write temp file: {}", e)))?;
    let tmp_path = tmpfile.path().to_string_lossy().to_string();

    let raw = run_cmd_with_timeout(
        Command::new(program)
            .arg("-enc")
            .arg("UTF-8")
            .arg(&tmp_path)
            .arg("-"),
        EXTRACTION_CMD_TIMEOUT_SECS,
    )
    .await?;

    let pages = split_pages(&raw);
    debug!(page_count = pages.len(), bytes = data.len(), "Extracted PDF text");
    Ok(pages.join("\n"))
}

/// Split `pdftotext` output into trimmed, non-empty pages.
pub fn split_pages(raw: &str) -> Vec<String> {
    raw.split(PAGE_BREAK)
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run a command with a timeout, returning stdout as a string.
async fn run_cmd_with_timeout(cmd: &mut Command, timeout_secs: u64) -> Result<String> {
    let output = tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output())
        .await
        .map_err(|_| {
            Error::Extraction(format!("External command timed out after {}s", timeout_secs))
        })?
        .map_err(|e| Error::Extraction(format!("Failed to execute command: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Extraction(format!(
            "Command failed (exit {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Whether the `pdftotext` program can be run.
pub async fn pdftotext_available(program: &str) -> bool {
    match Command::new(program).arg("-v").output().await {
        // Exit code 99 on some poppler versions still means the binary exists.
        Ok(output) => output.status.success() || output.status.code() == Some(99),
        Err(_) => false,
    }
}
