//! Renders a settled OCR result and handles the copy, download and preview
//! actions. Only UI state lives here; the result is never modified.

pub mod clipboard;
pub mod format;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info};

use crate::error::AppResult;
use crate::models::OcrResult;

pub use clipboard::{Clipboard, MemoryClipboard, Osc52Clipboard};
pub use format::{download_file_name, format_count, format_size, preview_text, Preview};

pub const COPIED_FLAG_DURATION: Duration = Duration::from_secs(2);
pub const PAGE_PREVIEW_MAX_LINES: usize = 6;
pub const EMPTY_STATE: &str = "No results to display";
pub const TRUNCATION_HINT: &str =
    "Showing first 500 characters. Type \"full\" to see complete content.";

#[derive(Debug, Default)]
pub struct ResultPresenter {
    show_full_text: bool,
    copied_until: Option<Instant>,
}

impl ResultPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_full_text(&self) -> bool {
        self.show_full_text
    }

    pub fn toggle_full_text(&mut self) -> bool {
        self.show_full_text = !self.show_full_text;
        self.show_full_text
    }

    /// True for two seconds after a successful copy.
    pub fn is_copied(&self) -> bool {
        self.copied_until
            .map(|until| Instant::now() < until)
            .unwrap_or(false)
    }

    /// Copies the full text. Failures are logged and leave the flag alone.
    pub fn copy(&mut self, result: &OcrResult, clipboard: &mut dyn Clipboard) -> bool {
        match clipboard.write_text(&result.full_text) {
            Ok(()) => {
                self.copied_until = Some(Instant::now() + COPIED_FLAG_DURATION);
                info!(characters = result.full_text.chars().count(), "Text copied to clipboard");
                true
            }
            Err(e) => {
                error!("Failed to copy text: {}", e);
                false
            }
        }
    }

    /// Saves the full text into `dir` under the derived download name.
    pub async fn download(&self, result: &OcrResult, dir: &Path) -> AppResult<PathBuf> {
        let path = dir.join(download_file_name(&result.filename));
        tokio::fs::write(&path, result.full_text.as_bytes()).await?;
        info!(path = %path.display(), bytes = result.full_text.len(), "Extracted text saved");
        Ok(path)
    }

    pub fn render(&self, result: Option<&OcrResult>) -> String {
        let result = match result {
            Some(result) if result.is_displayable() => result,
            _ => return format!("{}\n", EMPTY_STATE),
        };

        let mut out = String::new();
        let _ = writeln!(out, "Extraction Results                      [reset] New Upload");
        let _ = writeln!(out);

        let filename = if result.filename.is_empty() {
            "Unknown file"
        } else {
            result.filename.as_str()
        };
        let _ = writeln!(out, "  File: {}", filename);
        let _ = writeln!(
            out,
            "  {} | {} words | {} characters | {}",
            format::format_pages(result.page_count()),
            format_count(result.total_words),
            format_count(result.total_characters),
            format_size(result.total_characters)
        );
        let _ = writeln!(out);

        let copy_label = if self.is_copied() { "Copied!" } else { "Copy Text" };
        let toggle_label = if self.show_full_text { "Hide" } else { "Show" };
        let _ = writeln!(
            out,
            "  [copy] {}   [download] Download   [full] {} Full Text",
            copy_label, toggle_label
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Extracted Text");

        if let Some(pages) = result.pages.as_ref().filter(|pages| pages.len() > 1) {
            for page in pages {
                let _ = writeln!(
                    out,
                    "  --- Page {} ({} words, {} chars) ---",
                    page.page, page.word_count, page.character_count
                );
                if page.text.is_empty() {
                    let _ = writeln!(out, "  | No text detected on this page.");
                } else {
                    push_block(&mut out, &page.text, Some(PAGE_PREVIEW_MAX_LINES));
                }
            }
        }

        if self.show_full_text {
            let _ = writeln!(out, "  --- Complete Text ---");
            if result.full_text.is_empty() {
                let _ = writeln!(out, "  | No text extracted.");
            } else {
                push_block(&mut out, &result.full_text, None);
            }
        } else if !result.full_text.is_empty() {
            let preview = preview_text(&result.full_text);
            push_block(&mut out, &preview.display(), None);
            if preview.truncated {
                let _ = writeln!(out, "  {}", TRUNCATION_HINT);
            }
        }

        out
    }
}

fn push_block(out: &mut String, text: &str, max_lines: Option<usize>) {
    let lines: Vec<&str> = text.lines().collect();
    let shown = max_lines.unwrap_or(lines.len()).min(lines.len());
    for line in &lines[..shown] {
        let _ = writeln!(out, "  | {}", line);
    }
    if shown < lines.len() {
        let _ = writeln!(out, "  | ... ({} more lines)", lines.len() - shown);
    }
}
