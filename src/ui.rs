//! Terminal chrome: the header banner and the busy spinner.

use std::time::Duration;

#[cfg(test)]
use indicatif::ProgressDrawTarget;
use indicatif::{ProgressBar, ProgressStyle};

pub const APP_TITLE: &str = "PDF OCR Tool";
pub const APP_SUBTITLE: &str = "Advanced Text Extraction";

pub fn header() -> String {
    let rule = "=".repeat(60);
    format!(
        "{rule}\n{APP_TITLE} - {APP_SUBTITLE}\n\
         Upload PDF files or images to extract text using OCR.\n{rule}\n"
    )
}

/// Spinner shown while an upload is in flight.
pub struct BusyIndicator {
    spinner: ProgressBar,
}

impl BusyIndicator {
    pub fn start(file_name: &str) -> Self {
        let spinner = ProgressBar::new_spinner().with_style(spinner_style());
        #[cfg(test)]
        spinner.set_draw_target(ProgressDrawTarget::hidden());
        spinner.set_prefix(file_name.to_owned());
        spinner.set_message("Processing your file...");
        spinner.enable_steady_tick(Duration::from_millis(120));
        Self { spinner }
    }

    pub fn finish(self) {
        self.spinner.finish_and_clear();
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix:.bold} {wide_msg}")
        .expect("spinner template is valid")
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
}
