//! Root coordinator. Holds the single result/error slot and wires the upload
//! controller to the presenter.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::handlers;
use crate::models::{OcrResult, UploadFile};
use crate::presenter::{Clipboard, ResultPresenter};
use crate::services::{OcrClient, UploadController, UploadEvent};
use crate::ui;

pub const PROMPT: &str = "> ";

pub struct App {
    config: Config,
    controller: UploadController,
    presenter: ResultPresenter,
    result: Option<Arc<OcrResult>>,
    error: Option<String>,
    clipboard: Box<dyn Clipboard + Send>,
}

impl App {
    pub fn new(config: Config, client: OcrClient, clipboard: Box<dyn Clipboard + Send>) -> Self {
        let controller = UploadController::new(client, config.max_file_size_bytes());
        Self {
            config,
            controller,
            presenter: ResultPresenter::new(),
            result: None,
            error: None,
            clipboard,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn controller(&self) -> &UploadController {
        &self.controller
    }

    pub fn presenter(&self) -> &ResultPresenter {
        &self.presenter
    }

    pub fn result(&self) -> Option<&OcrResult> {
        self.result.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Hands a selection to the controller. A rejected selection leaves the
    /// slot untouched; an accepted one clears it for the new attempt.
    pub async fn submit(&mut self, paths: &[PathBuf]) -> AppResult<()> {
        self.controller.select(paths).await?;
        self.clear_slot();
        Ok(())
    }

    pub fn submit_file(&mut self, file: UploadFile) -> AppResult<()> {
        self.controller.begin(file)?;
        self.clear_slot();
        Ok(())
    }

    pub fn apply(&mut self, event: UploadEvent) {
        match event {
            UploadEvent::Succeeded(result) => {
                self.result = Some(result);
                self.error = None;
                self.presenter = ResultPresenter::new();
            }
            UploadEvent::Failed(message) => {
                self.error = Some(message);
                self.result = None;
            }
        }
    }

    /// Waits for the current attempt and applies its outcome.
    pub async fn wait_for_settlement(&mut self) -> Option<UploadEvent> {
        let event = self.controller.next_event().await?;
        self.apply(event.clone());
        Some(event)
    }

    /// "New Upload": back to Idle with an empty slot.
    pub fn reset(&mut self) -> AppResult<()> {
        self.controller.reset()?;
        self.clear_slot();
        info!("Session reset");
        Ok(())
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn clear_slot(&mut self) {
        self.result = None;
        self.error = None;
        self.presenter = ResultPresenter::new();
    }

    fn displayable_result(&self) -> Option<&OcrResult> {
        self.result().filter(|r| r.is_displayable())
    }

    pub fn copy(&mut self) -> Option<bool> {
        let result = self.result.as_ref().filter(|r| r.is_displayable())?;
        Some(self.presenter.copy(result, self.clipboard.as_mut()))
    }

    pub async fn download(&self, dir: Option<&Path>) -> AppResult<PathBuf> {
        let result = self
            .displayable_result()
            .ok_or_else(|| AppError::validation("No results to download"))?;
        let dir = dir.unwrap_or(&self.config.download_dir);
        self.presenter.download(result, dir).await
    }

    pub fn toggle_full_text(&mut self) -> Option<bool> {
        self.displayable_result()?;
        Some(self.presenter.toggle_full_text())
    }

    pub async fn check_health(&self) -> bool {
        self.controller.client().check_health().await
    }

    pub fn render(&self) -> String {
        let mut out = self.controller.render_intake();
        if let Some(error) = &self.error {
            out.push_str(&format!("\nError\n  {}\n  (type \"dismiss\" to close)\n", error));
        }
        if self.result.is_some() {
            out.push('\n');
            out.push_str(&self.presenter.render(self.result()));
        }
        out
    }

    /// Runs the interactive session until `quit` or end of input. An upload
    /// still in flight at end of input is awaited first.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        output.write_all(ui::header().as_bytes()).await?;
        output.write_all(self.render().as_bytes()).await?;
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let mut lines = input.lines();
        let mut input_open = true;

        loop {
            tokio::select! {
                line = lines.next_line(), if input_open => {
                    match line? {
                        Some(line) => {
                            let reply = handlers::handle_line(self, &line).await;
                            output.write_all(reply.output.as_bytes()).await?;
                            if reply.quit {
                                break;
                            }
                            output.write_all(PROMPT.as_bytes()).await?;
                        }
                        None => {
                            debug!("Input closed");
                            input_open = false;
                        }
                    }
                }
                Some(event) = self.controller.next_event() => {
                    self.apply(event);
                    output.write_all(b"\n").await?;
                    output.write_all(self.render().as_bytes()).await?;
                    if input_open {
                        output.write_all(PROMPT.as_bytes()).await?;
                    }
                }
            }
            output.flush().await?;

            if !input_open && !self.controller.is_in_flight() {
                break;
            }
        }

        output.flush().await?;
        Ok(())
    }
}
