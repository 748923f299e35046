//! PDF OCR Client
//!
//! Submits a PDF or image to a remote OCR service, tracks the request, and
//! renders the extracted text in an interactive terminal session.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod presenter;
pub mod services;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
