pub mod ocr_client;
pub mod upload_controller;

pub use ocr_client::OcrClient;
pub use upload_controller::{Settlement, UploadController, UploadEvent, UploadOutcome};
