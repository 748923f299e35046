use tokio::io::{self, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_ocr_client::presenter::Osc52Clipboard;
use pdf_ocr_client::services::OcrClient;
use pdf_ocr_client::{App, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the session
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_ocr_client=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting PDF OCR client");
    tracing::info!("Max file size: {}MB", config.max_file_size_mb);

    let client = OcrClient::from_config(&config)?;
    let mut app = App::new(config, client, Box::new(Osc52Clipboard::stdout()));

    app.run(BufReader::new(io::stdin()), io::stdout()).await
}
