use tracing::info;

use crate::app::App;

/// Manual connectivity check, the "Test API Connection" diagnostic.
pub async fn health_handler(app: &App) -> String {
    info!("Health check requested");

    let base_url = app.controller().client().base_url().to_string();
    let healthy = app.check_health().await;

    info!(base_url = %base_url, healthy = healthy, "Health check completed");

    if healthy {
        "API Test: healthy\n".to_string()
    } else {
        format!("API Test Failed: no healthy OCR service at {}\n", base_url)
    }
}
