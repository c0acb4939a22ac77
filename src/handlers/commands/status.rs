//! Health and configuration commands

use crate::config::Settings;
use crate::handlers::HandlerResult;
use crate::services::{ServiceFactory, ServiceFailure};
use crate::utils::errors::ErrorCategory;

/// Handle `health`
pub async fn handle_health(services: &ServiceFactory) -> HandlerResult {
    let status = services.health_check().await;

    println!(
        "Backend:  {} ({})",
        if status.backend_healthy { "up" } else { "down" },
        services.client.base_url()
    );
    if let Some(reported) = &status.backend_status {
        println!("Status:   {}", reported);
    }
    println!("Session:  {}", if status.authenticated { "logged in" } else { "none" });

    if status.is_healthy() {
        return Ok(());
    }
    Err(ServiceFailure {
        category: ErrorCategory::Network,
        message: status.get_issues().join("; "),
        should_redirect: false,
    })
}

/// Handle `config`
pub fn handle_config(settings: &Settings) -> HandlerResult {
    match settings.to_toml() {
        Ok(rendered) => {
            print!("{}", rendered);
            Ok(())
        }
        Err(e) => Err(ServiceFailure::from_error(&e, "config")),
    }
}
