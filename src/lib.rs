pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

use commands::history::HistoryScreen;
use commands::upload::UploadScreen;
use config::DashboardConfig;
use error::AppError;
use services::api_client::ApiClient;
use std::sync::Arc;

/// Entry point for the shell: one HTTP client shared by every screen.
pub struct Dashboard {
    config: DashboardConfig,
    client: Arc<ApiClient>,
}

impl Dashboard {
    pub fn from_config(config: DashboardConfig) -> Result<Self, AppError> {
        let client = Arc::new(ApiClient::new(&config)?);
        tracing::info!(
            api = %client.base_url(),
            locale = ?config.locale,
            authenticated = config.auth_token.is_some(),
            "dashboard ready"
        );
        Ok(Self { config, client })
    }

    /// Reads the environment and installs logging before building the client.
    pub fn from_env() -> Result<Self, AppError> {
        let config = DashboardConfig::from_env()?;
        telemetry::init_tracing(&config.log_level);
        Self::from_config(config)
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn mount_upload(&self) -> UploadScreen {
        UploadScreen::mount(&self.config, self.client.clone())
    }

    /// Needs a running Tokio runtime for the search debounce task.
    pub fn mount_history(&self) -> HistoryScreen {
        HistoryScreen::mount(&self.config, self.client.clone())
    }
}
