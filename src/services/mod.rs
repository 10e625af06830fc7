pub mod api_client;
pub mod classifier;
pub mod debounce;
pub mod fs_service;
pub mod history_query;
pub mod localization;
pub mod preview;
pub mod report;
pub mod transport;
pub mod upload_session;
