pub mod api_types;
pub mod classify_types;
pub mod history_types;
pub mod view_types;
