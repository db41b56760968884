pub mod export;
pub mod handlers;

pub use export::{ExportError, ExportFormat, export_to_path, unique_entries, write_export};
pub use handlers::{ApiError, AppState, router};
