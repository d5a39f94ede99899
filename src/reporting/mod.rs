pub mod formatter;
pub mod exporter;

pub use exporter::{export_report, render_report, sanitize_filename, ExportFormat};
