pub mod dashboard;

pub use dashboard::{ReportPaths, build_report};
