//! Version information

pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn format_version_info() -> String {
    format!("jwt-forge v{}", CURRENT_VERSION)
}
