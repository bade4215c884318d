//! Build metadata embedded at compile time.

use serde::Serialize;

/// Version, commit, and build time of this binary
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub build_time: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
            build_time: option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        }
    }
}
