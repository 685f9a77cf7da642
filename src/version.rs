//! Build metadata shown by `apiusage --version`.
//!
//! Values are injected by `build.rs`; each falls back to "unknown".

use std::fmt;

/// Where and with what the binary was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub package_version: &'static str,
    pub commit: &'static str,
    pub date: &'static str,
    pub rustc: &'static str,
}

/// Metadata of the running binary.
pub const BUILD_INFO: BuildInfo = BuildInfo {
    package_version: env!("CARGO_PKG_VERSION"),
    commit: unknown_if_missing(option_env!("APIUSAGE_COMMIT_SHA")),
    date: unknown_if_missing(option_env!("APIUSAGE_BUILD_DATE")),
    rustc: unknown_if_missing(option_env!("APIUSAGE_RUSTC_VERSION")),
};

const fn unknown_if_missing(value: Option<&'static str>) -> &'static str {
    match value {
        Some(value) => value,
        None => "unknown",
    }
}

impl fmt::Display for BuildInfo {
    /// `apiusage {version} ({commit} {date}) rustc {rustc}`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "apiusage {} ({} {}) rustc {}",
            self.package_version, self.commit, self.date, self.rustc
        )
    }
}

/// Full version line.
pub fn version() -> String {
    BUILD_INFO.to_string()
}
