//! Build metadata captured by `build.rs`

use regex::Regex;
use serde::Serialize;

/// Package version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Oldest toolchain this binary is supported on
pub const MIN_RUSTC_VERSION: RustcVersion = RustcVersion::new(1, 70, 0);

/// `rustc --version` output of the compiler that built this binary
pub fn rustc_version() -> &'static str {
    env!("STRATA_RUSTC_VERSION")
}

pub fn release_tag() -> &'static str {
    env!("STRATA_RELEASE_TAG")
}

pub fn commit_id() -> &'static str {
    env!("STRATA_COMMIT_ID")
}

pub fn build_timestamp() -> &'static str {
    env!("STRATA_BUILD_TIMESTAMP")
}

/// A `major.minor.patch` toolchain version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RustcVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl RustcVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// Extract the first `x.y.z` triple, e.g. from `rustc 1.78.0 (9b00956e5 2024-04-29)`
    pub fn parse(raw: &str) -> Option<Self> {
        let pattern = Regex::new(r"(\d+)\.(\d+)\.(\d+)").ok()?;
        let caps = pattern.captures(raw)?;
        Some(Self {
            major: caps[1].parse().ok()?,
            minor: caps[2].parse().ok()?,
            patch: caps[3].parse().ok()?,
        })
    }
}

impl std::fmt::Display for RustcVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Version details printed by the `version` command
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: String,
    pub release_tag: String,
    pub commit_id: String,
    pub build_timestamp: String,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION.to_string(),
            release_tag: release_tag().to_string(),
            commit_id: commit_id().to_string(),
            build_timestamp: build_timestamp().to_string(),
        }
    }
}
