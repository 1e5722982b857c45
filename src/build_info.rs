//! Build-time information
//!
//! Metadata captured by the build script, used for the CLI version banner
//! and the startup log line.

/// Build timestamp (when the binary was compiled)
pub const BUILD_TIMESTAMP: &str = env!("VERGEN_BUILD_TIMESTAMP");

/// Cargo optimization level (0, 1, 2, 3, s, z)
pub const CARGO_OPT_LEVEL: &str = env!("VERGEN_CARGO_OPT_LEVEL");

/// Target triple (e.g., x86_64-unknown-linux-gnu, x86_64-apple-darwin)
pub const CARGO_TARGET_TRIPLE: &str = env!("VERGEN_CARGO_TARGET_TRIPLE");

/// Rust compiler version (e.g., 1.85.0)
pub const RUSTC_SEMVER: &str = env!("VERGEN_RUSTC_SEMVER");

/// Rust channel (stable, beta, or nightly)
pub const RUSTC_CHANNEL: &str = env!("VERGEN_RUSTC_CHANNEL");

/// Build version string
///
/// Format: `{crate_version} ({target_triple}-opt{opt_level})`
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_CARGO_TARGET_TRIPLE"),
    "-opt",
    env!("VERGEN_CARGO_OPT_LEVEL"),
    ")"
);

/// Detailed build info for `--version`
pub const DETAILED_INFO: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_CARGO_TARGET_TRIPLE"),
    "-opt",
    env!("VERGEN_CARGO_OPT_LEVEL"),
    ")\nBuilt: ",
    env!("VERGEN_BUILD_TIMESTAMP"),
    "\nRustc: ",
    env!("VERGEN_RUSTC_SEMVER"),
    " (",
    env!("VERGEN_RUSTC_CHANNEL"),
    ")"
);
