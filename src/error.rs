/// Crate-level error types for texflat diagnostics.
use std::path::PathBuf;

/// All errors in texflat carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, path, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A source file could not be read during expansion.
    #[error("cannot read {}: {source}", path.display())]
    FileRead {
        /// Path that could not be read.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// Inclusion directives lead back to a file still being expanded.
    #[error("include cycle detected: {}", chain.iter().map(|p| return p.display().to_string()).collect::<Vec<_>>().join(" -> "))]
    IncludeCycle {
        /// Ordered chain of file paths forming the cycle.
        chain: Vec<PathBuf>,
    },

    /// Input and output arguments name the same file.
    #[error("input and output are the same file: {}", path.display())]
    InputIsOutput {
        /// The path both arguments resolve to.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of the run report failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// An inclusion directive matched no file on disk.
    #[error("unresolved include `{name}`: no candidate file exists")]
    UnresolvedInclude {
        /// The directive name as written in the source.
        name: String,
        /// Every candidate path that was tried, in resolution order.
        searched: Vec<PathBuf>,
    },

    /// The filesystem watcher could not be set up.
    #[error("watch setup failed: {reason}")]
    Watch {
        /// Description of the watcher failure.
        reason: String,
    },
}
