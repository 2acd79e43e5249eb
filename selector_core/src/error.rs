use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while registering, parsing or invoking targets.
#[derive(Debug, Error)]
pub enum Error {
    /// Raw text could not be converted to the flag's element type
    #[error("invalid value {value:?} for '--{flag}': {reason}")]
    Conversion {
        flag: String,
        value: String,
        reason: String,
    },

    /// The selector flag named none of the known candidates
    #[error(
        "invalid choice {value:?} for '--{selector}' (possibly a typo?), expected one of: {}",
        candidates.join(", ")
    )]
    Selection {
        selector: String,
        value: String,
        candidates: Vec<String>,
    },

    #[error("no candidates were given for '--{0}'")]
    NoCandidates(String),

    /// A target read an argument that was never bound
    #[error("missing argument '{0}'")]
    MissingArgument(String),

    #[error("argument '{name}' holds {found}, which cannot be read as {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Parse(#[from] clap::Error),

    #[error(transparent)]
    Matches(#[from] clap::parser::MatchesError),

    #[error("failed to read signature file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse signature: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported signature file format '{0}', only .toml is supported")]
    UnsupportedFormat(PathBuf),

    #[error("invalid signature entry '{name}': {reason}")]
    InvalidSignature { name: String, reason: String },
}
