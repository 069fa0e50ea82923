//! Store <-> JSON document codec.
//!
//! # Responsibility
//! - Serialize the whole store into one indented JSON document.
//! - Deserialize a document back with best-effort, item-granular recovery.
//!
//! # Invariants
//! - File-level failures (malformed document, wrong root shape) are
//!   all-or-nothing; no partial state escapes them.
//! - Category- and item-level failures skip only the offending unit and are
//!   reported in-band as warnings.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod json_codec;

pub use json_codec::{
    decode_document, decode_store, encode_store, DecodedStore, LoadWarning,
};

pub type CodecResult<T> = Result<T, CodecError>;

/// Fatal codec failure; aborts the surrounding load or save.
#[derive(Debug)]
pub enum CodecError {
    /// The document is not valid JSON.
    Parse(serde_json::Error),
    /// The document parsed, but its root is not a JSON object.
    TopLevelNotObject,
    /// A record or the assembled document failed to serialize.
    Serialize {
        context: String,
        source: serde_json::Error,
    },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "document is not valid JSON: {err}"),
            Self::TopLevelNotObject => {
                write!(f, "document root must be a JSON object")
            }
            Self::Serialize { context, source } => {
                write!(f, "failed to serialize {context}: {source}")
            }
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::TopLevelNotObject => None,
            Self::Serialize { source, .. } => Some(source),
        }
    }
}
