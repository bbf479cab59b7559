//! Error types for SVG import.

use std::{io, path::PathBuf, result};

use kurbo::SvgParseError;

/// Errors that can occur while importing an SVG icon.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed SVG document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),

    #[error("SVG has neither a viewBox nor width/height")]
    NoViewport,

    #[error("invalid viewBox '{0}'")]
    InvalidViewBox(String),

    #[error("invalid length '{value}' in attribute '{attribute}'")]
    InvalidLength { attribute: String, value: String },

    #[error("invalid transform '{0}'")]
    InvalidTransform(String),

    #[error("invalid path data: {0}")]
    PathData(#[from] SvgParseError),

    #[error("<use> references unknown element '#{0}'")]
    UnresolvedReference(String),

    #[error("<use> reference cycle through '#{0}'")]
    ReferenceCycle(String),
}

pub type Result<T> = result::Result<T, Error>;
