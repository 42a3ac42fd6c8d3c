//! Error types for the report pipeline
//!
//! Each stage has its own error enum; the pipeline wraps them with the
//! stage that produced them so callers can report a precise message.

use thiserror::Error;

/// Errors produced while loading and validating the input document
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("malformed JSON input: {0}")]
    MalformedInput(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Errors produced while serializing pages to PDF bytes
///
/// Missing source assets never reach this point; they degrade to
/// placeholder blocks upstream. An image that resolved but cannot be
/// encoded into the PDF is fatal: the layout already promised it.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to encode image '{path}' for embedding: {reason}")]
    EncodingFailure { path: String, reason: String },
}

/// Pipeline stages, used to tag wrapped errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Schema,
    Assets,
    Compose,
    Render,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Schema => "schema",
            Stage::Assets => "assets",
            Stage::Compose => "compose",
            Stage::Render => "render",
        }
    }
}

/// Top-level error returned by [`crate::generate`]
///
/// Only the schema and render stages can fail; asset resolution degrades
/// to warnings and composition is total.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("schema stage failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("render stage failed: {0}")]
    Render(#[from] RenderError),
}

impl PipelineError {
    /// The stage that produced the wrapped error
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Schema(_) => Stage::Schema,
            PipelineError::Render(_) => Stage::Render,
        }
    }
}

/// Result alias for schema loading
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result alias for PDF rendering
pub type RenderResult<T> = Result<T, RenderError>;
