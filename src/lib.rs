//! Task report PDF generation
//!
//! Turns a JSON description of a recorded app-testing session (tasks,
//! steps, actions, screenshots) into a paginated A4 PDF report with
//! embedded, annotated images, using the pdf-writer library.
//!
//! The pipeline is a pure transformation over four stages: schema
//! loading, asset resolution, page composition and PDF rendering. Image
//! storage stays behind the caller-supplied [`AssetLookup`] capability;
//! the library itself performs no filesystem access.
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! let json = br#"{"app":"Demo","tasks":[]}"#;
//! let assets: HashMap<String, Vec<u8>> = HashMap::new();
//! let artifact = task_report_pdf::generate(json, &assets)?;
//! std::fs::write("report.pdf", &artifact.pdf)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assets;
mod canvas;
pub mod compose;
mod encoding;
pub mod error;
mod images;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod schema;
mod text_layout;
pub mod types;

pub use assets::{resolve, AssetLookup, AssetWarning, DirLookup, EnrichedReport, ResolvedAsset};
pub use error::{PipelineError, RenderError, SchemaError, Stage};
pub use model::{Action, Annotation, Report, Screenshot, Step, Task};
pub use pipeline::{generate, ReportArtifact};
