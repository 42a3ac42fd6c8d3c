//! Report pipeline: raw JSON bytes in, PDF bytes plus warnings out
//!
//! Stateless; each invocation builds its own document model, asset
//! store and PDF writer, so independent reports can generate in
//! parallel as long as each asset lookup is safe for concurrent reads.

use log::{debug, info};

use crate::assets::{resolve, AssetLookup, AssetWarning};
use crate::compose::compose;
use crate::error::PipelineError;
use crate::render::render;
use crate::schema::load;

/// The finished report: a complete PDF plus per-screenshot warnings
///
/// Warnings list every screenshot that degraded to a placeholder; the
/// PDF itself already shows each of them as a placeholder block, so
/// nothing degrades silently.
#[derive(Debug)]
pub struct ReportArtifact {
    pub pdf: Vec<u8>,
    pub warnings: Vec<AssetWarning>,
}

/// Run the full pipeline: schema load, asset resolution, composition,
/// rendering
///
/// Schema and render failures abort with a [`PipelineError`] naming the
/// stage; missing assets never abort, they surface in
/// [`ReportArtifact::warnings`].
pub fn generate(raw: &[u8], lookup: &impl AssetLookup) -> Result<ReportArtifact, PipelineError> {
    let report = load(raw)?;
    debug!(
        "loaded report '{}' with {} tasks",
        report.title,
        report.tasks.len()
    );

    let enriched = resolve(report, lookup);
    let pages = compose(&enriched);
    let pdf = render(&pages)?;

    info!(
        "rendered {} pages, {} bytes, {} degraded screenshots",
        pages.len(),
        pdf.len(),
        enriched.warnings.len()
    );
    Ok(ReportArtifact {
        pdf,
        warnings: enriched.warnings,
    })
}
