//! Asset resolution: binding screenshot references to image bytes
//!
//! The resolver knows nothing about storage layout. Callers hand it an
//! [`AssetLookup`] capability; the CLI binds it to a directory, tests
//! usually use a plain `HashMap`. Every screenshot reference resolves to
//! exactly one [`ResolvedAsset`], present or missing. A missing asset is
//! never fatal: it becomes a placeholder downstream plus one entry in
//! the warnings list.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;

use crate::model::Report;

/// Read capability supplied by the caller
///
/// Implementations must be safe for concurrent reads if the surrounding
/// application runs pipelines in parallel.
pub trait AssetLookup {
    fn exists(&self, path: &str) -> bool;
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// In-memory lookup, mainly for tests and embedded use
impl AssetLookup for HashMap<String, Vec<u8>> {
    fn exists(&self, path: &str) -> bool {
        self.contains_key(path)
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no asset named {path}"))
        })
    }
}

/// Directory-backed lookup used by the CLI
///
/// A reference like `login1` is probed as `login1`, `login1.png`,
/// `login1.jpg`, `login1.jpeg`, first in the root directory and then in
/// an `images/` subdirectory, matching where recorders historically put
/// their files.
pub struct DirLookup {
    root: PathBuf,
}

impl DirLookup {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidates(&self, path: &str) -> Vec<PathBuf> {
        let mut out = Vec::new();
        for base in [self.root.clone(), self.root.join("images")] {
            let direct = base.join(path);
            if Path::new(path).extension().is_some() {
                out.push(direct);
            } else {
                for ext in ["png", "jpg", "jpeg"] {
                    out.push(direct.with_extension(ext));
                }
                out.push(direct);
            }
        }
        out
    }
}

impl AssetLookup for DirLookup {
    fn exists(&self, path: &str) -> bool {
        self.candidates(path).iter().any(|p| p.is_file())
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        for candidate in self.candidates(path) {
            if candidate.is_file() {
                return std::fs::read(candidate);
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no file found for {path} under {}", self.root.display()),
        ))
    }
}

/// Outcome of loading one screenshot reference
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedAsset {
    /// Bytes read through the lookup, dimensions from a decode probe
    Present {
        bytes: Vec<u8>,
        width: u32,
        height: u32,
    },
    Missing {
        reason: String,
    },
}

impl ResolvedAsset {
    pub fn is_present(&self) -> bool {
        matches!(self, ResolvedAsset::Present { .. })
    }
}

/// One degraded screenshot, reported alongside a successful PDF
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetWarning {
    pub path: String,
    pub reason: String,
}

/// A report plus every screenshot reference resolved
pub struct EnrichedReport {
    pub report: Report,
    assets: HashMap<String, ResolvedAsset>,
    pub warnings: Vec<AssetWarning>,
}

impl EnrichedReport {
    pub fn asset(&self, path: &str) -> Option<&ResolvedAsset> {
        self.assets.get(path)
    }
}

/// Resolve every screenshot reference in traversal order
///
/// Deterministic: the same report and asset content always produce the
/// same enrichment. Duplicate references share one entry and warn once.
pub fn resolve(report: Report, lookup: &impl AssetLookup) -> EnrichedReport {
    let mut assets = HashMap::new();
    let mut warnings = Vec::new();

    for path in report.screenshot_paths() {
        if assets.contains_key(path) {
            continue;
        }
        let resolved = resolve_one(path, lookup);
        if let ResolvedAsset::Missing { reason } = &resolved {
            warn!("screenshot {path} unavailable: {reason}");
            warnings.push(AssetWarning {
                path: path.to_string(),
                reason: reason.clone(),
            });
        }
        assets.insert(path.to_string(), resolved);
    }

    EnrichedReport {
        report,
        assets,
        warnings,
    }
}

fn resolve_one(path: &str, lookup: &impl AssetLookup) -> ResolvedAsset {
    if !lookup.exists(path) {
        return ResolvedAsset::Missing {
            reason: "not found in asset lookup".to_string(),
        };
    }

    let bytes = match lookup.read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            return ResolvedAsset::Missing {
                reason: format!("read failed: {e}"),
            }
        }
    };

    // Decode probe: bytes that do not decode degrade here instead of
    // failing later inside the renderer.
    match image::load_from_memory(&bytes) {
        Ok(img) => {
            use image::GenericImageView;
            let (width, height) = img.dimensions();
            debug!("resolved {path}: {width}x{height}, {} bytes", bytes.len());
            ResolvedAsset::Present {
                bytes,
                width,
                height,
            }
        }
        Err(e) => ResolvedAsset::Missing {
            reason: format!("decode failed: {e}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, Screenshot, Step, Task};

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([200, 10, 10]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn report_with_paths(paths: &[&str]) -> Report {
        let actions = paths
            .iter()
            .map(|p| Action {
                kind: "tap".to_string(),
                params: vec![],
                screenshot: Some(Screenshot {
                    path: p.to_string(),
                    annotations: vec![],
                }),
            })
            .collect();
        Report {
            title: "t".to_string(),
            bundle: None,
            version: None,
            tasks: vec![Task {
                id: None,
                description: "task".to_string(),
                prerequisites: vec![],
                steps: vec![Step {
                    id: None,
                    description: "step".to_string(),
                    actions,
                }],
            }],
        }
    }

    #[test]
    fn test_present_asset_carries_dimensions() {
        let mut lookup = HashMap::new();
        lookup.insert("shot.png".to_string(), png_bytes());

        let enriched = resolve(report_with_paths(&["shot.png"]), &lookup);
        assert!(enriched.warnings.is_empty());
        match enriched.asset("shot.png").unwrap() {
            ResolvedAsset::Present { width, height, .. } => {
                assert_eq!((*width, *height), (4, 3));
            }
            other => panic!("expected present asset, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_asset_warns_once() {
        let lookup: HashMap<String, Vec<u8>> = HashMap::new();
        let enriched = resolve(report_with_paths(&["gone.png", "gone.png"]), &lookup);

        assert_eq!(enriched.warnings.len(), 1);
        assert_eq!(enriched.warnings[0].path, "gone.png");
        assert!(!enriched.asset("gone.png").unwrap().is_present());
    }

    #[test]
    fn test_undecodable_bytes_degrade() {
        let mut lookup = HashMap::new();
        lookup.insert("bad.png".to_string(), b"definitely not an image".to_vec());

        let enriched = resolve(report_with_paths(&["bad.png"]), &lookup);
        assert_eq!(enriched.warnings.len(), 1);
        assert!(enriched.warnings[0].reason.contains("decode failed"));
    }

    #[test]
    fn test_dir_lookup_probes_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("shot1.jpeg"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images").join("nested.png"), b"y").unwrap();

        let lookup = DirLookup::new(dir.path());
        assert!(lookup.exists("shot1"));
        assert!(lookup.exists("nested"));
        assert!(lookup.exists("nested.png"));
        assert!(!lookup.exists("other"));
        assert_eq!(lookup.read("shot1").unwrap(), b"x");
    }
}
