//! Document model for a recorded testing session
//!
//! Built once by the schema loader and treated as read-only afterwards.
//! Ordering of tasks, steps and actions mirrors the input document and
//! is preserved all the way into the rendered PDF.

use serde::Serialize;

/// Root entity: one report per input document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// App name, used as the report title
    pub title: String,
    pub bundle: Option<String>,
    pub version: Option<String>,
    pub tasks: Vec<Task>,
}

/// One recorded app task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: Option<String>,
    pub description: String,
    /// Prerequisite key/value pairs, rendered as a table under the header
    pub prerequisites: Vec<(String, String)>,
    pub steps: Vec<Step>,
}

/// One unit of work within a task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub id: Option<String>,
    pub description: String,
    pub actions: Vec<Action>,
}

/// An atomic recorded interaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    /// Type tag, e.g. "tap", "swipe", "textEntry", "success"
    pub kind: String,
    /// Free-form parameters, stringified in key order
    pub params: Vec<(String, String)>,
    pub screenshot: Option<Screenshot>,
}

/// Reference to an image asset plus its overlay metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screenshot {
    /// Logical path, resolved through the caller-supplied asset lookup
    pub path: String,
    pub annotations: Vec<Annotation>,
}

/// Overlay drawn on top of an embedded screenshot
///
/// Region coordinates are image pixels; tap and swipe coordinates are
/// fractions of the image width/height in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Annotation {
    Region {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        caption: Option<String>,
    },
    Tap {
        x: f64,
        y: f64,
    },
    Swipe {
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
    },
}

impl Report {
    /// All screenshot paths in Report → Task → Step → Action traversal
    /// order, duplicates included
    pub fn screenshot_paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        for task in &self.tasks {
            for step in &task.steps {
                for action in &step.actions {
                    if let Some(shot) = &action.screenshot {
                        paths.push(shot.path.as_str());
                    }
                }
            }
        }
        paths
    }
}

impl Action {
    /// Look up a stringified parameter by key
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
