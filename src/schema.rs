//! Schema loader: raw JSON bytes to a validated document model
//!
//! Parsing happens in two passes: `serde_json` turns the bytes into a
//! `Value`, then a single validation walk builds the typed model and
//! reports the first structural problem it meets, in document order,
//! with the full field path (e.g. `tasks[2].steps[0].actions`).
//!
//! Unknown fields are ignored everywhere so newer recorders keep
//! working against this loader.

use log::debug;
use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};
use crate::model::{Action, Annotation, Report, Screenshot, Step, Task};

/// Parse and validate an input document
///
/// Performs no I/O beyond the given bytes and never touches image files.
pub fn load(raw: &[u8]) -> SchemaResult<Report> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|e| SchemaError::MalformedInput(e.to_string()))?;
    parse_report(&value)
}

fn parse_report(value: &Value) -> SchemaResult<Report> {
    let root = as_object(value, "<document root>")?;

    let title = optional_str(root, "app")
        .unwrap_or("Unknown App")
        .to_string();
    let bundle = optional_str(root, "bundle").map(str::to_string);
    let version = optional_str(root, "app-version").map(str::to_string);

    let raw_tasks = require_array(root, "tasks", "")?;
    let mut tasks = Vec::with_capacity(raw_tasks.len());
    for (i, task) in raw_tasks.iter().enumerate() {
        tasks.push(parse_task(task, &format!("tasks[{i}]"))?);
    }

    Ok(Report {
        title,
        bundle,
        version,
        tasks,
    })
}

fn parse_task(value: &Value, path: &str) -> SchemaResult<Task> {
    let obj = as_object(value, path)?;

    let description = require_str(obj, "description", path)?.to_string();
    let id = optional_str(obj, "id").map(str::to_string);

    // Key iteration over a serde_json map is sorted, which keeps the
    // rendered table deterministic across runs.
    let prerequisites = obj
        .get("prereq-info")
        .and_then(|v| v.as_object())
        .map(|m| {
            m.iter()
                .map(|(k, v)| (k.clone(), stringify(v)))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let raw_steps = require_array(obj, "steps", path)?;
    let mut steps = Vec::with_capacity(raw_steps.len());
    for (i, step) in raw_steps.iter().enumerate() {
        steps.push(parse_step(step, &format!("{path}.steps[{i}]"))?);
    }

    Ok(Task {
        id,
        description,
        prerequisites,
        steps,
    })
}

fn parse_step(value: &Value, path: &str) -> SchemaResult<Step> {
    let obj = as_object(value, path)?;

    let description = require_str(obj, "description", path)?.to_string();
    let id = optional_str(obj, "id").map(str::to_string);

    let raw_actions = require_array(obj, "actions", path)?;
    let mut actions = Vec::with_capacity(raw_actions.len());
    for (i, action) in raw_actions.iter().enumerate() {
        actions.push(parse_action(action, &format!("{path}.actions[{i}]"))?);
    }

    Ok(Step {
        id,
        description,
        actions,
    })
}

fn parse_action(value: &Value, path: &str) -> SchemaResult<Action> {
    let obj = as_object(value, path)?;

    let kind = require_str(obj, "type", path)?.to_string();

    let params = obj
        .get("params")
        .and_then(|v| v.as_object())
        .map(|m| {
            m.iter()
                .map(|(k, v)| (k.clone(), stringify(v)))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let screenshot = match obj.get("screenshot") {
        Some(Value::String(p)) => Some(Screenshot {
            path: p.clone(),
            annotations: parse_annotations(obj, path),
        }),
        Some(other) => {
            return Err(SchemaError::InvalidValue {
                field: format!("{path}.screenshot"),
                reason: format!("expected string path, got {}", type_name(other)),
            })
        }
        None => None,
    };

    Ok(Action {
        kind,
        params,
        screenshot,
    })
}

fn parse_annotations(obj: &serde_json::Map<String, Value>, path: &str) -> Vec<Annotation> {
    let Some(items) = obj.get("annotations").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for item in items {
        match parse_annotation(item) {
            Some(a) => out.push(a),
            // Invalid or unknown annotations are dropped, never fatal.
            None => debug!("skipping unrecognized annotation under {path}"),
        }
    }
    out
}

fn parse_annotation(value: &Value) -> Option<Annotation> {
    let obj = value.as_object()?;
    let kind = obj.get("kind")?.as_str()?;
    let num = |key: &str| obj.get(key).and_then(|v| v.as_f64());

    match kind {
        "region" => Some(Annotation::Region {
            x: num("x")?,
            y: num("y")?,
            width: num("width")?,
            height: num("height")?,
            caption: obj
                .get("caption")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        }),
        "tap" => Some(Annotation::Tap {
            x: num("x")?,
            y: num("y")?,
        }),
        "swipe" => Some(Annotation::Swipe {
            start_x: num("startX")?,
            start_y: num("startY")?,
            end_x: num("endX")?,
            end_y: num("endY")?,
        }),
        _ => None,
    }
}

// ===== Path-aware accessors =====

fn as_object<'a>(value: &'a Value, path: &str) -> SchemaResult<&'a serde_json::Map<String, Value>> {
    value.as_object().ok_or_else(|| SchemaError::InvalidValue {
        field: path.to_string(),
        reason: format!("expected object, got {}", type_name(value)),
    })
}

fn require<'a>(
    obj: &'a serde_json::Map<String, Value>,
    key: &str,
    parent: &str,
) -> SchemaResult<&'a Value> {
    obj.get(key)
        .ok_or_else(|| SchemaError::MissingField(join(parent, key)))
}

fn require_str<'a>(
    obj: &'a serde_json::Map<String, Value>,
    key: &str,
    parent: &str,
) -> SchemaResult<&'a str> {
    let value = require(obj, key, parent)?;
    value.as_str().ok_or_else(|| SchemaError::InvalidValue {
        field: join(parent, key),
        reason: format!("expected string, got {}", type_name(value)),
    })
}

fn require_array<'a>(
    obj: &'a serde_json::Map<String, Value>,
    key: &str,
    parent: &str,
) -> SchemaResult<&'a Vec<Value>> {
    let value = require(obj, key, parent)?;
    value.as_array().ok_or_else(|| SchemaError::InvalidValue {
        field: join(parent, key),
        reason: format!("expected array, got {}", type_name(value)),
    })
}

fn optional_str<'a>(obj: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(|v| v.as_str())
}

fn join(parent: &str, key: &str) -> String {
    // Root fields are addressed as plain "tasks", everything below as
    // "tasks[i].steps" and so on.
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_str(s: &str) -> SchemaResult<Report> {
        load(s.as_bytes())
    }

    #[test]
    fn test_minimal_document() {
        let report = load_str(r#"{"tasks":[]}"#).unwrap();
        assert_eq!(report.title, "Unknown App");
        assert!(report.tasks.is_empty());
    }

    #[test]
    fn test_malformed_input() {
        let err = load_str("{not json").unwrap_err();
        assert!(matches!(err, SchemaError::MalformedInput(_)));
    }

    #[test]
    fn test_missing_tasks() {
        let err = load_str(r#"{"app":"Demo"}"#).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField(p) if p == "tasks"));
    }

    #[test]
    fn test_missing_steps_names_task_path() {
        let err = load_str(
            r#"{"tasks":[{"description":"ok","steps":[]},{"description":"broken"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::MissingField(p) if p == "tasks[1].steps"));
    }

    #[test]
    fn test_missing_action_type_names_full_path() {
        let err = load_str(
            r#"{"tasks":[{"description":"t","steps":[{"description":"s","actions":[{}]}]}]}"#,
        )
        .unwrap_err();
        assert!(
            matches!(err, SchemaError::MissingField(p) if p == "tasks[0].steps[0].actions[0].type")
        );
    }

    #[test]
    fn test_tasks_wrong_type() {
        let err = load_str(r#"{"tasks":"nope"}"#).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValue { field, .. } if field == "tasks"));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let report = load_str(
            r#"{"tasks":[{"description":"t","steps":[],"future-field":42}],"extra":true}"#,
        )
        .unwrap();
        assert_eq!(report.tasks.len(), 1);
    }

    #[test]
    fn test_full_action_with_annotations() {
        let report = load_str(
            r#"{"app":"Demo","bundle":"com.example","app-version":"1.2",
                "tasks":[{"id":"t1","description":"Login",
                    "prereq-info":{"user":"alice","pin":1234},
                    "steps":[{"description":"Enter credentials","actions":[
                        {"type":"tap","params":{"x":0.5},"screenshot":"login1.png",
                         "annotations":[
                            {"kind":"region","x":10,"y":20,"width":100,"height":50,"caption":"field"},
                            {"kind":"tap","x":0.4,"y":0.6},
                            {"kind":"swipe","startX":0.1,"startY":0.9,"endX":0.1,"endY":0.2},
                            {"kind":"sparkle","x":1}
                         ]}
                    ]}]}]}"#,
        )
        .unwrap();

        let task = &report.tasks[0];
        assert_eq!(task.prerequisites, vec![
            ("pin".to_string(), "1234".to_string()),
            ("user".to_string(), "alice".to_string()),
        ]);

        let action = &task.steps[0].actions[0];
        assert_eq!(action.kind, "tap");
        assert_eq!(action.param("x"), Some("0.5"));

        let shot = action.screenshot.as_ref().unwrap();
        assert_eq!(shot.path, "login1.png");
        // The unknown "sparkle" annotation is dropped.
        assert_eq!(shot.annotations.len(), 3);
        assert!(matches!(
            shot.annotations[0],
            Annotation::Region { caption: Some(ref c), .. } if c == "field"
        ));
    }

    #[test]
    fn test_screenshot_wrong_type() {
        let err = load_str(
            r#"{"tasks":[{"description":"t","steps":[{"description":"s","actions":[
                {"type":"tap","screenshot":7}]}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidValue { field, .. }
                if field == "tasks[0].steps[0].actions[0].screenshot"
        ));
    }
}
