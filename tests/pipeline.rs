//! End-to-end tests for the report pipeline

use std::collections::HashMap;

use task_report_pdf::{generate, PipelineError, SchemaError, Stage};

const LOGIN_JSON: &[u8] = br#"{
    "app": "Demo App",
    "bundle": "com.example.demo",
    "app-version": "2.1",
    "tasks": [
        {
            "description": "Login",
            "steps": [
                {
                    "description": "Enter credentials",
                    "actions": [
                        {"type": "tap", "screenshot": "login1.png"}
                    ]
                }
            ]
        }
    ]
}"#;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageOutputFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Byte offset of a literal text string inside the PDF content
fn offset_of(pdf: &[u8], needle: &str) -> usize {
    let needle = needle.as_bytes();
    pdf.windows(needle.len())
        .position(|w| w == needle)
        .unwrap_or_else(|| panic!("PDF does not contain {:?}", String::from_utf8_lossy(needle)))
}

fn page_count(pdf: &[u8]) -> usize {
    let needle = b"/MediaBox";
    pdf.windows(needle.len()).filter(|w| w == needle).count()
}

#[test]
fn test_example_document_with_present_screenshot() {
    let mut assets = HashMap::new();
    assets.insert("login1.png".to_string(), png_bytes(120, 240));

    let artifact = generate(LOGIN_JSON, &assets).expect("pipeline should succeed");
    assert!(artifact.pdf.starts_with(b"%PDF-"));
    assert!(artifact.warnings.is_empty());

    // Cover page, then one task page.
    assert_eq!(page_count(&artifact.pdf), 2);

    // Cover content precedes the task, which precedes step and action.
    let cover = offset_of(&artifact.pdf, "Demo App");
    let task = offset_of(&artifact.pdf, "Task: Login");
    let step = offset_of(&artifact.pdf, "Step 1: Enter credentials");
    let action = offset_of(&artifact.pdf, "Action type:");
    assert!(cover < task, "cover should precede the task page");
    assert!(task < step);
    assert!(step < action);

    // The screenshot is embedded as an image XObject.
    let needle = b"/Image";
    assert!(artifact.pdf.windows(needle.len()).any(|w| w == needle));
}

#[test]
fn test_missing_screenshot_degrades_to_placeholder() {
    let assets: HashMap<String, Vec<u8>> = HashMap::new();

    let artifact = generate(LOGIN_JSON, &assets).expect("missing asset must not be fatal");

    assert_eq!(artifact.warnings.len(), 1);
    assert_eq!(artifact.warnings[0].path, "login1.png");

    // The placeholder names the reference in the page content.
    let placeholder = offset_of(&artifact.pdf, "login1.png");
    let step = offset_of(&artifact.pdf, "Step 1: Enter credentials");
    assert!(step < placeholder, "placeholder should sit at the action's position");
    offset_of(&artifact.pdf, "screenshot unavailable");
}

#[test]
fn test_missing_step_list_fails_before_rendering() {
    let json = br#"{"tasks": [{"description": "Broken"}]}"#;
    let assets: HashMap<String, Vec<u8>> = HashMap::new();

    let err = generate(json, &assets).unwrap_err();
    assert_eq!(err.stage(), Stage::Schema);
    match err {
        PipelineError::Schema(SchemaError::MissingField(path)) => {
            assert_eq!(path, "tasks[0].steps");
        }
        other => panic!("expected MissingField, got {other:?}"),
    }
}

#[test]
fn test_zero_tasks_produces_cover_only() {
    let json = br#"{"app": "Empty Session", "tasks": []}"#;
    let assets: HashMap<String, Vec<u8>> = HashMap::new();

    let artifact = generate(json, &assets).expect("empty report is valid");
    assert!(artifact.warnings.is_empty());
    assert_eq!(page_count(&artifact.pdf), 1);
    offset_of(&artifact.pdf, "Empty Session");
    offset_of(&artifact.pdf, "0 tasks recorded");
}

#[test]
fn test_generate_is_idempotent() {
    let mut assets = HashMap::new();
    assets.insert("login1.png".to_string(), png_bytes(32, 32));

    let first = generate(LOGIN_JSON, &assets).unwrap();
    let second = generate(LOGIN_JSON, &assets).unwrap();
    assert_eq!(first.pdf, second.pdf);
    assert_eq!(first.warnings, second.warnings);
}

#[test]
fn test_traversal_order_spans_tasks() {
    let json = br#"{
        "app": "Order Check",
        "tasks": [
            {"description": "Alpha", "steps": [
                {"description": "first move", "actions": [{"type": "tap"}]},
                {"description": "second move", "actions": [{"type": "type"}]}
            ]},
            {"description": "Beta", "steps": [
                {"description": "third move", "actions": [{"type": "wait"}]}
            ]}
        ]
    }"#;
    let assets: HashMap<String, Vec<u8>> = HashMap::new();

    let artifact = generate(json, &assets).unwrap();
    let a = offset_of(&artifact.pdf, "Task: Alpha");
    let s1 = offset_of(&artifact.pdf, "Step 1: first move");
    let s2 = offset_of(&artifact.pdf, "Step 2: second move");
    let b = offset_of(&artifact.pdf, "Task: Beta");
    let s3 = offset_of(&artifact.pdf, "Step 1: third move");
    assert!(a < s1 && s1 < s2 && s2 < b && b < s3);
}

#[test]
fn test_annotations_and_prerequisites_render() {
    let json = br#"{
        "app": "Annotated",
        "tasks": [
            {
                "id": "task-7",
                "description": "Checkout",
                "prereq-info": {"user": "alice", "cart": "2 items"},
                "steps": [
                    {"description": "Swipe to pay", "actions": [
                        {"type": "swipe", "params": {"duration": 0.3},
                         "screenshot": "pay.png",
                         "annotations": [
                            {"kind": "region", "x": 5, "y": 5, "width": 50, "height": 30, "caption": "pay button"},
                            {"kind": "tap", "x": 0.5, "y": 0.8},
                            {"kind": "swipe", "startX": 0.2, "startY": 0.9, "endX": 0.2, "endY": 0.1}
                         ]}
                    ]},
                    {"description": "Confirm", "actions": [
                        {"type": "success", "params": {"successDescription": "Order placed"}}
                    ]}
                ]
            }
        ]
    }"#;
    let mut assets = HashMap::new();
    assets.insert("pay.png".to_string(), png_bytes(200, 100));

    let artifact = generate(json, &assets).unwrap();
    assert!(artifact.warnings.is_empty());

    offset_of(&artifact.pdf, "Task id: task-7");
    offset_of(&artifact.pdf, "alice");
    offset_of(&artifact.pdf, "pay button");
    offset_of(&artifact.pdf, "Success Condition:");
    offset_of(&artifact.pdf, "Order placed");

    // Annotation strokes use the red annotation color.
    offset_of(&artifact.pdf, "0.8 0 0 RG");
}

#[test]
fn test_dir_lookup_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("login1.png"), png_bytes(16, 16)).unwrap();

    let lookup = task_report_pdf::DirLookup::new(dir.path());
    let artifact = generate(LOGIN_JSON, &lookup).unwrap();
    assert!(artifact.warnings.is_empty());
    assert_eq!(page_count(&artifact.pdf), 2);
}
