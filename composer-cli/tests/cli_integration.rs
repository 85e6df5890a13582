//! End-to-end script runs against a temporary directory.

use std::path::{Path, PathBuf};

use composer_cli::{run, CliArgs, FormatArg};

fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([30, 120, 200, 255]));
    img.save(path).expect("write png");
}

fn args(script: PathBuf) -> CliArgs {
    CliArgs {
        script,
        config: None,
        output: None,
        format: FormatArg::Png,
        assets: None,
        print_document: false,
    }
}

#[test]
fn test_script_exports_png_next_to_script() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(&dir.path().join("photo.png"), 64, 48);
    let script = dir.path().join("actions.json");
    std::fs::write(
        &script,
        r##"{"actions": [
            {"action": "uploadBackground", "path": "photo.png"},
            {"action": "setText", "text": "Caption"},
            {"action": "changeStyle", "change": {"key": "fill", "value": "#ff0000"}},
            {"action": "export"}
        ]}"##,
    )
    .expect("write script");

    let report = run(&args(script)).expect("run succeeds");

    assert_eq!(report.actions, 4);
    assert_eq!(report.exports, vec![dir.path().join("composition_64x48.png")]);
    let exported = image::open(&report.exports[0]).expect("exported png decodes");
    assert_eq!(image::GenericImageView::dimensions(&exported), (64, 48));
}

#[test]
fn test_export_clears_selection_in_final_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(&dir.path().join("bg.png"), 20, 10);
    let script = dir.path().join("s.json");
    std::fs::write(
        &script,
        r#"{"actions": [
            {"action": "uploadBackground", "path": "bg.png"},
            {"action": "addSticker", "src": "/1.svg"},
            {"action": "export"}
        ]}"#,
    )
    .expect("write script");

    let mut cli = args(script);
    cli.output = Some(dir.path().join("out.svg"));
    let report = run(&cli).expect("run succeeds");

    let svg = std::fs::read_to_string(dir.path().join("out.svg")).expect("svg written");
    assert!(svg.starts_with("<svg") || svg.starts_with("<?xml"));
    let doc: serde_json::Value = serde_json::from_str(&report.document_json).expect("json");
    assert_eq!(doc["stickers"][0]["isSelected"], false);
}

#[test]
fn test_output_directory_uses_default_file_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("exports");
    std::fs::create_dir(&out).expect("mkdir");
    write_png(&dir.path().join("bg.png"), 12, 8);
    let script = dir.path().join("s.json");
    std::fs::write(
        &script,
        r#"{"actions": [
            {"action": "uploadBackground", "path": "bg.png"},
            {"action": "export"}
        ]}"#,
    )
    .expect("write script");

    let mut cli = args(script);
    cli.output = Some(out.clone());
    cli.format = FormatArg::Jpeg;
    let report = run(&cli).expect("run succeeds");

    // The format flag picks the renderer, the file name keeps the editor default.
    assert_eq!(report.exports.len(), 1);
    assert!(report.exports[0].starts_with(&out));
    let bytes = std::fs::read(&report.exports[0]).expect("export written");
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_config_file_changes_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"historyCapacity": 5}"#).expect("write config");
    let script = dir.path().join("s.json");
    std::fs::write(
        &script,
        r#"{"actions": [{"action": "setText", "text": "a"}]}"#,
    )
    .expect("write script");

    let mut cli = args(script);
    cli.config = Some(config);
    let report = run(&cli).expect("run succeeds");
    assert_eq!(report.actions, 1);
    assert!(report.exports.is_empty());
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"historyCapacity": 0}"#).expect("write config");
    let script = dir.path().join("s.json");
    std::fs::write(&script, r#"{"actions": []}"#).expect("write script");

    let mut cli = args(script);
    cli.config = Some(config);
    assert!(run(&cli).is_err());
}

#[test]
fn test_missing_background_file_fails_with_action_context() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("s.json");
    std::fs::write(
        &script,
        r#"{"actions": [{"action": "uploadBackground", "path": "nope.png"}]}"#,
    )
    .expect("write script");

    let err = run(&args(script)).expect_err("missing file");
    assert!(format!("{err:#}").contains("Action 0 failed"));
}
