//! Integration tests for composition export (composer-renderer).
//!
//! Drives a real editor session through the two-step export and checks what
//! ends up in the flattened output.

use std::io::Cursor;

use composer_core::{EditorSession, ElementRef, SceneRenderer};
use composer_renderer::export::SELECTION_COLOR;
use composer_renderer::{ExportFormat, RendererConfig, SvgRenderer};

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 255, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

fn renderer(format: ExportFormat) -> SvgRenderer {
    SvgRenderer::new(RendererConfig {
        format,
        load_system_fonts: false,
        ..RendererConfig::default()
    })
}

fn session_with_content() -> EditorSession {
    let mut session = EditorSession::default();
    session.upload_background(&png(160, 90)).expect("decode");
    session.add_sticker("data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciLz4=");
    session.set_text_content("Caption");
    session
}

// ==========================================================================
// Export sequencing
// ==========================================================================

#[test]
fn test_export_output_has_no_selection_artifacts() {
    let mut session = session_with_content();
    let mut renderer = renderer(ExportFormat::Svg);

    let live = renderer.render_to_svg(&composer_core::RenderFrame::from_document(
        session.document(),
    ));
    assert!(live.contains(SELECTION_COLOR));

    session.prepare_for_export().expect("ready");
    let image = session
        .run_deferred(&mut renderer)
        .expect("capture queued")
        .expect("capture succeeded");

    let svg = String::from_utf8(image.bytes).expect("utf-8 svg");
    assert!(!svg.contains(SELECTION_COLOR));
    assert!(svg.contains("Caption"));
    assert!(svg.contains("data:image/png;base64,"));
    assert_eq!(image.file_name, "composition_160x90.svg");
    assert_eq!(renderer.transformer(), None);
}

#[test]
fn test_png_export_matches_canvas_size() {
    let mut session = session_with_content();
    let mut renderer = renderer(ExportFormat::Png);

    session.prepare_for_export().expect("ready");
    let image = session
        .run_deferred(&mut renderer)
        .expect("capture queued")
        .expect("capture succeeded");

    let decoded = image::load_from_memory(&image.bytes).expect("png decodes");
    assert_eq!(image::GenericImageView::dimensions(&decoded), (160, 90));
    assert_eq!(image.file_name, "composition_160x90.png");
}

#[test]
fn test_jpeg_export_file_name() {
    let mut session = session_with_content();
    let mut renderer = renderer(ExportFormat::Jpeg);

    session.prepare_for_export().expect("ready");
    let image = session
        .run_deferred(&mut renderer)
        .expect("capture queued")
        .expect("capture succeeded");
    assert_eq!(&image.bytes[0..2], &[0xFF, 0xD8]);
    assert!(image.file_name.ends_with(".jpg"));
}

#[test]
fn test_bmp_background_survives_raster_export() {
    let red = image::RgbImage::from_pixel(20, 10, image::Rgb([255, 0, 0]));
    let mut bmp = Cursor::new(Vec::new());
    red.write_to(&mut bmp, image::ImageFormat::Bmp)
        .expect("encode bmp");

    let mut session = EditorSession::default();
    session
        .upload_background(bmp.get_ref())
        .expect("bmp accepted");
    session.prepare_for_export().expect("ready");
    let image = session
        .run_deferred(&mut renderer(ExportFormat::Png))
        .expect("capture queued")
        .expect("capture succeeded");

    let decoded = image::load_from_memory(&image.bytes)
        .expect("png decodes")
        .to_rgba8();
    assert_eq!(decoded.dimensions(), (20, 10));
    assert_eq!(decoded.get_pixel(10, 5), &image::Rgba([255, 0, 0, 255]));
}

// ==========================================================================
// Transformer tracking
// ==========================================================================

#[test]
fn test_renderer_tracks_transformer_target() {
    let mut session = EditorSession::default();
    let mut renderer = renderer(ExportFormat::Svg);

    let id = session.add_sticker("/1.svg");
    session.run_deferred(&mut renderer);
    assert_eq!(renderer.transformer(), Some(ElementRef::sticker(id)));

    session.deselect_all();
    session.run_deferred(&mut renderer);
    assert_eq!(renderer.transformer(), None);
    assert_eq!(renderer.file_extension(), "svg");
}

#[test]
fn test_stacking_follows_z_order() {
    let mut session = EditorSession::default();
    let below = session.add_sticker("/below.svg");
    session.add_sticker("/above.svg");
    let renderer = renderer(ExportFormat::Svg);

    let frame = composer_core::RenderFrame::from_document(session.document());
    let svg = renderer.render_to_svg(&frame);
    assert!(svg.find("below.svg") < svg.find("above.svg"));

    session.select_sticker(below);
    let frame = composer_core::RenderFrame::from_document(session.document());
    let svg = renderer.render_to_svg(&frame);
    assert!(svg.find("above.svg") < svg.find("below.svg"));
}
