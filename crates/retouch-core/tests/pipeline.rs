//! End-to-end behavior of the edit pipeline through the public API.

use retouch_core::decode::{decode_image, open};
use retouch_core::encode::{encode_image, export, ExportConfig, OutputFormat};
use retouch_core::{
    fit_geometry, recompute, EditError, EffectFilter, FlipMode, Image, ParameterChange,
    ParameterSet, PixelFormat,
};

fn photo(width: u32, height: u32) -> Image {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x * 255 / width.max(1)) as u8);
            pixels.push((y * 255 / height.max(1)) as u8);
            pixels.push(((x + y) * 13 % 256) as u8);
        }
    }
    Image::new(width, height, PixelFormat::Rgb8, pixels)
}

fn with(changes: &[ParameterChange]) -> ParameterSet {
    changes
        .iter()
        .fold(ParameterSet::new(), |p, c| p.with_change(*c))
}

#[test]
fn default_parameters_reproduce_the_original() {
    for format in [PixelFormat::Luma8, PixelFormat::Rgba8] {
        let original = Image::filled(11, 5, format, &vec![77; format.channels()]);
        assert_eq!(recompute(&original, &ParameterSet::new()).unwrap(), original);
    }
    let original = photo(31, 17);
    assert_eq!(recompute(&original, &ParameterSet::new()).unwrap(), original);
}

#[test]
fn brightness_change_replays_from_the_original() {
    let original = photo(24, 16);
    let mut params = with(&[
        ParameterChange::Rotate(90.0),
        ParameterChange::Flip(FlipMode::Horizontal),
        ParameterChange::Grayscale(true),
    ]);
    let first = recompute(&original, &params).unwrap();
    assert_eq!((first.width, first.height), (16, 24));
    assert_eq!(first.format, PixelFormat::Luma8);

    params.apply(ParameterChange::Brightness(1.4));
    let replayed = recompute(&original, &params).unwrap();
    assert_eq!((replayed.width, replayed.height), (16, 24));
    assert_eq!(replayed.format, PixelFormat::Luma8);

    // Brightening the already grayscaled result clips differently
    let patched = recompute(&first, &with(&[ParameterChange::Brightness(1.4)])).unwrap();
    assert_eq!((patched.width, patched.height), (16, 24));
    assert_ne!(replayed, patched);
}

#[test]
fn quarter_turn_and_back_is_lossless() {
    let original = photo(20, 20);
    let turned = recompute(&original, &with(&[ParameterChange::Rotate(90.0)])).unwrap();
    let back = recompute(&turned, &with(&[ParameterChange::Rotate(-90.0)])).unwrap();
    assert_eq!(back, original);
}

#[test]
fn arbitrary_rotation_and_back_keeps_content_centered() {
    let original = Image::filled(20, 20, PixelFormat::Rgb8, &[200, 200, 200]);
    let turned = recompute(&original, &with(&[ParameterChange::Rotate(30.0)])).unwrap();
    let back = recompute(&turned, &with(&[ParameterChange::Rotate(-30.0)])).unwrap();

    // The canvas grows on each turn but the image stays in the middle
    assert!(back.width >= original.width && back.height >= original.height);
    assert_eq!(back.pixel(back.width / 2, back.height / 2), &[200, 200, 200]);

    // Cropping the grown canvas back to a square restores the size within a pixel
    let margin = f64::from(back.width - original.width) / 2.0;
    let square = recompute(
        &turned,
        &with(&[ParameterChange::Rotate(-30.0), ParameterChange::Zoom(margin)]),
    )
    .unwrap();
    assert!(square.width.abs_diff(original.width) <= 1);
    assert!(square.height.abs_diff(original.height) <= 1);
    assert_eq!(square.pixel(square.width / 2, square.height / 2), &[200, 200, 200]);
}

#[test]
fn double_flip_and_double_invert_are_identities() {
    let original = photo(9, 7);
    for mode in [FlipMode::Horizontal, FlipMode::Vertical] {
        let once = recompute(&original, &with(&[ParameterChange::Flip(mode)])).unwrap();
        let twice = recompute(&once, &with(&[ParameterChange::Flip(mode)])).unwrap();
        assert_eq!(twice, original);
    }

    let invert = with(&[ParameterChange::Invert(true)]);
    let once = recompute(&original, &invert).unwrap();
    assert_eq!(recompute(&once, &invert).unwrap(), original);
}

#[test]
fn zoom_at_half_the_short_side_is_rejected() {
    let original = photo(40, 30);
    let result = recompute(&original, &with(&[ParameterChange::Zoom(15.0)]));
    assert!(matches!(result, Err(EditError::InvalidParameter(_))));

    let cropped = recompute(&original, &with(&[ParameterChange::Zoom(14.0)])).unwrap();
    assert_eq!((cropped.width, cropped.height), (12, 2));
}

#[test]
fn every_effect_runs() {
    let original = photo(12, 12);
    for effect in [
        EffectFilter::Emboss,
        EffectFilter::FindEdges,
        EffectFilter::Contour,
        EffectFilter::EdgeEnhance,
        EffectFilter::Denoise,
        EffectFilter::RemoveBackground,
    ] {
        let result = recompute(&original, &with(&[ParameterChange::Effect(effect)])).unwrap();
        assert_eq!((result.width, result.height), (12, 12), "{}", effect.label());
    }
}

#[test]
fn display_fit_examples() {
    let g = fit_geometry(1920, 1080, 800, 600).unwrap();
    assert_eq!((g.placement_width, g.placement_height), (800, 450));

    let g = fit_geometry(1000, 1000, 400, 800).unwrap();
    assert_eq!((g.placement_width, g.placement_height), (400, 400));
}

#[test]
fn png_export_and_reimport_is_pixel_identical() {
    let dir = tempfile::tempdir().unwrap();
    let original = photo(33, 21);

    let path = export(&original, dir.path(), "copy", "png", &ExportConfig::default()).unwrap();
    let reimported = open(&path).unwrap();

    assert_eq!(recompute(&reimported, &ParameterSet::new()).unwrap(), original);
}

#[test]
fn transparent_result_exports_to_png_but_not_jpeg() {
    let original = photo(10, 10);
    let keyed = recompute(
        &original,
        &with(&[ParameterChange::Effect(EffectFilter::RemoveBackground)]),
    )
    .unwrap();
    assert_eq!(keyed.format, PixelFormat::Rgba8);

    let png = encode_image(&keyed, OutputFormat::Png, &ExportConfig::default()).unwrap();
    assert_eq!(decode_image(&png).unwrap(), keyed);

    let dir = tempfile::tempdir().unwrap();
    let result = export(&keyed, dir.path(), "keyed", "jpg", &ExportConfig::default());
    assert!(result.is_err());
    assert!(!dir.path().join("keyed.jpg").exists());
}
