use std::fs;

use glitchify::{
    io::{load_buffer, save_buffer},
    GlitchConfig, GlitchError, Pipeline, PixelBuffer,
};
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn config_file_overrides_chances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("glitch.toml");
    fs::write(
        &path,
        r#"
[chances]
edge_detect = 0.0
quantize = 0.0
block_glitch = 0.0
vertical_shift = 0.0
scanlines = 1.0
noise = 0.0
channel_shift = 0.0

[scanlines]
spacing = 2
opacity = 0.5
"#,
    )
    .unwrap();

    let config = GlitchConfig::load(&path).unwrap();
    let pipeline = Pipeline::new(&config).unwrap();
    let input = PixelBuffer::filled(3, 4, [200, 100, 50, 255]).unwrap();
    let (out, applied) = pipeline.apply_traced(input, &mut StdRng::seed_from_u64(8));

    assert_eq!(applied, ["scanlines"]);
    assert_eq!(out.pixel(1, 0), [100, 50, 25, 255]);
    assert_eq!(out.pixel(1, 1), [200, 100, 50, 255]);
    assert_eq!(out.pixel(1, 2), [100, 50, 25, 255]);
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = GlitchConfig::load(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, GlitchError::Io(_)));
}

#[test]
fn glitched_image_survives_a_png_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("in.png");
    let output_path = dir.path().join("out.png");

    let source = PixelBuffer::from_fn(40, 30, |x, y| [(x * 6) as u8, (y * 8) as u8, 90, 255]).unwrap();
    save_buffer(source, &input_path).unwrap();

    let loaded = load_buffer(&input_path).unwrap();
    let glitched = glitchify::apply_glitch_pipeline(loaded, &mut StdRng::seed_from_u64(99));
    save_buffer(glitched.clone(), &output_path).unwrap();

    assert_eq!(load_buffer(&output_path).unwrap(), glitched);
}
