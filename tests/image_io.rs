mod common;

use common::*;
use image::{Rgb, RgbImage};
use seedmatte::capture::{load_mask, FrameSource, ImageSequence};
use seedmatte::output::{OutputSink, PngSequence};

fn write_frames(dir: &std::path::Path, names: &[&str]) {
    for (i, name) in names.iter().enumerate() {
        RgbImage::from_pixel(5, 3, Rgb([i as u8 * 10, 0, 0]))
            .save(dir.join(name))
            .expect("Failed to save test frame");
    }
}

#[test]
fn sequence_reads_frames_in_name_order() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    // written out of order on purpose
    write_frames(dir.path(), &["b.png", "a.png", "c.png"]);
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let mut source = ImageSequence::open(dir.path()).unwrap();
    assert_eq!(source.len(), 3);
    assert_eq!(source.resolution(), (5, 3));

    let frames = source.read_all().unwrap();
    let ids: Vec<u8> = frames.iter().map(frame_id).collect();
    assert_eq!(ids, vec![10, 0, 20]);
    assert!(source.next_frame().unwrap().is_none());
}

#[test]
fn empty_directory_is_an_error() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    assert!(ImageSequence::open(dir.path()).is_err());
}

#[test]
fn png_sequence_numbers_frames() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let out_dir = dir.path().join("nested/out");
    let mut sink = PngSequence::new(&out_dir).unwrap();
    sink.write_all(&clip(3, 4, 2)).unwrap();

    assert_eq!(sink.frames_written(), 3);
    for i in 0..3 {
        let path = out_dir.join(format!("{i:05}.png"));
        let frame = image::open(&path).unwrap().to_rgb8();
        assert_eq!(frame_id(&frame), i as u8);
    }
}

#[test]
fn mask_loads_as_grayscale() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("mask.png");
    RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]))
        .save(&path)
        .unwrap();

    let mask = load_mask(&path).unwrap();
    assert_eq!(mask.dimensions(), (4, 4));
    assert!(mask.pixels().all(|p| p[0] == 255));
}

#[test]
fn files_round_trip_through_the_pipeline() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let frames_dir = dir.path().join("frames");
    std::fs::create_dir(&frames_dir).unwrap();
    for (i, frame) in clip(4, 6, 6).iter().enumerate() {
        frame.save(frames_dir.join(format!("{i:03}.png"))).unwrap();
    }

    let frames = ImageSequence::open(&frames_dir).unwrap().read_all().unwrap();
    let mut predictor = ScriptedPredictor::new();
    let out = MattingPipeline::new(MattingConfig::default(), ExecutionContext::cpu())
        .run(&mut predictor, &frames, &uniform_mask(6, 6, 255))
        .unwrap();

    let mut sink = PngSequence::new(dir.path().join("composites")).unwrap();
    sink.write_all(&out.composites).unwrap();
    assert_eq!(sink.frames_written(), 4);
}
