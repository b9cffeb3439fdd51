use super::*;

use crate::render::frame::FrameRGBA;

fn frame(width: u32, height: u32, rgba: [u8; 4], duration_ms: u32) -> Frame {
    Frame {
        image: FrameRGBA {
            width,
            height,
            data: rgba.repeat((width * height) as usize),
            premultiplied: true,
        },
        duration_ms,
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("toonloop-sink-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn cfg(frame_count: u64) -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        loop_count: 0,
        frame_count,
    }
}

#[test]
fn in_memory_sink_collects_animation() {
    let mut sink = InMemorySink::new();
    sink.begin(SinkConfig {
        loop_count: 3,
        ..cfg(2)
    })
    .unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, [0, 0, 0, 255], 80))
        .unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 2, [9, 9, 9, 255], 70))
        .unwrap();
    sink.end().unwrap();

    assert_eq!(sink.frames().len(), 2);
    let anim = sink.into_animation().unwrap();
    assert_eq!(anim.loop_count, 3);
    assert_eq!(anim.durations_ms(), vec![80, 70]);
    assert_eq!(anim.total_duration_ms(), 150);
}

#[test]
fn out_of_order_frames_are_rejected() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 2, [0; 4], 80))
        .unwrap();
    assert!(sink.push_frame(FrameIndex(1), &frame(2, 2, [0; 4], 80)).is_err());
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2, [0; 4], 80)).is_err());
}

#[test]
fn unstarted_in_memory_sink_has_no_animation() {
    assert!(InMemorySink::new().into_animation().is_err());
}

#[test]
fn png_sequence_writes_frames_and_manifest() {
    let dir = scratch_dir("write");
    let anim = Animation {
        frames: vec![
            frame(2, 2, [128, 0, 0, 128], 80),
            frame(2, 2, [0, 255, 0, 255], 60),
        ],
        loop_count: 0,
        width: 2,
        height: 2,
    };
    let mut sink = PngSequenceSink::new(&dir);
    write_animation(&anim, &mut sink).unwrap();

    let first = image::open(dir.join("frame_0000.png")).unwrap().to_rgba8();
    assert_eq!(first.dimensions(), (2, 2));
    // Stored straight: premultiplied 128/128 becomes full red.
    assert_eq!(first.get_pixel(0, 0).0, [255, 0, 0, 128]);
    assert!(dir.join("frame_0001.png").exists());

    let manifest: SequenceManifest = serde_json::from_slice(
        &std::fs::read(dir.join(PngSequenceSink::MANIFEST)).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest.durations_ms, vec![80, 60]);
    assert_eq!(manifest.frames, vec!["frame_0000.png", "frame_0001.png"]);
    assert_eq!((manifest.width, manifest.height, manifest.loop_count), (2, 2, 0));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn png_sequence_rejects_wrong_size_and_missing_begin() {
    let dir = scratch_dir("size");
    let mut sink = PngSequenceSink::new(&dir);
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2, [0; 4], 80)).is_err());
    assert!(sink.end().is_err());

    sink.begin(cfg(1)).unwrap();
    assert!(sink.push_frame(FrameIndex(0), &frame(3, 2, [0; 4], 80)).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
