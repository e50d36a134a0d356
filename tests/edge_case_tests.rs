//! Edge case tests for range resolution, extraction and rendering


use hand_motion_analysis::{
    config::RenderConfig,
    dataset::ClipMetadata,
    keypoints::KeypointId,
    pipeline::{analyze, AnalysisRequest},
    render::{present, PlotRenderer},
    signal::{angle_series, distance_series, extract, trajectory, AnalysisMethod, AnglePolicy, Selection, Signal},
    summary::Statistics,
    time_range::{resolve, FrameRange, TimeRange},
};
use test_helpers::{linear_coordinates, place, zero_coordinates};

fn range(start: &str, end: &str) -> TimeRange {
    TimeRange::parse(start, end).unwrap()
}

#[test]
fn test_fractional_fps_truncates() {
    let clip = ClipMetadata::new("ntsc", 29.97, 1000).unwrap();
    let resolved = resolve(&range("0m1s", "0m10s"), &clip).unwrap();

    assert_eq!(resolved.frames, FrameRange::new(29, 299));
    assert_eq!(resolved.times.len(), 270);
    assert!((resolved.times[0] - 29.0 / 29.97).abs() < 1e-12);
}

#[test]
fn test_range_ending_exactly_at_clip_end() {
    let clip = ClipMetadata::new("c", 30.0, 300).unwrap();
    let resolved = resolve(&range("0m9s", "0m10s"), &clip).unwrap();

    assert_eq!(resolved.frames, FrameRange::new(270, 300));
    assert_eq!(resolved.available(clip.num_frames), resolved.frames);
    assert_eq!(resolved.times.len(), 30);
}

#[test]
fn test_range_starting_after_clip_end_is_empty() {
    let clip = ClipMetadata::new("c", 30.0, 60).unwrap();
    let coords = linear_coordinates(60);
    let request = AnalysisRequest::new(
        "c",
        range("0m5s", "0m6s"),
        AnalysisMethod::Angle,
        vec![KeypointId::THUMB_TIP, KeypointId::THUMB_IP, KeypointId::THUMB_MCP],
    );

    let analysis = analyze(&request, &clip, coords.view(), AnglePolicy::Raw).unwrap();
    assert_eq!(analysis.frames, FrameRange::new(150, 180));
    assert!(analysis.signal.is_empty());

    // An empty signal still renders
    let image = present(&mut PlotRenderer::default(), &analysis.signal).unwrap();
    assert_eq!(image.dimensions(), (1500, 400));
}

#[test]
fn test_missing_detections_propagate_as_nan() {
    let mut coords = zero_coordinates(4);
    for frame in 0..4 {
        place(&mut coords, frame, KeypointId::PINKY_TIP, 3.0, 4.0);
    }
    place(&mut coords, 2, KeypointId::THUMB_TIP, f64::NAN, f64::NAN);

    let distances = distance_series(coords.view(), FrameRange::new(0, 4), KeypointId::THUMB_TIP, KeypointId::PINKY_TIP);
    assert_eq!(distances.len(), 4);
    assert!(distances[2].is_nan());
    assert_eq!(distances[3], 5.0);

    let points = trajectory(coords.view(), FrameRange::new(0, 4), KeypointId::THUMB_TIP);
    assert!(points[2].0.is_nan() && points[2].1.is_nan());
    assert_eq!(points[1], (0.0, 0.0));

    let stats = Statistics::from_values(&distances).unwrap();
    assert_eq!(stats.count, 4);
    assert_eq!(stats.valid, 3);
    assert_eq!(stats.mean, 5.0);
}

#[test]
fn test_coincident_points_give_undefined_angle() {
    let mut coords = zero_coordinates(1);
    place(&mut coords, 0, KeypointId::THUMB_MCP, 0.0, 1.0);

    for policy in [AnglePolicy::Raw, AnglePolicy::Clamped] {
        let angles = angle_series(
            coords.view(),
            FrameRange::new(0, 1),
            (KeypointId::THUMB_TIP, KeypointId::THUMB_IP, KeypointId::THUMB_MCP),
            policy,
        );
        assert!(angles[0].is_nan(), "{policy:?} should leave 0/0 undefined");
    }
}

#[test]
fn test_straight_and_folded_angles() {
    let mut coords = zero_coordinates(2);
    // Straight finger
    place(&mut coords, 0, KeypointId::THUMB_TIP, 2.0, 0.0);
    place(&mut coords, 0, KeypointId::THUMB_MCP, -3.0, 0.0);
    // Fully folded
    place(&mut coords, 1, KeypointId::THUMB_TIP, 2.0, 0.0);
    place(&mut coords, 1, KeypointId::THUMB_MCP, 5.0, 0.0);

    let angles = angle_series(
        coords.view(),
        FrameRange::new(0, 2),
        (KeypointId::THUMB_TIP, KeypointId::THUMB_IP, KeypointId::THUMB_MCP),
        AnglePolicy::Clamped,
    );
    assert!((angles[0] - 180.0).abs() < 1e-9);
    assert!(angles[1].abs() < 1e-9);
}

#[test]
fn test_extract_time_axis_matches_values() {
    let clip = ClipMetadata::new("c", 25.0, 100).unwrap();
    let coords = linear_coordinates(100);
    let resolved = resolve(&range("0m1s", "0m3s"), &clip).unwrap();

    let signal = extract(
        coords.view(),
        resolved.frames,
        &Selection::Distance(KeypointId::WRIST, KeypointId::PINKY_TIP),
        &resolved.times,
        AnglePolicy::Raw,
    );
    let Signal::TimeSeries(series) = signal else {
        panic!("expected a time series");
    };
    assert_eq!(series.times.len(), series.values.len());
    assert_eq!(series.len(), 50);
    // Keypoints k and 0 are always 20 apart along x
    assert!(series.values.iter().all(|&d| (d - 20.0).abs() < 1e-12));
}

#[test]
fn test_flat_trajectory_bounds_render() {
    let coords = zero_coordinates(10);
    let request = AnalysisRequest::new("c", range("0m0s", "0m1s"), AnalysisMethod::Track, vec![KeypointId::WRIST]);
    let clip = ClipMetadata::new("c", 10.0, 10).unwrap();

    let analysis = analyze(&request, &clip, coords.view(), AnglePolicy::Raw).unwrap();
    let style = RenderConfig {
        trajectory_size: 64,
        margin: 4,
        ..RenderConfig::default()
    };
    let image = present(&mut PlotRenderer::new(style), &analysis.signal).unwrap();
    assert_eq!(image.dimensions(), (64, 64));
}
