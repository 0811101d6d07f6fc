//! Chunk routing and global slicing over a small real-world print fragment

use gcodetube_core::{LayerDetection, TubeConfig, Vec3};
use gcodetube_visualizer::{ChunkManager, LayerRange};

const RADIAL: usize = 5;

/// 14 emitted points: a lift, a travel, extrusions, a retraction and travels
const FOURTEEN_POINTS: &str = "
G1 Z5 F5000 ; lift nozzle
G0 X111.78 Y83.52 Z0.20 F9000
G1 X112.30 Y83.53 F1800 E0.0173
G1 X112.81 Y83.59 E0.0343

G1 X113.59 Y83.76 E0.0607
G1 X114.18 Y83.96 E0.0814
G1 X115.08 Y84.39 E0.1148
G1 X116.08 Y84.39 E0.1148

G1 X113.59 Y83.76 E0.0607
G1 X114.18 Y83.96 E0.0814
G1 X115.08 Y84.39 E0.1148
G1 X116.08 Y84.39 E0.1148

G1 X115.08 Y86.39 E0.1148
G1 X117.08 Y84.39 E0.1148
";

fn config(points_per_chunk: usize) -> TubeConfig {
    TubeConfig {
        radial_segments: RADIAL as u32,
        points_per_chunk,
        ..Default::default()
    }
}

/// Index count of `segments` ring pairs with or without the closing caps
fn count_expected(radial: usize, segments: usize, with_start: bool, with_end: bool) -> usize {
    let mut count = (radial + 1) * 6 * 2 * segments;
    if with_start {
        count += radial * 6;
    }
    if !with_end {
        count -= radial * 6;
    }
    count
}

async fn parsed(config: TubeConfig) -> ChunkManager {
    let mut manager = ChunkManager::new(FOURTEEN_POINTS, config).unwrap();
    manager.parse().await.unwrap();
    manager
}

fn index_counts(manager: &ChunkManager) -> Vec<usize> {
    manager.chunks().iter().map(|c| c.index_count()).collect()
}

#[tokio::test]
async fn test_fourteen_points_fit_one_chunk() {
    let manager = parsed(config(120_000)).await;

    assert_eq!(manager.chunks().len(), 1);
    assert_eq!(manager.points_count(), 14);
    assert_eq!(manager.chunks()[0].index_count(), count_expected(RADIAL, 13, true, true));
}

#[tokio::test]
async fn test_chunks_share_boundary_points() {
    let manager = parsed(config(4)).await;

    let local: Vec<usize> = manager.chunks().iter().map(|c| c.points_count()).collect();
    assert_eq!(local, vec![4, 5, 5, 3]);
    assert_eq!(manager.points_count(), 14);

    for pair in manager.chunks().windows(2) {
        assert_eq!(pair[0].last_point(), pair[1].points().first());
    }
}

#[tokio::test]
async fn test_unsliced_chunks_are_fully_indexed() {
    let manager = parsed(config(4)).await;

    assert_eq!(
        index_counts(&manager),
        vec![
            count_expected(RADIAL, 3, true, true),
            count_expected(RADIAL, 4, true, true),
            count_expected(RADIAL, 4, true, true),
            count_expected(RADIAL, 2, true, true),
        ]
    );
    assert_eq!(index_counts(&manager), vec![246, 318, 318, 174]);
}

#[tokio::test]
async fn test_full_range_slice_matches_unsliced() {
    let mut manager = parsed(config(4)).await;
    let unsliced = index_counts(&manager);

    manager.slice(Some(0), Some(14)).unwrap();
    assert_eq!(index_counts(&manager), unsliced);

    manager.slice(Some(3), Some(7)).unwrap();
    manager.slice(None, None).unwrap();
    assert_eq!(index_counts(&manager), unsliced);
}

#[tokio::test]
async fn test_window_across_two_chunks() {
    let mut manager = parsed(config(4)).await;

    // global 5..10 is local 2..5 of chunk 1 and local 0..3 of chunk 2
    manager.slice(Some(5), Some(10)).unwrap();

    assert_eq!(manager.chunks()[1].window(), (2, 5));
    assert_eq!(manager.chunks()[2].window(), (0, 3));
    assert_eq!(
        index_counts(&manager),
        vec![
            0,
            count_expected(RADIAL, 2, false, true),
            count_expected(RADIAL, 2, false, true),
            0
        ]
    );
}

#[tokio::test]
async fn test_window_inside_one_chunk() {
    let mut manager = parsed(config(4)).await;

    manager.slice(Some(4), Some(8)).unwrap();
    assert_eq!(manager.chunks()[1].window(), (1, 5));
    assert_eq!(index_counts(&manager), vec![0, count_expected(RADIAL, 3, false, true), 0, 0]);

    manager.slice(Some(0), Some(4)).unwrap();
    assert_eq!(index_counts(&manager), vec![246, 0, 0, 0]);
}

#[tokio::test]
async fn test_partial_first_chunk() {
    let mut manager = parsed(config(4)).await;

    manager.slice(Some(2), None).unwrap();
    assert_eq!(
        index_counts(&manager),
        vec![
            count_expected(RADIAL, 1, false, true),
            count_expected(RADIAL, 4, true, true),
            count_expected(RADIAL, 4, true, true),
            count_expected(RADIAL, 2, true, true),
        ]
    );
    assert_eq!(index_counts(&manager), vec![72, 318, 318, 174]);
}

#[tokio::test]
async fn test_first_chunk_hidden() {
    let mut manager = parsed(config(4)).await;

    manager.slice(Some(3), None).unwrap();
    assert_eq!(
        index_counts(&manager),
        vec![
            count_expected(RADIAL, 0, false, true),
            count_expected(RADIAL, 4, true, true),
            count_expected(RADIAL, 4, true, true),
            count_expected(RADIAL, 2, true, true),
        ]
    );
}

#[tokio::test]
async fn test_partial_second_chunk() {
    let mut manager = parsed(config(4)).await;

    manager.slice(Some(4), None).unwrap();
    assert_eq!(
        index_counts(&manager),
        vec![
            count_expected(RADIAL, 0, false, true),
            count_expected(RADIAL, 3, false, true),
            count_expected(RADIAL, 4, true, true),
            count_expected(RADIAL, 2, true, true),
        ]
    );
    assert_eq!(index_counts(&manager), vec![0, 216, 318, 174]);
}

#[tokio::test]
async fn test_window_reaching_the_end() {
    let mut manager = parsed(config(4)).await;

    manager.slice(Some(10), None).unwrap();
    assert_eq!(
        index_counts(&manager),
        vec![0, 0, count_expected(RADIAL, 1, false, true), count_expected(RADIAL, 2, true, true)]
    );
}

#[tokio::test]
async fn test_empty_and_inverted_ranges() {
    let mut manager = parsed(config(4)).await;

    manager.slice(Some(6), Some(6)).unwrap();
    assert_eq!(manager.index_count(), 0);

    manager.slice(Some(9), Some(3)).unwrap();
    assert_eq!(manager.index_count(), 0);

    manager.slice(Some(40), None).unwrap();
    assert_eq!(manager.index_count(), 0);
}

#[tokio::test]
async fn test_negative_bounds_are_rejected() {
    let mut manager = parsed(config(4)).await;
    manager.slice(Some(5), Some(10)).unwrap();
    let before = index_counts(&manager);

    assert!(manager.slice(Some(-1), Some(10)).is_err());
    assert!(manager.slice(Some(1), Some(-10)).is_err());
    assert_eq!(index_counts(&manager), before);
}

#[tokio::test]
async fn test_bounds_cover_extrusions_only() {
    let manager = parsed(config(4)).await;
    let bounds = manager.bounds().unwrap();

    // the lift to Z5 and the travel moves never extrude
    assert_eq!(bounds.max.z, 0.2);
    assert_eq!(bounds.min.z, 0.2);
    assert!(bounds.contains(Vec3::new(114.0, 84.0, 0.2)));
    assert!((bounds.min.x - 112.30).abs() < 1e-4);
    assert!((bounds.max.x - 115.08).abs() < 1e-4);
    assert!((bounds.max.y - 84.39).abs() < 1e-4);
}

#[tokio::test]
async fn test_height_layers() {
    let mut manager = parsed(TubeConfig {
        layer_detection: LayerDetection::Height,
        ..config(4)
    })
    .await;

    assert_eq!(
        manager.layers(),
        &[
            LayerRange { start: 0, end: 0 },
            LayerRange { start: 1, end: 1 },
            LayerRange { start: 2, end: 13 },
        ]
    );
    assert_eq!(manager.layer_count(), 2);

    manager.slice_by_layer(Some(2), Some(2)).unwrap();
    assert_eq!(
        index_counts(&manager),
        vec![
            count_expected(RADIAL, 1, false, true),
            count_expected(RADIAL, 4, true, true),
            count_expected(RADIAL, 4, true, true),
            count_expected(RADIAL, 2, true, true),
        ]
    );
}

#[tokio::test]
async fn test_marker_layers_ignore_heights() {
    let manager = parsed(config(4)).await;
    assert!(manager.layers().is_empty());
    assert_eq!(manager.layer_count(), 0);
}

#[tokio::test]
async fn test_marker_layers() {
    let gcode = "\
;LAYER:0
G1 X1 E1
G1 X2 E2
G1 X3 E3
;LAYER:1
G1 X3 Y1 E4
G1 X3 Y2 E5
;LAYER:2
G1 X4 Y2 E6
G1 X5 Y2 E7
";
    let mut manager = ChunkManager::new(gcode, config(3)).unwrap();
    manager.parse().await.unwrap();

    assert_eq!(manager.points_count(), 7);
    assert_eq!(
        manager.layers(),
        &[
            LayerRange { start: 0, end: 2 },
            LayerRange { start: 3, end: 4 },
            LayerRange { start: 5, end: 6 },
        ]
    );
    assert_eq!(manager.layer_count(), 2);

    // layer 1 alone: global 3..5, which is chunk 1 local 1..3
    manager.slice_by_layer(Some(1), Some(1)).unwrap();
    assert_eq!(manager.chunks()[1].window(), (1, 3));
    assert_eq!(index_counts(&manager), vec![0, count_expected(RADIAL, 1, false, true), 0]);

    // unknown layers fall back to the whole model
    manager.slice_by_layer(Some(10), None).unwrap();
    assert_eq!(
        index_counts(&manager),
        vec![
            count_expected(RADIAL, 2, true, true),
            count_expected(RADIAL, 3, true, true),
            count_expected(RADIAL, 1, true, true),
        ]
    );
}

#[tokio::test]
async fn test_malformed_operand_aborts_parse() {
    let mut manager = ChunkManager::new("G1 X1\nG1 X2 E0.1.2\nG1 X3", config(4)).unwrap();
    let err = manager.parse().await.unwrap_err();

    assert!(err.is_gcode_error());
    assert!(err.to_string().contains("line 1"));
}

#[tokio::test]
async fn test_min_max_values_are_available_before_parse() {
    let manager = ChunkManager::new(FOURTEEN_POINTS, config(4)).unwrap();
    let values = manager.min_max_values();

    assert_eq!(values.min_speed, Some(1800.0));
    assert_eq!(values.max_speed, 9000.0);
    assert_eq!(values.min_temp, None);
}
