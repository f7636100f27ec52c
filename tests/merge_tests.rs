// Tests for transcript segment coalescing.
//
// Batches are coalesced internally first, then folded into the
// accumulated sequence when speaker identity matches and the silence gap
// is under 30 seconds.

use keepsake::{combine_segments, TranscriptSegment};

fn seg(speaker: &str, is_user: bool, text: &str, start: f64, end: f64) -> TranscriptSegment {
    TranscriptSegment {
        speaker: speaker.to_string(),
        is_user,
        text: text.to_string(),
        start,
        end: Some(end),
    }
}

#[test]
fn test_empty_batch_changes_nothing() {
    let mut accumulated = vec![seg("SPEAKER_00", false, "hello", 0.0, 1.0)];
    let before = accumulated.clone();

    combine_segments(&mut accumulated, Vec::new());

    assert_eq!(accumulated.len(), before.len());
    assert_eq!(accumulated[0].text, before[0].text);
    assert_eq!(accumulated[0].end, before[0].end);
}

#[test]
fn test_intra_batch_same_speaker_coalesces() {
    let mut accumulated = Vec::new();
    let batch = vec![
        seg("SPEAKER_00", false, "hello", 0.0, 1.0),
        seg("SPEAKER_00", false, "there", 1.0, 2.0),
        seg("SPEAKER_01", false, "hi", 2.0, 3.0),
    ];

    combine_segments(&mut accumulated, batch);

    assert_eq!(accumulated.len(), 2);
    assert_eq!(accumulated[0].text, "hello there");
    assert_eq!(accumulated[0].end, Some(2.0));
    assert_eq!(accumulated[1].text, "hi");
}

#[test]
fn test_user_segments_coalesce_across_speaker_labels() {
    let mut accumulated = Vec::new();
    let batch = vec![
        seg("SPEAKER_00", true, "one", 0.0, 1.0),
        seg("SPEAKER_03", true, "two", 1.0, 2.0),
    ];

    combine_segments(&mut accumulated, batch);

    assert_eq!(accumulated.len(), 1);
    assert_eq!(accumulated[0].text, "one two");
}

#[test]
fn test_gap_under_30_seconds_merges_into_history() {
    let mut accumulated = vec![seg("SPEAKER_00", false, "first", 0.0, 10.0)];
    let batch = vec![seg("SPEAKER_00", false, "second", 39.999, 41.0)];

    combine_segments(&mut accumulated, batch);

    assert_eq!(accumulated.len(), 1);
    assert_eq!(accumulated[0].text, "first second");
    assert_eq!(accumulated[0].end, Some(41.0));
}

#[test]
fn test_gap_of_exactly_30_seconds_does_not_merge() {
    let mut accumulated = vec![seg("SPEAKER_00", false, "first", 0.0, 10.0)];
    let batch = vec![seg("SPEAKER_00", false, "second", 40.0, 41.0)];

    combine_segments(&mut accumulated, batch);

    assert_eq!(accumulated.len(), 2);
    assert_eq!(accumulated[0].text, "first");
    assert_eq!(accumulated[1].text, "second");
}

#[test]
fn test_different_speaker_never_merges_into_history() {
    let mut accumulated = vec![seg("SPEAKER_00", false, "first", 0.0, 10.0)];
    let batch = vec![seg("SPEAKER_01", false, "second", 10.5, 11.0)];

    combine_segments(&mut accumulated, batch);

    assert_eq!(accumulated.len(), 2);
}

#[test]
fn test_open_ended_history_segment_is_not_extended() {
    let mut accumulated = vec![TranscriptSegment {
        speaker: "SPEAKER_00".to_string(),
        is_user: false,
        text: "still talking".to_string(),
        start: 0.0,
        end: None,
    }];
    let batch = vec![seg("SPEAKER_00", false, "more", 5.0, 6.0)];

    combine_segments(&mut accumulated, batch);

    // Without a known end there is no gap to evaluate, so the new segment
    // starts its own entry.
    assert_eq!(accumulated.len(), 2);
    assert_eq!(accumulated[1].text, "more");
}

#[test]
fn test_only_batch_head_merges_into_history() {
    let mut accumulated = vec![seg("SPEAKER_00", false, "first", 0.0, 10.0)];
    let batch = vec![
        seg("SPEAKER_00", false, "second", 11.0, 12.0),
        seg("SPEAKER_01", false, "third", 12.0, 13.0),
        seg("SPEAKER_00", false, "fourth", 13.0, 14.0),
    ];

    combine_segments(&mut accumulated, batch);

    assert_eq!(accumulated.len(), 3);
    assert_eq!(accumulated[0].text, "first second");
    assert_eq!(accumulated[1].text, "third");
    assert_eq!(accumulated[2].text, "fourth");
}

#[test]
fn test_merged_ends_are_non_decreasing() {
    let mut accumulated = Vec::new();

    combine_segments(
        &mut accumulated,
        vec![
            seg("SPEAKER_00", false, "a", 0.0, 1.0),
            seg("SPEAKER_00", false, "b", 1.0, 2.5),
            seg("SPEAKER_01", false, "c", 3.0, 4.0),
        ],
    );
    combine_segments(
        &mut accumulated,
        vec![
            seg("SPEAKER_01", false, "d", 5.0, 6.0),
            seg("SPEAKER_00", true, "e", 6.0, 7.0),
        ],
    );
    combine_segments(
        &mut accumulated,
        vec![seg("SPEAKER_02", true, "f", 50.0, 51.0)],
    );

    let ends: Vec<f64> = accumulated.iter().filter_map(|s| s.end).collect();
    assert!(!ends.is_empty());
    for pair in ends.windows(2) {
        assert!(pair[0] <= pair[1], "ends must be non-decreasing: {:?}", ends);
    }
}
