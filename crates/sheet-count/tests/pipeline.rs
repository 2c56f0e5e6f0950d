use sheet_count::{
    BestFrameRule, FrameError, RgbFrame, SequenceAggregator, SheetCountParams, SheetCounter,
};

const BACKGROUND: [u8; 3] = [20, 20, 20];
const PAPER_EDGE: [u8; 3] = [200, 200, 200];

/// 600×400 frame with one bright 1-px line per entry of `rows`, spanning x 50..550.
///
/// Each thin line yields two edge rows (above and below it), so every line
/// is one two-member cluster.
fn banded_frame(rows: &[usize]) -> RgbFrame {
    let mut frame = RgbFrame::filled(600, 400, BACKGROUND).unwrap();
    for &y in rows {
        frame.fill_rect(50, y, 550, y + 1, PAPER_EDGE);
    }
    frame
}

fn frame_with_bands(n: usize) -> RgbFrame {
    let rows = [80, 180, 280, 360];
    banded_frame(&rows[..n])
}

#[test]
fn three_separated_bands_count_three() {
    let frame = banded_frame(&[100, 200, 300]);
    let result = SheetCounter::default().count(&frame);

    assert_eq!(result.sheet_count, 3);
    let mut midpoints = result.midpoints.clone();
    midpoints.sort_unstable();
    assert_eq!(midpoints, vec![99, 101, 199, 201, 299, 301]);
    assert_eq!(result.assignment.noise_count(), 0);
    assert!(result
        .horizontal
        .iter()
        .all(|l| l.segment().dx() >= 100 && l.segment().dy() == 0));

    assert_eq!(result.annotated.pixel(300, 99), [0, 255, 255]);
    assert_eq!(result.annotated.pixel(300, 150), BACKGROUND);
    assert_eq!(frame.pixel(300, 99), BACKGROUND);
}

#[test]
fn uniform_frame_counts_zero_and_is_left_untouched() {
    let frame = RgbFrame::filled(600, 400, [128, 128, 128]).unwrap();
    let result = SheetCounter::default().count(&frame);
    assert_eq!(result.sheet_count, 0);
    assert_eq!(result.edge_pixels, 0);
    assert!(result.segments.is_empty());
    assert_eq!(result.annotated, frame);
}

#[test]
fn single_isolated_edge_is_noise() {
    let mut frame = RgbFrame::filled(600, 400, BACKGROUND).unwrap();
    frame.fill_rect(0, 200, 600, 400, PAPER_EDGE);
    let result = SheetCounter::default().count(&frame);
    assert_eq!(result.horizontal.len(), 1);
    assert_eq!(result.midpoints, vec![199]);
    assert_eq!(result.sheet_count, 0);
}

#[test]
fn vertical_lines_do_not_count() {
    let mut frame = RgbFrame::filled(600, 400, BACKGROUND).unwrap();
    frame.fill_rect(300, 50, 301, 350, PAPER_EDGE);
    let result = SheetCounter::default().count(&frame);
    assert!(!result.segments.is_empty());
    assert!(result.horizontal.is_empty());
    assert_eq!(result.sheet_count, 0);
}

#[test]
fn counting_is_deterministic() {
    let frame = banded_frame(&[60, 63, 150, 152, 330]);
    let counter = SheetCounter::default();
    let a = counter.count(&frame);
    let b = counter.count(&frame);
    assert_eq!(a.sheet_count, b.sheet_count);
    assert_eq!(a.segments, b.segments);
    assert_eq!(a.annotated, b.annotated);
}

#[test]
fn malformed_raw_buffers_are_rejected() {
    let counter = SheetCounter::default();
    assert!(matches!(
        counter.count_raw(0, 10, 3, &[]),
        Err(FrameError::ZeroDimensions { .. })
    ));
    assert!(matches!(
        counter.count_raw(4, 4, 1, &[0; 16]),
        Err(FrameError::ChannelCount { got: 1, .. })
    ));
    assert!(matches!(
        counter.count_raw(4, 4, 3, &[0; 47]),
        Err(FrameError::BufferLength {
            expected: 48,
            got: 47
        })
    ));

    let frame = banded_frame(&[100, 200]);
    let raw = counter
        .count_raw(frame.width(), frame.height(), 3, frame.data())
        .unwrap();
    assert_eq!(raw.sheet_count, 2);
}

#[test]
fn sequence_keeps_frame_with_maximum() {
    let counts = [1usize, 2, 2, 3, 1];
    let frames: Vec<RgbFrame> = counts.iter().map(|&n| frame_with_bands(n)).collect();

    let aggregator = SequenceAggregator::default();
    let mut seen = Vec::new();
    let run = aggregator.run_with_observer(&mut frames.clone().into_iter(), |i, r| {
        seen.push((i, r.sheet_count))
    });

    assert_eq!(run.counts, counts);
    assert_eq!(seen, vec![(0, 1), (1, 2), (2, 2), (3, 3), (4, 1)]);
    assert_eq!(run.max_sheet_count, Some(3));
    assert_eq!(run.best_frame_index, Some(3));
    assert_eq!(run.frames_processed, 5);
    assert!(!run.cancelled);

    let expected = SheetCounter::default().count(&frames[3]).annotated;
    assert_eq!(run.best_frame.as_ref(), Some(&expected));
}

#[test]
fn tie_handling_follows_rule() {
    let frames = vec![frame_with_bands(2), frame_with_bands(1), frame_with_bands(2)];

    let latest = SequenceAggregator::default().run(&mut frames.clone().into_iter());
    assert_eq!(latest.best_frame_index, Some(2));

    let mut params = SheetCountParams::default();
    params.sequence.best_frame_rule = BestFrameRule::FirstAtMax;
    let first = SequenceAggregator::new(params).run(&mut frames.into_iter());
    assert_eq!(first.best_frame_index, Some(0));
    assert_eq!(first.max_sheet_count, Some(2));
}

#[test]
fn staggered_lines_within_eps_form_one_sheet() {
    let mut frame = RgbFrame::filled(600, 400, BACKGROUND).unwrap();
    for y in [100, 200, 300] {
        frame.fill_rect(50, y, 300, y + 1, PAPER_EDGE);
        frame.fill_rect(300, y + 2, 550, y + 3, PAPER_EDGE);
    }
    let result = SheetCounter::default().count(&frame);

    let mut midpoints = result.midpoints.clone();
    midpoints.sort_unstable();
    midpoints.dedup();
    assert_eq!(midpoints, vec![99, 101, 103, 199, 201, 203, 299, 301, 303]);

    assert_eq!(result.sheet_count, 3);
    assert_eq!(result.assignment.noise_count(), 0);
    for cluster in 0..result.sheet_count {
        assert!(result.assignment.members(cluster).len() >= 3);
    }
}

#[test]
fn malformed_frames_never_reach_the_aggregator() {
    let good = banded_frame(&[100, 200]);
    let raw = vec![
        (good.width(), good.height(), good.data().to_vec()),
        (10, 10, vec![0; 3]),
        (0, 0, Vec::new()),
    ];
    let decoded: Vec<Result<RgbFrame, FrameError>> = raw
        .into_iter()
        .map(|(w, h, data)| RgbFrame::from_raw(w, h, data))
        .collect();

    assert!(decoded[0].is_ok());
    assert!(matches!(
        decoded[1],
        Err(FrameError::BufferLength {
            expected: 300,
            got: 3
        })
    ));
    assert!(matches!(decoded[2], Err(FrameError::ZeroDimensions { .. })));

    let run = SequenceAggregator::default().run(&mut decoded.into_iter().filter_map(Result::ok));
    assert_eq!(run.frames_processed, 1);
    assert_eq!(run.max_sheet_count, Some(2));

    let short = r#"{ "width": 10, "height": 10, "data": [0, 0, 0] }"#;
    assert!(serde_json::from_str::<RgbFrame>(short).is_err());
}
