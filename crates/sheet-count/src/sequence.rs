//! Driving the pipeline over a frame sequence.
//!
//! The aggregator pulls frames in arrival order, counts each one and keeps
//! the running maximum together with the annotated frame selected by the
//! [`BestFrameRule`]. A run ends when the source is exhausted or when its
//! [`CancelToken`] is triggered; in both cases the partial result is returned.

use crate::{BestFrameRule, FrameResult, SheetCountParams, SheetCounter};
use log::{debug, info};
use sheet_count_core::RgbFrame;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Supplier of frames. Any `Iterator<Item = RgbFrame>` is a source.
pub trait FrameSource {
    /// Next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<RgbFrame>;
}

impl<I> FrameSource for I
where
    I: Iterator<Item = RgbFrame>,
{
    fn next_frame(&mut self) -> Option<RgbFrame> {
        self.next()
    }
}

/// Cloneable stop flag shared between a run and its controller.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Accumulated outcome of a sequence run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunResult {
    /// Largest per-frame count; `None` when no frame was processed.
    pub max_sheet_count: Option<usize>,
    /// Annotated frame chosen by the best-frame rule.
    pub best_frame: Option<RgbFrame>,
    pub best_frame_index: Option<usize>,
    /// Per-frame counts in arrival order.
    pub counts: Vec<usize>,
    /// Per-frame horizontal line midpoints in arrival order.
    pub midpoints: Vec<Vec<i32>>,
    pub frames_processed: usize,
    pub cancelled: bool,
}

/// Running state of one run, updated once per frame.
#[derive(Debug)]
struct RunAccumulator {
    rule: BestFrameRule,
    result: RunResult,
}

impl RunAccumulator {
    fn new(rule: BestFrameRule) -> Self {
        Self {
            rule,
            result: RunResult::default(),
        }
    }

    fn push(&mut self, frame: FrameResult) {
        let res = &mut self.result;
        let index = res.frames_processed;
        let count = frame.sheet_count;

        let keep = match (res.max_sheet_count, self.rule) {
            (None, _) => true,
            (Some(prior), BestFrameRule::LatestAtMax) => count >= prior,
            (Some(prior), BestFrameRule::FirstAtMax) => count > prior,
        };
        if keep {
            res.best_frame = Some(frame.annotated);
            res.best_frame_index = Some(index);
        }

        res.max_sheet_count = Some(res.max_sheet_count.map_or(count, |m| m.max(count)));
        res.counts.push(count);
        res.midpoints.push(frame.midpoints);
        res.frames_processed += 1;
    }

    fn finish(mut self, cancelled: bool) -> RunResult {
        self.result.cancelled = cancelled;
        self.result
    }
}

/// Runs a [`SheetCounter`] over a [`FrameSource`].
#[derive(Clone, Debug, Default)]
pub struct SequenceAggregator {
    counter: SheetCounter,
    cancel: CancelToken,
}

impl SequenceAggregator {
    pub fn new(params: SheetCountParams) -> Self {
        Self {
            counter: SheetCounter::new(params),
            cancel: CancelToken::new(),
        }
    }

    /// Replace the cancellation token, e.g. with one shared with a UI thread.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn counter(&self) -> &SheetCounter {
        &self.counter
    }

    pub fn run<S: FrameSource + ?Sized>(&self, source: &mut S) -> RunResult {
        self.run_with_observer(source, |_, _| {})
    }

    /// Like [`SequenceAggregator::run`], calling `observer(index, result)`
    /// synchronously after every frame.
    pub fn run_with_observer<S, F>(&self, source: &mut S, mut observer: F) -> RunResult
    where
        S: FrameSource + ?Sized,
        F: FnMut(usize, &FrameResult),
    {
        let rule = self.counter.params().sequence.best_frame_rule;
        let mut acc = RunAccumulator::new(rule);
        let mut cancelled = false;

        loop {
            if self.cancel.is_cancelled() {
                info!(
                    "run cancelled after {} frames",
                    acc.result.frames_processed
                );
                cancelled = true;
                break;
            }
            let Some(frame) = source.next_frame() else {
                break;
            };

            let index = acc.result.frames_processed;
            let result = self.counter.count(&frame);
            debug!("frame {index}: {} sheets", result.sheet_count);
            observer(index, &result);
            acc.push(result);
        }

        let result = acc.finish(cancelled);
        info!(
            "processed {} frames, max sheet count {:?} (frame {:?})",
            result.frames_processed, result.max_sheet_count, result.best_frame_index
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_count_core::ClusterAssignment;

    fn fake_result(count: usize, tag: u8) -> FrameResult {
        FrameResult {
            sheet_count: count,
            annotated: RgbFrame::filled(2, 2, [tag; 3]).unwrap(),
            edge_pixels: 0,
            segments: Vec::new(),
            horizontal: Vec::new(),
            midpoints: vec![tag as i32],
            assignment: ClusterAssignment::default(),
        }
    }

    fn accumulate(rule: BestFrameRule, counts: &[usize]) -> RunResult {
        let mut acc = RunAccumulator::new(rule);
        for (i, &c) in counts.iter().enumerate() {
            acc.push(fake_result(c, i as u8));
        }
        acc.finish(false)
    }

    #[test]
    fn keeps_frame_reaching_maximum() {
        let res = accumulate(BestFrameRule::LatestAtMax, &[1, 2, 2, 3, 1]);
        assert_eq!(res.max_sheet_count, Some(3));
        assert_eq!(res.best_frame_index, Some(3));
        assert_eq!(res.best_frame.unwrap().pixel(0, 0), [3; 3]);
        assert_eq!(res.counts, vec![1, 2, 2, 3, 1]);
        assert_eq!(res.midpoints.len(), 5);
    }

    #[test]
    fn tie_rules_differ() {
        let latest = accumulate(BestFrameRule::LatestAtMax, &[2, 1, 2]);
        assert_eq!(latest.best_frame_index, Some(2));
        let first = accumulate(BestFrameRule::FirstAtMax, &[2, 1, 2]);
        assert_eq!(first.best_frame_index, Some(0));
    }

    #[test]
    fn first_frame_is_kept_even_with_zero_count() {
        let res = accumulate(BestFrameRule::FirstAtMax, &[0, 0]);
        assert_eq!(res.max_sheet_count, Some(0));
        assert_eq!(res.best_frame_index, Some(0));
    }

    #[test]
    fn empty_source_has_no_maximum() {
        let agg = SequenceAggregator::default();
        let res = agg.run(&mut std::iter::empty::<RgbFrame>());
        assert_eq!(res.max_sheet_count, None);
        assert!(res.best_frame.is_none());
        assert_eq!(res.frames_processed, 0);
        assert!(!res.cancelled);
    }

    #[test]
    fn cancelled_token_stops_before_next_frame() {
        let agg = SequenceAggregator::default();
        let token = agg.cancel_token();
        let frames = vec![RgbFrame::filled(8, 8, [0; 3]).unwrap(); 4];
        let res = agg.run_with_observer(&mut frames.into_iter(), |index, _| {
            if index == 1 {
                token.cancel();
            }
        });
        assert!(res.cancelled);
        assert_eq!(res.frames_processed, 2);
        assert_eq!(res.counts, vec![0, 0]);
    }

    #[test]
    fn shared_token_cancelled_up_front_processes_nothing() {
        let token = CancelToken::new();
        let agg = SequenceAggregator::default().with_cancel_token(token.clone());
        token.cancel();
        let frames = vec![RgbFrame::filled(8, 8, [0; 3]).unwrap()];
        let res = agg.run(&mut frames.into_iter());
        assert!(res.cancelled);
        assert_eq!(res.max_sheet_count, None);
        assert_eq!(
            agg.counter().params().sequence.best_frame_rule,
            BestFrameRule::LatestAtMax
        );
    }
}
