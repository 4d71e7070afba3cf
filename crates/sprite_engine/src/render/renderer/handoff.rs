//! Producer/worker frame handoff
//!
//! A single-slot mailbox guarded by one mutex and one condition variable.
//! It holds the "rendering" and "done" flags, the frame waiting to be drawn,
//! and the spare sprite buffer the worker hands back after drawing.
//!
//! Both sides wait on the same condition variable, so every state change
//! wakes all waiters and each re-checks its own predicate.

use parking_lot::{Condvar, Mutex};

use crate::render::api::FrameInfo;
use crate::render::primitives::Sprite;
use crate::render::systems::batching::BatchStats;
use crate::render::{RenderError, RenderResult};

/// A frame in flight: its snapshot and the sprites it owns
#[derive(Debug)]
pub(crate) struct Frame {
    pub info: FrameInfo,
    pub sprites: Vec<Sprite>,
}

/// What the worker reports after drawing a frame
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FrameReport {
    pub batch: BatchStats,
    pub backend_errors: u64,
    pub frame_time_us: u64,
}

/// Running totals for a renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames accepted by `submit`
    pub frames_submitted: u64,
    /// Frames the worker finished drawing
    pub frames_drawn: u64,
    /// Sprites in drawn frames
    pub sprites_drawn: u64,
    /// Batches handed to the backend
    pub batches_drawn: u64,
    /// Batches skipped after upload or draw errors
    pub batches_skipped: u64,
    /// Errors reported by the backend
    pub backend_errors: u64,
    /// Wall time of the most recent frame (microseconds)
    pub last_frame_time_us: u64,
}

#[derive(Debug)]
struct HandoffState {
    rendering: bool,
    done: bool,
    pending: Option<Frame>,
    spare: Option<Vec<Sprite>>,
    stats: RenderStats,
}

impl HandoffState {
    fn busy(&self) -> bool {
        self.rendering || self.pending.is_some()
    }
}

#[derive(Debug)]
pub(crate) struct FrameHandoff {
    state: Mutex<HandoffState>,
    signal: Condvar,
}

impl FrameHandoff {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HandoffState {
                rendering: false,
                done: false,
                pending: None,
                spare: Some(Vec::new()),
                stats: RenderStats::default(),
            }),
            signal: Condvar::new(),
        }
    }

    /// Wait until the worker is idle with nothing queued, then queue a frame
    ///
    /// `build` receives the recycled back buffer and runs under the lock, so
    /// the buffer swap and the handoff are one step from the worker's view.
    pub fn submit(&self, build: impl FnOnce(Vec<Sprite>) -> Frame) -> RenderResult<()> {
        let mut state = self.state.lock();
        while !state.done && state.busy() {
            self.signal.wait(&mut state);
        }
        if state.done {
            return Err(RenderError::ShutDown);
        }

        let recycled = state.spare.take().unwrap_or_default();
        state.pending = Some(build(recycled));
        state.stats.frames_submitted += 1;
        drop(state);

        self.signal.notify_all();
        Ok(())
    }

    /// Block until a frame is queued or shutdown is requested
    ///
    /// Returns `None` once shutdown is requested, even if a frame is queued.
    pub fn next_frame(&self) -> Option<Frame> {
        let mut state = self.state.lock();
        loop {
            if state.done {
                return None;
            }
            if let Some(frame) = state.pending.take() {
                state.rendering = true;
                return Some(frame);
            }
            self.signal.wait(&mut state);
        }
    }

    /// Mark the current frame finished and return its buffer for reuse
    pub fn complete(&self, mut sprites: Vec<Sprite>, report: FrameReport) {
        sprites.clear();

        let mut state = self.state.lock();
        state.rendering = false;
        state.spare = Some(sprites);

        let stats = &mut state.stats;
        stats.frames_drawn += 1;
        stats.sprites_drawn += report.batch.sprite_count as u64;
        stats.batches_drawn += report.batch.batch_count as u64;
        stats.batches_skipped += report.batch.skipped_batches as u64;
        stats.backend_errors += report.backend_errors;
        stats.last_frame_time_us = report.frame_time_us;
        drop(state);

        self.signal.notify_all();
    }

    /// Block until every submitted frame has been drawn
    pub fn wait_idle(&self) {
        let mut state = self.state.lock();
        while !state.done && state.busy() {
            self.signal.wait(&mut state);
        }
    }

    /// Ask the worker to exit and release any blocked producer
    pub fn shut_down(&self) {
        self.state.lock().done = true;
        self.signal.notify_all();
    }

    pub fn is_rendering(&self) -> bool {
        self.state.lock().rendering
    }

    pub fn stats(&self) -> RenderStats {
        self.state.lock().stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    fn frame(sequence: u64, sprites: Vec<Sprite>) -> Frame {
        Frame {
            info: FrameInfo {
                sequence,
                buffer_index: (sequence % 2) as usize,
                sprite_count: sprites.len(),
                camera: Mat4::identity(),
                clear_color: [0.0; 4],
            },
            sprites,
        }
    }

    #[test]
    fn test_submit_then_take() {
        let handoff = FrameHandoff::new();
        handoff.submit(|buf| frame(0, buf)).expect("submit");
        assert_eq!(handoff.stats().frames_submitted, 1);

        let taken = handoff.next_frame().expect("queued frame");
        assert_eq!(taken.info.sequence, 0);
        assert!(handoff.is_rendering());

        handoff.complete(taken.sprites, FrameReport::default());
        assert!(!handoff.is_rendering());
        assert_eq!(handoff.stats().frames_drawn, 1);
    }

    #[test]
    fn test_second_submit_blocks_until_worker_takes_first() {
        let handoff = Arc::new(FrameHandoff::new());
        handoff.submit(|buf| frame(0, buf)).expect("first submit");

        let (tx, rx) = mpsc::channel();
        let producer = {
            let handoff = Arc::clone(&handoff);
            thread::spawn(move || {
                let result = handoff.submit(|buf| frame(1, buf));
                tx.send(()).expect("test thread alive");
                result
            })
        };

        // No worker ever takes frame 0, so the producer stays parked
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

        handoff.shut_down();
        rx.recv_timeout(Duration::from_secs(5)).expect("shutdown wakes the producer");
        let result = producer.join().expect("producer thread");
        assert!(matches!(result, Err(RenderError::ShutDown)));
    }

    #[test]
    fn test_blocked_submit_resumes_after_frame_completes() {
        let handoff = Arc::new(FrameHandoff::new());
        handoff.submit(|buf| frame(0, buf)).expect("first submit");
        let first = handoff.next_frame().expect("frame 0");

        let (tx, rx) = mpsc::channel();
        let producer = {
            let handoff = Arc::clone(&handoff);
            thread::spawn(move || {
                handoff.submit(|buf| frame(1, buf)).expect("second submit");
                tx.send(()).expect("test thread alive");
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err(), "must wait while rendering");
        handoff.complete(first.sprites, FrameReport::default());
        rx.recv_timeout(Duration::from_secs(5)).expect("producer released");
        producer.join().expect("producer thread");

        assert_eq!(handoff.next_frame().map(|f| f.info.sequence), Some(1));
    }

    #[test]
    fn test_shutdown_drops_pending_frame() {
        let handoff = FrameHandoff::new();
        handoff.submit(|buf| frame(0, buf)).expect("submit");
        handoff.shut_down();

        assert!(handoff.next_frame().is_none());
        assert_eq!(handoff.stats().frames_drawn, 0);
        assert!(matches!(handoff.submit(|buf| frame(1, buf)), Err(RenderError::ShutDown)));
    }

    #[test]
    fn test_spare_buffer_is_recycled() {
        let handoff = FrameHandoff::new();
        handoff
            .submit(|mut buf| {
                buf.reserve(64);
                frame(0, buf)
            })
            .expect("submit");
        let taken = handoff.next_frame().expect("frame");
        let capacity = taken.sprites.capacity();
        handoff.complete(taken.sprites, FrameReport::default());

        handoff
            .submit(|buf| {
                assert!(buf.is_empty());
                assert_eq!(buf.capacity(), capacity);
                frame(1, buf)
            })
            .expect("submit");
    }

    #[test]
    fn test_wait_idle_returns_once_drawn() {
        let handoff = Arc::new(FrameHandoff::new());
        handoff.submit(|buf| frame(0, buf)).expect("submit");

        let worker = {
            let handoff = Arc::clone(&handoff);
            thread::spawn(move || {
                while let Some(frame) = handoff.next_frame() {
                    handoff.complete(frame.sprites, FrameReport::default());
                }
            })
        };

        handoff.wait_idle();
        assert_eq!(handoff.stats().frames_drawn, 1);
        handoff.shut_down();
        worker.join().expect("worker thread");
    }
}
