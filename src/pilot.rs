use crate::dispatcher::Dispatcher;
use crate::sink::CommandSink;
use crate::types::{Command, FlightState, Frame};
use crate::{PilotError, Result};
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Capacity of the inbound frame queue. Frames block the producer when the
/// queue is full rather than being dropped, so the window never skips one.
const FRAME_QUEUE: usize = 256;

/// Capacity of the outbound report queue. Reports nobody reads are dropped
/// once it fills.
const REPORT_QUEUE: usize = 256;

/// Result of dispatching one frame on the pilot thread.
#[derive(Debug)]
pub struct DispatchReport {
    pub frame_id: u64,
    /// Flight state after the frame was processed.
    pub state: FlightState,
    pub outcome: Result<Vec<Command>>,
}

/// Handle to a dispatcher running on its own thread.
///
/// Frames submitted from any thread are processed one at a time, in
/// submission order, by the single thread that owns the dispatcher. A
/// failed frame is reported and processing carries on with the next one.
pub struct PilotThread {
    frames: Option<Sender<Frame>>,
    reports: Receiver<DispatchReport>,
    stop_flag: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl PilotThread {
    /// Move `dispatcher` onto a new thread and start consuming frames.
    pub fn start<S>(dispatcher: Dispatcher<S>) -> Result<PilotThread>
    where
        S: CommandSink + Send + 'static,
    {
        let (frame_tx, frame_rx) = crossbeam_channel::bounded(FRAME_QUEUE);
        let (report_tx, report_rx) = crossbeam_channel::bounded(REPORT_QUEUE);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_clone = stop_flag.clone();

        let thread = std::thread::Builder::new()
            .name("handpilot-dispatch".into())
            .spawn(move || {
                dispatch_loop(dispatcher, frame_rx, report_tx, stop_clone);
            })?;

        Ok(PilotThread {
            frames: Some(frame_tx),
            reports: report_rx,
            stop_flag,
            thread: Some(thread),
        })
    }

    /// Queue a frame for dispatch. Blocks while the queue is full.
    pub fn submit(&self, frame: Frame) -> Result<()> {
        let frames = self.frames.as_ref().ok_or(PilotError::StreamStopped)?;
        frames
            .send(frame)
            .map_err(|_| PilotError::ChannelDisconnected)
    }

    /// A sender other threads can use to submit frames.
    pub fn frame_sender(&self) -> Option<Sender<Frame>> {
        self.frames.clone()
    }

    /// Receive the next dispatch report (blocks until available).
    pub fn recv(&self) -> Result<DispatchReport> {
        self.reports
            .recv()
            .map_err(|_| PilotError::StreamStopped)
    }

    /// Try to receive a dispatch report without blocking.
    pub fn try_recv(&self) -> Option<DispatchReport> {
        self.reports.try_recv().ok()
    }

    /// Receive a dispatch report with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<DispatchReport> {
        self.reports.recv_timeout(timeout).map_err(|e| match e {
            crossbeam_channel::RecvTimeoutError::Timeout => PilotError::Timeout,
            crossbeam_channel::RecvTimeoutError::Disconnected => PilotError::StreamStopped,
        })
    }

    /// Check if the pilot thread is still accepting frames.
    pub fn is_active(&self) -> bool {
        !self.stop_flag.load(Ordering::Relaxed)
    }

    /// Stop the thread after the frame in progress, and wait for it.
    /// Frames still queued are discarded.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        drop(self.frames.take());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for PilotThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The dispatch loop runs in a dedicated thread.
///
/// Polls the frame queue with a short timeout so the stop flag is noticed
/// even when no frames arrive.
fn dispatch_loop<S: CommandSink>(
    mut dispatcher: Dispatcher<S>,
    frames: Receiver<Frame>,
    reports: Sender<DispatchReport>,
    stop_flag: Arc<AtomicBool>,
) {
    log::info!("Pilot dispatcher started");

    loop {
        if stop_flag.load(Ordering::Relaxed) {
            log::info!("Pilot dispatcher stopping (stop flag set)");
            break;
        }

        let frame = match frames.recv_timeout(Duration::from_millis(100)) {
            Ok(frame) => frame,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                log::info!("Frame channel closed, stopping dispatcher");
                break;
            }
        };

        let frame_id = frame.id;
        let outcome = dispatcher.on_frame(frame);
        if let Err(e) = &outcome {
            log::warn!("Frame {} rejected: {}", frame_id, e);
        }

        let report = DispatchReport {
            frame_id,
            state: dispatcher.state(),
            outcome,
        };
        if let Err(e) = reports.try_send(report) {
            match e {
                crossbeam_channel::TrySendError::Full(_) => {
                    log::trace!("Report queue full, dropping report for frame {}", frame_id);
                }
                crossbeam_channel::TrySendError::Disconnected(_) => {
                    log::trace!("No report receiver, dropping report for frame {}", frame_id);
                }
            }
        }
    }
}
