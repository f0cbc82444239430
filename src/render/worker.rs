//! Background thread that owns the renderer.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use super::{DiagramRenderer, RenderError, RenderResult, RenderTicket};
use crate::config::DiagramTheme;

#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub ticket: RenderTicket,
    pub code: String,
    pub theme: DiagramTheme,
    pub width_px: u32,
}

#[derive(Debug, Clone)]
pub struct RenderResponse {
    pub ticket: RenderTicket,
    pub result: RenderResult,
}

/// Messages from the worker thread.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// The renderer initialized.
    Ready { renderer: &'static str },
    /// The renderer could not be initialized; requests will fail.
    InitFailed { renderer: &'static str, message: String },
    Rendered(RenderResponse),
}

/// Render ids the presentation still waits for.
///
/// Queued requests whose id has been withdrawn are skipped by the thread.
#[derive(Debug, Clone, Default)]
struct WantedIds(Arc<Mutex<HashSet<String>>>);

impl WantedIds {
    fn insert(&self, render_id: &str) {
        if let Ok(mut ids) = self.0.lock() {
            ids.insert(render_id.to_string());
        }
    }

    /// Remove `render_id`, returning whether it was still wanted.
    fn take(&self, render_id: &str) -> bool {
        self.0.lock().is_ok_and(|mut ids| ids.remove(render_id))
    }

    fn retain<'a>(&self, keep: impl IntoIterator<Item = &'a str>) {
        let keep: HashSet<&str> = keep.into_iter().collect();
        if let Ok(mut ids) = self.0.lock() {
            ids.retain(|id| keep.contains(id.as_str()));
        }
    }
}

/// Runs a [`DiagramRenderer`] on its own thread.
///
/// Dropping the worker skips whatever is still queued, closes the request
/// channel and joins the thread.
pub struct RenderWorker {
    requests: Option<Sender<RenderRequest>>,
    events: Receiver<WorkerEvent>,
    handle: Option<JoinHandle<()>>,
    wanted: WantedIds,
    shutdown: Arc<AtomicBool>,
}

impl RenderWorker {
    pub fn spawn(renderer: Box<dyn DiagramRenderer>) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<RenderRequest>();
        let (event_tx, event_rx) = mpsc::channel();
        let wanted = WantedIds::default();
        let shutdown = Arc::new(AtomicBool::new(false));
        let queue = Queue {
            requests: req_rx,
            wanted: wanted.clone(),
            shutdown: Arc::clone(&shutdown),
        };
        let handle = std::thread::Builder::new()
            .name("render-worker".to_string())
            .spawn(move || run(renderer, &queue, &event_tx))
            .map_err(|err| warn!("failed to start render worker: {err}"))
            .ok();
        Self {
            requests: Some(req_tx),
            events: event_rx,
            handle,
            wanted,
            shutdown,
        }
    }

    /// Queue a request. Returns false if the worker has stopped.
    pub fn submit(&self, request: RenderRequest) -> bool {
        if self.handle.is_none() {
            return false;
        }
        let render_id = request.ticket.render_id.clone();
        self.wanted.insert(&render_id);
        let sent = self
            .requests
            .as_ref()
            .is_some_and(|tx| tx.send(request).is_ok());
        if !sent {
            self.wanted.take(&render_id);
        }
        sent
    }

    /// Withdraw every queued request whose render id is not in `keep`.
    ///
    /// Withdrawn requests are skipped without a response.
    pub fn retain<'a>(&self, keep: impl IntoIterator<Item = &'a str>) {
        self.wanted.retain(keep);
    }

    /// Next event without blocking.
    pub fn try_next(&self) -> Option<WorkerEvent> {
        self.events.try_recv().ok()
    }

    /// Next event, waiting up to `timeout`.
    #[cfg(test)]
    pub fn next_timeout(&self, timeout: std::time::Duration) -> Option<WorkerEvent> {
        self.events.recv_timeout(timeout).ok()
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.wanted.retain(std::iter::empty());
        self.requests = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Receiving side of the request channel, shared state included.
struct Queue {
    requests: Receiver<RenderRequest>,
    wanted: WantedIds,
    shutdown: Arc<AtomicBool>,
}

impl Queue {
    /// Next request still wanted, or `None` once the worker is shutting down.
    fn next(&self) -> Option<RenderRequest> {
        while let Ok(request) = self.requests.recv() {
            if self.shutdown.load(Ordering::Relaxed) {
                return None;
            }
            if self.wanted.take(&request.ticket.render_id) {
                return Some(request);
            }
            debug!(render_id = %request.ticket.render_id, "skipping withdrawn render");
        }
        None
    }
}

fn run(mut renderer: Box<dyn DiagramRenderer>, queue: &Queue, events: &Sender<WorkerEvent>) {
    let init_error = match renderer.init() {
        Ok(()) => {
            let _ = events.send(WorkerEvent::Ready {
                renderer: renderer.name(),
            });
            None
        }
        Err(err) => {
            warn!(renderer = renderer.name(), "{err}");
            let message = err.to_string();
            let _ = events.send(WorkerEvent::InitFailed {
                renderer: renderer.name(),
                message: message.clone(),
            });
            Some(message)
        }
    };

    while let Some(request) = queue.next() {
        debug!(render_id = %request.ticket.render_id, "render start");
        let outcome = match &init_error {
            Some(message) => Err(RenderError::Init(message.clone())),
            None => renderer.render(
                &request.ticket.render_id,
                &request.code,
                request.theme,
                request.width_px,
            ),
        };
        let result = RenderResult::from_outcome(outcome, &request.code);
        debug!(
            render_id = %request.ticket.render_id,
            ok = result.is_success(),
            "render done"
        );
        let response = RenderResponse {
            ticket: request.ticket,
            result,
        };
        if events.send(WorkerEvent::Rendered(response)).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::render::{RenderTracker, SourceRenderer, Visual};

    const WAIT: Duration = Duration::from_secs(5);

    struct Rejecting;

    impl DiagramRenderer for Rejecting {
        fn name(&self) -> &'static str {
            "rejecting"
        }

        fn init(&mut self) -> Result<(), RenderError> {
            Ok(())
        }

        fn render(&mut self, _: &str, code: &str, _: DiagramTheme, _: u32) -> Result<Visual, RenderError> {
            Err(RenderError::Rejected(format!("cannot parse {code}")))
        }
    }

    /// Waits for `gate` before it is ready, then takes `delay` per diagram.
    struct Slow {
        gate: Receiver<()>,
        delay: Duration,
        renders: Arc<AtomicUsize>,
    }

    impl DiagramRenderer for Slow {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn init(&mut self) -> Result<(), RenderError> {
            let _ = self.gate.recv();
            Ok(())
        }

        fn render(&mut self, _: &str, code: &str, _: DiagramTheme, _: u32) -> Result<Visual, RenderError> {
            std::thread::sleep(self.delay);
            self.renders.fetch_add(1, Ordering::SeqCst);
            Ok(Visual::Text(code.to_string()))
        }
    }

    fn slow_worker(delay: Duration) -> (RenderWorker, Sender<()>, Arc<AtomicUsize>) {
        let (gate_tx, gate_rx) = mpsc::channel();
        let renders = Arc::new(AtomicUsize::new(0));
        let renderer = Slow {
            gate: gate_rx,
            delay,
            renders: Arc::clone(&renders),
        };
        (RenderWorker::spawn(Box::new(renderer)), gate_tx, renders)
    }

    fn request(tracker: &mut RenderTracker, slide_id: &str, code: &str) -> RenderRequest {
        RenderRequest {
            ticket: tracker.issue(slide_id),
            code: code.to_string(),
            theme: DiagramTheme::Default,
            width_px: 640,
        }
    }

    fn next_rendered(worker: &RenderWorker) -> RenderResponse {
        loop {
            match worker.next_timeout(WAIT).expect("worker event") {
                WorkerEvent::Rendered(response) => return response,
                WorkerEvent::Ready { .. } | WorkerEvent::InitFailed { .. } => {}
            }
        }
    }

    #[test]
    fn test_worker_reports_ready_then_renders() {
        let worker = RenderWorker::spawn(Box::new(SourceRenderer));
        let mut tracker = RenderTracker::new();
        assert!(matches!(
            worker.next_timeout(WAIT),
            Some(WorkerEvent::Ready { renderer: "source" })
        ));

        let req = request(&mut tracker, "diagram-0", "pie title Pets");
        assert!(worker.submit(req));
        let response = next_rendered(&worker);
        assert!(tracker.accept(&response.ticket));
        assert!(matches!(
            response.result,
            RenderResult::Success(Visual::Text(ref text)) if text == "pie title Pets"
        ));
    }

    #[test]
    fn test_worker_turns_errors_into_failures() {
        let worker = RenderWorker::spawn(Box::new(Rejecting));
        let mut tracker = RenderTracker::new();
        assert!(worker.submit(request(&mut tracker, "diagram-3", "grph")));
        let response = next_rendered(&worker);
        match response.result {
            RenderResult::Failure { message, code } => {
                assert_eq!(message, "cannot parse grph");
                assert_eq!(code, "grph");
            }
            RenderResult::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_worker_results_arrive_in_request_order() {
        let worker = RenderWorker::spawn(Box::new(SourceRenderer));
        let mut tracker = RenderTracker::new();
        let first = request(&mut tracker, "diagram-0", "graph A");
        let second = request(&mut tracker, "diagram-1", "graph B");
        let first_id = first.ticket.render_id.clone();
        assert!(worker.submit(first));
        assert!(worker.submit(second));
        assert_eq!(next_rendered(&worker).ticket.render_id, first_id);
        assert_eq!(next_rendered(&worker).ticket.slide_id, "diagram-1");
    }

    #[test]
    fn test_withdrawn_requests_are_skipped() {
        let (worker, gate, renders) = slow_worker(Duration::from_millis(50));
        let mut tracker = RenderTracker::new();
        for i in 0..8 {
            let slide_id = format!("diagram-{i}");
            assert!(worker.submit(request(&mut tracker, &slide_id, "graph TD")));
        }
        tracker.retain_slides(&["diagram-7"]);
        worker.retain(tracker.render_ids());
        gate.send(()).unwrap();

        let response = next_rendered(&worker);
        assert_eq!(response.ticket.slide_id, "diagram-7");
        assert!(tracker.accept(&response.ticket));
        assert_eq!(renders.load(Ordering::SeqCst), 1);
        assert!(worker.next_timeout(Duration::from_millis(200)).is_none());
    }

    #[test]
    fn test_drop_skips_queued_work() {
        let delay = Duration::from_millis(100);
        let (worker, gate, renders) = slow_worker(delay);
        let mut tracker = RenderTracker::new();
        for i in 0..6 {
            let slide_id = format!("diagram-{i}");
            assert!(worker.submit(request(&mut tracker, &slide_id, "graph TD")));
        }
        gate.send(()).unwrap();
        next_rendered(&worker);

        let started = Instant::now();
        drop(worker);
        assert!(started.elapsed() < delay * 3, "quit waited for the backlog");
        assert!(renders.load(Ordering::SeqCst) <= 2);
    }
}
