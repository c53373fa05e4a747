//! Extraction orchestrator
//!
//! Runs one extraction request at a time on a background thread and owns the
//! `ExtractionState`. The UI polls on every tick; completions are applied
//! through the pure `transition` function.

use crate::error::ExtractionError;
use crate::model::state::transition;
use crate::model::{
    ExtractionEvent, ExtractionResult, ExtractionState, ProcessingMode, RequestId, UploadedFile,
};
use crate::services::extraction::ExtractionService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Shared flag telling a worker its result is no longer wanted
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Message from the worker thread
#[derive(Debug)]
struct JobMessage {
    request: RequestId,
    outcome: Result<ExtractionResult, ExtractionError>,
}

/// The request currently in flight
struct InFlight {
    request: RequestId,
    receiver: Receiver<JobMessage>,
    cancel: CancelToken,
    started: Instant,
}

/// What happened to a submit call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started(RequestId),
    /// A request is already in flight; nothing was sent
    AlreadyInFlight,
}

/// Owner of the extraction state and the single in-flight request
pub struct ExtractionOrchestrator {
    service: Arc<dyn ExtractionService>,
    state: ExtractionState,
    job: Option<InFlight>,
    next_request: u64,
    timeout: Duration,
}

impl ExtractionOrchestrator {
    pub fn new(service: Arc<dyn ExtractionService>, timeout: Duration) -> Self {
        Self {
            service,
            state: ExtractionState::Idle,
            job: None,
            next_request: 0,
            timeout,
        }
    }

    pub fn state(&self) -> &ExtractionState {
        &self.state
    }

    /// Time since the in-flight request started
    pub fn elapsed(&self) -> Option<Duration> {
        self.job.as_ref().map(|j| j.started.elapsed())
    }

    /// Start extracting `file` with `mode`
    ///
    /// Fails with `EmptyInput` when there is no file. While a request is in
    /// flight further calls are ignored.
    pub fn submit(
        &mut self,
        file: Option<&UploadedFile>,
        mode: ProcessingMode,
    ) -> Result<SubmitOutcome, ExtractionError> {
        let file = file.ok_or(ExtractionError::EmptyInput)?;

        if self.state.is_loading() {
            tracing::debug!("submit ignored, a request is already in flight");
            return Ok(SubmitOutcome::AlreadyInFlight);
        }

        self.next_request += 1;
        let request = RequestId(self.next_request);
        let (tx, rx) = mpsc::channel();
        let cancel = CancelToken::new();

        tracing::info!(%request, file = %file.name, %mode, "extraction submitted");
        Self::spawn_worker(
            Arc::clone(&self.service),
            file.clone(),
            mode,
            request,
            cancel.clone(),
            tx,
        );

        self.job = Some(InFlight {
            request,
            receiver: rx,
            cancel,
            started: Instant::now(),
        });
        self.apply(ExtractionEvent::Submitted(request));

        Ok(SubmitOutcome::Started(request))
    }

    /// Drain worker messages and enforce the deadline
    ///
    /// Returns true when the state changed.
    pub fn poll(&mut self) -> bool {
        let Some(ref job) = self.job else {
            return false;
        };

        let event = match job.receiver.try_recv() {
            Ok(message) => {
                if message.request != job.request {
                    tracing::warn!(request = %message.request, "discarding stale response");
                    return false;
                }
                ExtractionEvent::Completed {
                    request: message.request,
                    outcome: message.outcome,
                }
            }
            Err(TryRecvError::Empty) => {
                if job.started.elapsed() < self.timeout {
                    return false;
                }
                tracing::warn!(request = %job.request, "extraction timed out");
                job.cancel.cancel();
                ExtractionEvent::TimedOut {
                    request: job.request,
                    after_secs: self.timeout.as_secs(),
                }
            }
            Err(TryRecvError::Disconnected) => ExtractionEvent::Completed {
                request: job.request,
                outcome: Err(ExtractionError::Transport(
                    "Extraction worker stopped unexpectedly".to_string(),
                )),
            },
        };

        self.job = None;
        self.apply(event);
        true
    }

    /// Drop any in-flight request and return to `Idle`
    ///
    /// Called when a new file replaces the current one; a response for the
    /// superseded request is never applied.
    pub fn reset(&mut self) {
        if let Some(job) = self.job.take() {
            tracing::info!(request = %job.request, "cancelling superseded extraction");
            job.cancel.cancel();
        }
        self.apply(ExtractionEvent::FileSelected);
    }

    fn apply(&mut self, event: ExtractionEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = transition(state, event);

        match &self.state {
            ExtractionState::Success(result) => tracing::info!(
                columns = result.column_count(),
                rows = result.row_count(),
                "extraction succeeded"
            ),
            ExtractionState::Error(err) => tracing::warn!(error = %err, "extraction failed"),
            _ => {}
        }
    }

    fn spawn_worker(
        service: Arc<dyn ExtractionService>,
        file: UploadedFile,
        mode: ProcessingMode,
        request: RequestId,
        cancel: CancelToken,
        tx: Sender<JobMessage>,
    ) {
        thread::spawn(move || {
            let outcome = service.extract(&file, mode);
            if cancel.is_cancelled() {
                tracing::debug!(%request, "response arrived after cancellation, dropped");
                return;
            }
            // The receiver is gone if the request was superseded meanwhile
            let _ = tx.send(JobMessage { request, outcome });
        });
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{wait_for_completion, FakeService};
    use super::*;
    use crate::model::result::row;
    use pretty_assertions::assert_eq;

    fn upload(name: &str) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            mime: "image/jpeg".to_string(),
            bytes: vec![1u8, 2, 3].into(),
        }
    }

    fn croissant() -> ExtractionResult {
        ExtractionResult::new(vec!["Item".to_string()], vec![row(&[("Item", "Croissant")])])
    }

    #[test]
    fn test_submit_without_file_fails_fast() {
        let service = Arc::new(FakeService::new(vec![]));
        let mut orchestrator = ExtractionOrchestrator::new(service.clone(), Duration::from_secs(5));

        let err = orchestrator.submit(None, ProcessingMode::Auto).unwrap_err();

        assert_eq!(err, ExtractionError::EmptyInput);
        assert_eq!(orchestrator.state(), &ExtractionState::Idle);
        assert_eq!(service.call_count(), 0);
    }

    #[test]
    fn test_successful_extraction() {
        let service = Arc::new(FakeService::new(vec![Ok(croissant())]));
        let mut orchestrator = ExtractionOrchestrator::new(service.clone(), Duration::from_secs(5));

        let outcome = orchestrator
            .submit(Some(&upload("cake.jpg")), ProcessingMode::Text)
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Started(RequestId(1)));
        assert!(orchestrator.state().is_loading());

        wait_for_completion(&mut orchestrator);

        assert_eq!(
            orchestrator.state().result().map(|r| r.as_ref()),
            Some(&croissant())
        );
        assert_eq!(*service.modes.lock().unwrap(), vec![ProcessingMode::Text]);
    }

    #[test]
    fn test_second_submit_while_loading_sends_nothing() {
        let (service, release) = FakeService::gated(vec![Ok(croissant()), Ok(croissant())]);
        let service = Arc::new(service);
        let mut orchestrator = ExtractionOrchestrator::new(service.clone(), Duration::from_secs(5));
        let file = upload("cake.jpg");

        orchestrator.submit(Some(&file), ProcessingMode::Auto).unwrap();
        let second = orchestrator.submit(Some(&file), ProcessingMode::Auto).unwrap();
        assert_eq!(second, SubmitOutcome::AlreadyInFlight);

        release.send(()).unwrap();
        wait_for_completion(&mut orchestrator);

        assert_eq!(service.call_count(), 1);
        assert!(orchestrator.state().result().is_some());
    }

    #[test]
    fn test_reset_discards_late_response() {
        let (service, release) = FakeService::gated(vec![Ok(croissant())]);
        let service = Arc::new(service);
        let mut orchestrator = ExtractionOrchestrator::new(service.clone(), Duration::from_secs(5));

        orchestrator.submit(Some(&upload("old.jpg")), ProcessingMode::Auto).unwrap();
        orchestrator.reset();
        assert_eq!(orchestrator.state(), &ExtractionState::Idle);

        release.send(()).unwrap();
        thread::sleep(Duration::from_millis(50));

        assert!(!orchestrator.poll());
        assert_eq!(orchestrator.state(), &ExtractionState::Idle);
    }

    #[test]
    fn test_timeout_moves_to_error() {
        let (service, release) = FakeService::gated(vec![Ok(croissant())]);
        let mut orchestrator = ExtractionOrchestrator::new(Arc::new(service), Duration::ZERO);

        orchestrator.submit(Some(&upload("slow.jpg")), ProcessingMode::Auto).unwrap();
        assert!(orchestrator.poll());
        assert_eq!(
            orchestrator.state(),
            &ExtractionState::Error(ExtractionError::Timeout(0))
        );

        // The late answer has nowhere to go
        release.send(()).unwrap();
        assert!(!orchestrator.poll());
    }

    #[test]
    fn test_transport_failure_becomes_error_state() {
        let service = Arc::new(FakeService::new(vec![Err(ExtractionError::Transport(
            "connection refused".to_string(),
        ))]));
        let mut orchestrator = ExtractionOrchestrator::new(service, Duration::from_secs(5));

        orchestrator.submit(Some(&upload("cake.jpg")), ProcessingMode::Auto).unwrap();
        wait_for_completion(&mut orchestrator);

        assert_eq!(
            orchestrator.state().error(),
            Some(&ExtractionError::Transport("connection refused".to_string()))
        );
    }

    #[test]
    fn test_resubmit_after_error_uses_new_request_id() {
        let service = Arc::new(FakeService::new(vec![
            Err(ExtractionError::Server("blurry".to_string())),
            Ok(croissant()),
        ]));
        let mut orchestrator = ExtractionOrchestrator::new(service.clone(), Duration::from_secs(5));
        let file = upload("cake.jpg");

        orchestrator.submit(Some(&file), ProcessingMode::Auto).unwrap();
        wait_for_completion(&mut orchestrator);
        assert!(orchestrator.state().error().is_some());

        let outcome = orchestrator.submit(Some(&file), ProcessingMode::Table).unwrap();
        assert_eq!(outcome, SubmitOutcome::Started(RequestId(2)));
        wait_for_completion(&mut orchestrator);

        assert!(orchestrator.state().result().is_some());
        assert_eq!(service.call_count(), 2);
    }
}
