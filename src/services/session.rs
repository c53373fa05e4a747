//! Extraction session
//!
//! Ties file intake, the selected processing mode and the orchestrator
//! together. Every intake path ends in `select_file`, and a successful
//! selection always resets the extraction state so the preview and any later
//! result come from the same file.

use crate::error::{ExtractionError, IntakeError};
use crate::model::{
    ExtractionResult, ExtractionState, FileCandidate, PreviewHandle, ProcessingMode, UploadedFile,
};
use crate::services::extraction::ExtractionService;
use crate::services::intake::{parse_dropped_paths, read_candidate, FileIntake};
use crate::services::orchestrator::{ExtractionOrchestrator, SubmitOutcome};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct ExtractionSession {
    intake: FileIntake,
    orchestrator: ExtractionOrchestrator,
    mode: ProcessingMode,
}

impl ExtractionSession {
    pub fn new(service: Arc<dyn ExtractionService>, timeout: Duration, mode: ProcessingMode) -> Self {
        Self {
            intake: FileIntake::new(),
            orchestrator: ExtractionOrchestrator::new(service, timeout),
            mode,
        }
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ProcessingMode) {
        if self.mode != mode {
            tracing::debug!(from = %self.mode, to = %mode, "processing mode changed");
            self.mode = mode;
        }
    }

    pub fn current_file(&self) -> Option<&UploadedFile> {
        self.intake.current()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.intake.preview()
    }

    #[cfg(test)]
    pub fn live_previews(&self) -> usize {
        self.intake.live_previews()
    }

    /// Pick up a finished preview thumbnail; true when it changed
    pub fn poll_preview(&mut self) -> bool {
        self.intake.poll_preview()
    }

    pub fn state(&self) -> &ExtractionState {
        self.orchestrator.state()
    }

    pub fn result(&self) -> Option<&ExtractionResult> {
        self.orchestrator.state().result().map(|r| r.as_ref())
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.orchestrator.elapsed()
    }

    /// Whether the extract trigger is enabled
    pub fn can_submit(&self) -> bool {
        self.intake.current().is_some() && !self.orchestrator.state().is_loading()
    }

    /// Replace the current file with `candidate`
    pub fn select_file(&mut self, candidate: FileCandidate) -> Result<&UploadedFile, IntakeError> {
        let file = self.intake.select_file(candidate)?;
        self.orchestrator.reset();
        Ok(file)
    }

    /// Read an image from disk and select it
    pub fn select_path(&mut self, path: &Path) -> Result<&UploadedFile, IntakeError> {
        let candidate = read_candidate(path)?;
        self.select_file(candidate)
    }

    /// Select the file from pasted drag-and-drop text
    ///
    /// Only the first dropped path is used.
    pub fn select_dropped(&mut self, text: &str) -> Result<&UploadedFile, IntakeError> {
        let paths = parse_dropped_paths(text);
        if paths.len() > 1 {
            tracing::warn!(count = paths.len(), "multiple files dropped, keeping the first");
        }
        let first = paths.first().ok_or(IntakeError::NothingDropped)?;
        self.select_path(first)
    }

    /// Submit the current file with the current mode
    pub fn submit(&mut self) -> Result<SubmitOutcome, ExtractionError> {
        self.orchestrator.submit(self.intake.current(), self.mode)
    }

    /// Apply any finished request; true when the state changed
    pub fn poll(&mut self) -> bool {
        self.orchestrator.poll()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::table::grid;
    use crate::model::preview::png_bytes;
    use crate::model::result::row;
    use crate::services::export::Exporter;
    use crate::services::orchestrator::testing::FakeService;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::thread;
    use std::time::Instant;
    use tempfile::tempdir;

    fn session(service: Arc<FakeService>) -> ExtractionSession {
        ExtractionSession::new(service, Duration::from_secs(5), ProcessingMode::Auto)
    }

    fn image(name: &str) -> FileCandidate {
        FileCandidate::new(name, "image/jpeg", png_bytes(3, 3))
    }

    fn wait(session: &mut ExtractionSession) {
        let deadline = Instant::now() + Duration::from_secs(1);
        while session.state().is_loading() && Instant::now() < deadline {
            session.poll();
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_single_croissant_row() {
        let result = ExtractionResult::new(
            vec!["Item".to_string()],
            vec![row(&[("Item", "Croissant")])],
        );
        let service = Arc::new(FakeService::new(vec![Ok(result)]));
        let mut session = session(service.clone());

        session.select_file(image("cake.jpg")).unwrap();
        session.submit().unwrap();
        wait(&mut session);

        let rendered = grid(session.result().unwrap());
        assert_eq!(rendered, vec![vec!["Croissant".to_string()]]);
        assert_eq!(*service.modes.lock().unwrap(), vec![ProcessingMode::Auto]);
    }

    #[test]
    fn test_service_failure_shows_message() {
        let service = Arc::new(FakeService::new(vec![Err(ExtractionError::Server(
            "No text detected".to_string(),
        ))]));
        let mut session = session(service.clone());

        session.select_file(image("cake.png")).unwrap();
        session.set_mode(ProcessingMode::Table);
        session.submit().unwrap();
        wait(&mut session);

        let err = session.state().error().unwrap();
        assert_eq!(err.to_string(), "No text detected");
        assert!(session.result().is_none());
        assert_eq!(*service.modes.lock().unwrap(), vec![ProcessingMode::Table]);
    }

    #[test]
    fn test_submit_without_file() {
        let service = Arc::new(FakeService::new(vec![]));
        let mut session = session(service.clone());

        assert!(!session.can_submit());
        let err = session.submit().unwrap_err();

        assert_eq!(err.to_string(), "Please upload an image first");
        assert_eq!(service.call_count(), 0);
        assert_eq!(session.state(), &ExtractionState::Idle);
    }

    #[test]
    fn test_export_matches_rendered_result() {
        let result = ExtractionResult::new(
            vec!["Item".to_string(), "Price".to_string()],
            vec![
                row(&[("Item", "Rye loaf"), ("Price", "$6")]),
                row(&[("Item", "Bagel")]),
            ],
        );
        let service = Arc::new(FakeService::new(vec![Ok(result.clone())]));
        let mut session = session(service);
        let dir = tempdir().unwrap();

        session.select_file(image("receipt.jpg")).unwrap();
        session.set_mode(ProcessingMode::Text);
        session.submit().unwrap();
        wait(&mut session);

        let path = Exporter::new(dir.path())
            .export_json(session.result())
            .unwrap()
            .unwrap();
        let parsed: ExtractionResult =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(Some(&parsed), session.result());
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_pdf_is_rejected_and_prior_state_kept() {
        let result = ExtractionResult::new(vec!["Item".to_string()], vec![row(&[("Item", "Tart")])]);
        let service = Arc::new(FakeService::new(vec![Ok(result)]));
        let mut session = session(service);
        let dir = tempdir().unwrap();
        let pdf = dir.path().join("menu.pdf");
        fs::write(&pdf, b"%PDF-1.4").unwrap();

        session.select_file(image("tart.jpg")).unwrap();
        session.submit().unwrap();
        wait(&mut session);
        let preview_id = session.preview().map(|p| p.id());

        let err = session.select_path(&pdf).unwrap_err();

        assert!(matches!(err, IntakeError::NotAnImage { .. }));
        assert_eq!(session.current_file().unwrap().name, "tart.jpg");
        assert_eq!(session.preview().map(|p| p.id()), preview_id);
        assert!(session.result().is_some());
    }

    #[test]
    fn test_pdf_with_nothing_selected_creates_no_preview() {
        let mut session = session(Arc::new(FakeService::new(vec![])));
        let dir = tempdir().unwrap();
        let pdf = dir.path().join("menu.pdf");
        fs::write(&pdf, b"%PDF-1.4").unwrap();

        assert!(session.select_path(&pdf).is_err());
        assert!(session.preview().is_none());
        assert_eq!(session.live_previews(), 0);
    }

    #[test]
    fn test_new_file_resets_result() {
        let result = ExtractionResult::new(vec!["Item".to_string()], vec![row(&[("Item", "Scone")])]);
        let service = Arc::new(FakeService::new(vec![Ok(result)]));
        let mut session = session(service);

        session.select_file(image("first.jpg")).unwrap();
        session.submit().unwrap();
        wait(&mut session);
        assert!(session.result().is_some());

        let selected = session.select_file(image("second.jpg")).unwrap();
        assert_eq!(selected.name, "second.jpg");

        assert_eq!(session.state(), &ExtractionState::Idle);
        assert_eq!(session.live_previews(), 1);
        assert!(session.can_submit());
    }

    #[test]
    fn test_thumbnail_arrives_through_poll() {
        let mut session = session(Arc::new(FakeService::new(vec![])));
        session.select_file(image("bun.png")).unwrap();

        let preview = session.preview().unwrap();
        assert_eq!(preview.dimensions, Some((3, 3)));
        assert!(preview.is_decoding());

        let deadline = Instant::now() + Duration::from_secs(2);
        while session.preview().is_some_and(|p| p.is_decoding()) && Instant::now() < deadline {
            session.poll_preview();
            thread::sleep(Duration::from_millis(5));
        }

        assert!(session.preview().unwrap().thumbnail().is_some());
        assert!(!session.poll_preview());
    }

    #[test]
    fn test_new_file_while_loading_discards_old_response() {
        let old = ExtractionResult::new(vec!["Item".to_string()], vec![row(&[("Item", "Old")])]);
        let (service, release) = FakeService::gated(vec![Ok(old)]);
        let mut session = session(Arc::new(service));

        session.select_file(image("old.jpg")).unwrap();
        session.submit().unwrap();
        assert!(!session.can_submit());

        session.select_file(image("new.jpg")).unwrap();
        release.send(()).unwrap();
        thread::sleep(Duration::from_millis(50));
        session.poll();

        assert_eq!(session.state(), &ExtractionState::Idle);
        assert_eq!(session.current_file().unwrap().name, "new.jpg");
    }

    #[test]
    fn test_dropped_paths_select_first_file() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("my bun.png");
        let second = dir.path().join("loaf.png");
        fs::write(&first, png_bytes(2, 2)).unwrap();
        fs::write(&second, png_bytes(2, 2)).unwrap();
        let mut session = session(Arc::new(FakeService::new(vec![])));

        let text = format!("'{}' '{}'", first.display(), second.display());
        let selected = session.select_dropped(&text).unwrap();

        assert_eq!(selected.name, "my bun.png");
        assert_eq!(session.live_previews(), 1);
        assert_eq!(
            session.select_dropped("  ").unwrap_err(),
            IntakeError::NothingDropped
        );
    }
}
