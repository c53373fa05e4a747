//! Background reachability probe for the extraction service

use crate::model::ServerStatus;
use crate::services::extraction::ExtractionService;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

pub struct HealthProbe {
    service: Arc<dyn ExtractionService>,
    receiver: Option<Receiver<ServerStatus>>,
}

impl HealthProbe {
    pub fn new(service: Arc<dyn ExtractionService>) -> Self {
        Self {
            service,
            receiver: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }

    /// Start a probe unless one is already running
    ///
    /// Returns the status to show while the probe runs.
    pub fn start(&mut self) -> ServerStatus {
        if self.receiver.is_some() {
            return ServerStatus::Checking;
        }

        let (tx, rx) = mpsc::channel();
        let service = Arc::clone(&self.service);
        thread::spawn(move || {
            let status = match service.check_health() {
                Ok(banner) => ServerStatus::Online(banner),
                Err(e) => ServerStatus::Offline(e.to_string()),
            };
            let _ = tx.send(status);
        });

        self.receiver = Some(rx);
        ServerStatus::Checking
    }

    /// Result of the running probe, once it has finished
    pub fn poll(&mut self) -> Option<ServerStatus> {
        let receiver = self.receiver.as_ref()?;
        let status = match receiver.try_recv() {
            Ok(status) => status,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                ServerStatus::Offline("Health probe stopped unexpectedly".to_string())
            }
        };

        match &status {
            ServerStatus::Online(banner) => tracing::info!(%banner, "extraction service online"),
            ServerStatus::Offline(reason) => tracing::warn!(%reason, "extraction service offline"),
            _ => {}
        }
        self.receiver = None;
        Some(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::orchestrator::testing::FakeService;
    use std::time::{Duration, Instant};

    #[test]
    fn test_probe_reports_online() {
        let mut probe = HealthProbe::new(Arc::new(FakeService::new(vec![])));
        assert_eq!(probe.start(), ServerStatus::Checking);
        assert!(probe.is_running());

        let deadline = Instant::now() + Duration::from_secs(1);
        let mut status = None;
        while status.is_none() && Instant::now() < deadline {
            status = probe.poll();
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(status, Some(ServerStatus::Online("fake service".to_string())));
        assert!(!probe.is_running());
    }

    #[test]
    fn test_poll_without_probe() {
        let mut probe = HealthProbe::new(Arc::new(FakeService::new(vec![])));
        assert_eq!(probe.poll(), None);
    }
}
