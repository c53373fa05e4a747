//! Workflow services
//!
//! - `intake` - validation and ownership of the selected image
//! - `extraction` - the remote extraction service client
//! - `orchestrator` - single-flight request lifecycle on a worker thread
//! - `session` - intake, mode and orchestrator wired together
//! - `export` - JSON/CSV artifacts
//! - `health` - background reachability probe

pub mod export;
pub mod extraction;
pub mod health;
pub mod intake;
pub mod orchestrator;
pub mod session;

pub use export::Exporter;
pub use extraction::{ExtractionService, HttpExtractionService};
pub use health::HealthProbe;
pub use orchestrator::SubmitOutcome;
pub use session::ExtractionSession;
