//! Serial, resumable package installation.
//!
//! The pieces fit together as follows:
//!
//! - [`InstallQueue`] holds the identifiers still to install, bridge first.
//! - [`PackageInstaller`] dispatches one request at a time and polls it on
//!   every tick, classifying failures through a [`FailurePolicy`].
//! - [`InstallStateStore`] persists an [`InstallationState`] snapshot after
//!   every dequeue so an interrupted batch resumes where it stopped.

pub mod client;
pub mod executor;
pub mod policy;
pub mod progress;
pub mod queue;
pub mod state;

pub use client::{AddRequest, ManifestPackageClient, PackageClient, RequestStatus};
pub use executor::{BatchOutcome, ExecutorConfig, PackageInstaller, StepEvent};
pub use policy::{DEFAULT_SKIP_PATTERNS, FailureClass, FailurePolicy};
pub use progress::{ProgressSink, TracingProgress, progress_fraction};
pub use queue::InstallQueue;
pub use state::{FilePrefStore, InstallStateStore, InstallationState, MemoryPrefStore, PrefStore, StateError};
