//! PhotoKit Core Library
//!
//! This library fetches an image over HTTP, holds it in memory and applies a
//! small set of transformations to it: base64 round-trip, JPEG re-encoding,
//! quality-based compression and percentage-based cropping.
//!
//! # Overview
//!
//! - **Sessions**: a named image and its last crop via [`session`]
//! - **Image Data**: the tagged bytes / base64 / bitmap slot via [`image_data`]
//! - **Image Processing**: JPEG, base64 and crop helpers via [`image_processing`]
//! - **Fetching**: blocking HTTP downloads via [`fetch`]
//! - **Workflow**: the scripted example run via [`workflow`]
//!
//! # Quick Start
//!
//! ```ignore
//! use photokit_core::{PhotoKit, RunMode, WorkflowPlan};
//!
//! photokit_core::init();
//! let kit = PhotoKit::new()?;
//!
//! let plan = WorkflowPlan::example("/tmp/");
//! let report = kit.run(&plan, "giant-image", RunMode::Lenient)?;
//! for path in &report.written {
//!     println!("{}", path.display());
//! }
//! ```
//!
//! # Module Structure
//!
//! - [`config`]: Environment configuration
//! - [`error`]: Error types and result aliases
//! - [`fetch`]: HTTP client
//! - [`image_data`]: Image representations
//! - [`image_processing`]: Codec and crop utilities
//! - [`session`]: The photo session
//! - [`settings`]: Persisted user defaults
//! - [`workflow`]: Scripted pipeline

pub mod config;
pub mod error;
pub mod fetch;
pub mod image_data;
pub mod image_processing;
pub mod session;
pub mod settings;
pub mod workflow;

// Re-export primary types for convenience
pub use config::Config;
pub use error::{AppError, Result};
pub use fetch::HttpFetcher;
pub use image_data::{ImageData, ImageKind};
pub use image_processing::{CropRect, ImageProcessor, RelativeRect};
pub use session::PhotoSession;
pub use settings::Settings;
pub use workflow::{CropJob, RunMode, WorkflowPlan, WorkflowReport, run_workflow};

/// Main entry point for PhotoKit.
///
/// Holds the configuration and hands out sessions whose HTTP client honours
/// it.
pub struct PhotoKit {
    config: Config,
    fetcher: HttpFetcher,
}

impl PhotoKit {
    /// Creates a new instance configured from the environment
    /// (including `.env` files).
    ///
    /// # Errors
    ///
    /// Returns an error if the environment holds invalid values or the HTTP
    /// client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::load()?)
    }

    /// Creates an instance with custom configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config)?;
        Ok(Self { config, fetcher })
    }

    /// Opens an empty session named `name`.
    pub fn session(&self, name: impl Into<String>) -> PhotoSession {
        PhotoSession::new(name).with_fetcher(self.fetcher.clone())
    }

    /// Runs `plan` in a fresh session named `name`.
    pub fn run(&self, plan: &WorkflowPlan, name: &str, mode: RunMode) -> Result<WorkflowReport> {
        let mut session = self.session(name);
        run_workflow(&mut session, plan, mode)
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Initializes the library: loads `.env` files and installs the logger.
///
/// The log level comes from `RUST_LOG` and defaults to `info`. Calling this
/// more than once is harmless.
pub fn init() {
    let _ = dotenvy::dotenv();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
