//! Geo Post Service
//!
//! Accepts geo-tagged posts with optional media, stores the media in GCS,
//! scores images for faces with Cloud Vision, indexes posts into
//! Elasticsearch and serves geo-radius and confidence-threshold queries.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

use std::sync::Arc;

pub use config::{Config, HandlerSettings};
pub use error::{AppError, Result};

use services::{ImageAnnotator, ObjectStore, SearchBackend};

/// Shared handler state. Holds client handles only; nothing here is
/// mutated while serving requests.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<dyn SearchBackend>,
    pub storage: Arc<dyn ObjectStore>,
    pub annotator: Arc<dyn ImageAnnotator>,
    pub settings: HandlerSettings,
}

impl AppState {
    pub fn new(
        search: Arc<dyn SearchBackend>,
        storage: Arc<dyn ObjectStore>,
        annotator: Arc<dyn ImageAnnotator>,
        settings: HandlerSettings,
    ) -> Self {
        Self {
            search,
            storage,
            annotator,
            settings,
        }
    }
}
