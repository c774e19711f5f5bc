//! Server state and configuration.

use std::path::PathBuf;

use tokio::sync::{Mutex, RwLock, watch};

use crate::assets::BackgroundStore;
use crate::bulk::BulkController;
use crate::error::CertError;
use crate::import::ImportSession;
use crate::registry::TemplateRegistry;
use crate::render::Compositor;
use crate::seed;
use crate::store::RecipientStore;

/// Cached backgrounds untouched this long are evicted.
pub const BACKGROUND_EXPIRATION_SECS: u64 = 600;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// TTF font used for certificate text (must cover CJK)
    pub font_path: PathBuf,
    /// Optional bold face for emphasized runs
    pub bold_font_path: Option<PathBuf>,
}

/// Application state shared across handlers.
///
/// Lock order: `registry` before `store`, in every handler that needs
/// both. Long-running work must not hold the registry lock; it clones a
/// registry snapshot instead.
pub struct AppState {
    pub config: ServerConfig,
    pub registry: RwLock<TemplateRegistry>,
    pub store: RwLock<RecipientStore>,
    /// Held for the whole duration of a batch; `try_lock` failure means a
    /// batch is in flight.
    pub bulk: Mutex<BulkController>,
    /// Progress reads bypass the bulk lock via this channel.
    pub bulk_progress: watch::Receiver<u8>,
    pub import: Mutex<ImportSession>,
    pub backgrounds: BackgroundStore,
    pub compositor: Compositor,
}

impl AppState {
    pub fn new(config: ServerConfig, compositor: Compositor) -> Result<Self, CertError> {
        let (bulk, bulk_progress) = BulkController::new();
        Ok(Self {
            config,
            registry: RwLock::new(seed::registry()?),
            store: RwLock::new(seed::store()),
            bulk: Mutex::new(bulk),
            bulk_progress,
            import: Mutex::new(ImportSession::new()),
            backgrounds: BackgroundStore::new()?,
            compositor,
        })
    }
}
