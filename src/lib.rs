//! # Certatelier - Certificate Image Generation Library
//!
//! Certatelier turns templated certificate layouts plus recipient data into
//! finished PNG certificate images. It provides:
//!
//! - **Template registry**: coded templates, per-template placeholder schemas
//! - **Layout resolution**: per-recipient overrides merged over the schema
//! - **Text binding**: placeholder keys bound to recipient fields
//! - **Compositing**: CJK-aware text flow drawn over background artwork
//! - **Bulk generation**: batch rendering with progress and atomic status flips
//! - **Import**: validate-all then commit-or-fail recipient ingestion
//!
//! ## Quick Start
//!
//! ```no_run
//! use certatelier::{
//!     render::{Compositor, font::LoadedFont, render_recipient},
//!     assets::BackgroundStore,
//!     seed,
//! };
//!
//! # async fn example() -> Result<(), certatelier::CertError> {
//! let registry = seed::registry()?;
//! let store = seed::store();
//!
//! let font = LoadedFont::from_files("fonts/NotoSansSC-Regular.ttf", None)?;
//! let compositor = Compositor::new(font);
//! let backgrounds = BackgroundStore::new()?;
//!
//! let recipient = store.get("1").ok_or_else(|| {
//!     certatelier::CertError::Template("missing seed recipient".into())
//! })?;
//! let cert = render_recipient(&compositor, &registry, &backgrounds, recipient).await?;
//! std::fs::write(&cert.file_name, &cert.png)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`model`] | Core data types (templates, placeholders, recipients) |
//! | [`registry`] | Template, schema, and organization registry |
//! | [`store`] | Recipient collection and the public query contract |
//! | [`layout`] | Schema + override resolution |
//! | [`binding`] | Placeholder key to recipient field binding |
//! | [`render`] | Text flow, fonts, and the compositor |
//! | [`assets`] | Background image fetching and caching |
//! | [`bulk`] | Batch generation state machine |
//! | [`import`] | Row validation and all-or-nothing commit |
//! | [`schema_io`] | Schema export/import as JSON |
//! | [`server`] | HTTP admin and public query surface |
//! | [`error`] | Error types |

pub mod assets;
pub mod binding;
pub mod bulk;
pub mod error;
pub mod import;
pub mod layout;
pub mod model;
pub mod registry;
pub mod render;
pub mod schema_io;
pub mod seed;
pub mod server;
pub mod store;

// Re-exports for convenience
pub use error::{CertError, QueryError};
pub use registry::TemplateRegistry;
pub use render::Compositor;
pub use store::RecipientStore;
