pub mod controller;
pub mod entity;
pub mod error;
pub mod flow;
pub mod notices;
pub mod sanitize;
pub mod snapshot;
pub mod transport;
pub mod upload;

pub use controller::{ContentEditorController, EditorOptions, LoadReport};
pub use error::{ClientError, ValidationError};
pub use notices::{Banner, BannerKind, Notices};
pub use snapshot::{SiteSnapshot, SnapshotStore};
pub use transport::{ApiClient, Credentials};
pub use upload::ImageUpload;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod support;
