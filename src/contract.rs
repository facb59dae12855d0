//! # contract: seams between the conversion core and its collaborators
//!
//! The core never talks to the network or picks identifiers on its own.
//! It goes through the traits below instead:
//!
//! - [`ImageFetcher`]: downloads one image. Implemented over HTTP by the CLI
//!   crate and by `MockImageFetcher` in tests.
//! - [`ImageStore`]: the local image cache, keyed by image id.
//! - [`IdGenerator`]: opaque unique identifiers for bundle entities.
//!
//! ## Mocking & Testing
//! - `ImageFetcher` is annotated for `mockall`; the generated mock is exported
//!   behind the `test-export-mocks` feature so integration tests and the CLI
//!   crate can use it.
//! - [`SequentialIds`] gives reproducible identifiers for snapshot-style
//!   assertions.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use uuid::Uuid;

use crate::error::FetchError;

/// Fetches raw image bytes for a URL.
///
/// A non-success status must be reported as [`FetchError::Status`]; the
/// resolver logs it and leaves the image out of every bundle.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// The local image cache. Entries hold base64 text and are keyed by
/// [`crate::recipe::ImageRef::id`]; writing the same id twice is harmless.
pub trait ImageStore: Send + Sync {
    fn exists(&self, id: &str) -> bool;

    fn read(&self, id: &str) -> io::Result<String>;

    fn write(&self, id: &str, encoded: &str) -> io::Result<()>;
}

/// Source of opaque identifiers for bundle records and their sub-entities.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Upper-case random v4 UUIDs, the format Crouton itself writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string().to_uppercase()
    }
}

/// Deterministic identifiers (`id-1`, `id-2`, ...).
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("id-{n}")
    }
}
