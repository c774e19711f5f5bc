//! Background image loading and caching.
//!
//! `BackgroundStore` handles all image fetching concerns so templates stay
//! pure data with no HTTP or filesystem knowledge. A template's
//! `backgroundImage` may be an `http(s)` URL or a local file path; decoded
//! images are cached keyed by the reference string.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::DynamicImage;
use tokio::sync::RwLock;

use crate::error::CertError;

/// A decoded background plus its last access time, for eviction.
#[derive(Debug, Clone)]
pub struct CachedBackground {
    pub image: DynamicImage,
    last_access: Instant,
}

impl CachedBackground {
    fn new(image: DynamicImage) -> Self {
        Self {
            image,
            last_access: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_access = Instant::now();
    }
}

/// Fetches and caches template backgrounds.
pub struct BackgroundStore {
    client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, CachedBackground>>>,
}

impl BackgroundStore {
    pub fn new() -> Result<Self, CertError> {
        let client = reqwest::Client::builder()
            .user_agent("certatelier/0.1")
            .build()
            .map_err(|e| CertError::Image(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            client,
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Load a background by reference, using the cache when possible.
    ///
    /// `http(s)` references are downloaded; anything else is read from the
    /// local filesystem. The decoded image is cached under the reference.
    pub async fn load(&self, reference: &str) -> Result<DynamicImage, CertError> {
        if reference.trim().is_empty() {
            return Err(CertError::Image("empty background reference".into()));
        }

        {
            let mut cache = self.cache.write().await;
            if let Some(cached) = cache.get_mut(reference) {
                cached.touch();
                return Ok(cached.image.clone());
            }
        }

        let bytes = if reference.starts_with("http://") || reference.starts_with("https://") {
            self.download(reference).await?
        } else {
            tokio::fs::read(reference).await.map_err(|e| {
                CertError::Image(format!("Failed to read {}: {}", reference, e))
            })?
        };

        let image = image::load_from_memory(&bytes)
            .map_err(|e| CertError::Image(format!("Failed to decode {}: {}", reference, e)))?;

        {
            let mut cache = self.cache.write().await;
            cache.insert(reference.to_string(), CachedBackground::new(image.clone()));
        }

        Ok(image)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, CertError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CertError::Image(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(CertError::Image(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CertError::Image(format!("Failed to read image data: {}", e)))?;
        Ok(bytes.to_vec())
    }

    /// Drop cached backgrounds not touched within `max_age`.
    pub async fn evict_expired(&self, max_age: Duration) {
        let mut cache = self.cache.write().await;
        cache.retain(|_, cached| cached.last_access.elapsed() < max_age);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[tokio::test]
    async fn empty_reference_is_an_error() {
        let store = BackgroundStore::new().unwrap();
        assert!(store.load("  ").await.is_err());
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let store = BackgroundStore::new().unwrap();
        assert!(store.load("/nonexistent/bg.png").await.is_err());
    }

    #[tokio::test]
    async fn cached_entries_are_served_and_evicted() {
        let store = BackgroundStore::new().unwrap();
        let image = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        {
            let mut cache = store.cache.write().await;
            cache.insert("bg".into(), CachedBackground::new(image));
        }
        assert!(store.load("bg").await.is_ok());

        store.evict_expired(Duration::ZERO).await;
        assert!(store.load("bg").await.is_err());
    }
}
