//! Object storage session.
//!
//! A session is opened for the duration of an advisor run and must be
//! closed afterwards. With the `s3` feature the session holds an AWS S3
//! client for the configured region.

use crate::error::{AdvisorError, Result};
use tracing::{debug, info, warn};

/// An open object storage session.
pub struct StorageSession {
    region: String,
    #[cfg(feature = "s3")]
    client: Option<aws_sdk_s3::Client>,
    open: bool,
}

impl StorageSession {
    /// Open a session for a region.
    pub async fn open(region: &str) -> Result<Self> {
        let region = region.trim();
        if region.is_empty() {
            return Err(AdvisorError::Storage(
                "Failed to initialize: no storage region configured".to_string(),
            ));
        }

        info!("Opening object storage session in {}", region);

        Ok(Self {
            region: region.to_string(),
            #[cfg(feature = "s3")]
            client: Some(Self::connect(region).await),
            open: true,
        })
    }

    #[cfg(feature = "s3")]
    async fn connect(region: &str) -> aws_sdk_s3::Client {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        aws_sdk_s3::Client::new(&aws_config)
    }

    /// Region the session was opened in.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The S3 client of this session.
    #[cfg(feature = "s3")]
    #[allow(dead_code)] // Available to callers storing artifacts
    pub fn client(&self) -> Option<&aws_sdk_s3::Client> {
        self.client.as_ref()
    }

    /// Whether the session is still open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Close the session and release its client. Closing twice is a no-op.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.release();
        debug!("Closed object storage session in {}", self.region);
    }

    fn release(&mut self) {
        #[cfg(feature = "s3")]
        {
            self.client = None;
        }
        self.open = false;
    }
}

impl Drop for StorageSession {
    fn drop(&mut self) {
        if self.is_open() {
            warn!(
                "Object storage session in {} dropped without close, releasing",
                self.region
            );
            self.release();
        }
    }
}
