// Record loading: obtain the text from a string, a file path or a URL and
// hand it to a freshly-constructed viewer. Every entry point follows the same
// contract: on any failure, log and return `None`, never propagate.

use std::fmt;

use async_trait::async_trait;

use crate::viewer::{ViewerFactory, ViewerHandle, ViewerOptions};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// The request completed with a non-success HTTP status.
    Status(u16),
    /// The request itself failed (network down, malformed URL, ...).
    Failed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Status(status) => write!(f, "HTTP error, status: {status}"),
            TransportError::Failed(message) => write!(f, "request failed: {message}"),
        }
    }
}

/// HTTP GET for record text. `?Send` because the browser event loop is
/// single-threaded and `web-sys` futures are not `Send`.
#[async_trait(?Send)]
pub trait Transport {
    async fn fetch_text(&self, url: &str) -> Result<String, TransportError>;
}

#[async_trait(?Send)]
impl<T: Transport> Transport for &T {
    async fn fetch_text(&self, url: &str) -> Result<String, TransportError> {
        (**self).fetch_text(url).await
    }
}

pub struct RecordLoader<F, T> {
    factory: F,
    transport: T,
}

impl<F: ViewerFactory, T: Transport> RecordLoader<F, T> {
    pub fn new(factory: F, transport: T) -> Self { RecordLoader { factory, transport } }

    /// Constructs a viewer on `target_id` and feeds it `text`. `None` when
    /// the mount point is absent.
    pub fn load_from_str(
        &self, text: &str, target_id: &str, options: &ViewerOptions,
    ) -> Option<F::Viewer> {
        let Some(viewer) = self.factory.create(target_id, options) else {
            log::error!("Cannot find mount point \"{target_id}\"");
            return None;
        };
        viewer.load(text);
        Some(viewer)
    }

    pub async fn load_from_url(
        &self, url: &str, target_id: &str, options: &ViewerOptions,
    ) -> Option<F::Viewer> {
        match self.transport.fetch_text(url).await {
            Ok(text) => self.load_from_str(&text, target_id, options),
            Err(err) => {
                log::error!("Failed to load record from \"{url}\": {err}");
                None
            }
        }
    }

    /// Local record files are served over the same transport as remote URLs.
    pub async fn load_from_file(
        &self, path: &str, target_id: &str, options: &ViewerOptions,
    ) -> Option<F::Viewer> {
        self.load_from_url(path, target_id, options).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_util::{FakeFactory, FakeTransport};

    fn sample_loader() -> RecordLoader<FakeFactory, FakeTransport> {
        let factory = FakeFactory::with_mounts(["board-1"]);
        let transport = FakeTransport::new().with_response("/records/a.kif", "1 ７六歩\n");
        RecordLoader::new(factory, transport)
    }

    #[test]
    fn load_from_str_feeds_the_new_viewer() {
        let loader = sample_loader();
        let viewer = loader.load_from_str("1 ７六歩", "board-1", &ViewerOptions::new()).unwrap();
        assert_eq!(viewer.loaded_texts(), vec!["1 ７六歩".to_owned()]);
    }

    #[test]
    fn load_from_str_missing_mount_returns_none() {
        let loader = sample_loader();
        assert!(loader.load_from_str("x", "no-such-board", &ViewerOptions::new()).is_none());
    }

    #[async_std::test]
    async fn load_from_url_fetches_then_loads() {
        let loader = sample_loader();
        let viewer =
            loader.load_from_url("/records/a.kif", "board-1", &ViewerOptions::new()).await.unwrap();
        assert_eq!(viewer.loaded_texts(), vec!["1 ７六歩\n".to_owned()]);
    }

    #[async_std::test]
    async fn load_from_url_transport_failure_returns_none() {
        let loader = sample_loader();
        assert!(loader.load_from_url("/missing.kif", "board-1", &ViewerOptions::new()).await.is_none());
    }

    #[async_std::test]
    async fn load_from_file_delegates_to_url_path() {
        let loader = sample_loader();
        let viewer =
            loader.load_from_file("/records/a.kif", "board-1", &ViewerOptions::new()).await;
        assert!(viewer.is_some());
    }
}
