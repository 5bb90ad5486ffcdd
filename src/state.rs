use std::sync::Arc;

use crate::downloader::Downloader;

#[derive(Clone)]
pub struct AppState {
    pub downloader: Arc<Downloader>,
}

impl AppState {
    pub fn new(downloader: Downloader) -> Self {
        Self {
            downloader: Arc::new(downloader),
        }
    }
}
