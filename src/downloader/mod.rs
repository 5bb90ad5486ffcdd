// Downloader module - catalog building and retrieval on top of yt-dlp

pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod scratch;
pub mod utils;

pub use errors::{DownloadError, InputError, RestrictionKind};
pub use format_selector::{CatalogPolicy, FilterPolicy, FormatSelector};
pub use models::{
    DownloadMode, DownloadRequest, FetchedMedia, FormatOption, MediaInfo, ProbeResult,
    StreamDescriptor,
};
pub use orchestrator::{Downloader, RetrievalSettings};
