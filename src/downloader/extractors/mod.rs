// InfoExtractor module - the seam to the external media engine
//
// The engine is yt-dlp, driven as a child process either as the native
// binary or as `python3 -m yt_dlp` (see ExtractorMode). Everything the engine
// needs for one call travels in an ExtractorConfig value.

mod cli;
mod diagnostics;
mod traits;

pub use cli::CliInfoExtractor;
pub use diagnostics::{diagnose_error, error_summary};
pub use traits::{
    CredentialsSource, ExtractorConfig, ExtractorMode, InfoExtractor, NetworkOptions,
    PostProcessing,
};
