// Scoped per-request storage for engine output
//
// yt-dlp has to write to disk (merging and mp3 extraction cannot target a
// pipe), so every fetch gets its own uniquely named temp directory. The
// directory lives exactly as long as the MediaStream built from it.

use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use tempfile::TempDir;
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};

use super::errors::DownloadError;

/// Suffixes yt-dlp uses for in-progress or bookkeeping files
const PARTIAL_SUFFIXES: [&str; 4] = [".part", ".ytdl", ".temp", ".tmp"];

pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create under `root`, or the OS temp dir when `None`
    pub fn create(root: Option<&Path>) -> Result<Self, DownloadError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("streamgrab-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Locate the finished media file: the largest complete regular file
    pub async fn output_file(&self) -> Result<PathBuf, DownloadError> {
        let mut entries = tokio::fs::read_dir(self.path()).await?;
        let mut best: Option<(u64, PathBuf)> = None;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if PARTIAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
                continue;
            }

            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            if best.as_ref().is_none_or(|(len, _)| metadata.len() > *len) {
                best = Some((metadata.len(), path));
            }
        }

        best.map(|(_, path)| path).ok_or(DownloadError::NoOutput)
    }

    /// Open `path` for streaming; the directory moves into the stream
    pub async fn into_stream(self, path: &Path) -> Result<(MediaStream, u64), DownloadError> {
        let file = File::open(path).await?;
        let len = file.metadata().await?.len();
        Ok((MediaStream { file, _scratch: self.dir }, len))
    }
}

/// Readable body that deletes its backing directory when dropped
pub struct MediaStream {
    // Declared first so the handle closes before the directory is removed.
    file: File,
    _scratch: TempDir,
}

impl AsyncRead for MediaStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_read(cx, buf)
    }
}
