// FormatSelector - turns raw engine descriptors into the quality catalog
//
// Handles:
// - Track filtering (combined audio+video, or video-only acceptable)
// - Common resolution allow-list
// - Size estimation from bitrate x duration when the engine has no size
// - One option per height, best quality first

use std::collections::btree_map::{BTreeMap, Entry};

use serde::Deserialize;

use super::models::{FormatOption, StreamDescriptor};

/// Heights offered when `common_heights_only` is on
pub const COMMON_HEIGHTS: [u32; 8] = [144, 240, 360, 480, 720, 1080, 1440, 2160];

/// Which descriptors qualify for the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPolicy {
    /// Needs a height, a video codec and an audio codec
    #[default]
    Combined,
    /// Needs a height and a video codec; the stream may be silent
    VideoOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatalogPolicy {
    pub policy: FilterPolicy,
    pub common_heights_only: bool,
}

impl Default for CatalogPolicy {
    fn default() -> Self {
        Self {
            policy: FilterPolicy::Combined,
            common_heights_only: true,
        }
    }
}

struct Candidate<'a> {
    descriptor: &'a StreamDescriptor,
    height: u32,
    size: Option<u64>,
}

impl Candidate<'_> {
    fn size_key(&self) -> u64 {
        self.size.unwrap_or(0)
    }
}

pub struct FormatSelector;

impl FormatSelector {
    /// Build the catalog shown to the user.
    ///
    /// `duration_secs` is the media length; pass 0 when unknown, which
    /// disables the bitrate estimate.
    pub fn build_catalog(
        descriptors: &[StreamDescriptor],
        duration_secs: f64,
        policy: &CatalogPolicy,
    ) -> Vec<FormatOption> {
        let mut by_height: BTreeMap<u32, Candidate<'_>> = BTreeMap::new();

        for descriptor in descriptors {
            if !Self::qualifies(descriptor, policy.policy) {
                continue;
            }
            let Some(height) = descriptor.video_height() else {
                continue;
            };
            if policy.common_heights_only && !COMMON_HEIGHTS.contains(&height) {
                continue;
            }

            let candidate = Candidate {
                descriptor,
                height,
                size: Self::estimate_size(descriptor, duration_secs),
            };

            // Larger estimate wins; on a tie the first one seen stays.
            match by_height.entry(height) {
                Entry::Vacant(slot) => {
                    slot.insert(candidate);
                }
                Entry::Occupied(mut slot) => {
                    if candidate.size_key() > slot.get().size_key() {
                        slot.insert(candidate);
                    }
                }
            }
        }

        let mut candidates: Vec<Candidate<'_>> = by_height.into_values().collect();
        candidates.sort_by(|a, b| {
            b.height
                .cmp(&a.height)
                .then_with(|| b.size_key().cmp(&a.size_key()))
        });

        candidates
            .into_iter()
            .map(|c| FormatOption {
                format_id: c.descriptor.format_id.clone(),
                label: Self::label(c.height, c.descriptor.fps, c.size),
                height: c.height,
            })
            .collect()
    }

    fn qualifies(descriptor: &StreamDescriptor, policy: FilterPolicy) -> bool {
        if descriptor.video_height().is_none() {
            return false;
        }
        match policy {
            FilterPolicy::Combined => descriptor.has_video() && descriptor.has_audio(),
            // An absent vcodec is fine here; only an explicit "none" is audio-only.
            FilterPolicy::VideoOnly => descriptor.vcodec.as_deref() != Some("none"),
        }
    }

    /// Exact size, then `bitrate_kbps * 1024 * duration / 8`, then the
    /// engine's own approximation. Only a hint for the label.
    pub fn estimate_size(descriptor: &StreamDescriptor, duration_secs: f64) -> Option<u64> {
        if let Some(size) = descriptor.filesize.filter(|s| *s > 0) {
            return Some(size);
        }
        if let Some(size) = Self::bitrate_estimate(descriptor, duration_secs) {
            return Some(size);
        }
        descriptor.filesize_approx.filter(|s| *s > 0)
    }

    fn bitrate_estimate(descriptor: &StreamDescriptor, duration_secs: f64) -> Option<u64> {
        let bitrate = descriptor.bitrate.filter(|b| *b > 0.0)?;
        if duration_secs.is_nan() || duration_secs <= 0.0 {
            return None;
        }
        Some((bitrate * 1024.0 * duration_secs / 8.0).round() as u64)
    }

    /// "720p 60fps (~73.2MB)"
    pub fn label(height: u32, fps: Option<f64>, size: Option<u64>) -> String {
        let mut label = format!("{}p", height);

        if let Some(fps) = fps.filter(|f| *f > 30.0) {
            label.push_str(&format!(" {}fps", fps));
        }

        if let Some(bytes) = size.filter(|b| *b > 0) {
            let mb = bytes as f64 / 1024.0 / 1024.0;
            label.push_str(&format!(" (~{:.1}MB)", mb));
        }

        label
    }
}
