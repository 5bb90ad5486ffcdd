// Engine diagnostics - maps yt-dlp error text to user-facing restrictions
//
// yt-dlp reports every failure as free text on stderr. Restrictions the user
// can act on (private, age gate, region, ...) are matched here so the HTTP
// layer never echoes raw engine output for them.

use regex::Regex;

use crate::downloader::errors::RestrictionKind;

lazy_static::lazy_static! {
    static ref ERROR_LINE_RE: Regex = Regex::new(r"(?m)^ERROR:\s*(.+?)\s*$").unwrap();
}

/// Analyze an error message and return the restriction it describes
pub fn diagnose_error(error: &str) -> Option<RestrictionKind> {
    let lower = error.to_lowercase();

    // Age gate
    if lower.contains("sign in to confirm your age")
        || lower.contains("age-restricted")
        || lower.contains("inappropriate for some users")
    {
        return Some(RestrictionKind::AgeRestricted);
    }

    // Private video
    if lower.contains("private video")
        || lower.contains("video is private")
        || lower.contains("sign in if you've been granted access")
    {
        return Some(RestrictionKind::Private);
    }

    // Members-only content
    if lower.contains("members only")
        || lower.contains("members-only")
        || lower.contains("join this channel")
        || lower.contains("available to this channel's members")
    {
        return Some(RestrictionKind::MembersOnly);
    }

    // DRM and paid content: permanent
    if lower.contains("drm protected")
        || lower.contains("drm-protected")
        || lower.contains("widevine")
        || lower.contains("playready")
        || lower.contains("requires payment")
        || lower.contains("requires purchase")
    {
        return Some(RestrictionKind::DrmProtected);
    }

    // Geographic restriction, before "unavailable": yt-dlp phrases it as
    // "Video unavailable. ... not made this video available in your country"
    if lower.contains("available in your country")
        || lower.contains("blocked in your country")
        || lower.contains("geo restriction")
        || lower.contains("geo-restricted")
    {
        return Some(RestrictionKind::GeoBlocked);
    }

    // Deleted / removed
    if lower.contains("video unavailable")
        || lower.contains("video is unavailable")
        || lower.contains("video has been removed")
        || lower.contains("no longer available")
    {
        return Some(RestrictionKind::Unavailable);
    }

    None
}

/// One-line description of an engine failure.
///
/// Prefers the last `ERROR:` line, then the last non-empty line.
pub fn error_summary(stderr: &str) -> String {
    if let Some(caps) = ERROR_LINE_RE.captures_iter(stderr).last() {
        return caps[1].to_string();
    }

    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
        .unwrap_or_else(|| "unknown engine error".to_string())
}
