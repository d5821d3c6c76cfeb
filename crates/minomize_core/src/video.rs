use url::Url;

const TITLE_SUFFIX: &str = " - YouTube";

/// Canonical watch URL for a video page, or `None` when the page is not a video.
///
/// Accepts `youtube.com/watch?v=ID` (any subdomain) and `youtu.be/ID`; tracking
/// parameters and timestamps are dropped so the same video always maps to the same URL.
pub fn canonical_watch_url(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url.trim()).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();

    let video_id = if host == "youtube.com" || host.ends_with(".youtube.com") {
        if !parsed.path().starts_with("/watch") {
            return None;
        }
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())?
    } else if host == "youtu.be" {
        parsed.path_segments()?.next()?.to_string()
    } else {
        return None;
    };

    if video_id.is_empty() {
        return None;
    }
    Some(format!("https://www.youtube.com/watch?v={video_id}"))
}

/// Loose check used by the popup to decide whether the active tab is a video.
pub fn is_video_page(url: &str) -> bool {
    url.contains("youtube.com/watch") || url.contains("youtu.be/")
}

/// Tab title without the site suffix, or `fallback` when there is no usable title.
pub fn display_title(tab_title: Option<&str>, fallback: &str) -> String {
    match tab_title.map(|title| title.trim_end_matches(TITLE_SUFFIX).trim()) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => fallback.to_string(),
    }
}

/// Shortens `text` to at most `max_chars` characters, ending in `...` when cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// `{frontend_base}/video/{job_id}`.
pub fn result_url(frontend_base: &str, job_id: &str) -> String {
    format!("{}/video/{}", frontend_base.trim_end_matches('/'), job_id)
}
