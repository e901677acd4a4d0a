//! Link validation and classification.

use reqwest::Url;

use recap_core::defaults::MIN_URL_LEN;
use recap_core::LinkKind;

/// Basic URL syntax check: `http`/`https` scheme, a host, and at least
/// [`MIN_URL_LEN`] characters overall.
pub fn is_valid_url(link: &str) -> bool {
    if link.chars().count() < MIN_URL_LEN {
        return false;
    }
    match Url::parse(link) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Classify a link by host and path.
pub fn classify_link(link: &str) -> LinkKind {
    if !is_valid_url(link) {
        return LinkKind::Invalid;
    }
    let Ok(url) = Url::parse(link) else {
        return LinkKind::Invalid;
    };

    let host = url.host_str().unwrap_or_default().to_lowercase();
    if host.contains("youtube") || host.contains("youtu.be") {
        return LinkKind::YouTube;
    }

    let is_pdf = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|last| last.rsplit_once('.'))
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        LinkKind::Pdf
    } else {
        LinkKind::WebPage
    }
}

/// Extract the video id from a YouTube link.
///
/// `youtube.com` hosts use the `v` query parameter, `youtu.be` hosts the last
/// path segment.
pub fn extract_youtube_video_id(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?.to_lowercase();

    let id = if host.contains("youtu.be") {
        url.path_segments()?
            .filter(|segment| !segment.is_empty())
            .last()
            .map(str::to_string)
    } else if host.contains("youtube") {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
    } else {
        None
    };

    id.filter(|id| !id.is_empty())
}
