//! YouTube transcript parsing.
//!
//! The watch page embeds the player response, whose `captionTracks` list
//! carries a `baseUrl` for each caption track. That URL returns timedtext XML
//! with one `<text>` element per caption line.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::html::decode_entities;

static CAPTION_BASE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""baseUrl"\s*:\s*("(?:[^"\\]|\\.)*")"#).expect("static regex"));

static TIMEDTEXT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<text\b[^>]*>(.*?)</text>").expect("static regex"));

static INNER_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static regex"));

/// URL of the first caption track listed in a watch page, if any.
pub fn caption_track_url(watch_html: &str) -> Option<String> {
    let start = watch_html.find("\"captionTracks\"")?;
    let caps = CAPTION_BASE_URL.captures(&watch_html[start..])?;
    // The match is a JSON string literal, escapes included (`&`, `\/`).
    serde_json::from_str::<String>(&caps[1])
        .ok()
        .filter(|url| !url.is_empty())
}

/// Join the caption lines of a timedtext XML document into one text.
pub fn parse_timedtext(xml: &str) -> String {
    TIMEDTEXT_LINE
        .captures_iter(xml)
        .map(|caps| {
            let line = INNER_TAGS.replace_all(&caps[1], "");
            // Caption text is entity-escaped inside an already escaped document.
            let line = decode_entities(&decode_entities(&line));
            line.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
