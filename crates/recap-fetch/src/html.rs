//! HTML to plain text conversion for fetched web pages.

use once_cell::sync::Lazy;
use regex::Regex;

/// Elements whose content is never visible text.
static HIDDEN_BLOCKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style|head|noscript|template|svg)\b[^>]*>.*?</(script|style|head|noscript|template|svg)\s*>")
        .expect("static regex")
});

static COMMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("static regex"));

/// Tags that end a line of visible text.
static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|li|tr|h[1-6]|blockquote|pre|section|article|header|footer|table|ul|ol)\s*>")
        .expect("static regex")
});

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"));

static ENTITIES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("static regex"));

static INLINE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").expect("static regex"));

/// Convert an HTML document to readable plain text.
///
/// Hidden elements (scripts, styles, the document head) are dropped, block
/// ends become line breaks, remaining tags are stripped, entities decoded and
/// whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let text = HIDDEN_BLOCKS.replace_all(html, "");
    let text = COMMENTS.replace_all(&text, "");
    let text = LINE_BREAKS.replace_all(&text, "\n");
    let text = TAGS.replace_all(&text, "");
    let text = decode_entities(&text);

    text.lines()
        .map(|line| INLINE_SPACE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode named and numeric HTML character references.
///
/// Unknown named entities are left as written.
pub fn decode_entities(text: &str) -> String {
    ENTITIES
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            decode_entity(entity).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<String> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }

    let decoded = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "deg" => "\u{b0}",
        "middot" => "\u{b7}",
        "bull" => "\u{2022}",
        _ => return None,
    };
    Some(decoded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags() {
        let html = "<html><body><h1>Title</h1><p>Hello <b>world</b></p></body></html>";
        assert_eq!(html_to_text(html), "Title\nHello world");
    }

    #[test]
    fn test_drops_script_style_and_head() {
        let html = r#"<html><head><title>Ignored</title><style>p { color: red; }</style></head>
<body><script type="text/javascript">var x = "<p>nope</p>";</script><p>Visible</p></body></html>"#;
        assert_eq!(html_to_text(html), "Visible");
    }

    #[test]
    fn test_drops_comments() {
        assert_eq!(html_to_text("<p>a<!-- hidden <b>x</b> -->b</p>"), "ab");
    }

    #[test]
    fn test_line_breaks() {
        let html = "<ul><li>One</li><li>Two</li></ul>Line<br/>Next";
        assert_eq!(html_to_text(html), "One\nTwo\nLine\nNext");
    }

    #[test]
    fn test_decodes_entities() {
        assert_eq!(
            decode_entities("Fish &amp; chips &lt;3 &#65;&#x42; &quot;ok&quot;"),
            "Fish & chips <3 AB \"ok\""
        );
    }

    #[test]
    fn test_unknown_entity_kept() {
        assert_eq!(decode_entities("&bogus; &#xZZ;"), "&bogus; &#xZZ;");
    }

    #[test]
    fn test_collapses_whitespace() {
        let html = "<p>  lots   of\t\tspace  </p>\n\n\n<p>&nbsp;</p><p>end</p>";
        assert_eq!(html_to_text(html), "lots of space\nend");
    }

    #[test]
    fn test_plain_text_passthrough() {
        assert_eq!(html_to_text("just text"), "just text");
    }
}
