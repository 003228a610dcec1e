//! Minimal anchor extraction for Apache/nginx style HTML directory indexes.

/// A hyperlink found in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Raw `href` attribute value
    pub href: String,
    /// Visible text of the link with nested tags removed
    pub text: String,
}

/// Extract every `<a href=...>text</a>` pair from an HTML document, in order.
///
/// Tag and attribute names are matched case-insensitively; attribute values may be
/// double-quoted, single-quoted, or bare. Anchors without an `href` are skipped.
pub fn parse_anchors(html: &str) -> Vec<Anchor> {
    // ASCII lowercasing keeps byte offsets identical to the original document
    let lower = html.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut anchors = Vec::new();
    let mut pos = 0;

    while let Some(found) = lower[pos..].find("<a") {
        let after = pos + found + 2;

        match bytes.get(after) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' => {}
            _ => {
                pos = after;
                continue;
            }
        }

        let Some(tag_end) = lower[after..].find('>').map(|i| after + i) else {
            break;
        };
        let Some(close) = lower[tag_end + 1..].find("</a").map(|i| tag_end + 1 + i) else {
            break;
        };

        if let Some(href) = attribute_value(&html[after..tag_end], "href") {
            let text = strip_tags(&html[tag_end + 1..close]);
            anchors.push(Anchor {
                href: decode_entities(&href),
                text: decode_entities(text.trim()),
            });
        }

        pos = close + 3;
    }

    anchors
}

/// Find the value of `name` inside the attribute section of a tag.
fn attribute_value(attributes: &str, name: &str) -> Option<String> {
    let lower = attributes.to_ascii_lowercase();
    let mut pos = 0;

    while let Some(found) = lower[pos..].find(name) {
        let start = pos + found;
        let end = start + name.len();
        pos = end;

        let standalone = start == 0 || lower.as_bytes()[start - 1].is_ascii_whitespace();
        if !standalone {
            continue;
        }

        let rest = attributes[end..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();

        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let inner = &rest[1..];
                inner.find(quote).map(|close| &inner[..close]).unwrap_or(inner)
            }
            Some(_) => rest
                .split(|c: char| c.is_ascii_whitespace())
                .next()
                .unwrap_or_default(),
            None => "",
        };

        return Some(value.to_string());
    }

    None
}

fn strip_tags(fragment: &str) -> String {
    let mut text = String::with_capacity(fragment.len());
    let mut in_tag = false;

    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOMADS_ROOT: &str = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 3.2 Final//EN">
<html>
 <head>
  <title>Index of /pub/data/nccf/com/nwm/prod</title>
 </head>
 <body>
<h1>Index of /pub/data/nccf/com/nwm/prod</h1>
<pre><img src="/icons/blank.gif" alt="Icon "> <a href="?C=N;O=D">Name</a>                    <a href="?C=M;O=A">Last modified</a>
<hr><img src="/icons/back.gif" alt="[PARENTDIR]"> <a href="/pub/data/nccf/com/nwm/">Parent Directory</a>                             -
<img src="/icons/folder.gif" alt="[DIR]"> <a href="nwm.20200820/">nwm.20200820/</a>            20-Aug-2020 23:59    -
<img src="/icons/folder.gif" alt="[DIR]"> <A HREF='nwm.20200821/'>nwm.20200821/</A>            21-Aug-2020 12:10    -
<hr></pre>
</body></html>
"#;

    #[test]
    fn test_parse_nomads_index() {
        let anchors = parse_anchors(NOMADS_ROOT);
        let texts: Vec<&str> = anchors.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Name", "Last modified", "Parent Directory", "nwm.20200820/", "nwm.20200821/"]
        );
        assert_eq!(anchors[4].href, "nwm.20200821/");
        assert_eq!(anchors[0].href, "?C=N;O=D");
    }

    #[test]
    fn test_attribute_order_and_nested_tags() {
        let html = r#"<a class="file" href=nwm.t00z.short_range.land.f001.conus.nc><b>nwm.t00z.short_range.land.f001.conus.nc</b></a>"#;
        let anchors = parse_anchors(html);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].href, "nwm.t00z.short_range.land.f001.conus.nc");
        assert_eq!(anchors[0].text, "nwm.t00z.short_range.land.f001.conus.nc");
    }

    #[test]
    fn test_skips_non_anchor_tags_and_missing_href() {
        let html = r#"<abbr>x</abbr><a name="top">top</a><a href="a&amp;b">a &amp; b</a>"#;
        let anchors = parse_anchors(html);
        assert_eq!(
            anchors,
            vec![Anchor {
                href: "a&b".to_string(),
                text: "a & b".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_anchors("").is_empty());
        assert!(parse_anchors("<a href=\"x\">unterminated").is_empty());
    }
}
