//! Tolerant tag/attribute scanning for HTML fragments.
//!
//! Uses simple string scanning (no HTML parser dependency). Tag and attribute
//! names match case-insensitively, values may be single- or double-quoted, and
//! attribute order does not matter. The first matching tag wins.

/// Returns the `src` of the first `<img>` tag that has a non-empty one.
///
/// ```
/// use notefeed::util::first_img_src;
///
/// let html = r#"<p>intro</p><IMG alt='x' SRC='https://a/b.png'>"#;
/// assert_eq!(first_img_src(html), Some("https://a/b.png"));
/// ```
pub fn first_img_src(html: &str) -> Option<&str> {
    Tags::new(html, "img").find_map(|tag| attr_value(tag, "src").filter(|v| !v.is_empty()))
}

/// Returns the `content` of the first `<meta property="og:image">` tag.
///
/// ```
/// use notefeed::util::og_image;
///
/// let html = r#"<head><meta content="https://x/y.jpg" property="og:image"></head>"#;
/// assert_eq!(og_image(html), Some("https://x/y.jpg"));
/// ```
pub fn og_image(html: &str) -> Option<&str> {
    Tags::new(html, "meta")
        .filter(|tag| {
            attr_value(tag, "property").is_some_and(|p| p.eq_ignore_ascii_case("og:image"))
        })
        .find_map(|tag| attr_value(tag, "content").filter(|v| !v.is_empty()))
}

/// Iterator over the source text of every `<name ...>` tag, in document order.
struct Tags<'a> {
    html: &'a str,
    // ASCII lowercasing keeps byte offsets identical to `html`
    lower: String,
    name: &'a str,
    pos: usize,
}

impl<'a> Tags<'a> {
    fn new(html: &'a str, name: &'a str) -> Self {
        Self {
            html,
            lower: html.to_ascii_lowercase(),
            name,
            pos: 0,
        }
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let html = self.html;
        let open = format!("<{}", self.name);

        while let Some(found) = self.lower[self.pos..].find(&open) {
            let start = self.pos + found;
            let after_name = start + open.len();

            // Reject <imgfoo>, <metadata>, ...
            let boundary = html[after_name..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_whitespace() || c == '/' || c == '>');
            if !boundary {
                self.pos = after_name;
                continue;
            }

            let end = tag_end(&html[after_name..])?;
            let tag_end_abs = after_name + end + 1;
            self.pos = tag_end_abs;
            return Some(&html[start..tag_end_abs]);
        }

        self.pos = html.len();
        None
    }
}

/// Offset of the `>` closing a tag, skipping over quoted attribute values.
fn tag_end(rest: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, b) in rest.bytes().enumerate() {
        match (quote, b) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"') | (None, b'\'') => quote = Some(b),
            (None, b'>') => return Some(i),
            (None, _) => {}
        }
    }
    None
}

/// Extracts the value of `attr_name` from a tag string (case-preserving).
///
/// Walks the tag one attribute at a time, so names are matched whole
/// (`data-src` is not `src`) and text inside another attribute's quoted
/// value is never taken for a name. Whitespace around `=` is allowed.
fn attr_value<'a>(tag: &'a str, attr_name: &str) -> Option<&'a str> {
    let is_name_end = |c: char| c.is_ascii_whitespace() || matches!(c, '=' | '>' | '/');

    // Skip `<` and the tag name
    let mut rest = tag.strip_prefix('<')?;
    rest = &rest[rest.find(is_name_end).unwrap_or(rest.len())..];

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '/');
        if rest.is_empty() || rest.starts_with('>') {
            return None;
        }

        let name_len = rest.find(is_name_end).unwrap_or(rest.len());
        // A stray `=` with no name in front of it
        let name_len = name_len.max(1);
        let name = &rest[..name_len];
        rest = rest[name_len..].trim_start();

        let value = match rest.strip_prefix('=') {
            Some(after_eq) => {
                let after_eq = after_eq.trim_start();
                match after_eq.chars().next() {
                    Some(quote @ ('"' | '\'')) => {
                        let inner = &after_eq[1..];
                        let end = inner.find(quote)?;
                        rest = &inner[end + 1..];
                        Some(&inner[..end])
                    }
                    _ => {
                        // Unquoted value runs to whitespace or the end of the tag
                        let end = after_eq
                            .find(|c: char| c.is_ascii_whitespace() || c == '>')
                            .unwrap_or(after_eq.len());
                        rest = &after_eq[end..];
                        Some(after_eq[..end].trim_end_matches('/'))
                    }
                }
            }
            None => None,
        };

        if name.eq_ignore_ascii_case(attr_name) {
            if let Some(value) = value {
                return Some(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- <img> scanning ---

    #[test]
    fn test_img_double_quotes() {
        let html = r#"<p><img src="https://example.com/a.jpg" alt="a"></p>"#;
        assert_eq!(first_img_src(html), Some("https://example.com/a.jpg"));
    }

    #[test]
    fn test_img_single_quotes_and_uppercase() {
        let html = "<IMG ALT='a' SRC='https://example.com/b.jpg'>";
        assert_eq!(first_img_src(html), Some("https://example.com/b.jpg"));
    }

    #[test]
    fn test_img_first_match_wins() {
        let html = r#"<img src="https://a/1.jpg"><img src="https://a/2.jpg">"#;
        assert_eq!(first_img_src(html), Some("https://a/1.jpg"));
    }

    #[test]
    fn test_img_without_src_is_skipped() {
        let html = r#"<img alt="spacer"><img src="https://a/2.jpg">"#;
        assert_eq!(first_img_src(html), Some("https://a/2.jpg"));
    }

    #[test]
    fn test_img_data_src_not_confused_with_src() {
        let html = r#"<img data-src="https://a/lazy.jpg" src="https://a/real.jpg">"#;
        assert_eq!(first_img_src(html), Some("https://a/real.jpg"));
    }

    #[test]
    fn test_img_self_closing_unquoted() {
        let html = "<img src=https://a/u.jpg/>";
        assert_eq!(first_img_src(html), Some("https://a/u.jpg"));
    }

    #[test]
    fn test_img_prefix_tag_ignored() {
        let html = r#"<imgx src="https://a/no.jpg"><img src="https://a/yes.jpg">"#;
        assert_eq!(first_img_src(html), Some("https://a/yes.jpg"));
    }

    #[test]
    fn test_img_gt_inside_quoted_attribute() {
        let html = r#"<img alt="a > b" src="https://a/q.jpg">"#;
        assert_eq!(first_img_src(html), Some("https://a/q.jpg"));
    }

    #[test]
    fn test_img_src_text_inside_alt_ignored() {
        let html = r#"<img alt="photo src=thumb" src="https://a/real.jpg">"#;
        assert_eq!(first_img_src(html), Some("https://a/real.jpg"));

        let html = r#"<img title='see  src="x"' data-src="https://a/lazy.jpg">"#;
        assert_eq!(first_img_src(html), None);
    }

    #[test]
    fn test_no_img() {
        assert_eq!(first_img_src("<p>text only</p>"), None);
        assert_eq!(first_img_src(""), None);
    }

    #[test]
    fn test_non_ascii_text_before_tag() {
        let html = r#"<p>記事の紹介 İstanbul</p><img src="https://a/jp.jpg">"#;
        assert_eq!(first_img_src(html), Some("https://a/jp.jpg"));
    }

    // --- og:image scanning ---

    #[test]
    fn test_og_image_property_first() {
        let html = r#"<html><head>
            <meta property="og:title" content="Title">
            <meta property="og:image" content="https://x/y.jpg">
        </head></html>"#;
        assert_eq!(og_image(html), Some("https://x/y.jpg"));
    }

    #[test]
    fn test_og_image_content_first() {
        let html = r#"<meta content='https://x/z.png' property='og:image' />"#;
        assert_eq!(og_image(html), Some("https://x/z.png"));
    }

    #[test]
    fn test_og_image_case_insensitive() {
        let html = r#"<META PROPERTY="OG:IMAGE" CONTENT="https://x/Case.JPG">"#;
        assert_eq!(og_image(html), Some("https://x/Case.JPG"));
    }

    #[test]
    fn test_og_image_ignores_secure_url_and_width() {
        let html = r#"<meta property="og:image:width" content="1200">
            <meta property="og:image" content="https://x/main.jpg">"#;
        assert_eq!(og_image(html), Some("https://x/main.jpg"));
    }

    #[test]
    fn test_og_property_text_inside_content_ignored() {
        let html = r#"<meta name="note" content="x property=og:image">
            <meta content="https://x/real.jpg" property="og:image">"#;
        assert_eq!(og_image(html), Some("https://x/real.jpg"));

        let html = r#"<meta property="og:image" name="a content=nope" content="https://x/c.jpg">"#;
        assert_eq!(og_image(html), Some("https://x/c.jpg"));
    }

    #[test]
    fn test_og_image_missing() {
        let html = r#"<meta name="description" content="nothing here">"#;
        assert_eq!(og_image(html), None);
    }

    #[test]
    fn test_og_image_unterminated_tag() {
        assert_eq!(og_image(r#"<meta property="og:image" content="https://x"#), None);
    }
}
