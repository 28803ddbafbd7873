// src/core/html.rs
// Minimal tag-scanning helpers for the HTML fallback paths.
// Good enough for well-formed listing pages; adapters that need real
// structure use the sites' JSON APIs or JSON-LD blocks instead.

use super::sanitize::{normalize_entities, normalize_ws};

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Find the next `<open …> … </close>` block, case-insensitive.
/// Returns (start of open tag, end just past the close tag).
pub fn next_tag_block_ci(s: &str, open: &str, close: &str, from: usize) -> Option<(usize, usize)> {
    let lc = to_lower(s);
    let ol = to_lower(open);
    let cl = to_lower(close);
    let start = lc.get(from..)?.find(&ol)? + from;
    let open_end = s[start..].find('>')? + start + 1;
    let end_rel = lc[open_end..].find(&cl)?;
    Some((start, open_end + end_rel + close.len()))
}

/// Content between the open tag's `>` and the close tag of a full block.
pub fn inner_after_open_tag(block: &str) -> &str {
    let Some(oe) = block.find('>') else { return "" };
    let Some(cs) = block.rfind('<') else { return "" };
    if cs > oe { &block[oe + 1..cs] } else { "" }
}

/// Value of an attribute inside the first tag of `fragment`, or None.
/// Handles single and double quotes; attribute names matched case-insensitively.
pub fn attr(fragment: &str, name: &str) -> Option<String> {
    let tag_end = fragment.find('>')?;
    let tag = &fragment[..tag_end];
    let lc = to_lower(tag);
    let needle = format!("{}=", to_lower(name));
    let mut at = 0;
    loop {
        let rel = lc[at..].find(&needle)?;
        let pos = at + rel;
        // Must be a word boundary, not e.g. `datetime=` matching `time=`.
        let boundary = pos == 0
            || !lc.as_bytes()[pos - 1].is_ascii_alphanumeric() && lc.as_bytes()[pos - 1] != b'-';
        let vstart = pos + needle.len();
        if !boundary {
            at = vstart;
            continue;
        }
        let rest = &tag[vstart..];
        let mut chars = rest.chars();
        return match chars.next() {
            Some(q @ ('"' | '\'')) => {
                let body = &rest[1..];
                body.find(q).map(|e| normalize_entities(&body[..e]))
            }
            Some(_) => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                Some(normalize_entities(&rest[..end]))
            }
            None => None,
        };
    }
}

/// Drop all tags, decode common entities, collapse whitespace.
pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&normalize_entities(&out))
}

/// Bodies of every `<script type="application/ld+json">` block in the page.
pub fn jsonld_blocks(page: &str) -> Vec<&str> {
    let lc = to_lower(page);
    let mut out = Vec::new();
    let mut at = 0;
    while let Some(rel) = lc[at..].find("<script") {
        let start = at + rel;
        let Some(open_end) = page[start..].find('>').map(|i| start + i + 1) else { break };
        let tag = to_lower(&page[start..open_end]);
        let Some(close_rel) = lc[open_end..].find("</script") else { break };
        if tag.contains("application/ld+json") {
            out.push(&page[open_end..open_end + close_rel]);
        }
        at = open_end + close_rel + "</script".len();
    }
    out
}

/// src of the first `<img>` inside `fragment`, or None. Void tag, so no
/// block scan.
pub fn first_img_src(fragment: &str) -> Option<String> {
    let start = to_lower(fragment).find("<img")?;
    attr(&fragment[start..], "src").filter(|s| !s.is_empty())
}

/// Href of a rel="next" pagination link, if any.
pub fn next_link(page: &str) -> Option<String> {
    let lc = to_lower(page);
    let mut at = 0;
    while let Some(rel) = lc[at..].find("<a") {
        let start = at + rel;
        let end = page[start..].find('>').map(|i| start + i + 1)?;
        let tag = &page[start..end];
        let is_next = attr(tag, "rel").is_some_and(|r| r == "next")
            || attr(tag, "class").is_some_and(|c| {
                c.split_whitespace().any(|p| p == "next" || p == "next-page" || p == "page-next")
            });
        if is_next {
            if let Some(href) = attr(tag, "href") {
                return Some(href);
            }
        }
        at = end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_flattens_markup() {
        assert_eq!(strip_tags("<p>Amleto <b>di</b> Shakespeare</p>"), "Amleto di Shakespeare");
        assert_eq!(strip_tags("Romeo &amp; Giulietta"), "Romeo & Giulietta");
    }

    #[test]
    fn attr_reads_quoted_and_bare_values() {
        let tag = r#"<time datetime="2026-02-09T20:30:00" class='when'>"#;
        assert_eq!(attr(tag, "datetime").as_deref(), Some("2026-02-09T20:30:00"));
        assert_eq!(attr(tag, "class").as_deref(), Some("when"));
        assert_eq!(attr("<a href=/next>", "href").as_deref(), Some("/next"));
        assert_eq!(attr(tag, "id"), None);
    }

    #[test]
    fn attr_requires_word_boundary() {
        let tag = r#"<time datetime="2026-02-09">"#;
        // "time" must not match the tail of "datetime".
        assert_eq!(attr(tag, "time"), None);
    }

    #[test]
    fn jsonld_blocks_skip_plain_scripts() {
        let page = r#"
            <script>var x = 1;</script>
            <script type="application/ld+json">{"@type":"Event"}</script>
            <SCRIPT TYPE="application/ld+json"> [1,2] </SCRIPT>
        "#;
        let blocks = jsonld_blocks(page);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("@type"));
    }

    #[test]
    fn first_img_src_reads_void_tags() {
        let block = r#"<div><IMG src="https://x.it/a.jpg" alt=""><img src="b.jpg"></div>"#;
        assert_eq!(first_img_src(block).as_deref(), Some("https://x.it/a.jpg"));
        assert_eq!(first_img_src("<p>no image</p>"), None);
    }

    #[test]
    fn next_link_matches_rel_and_class() {
        let page = r#"<a class="prev" href="/p/1">back</a> <a rel="next" href="/p/3">fwd</a>"#;
        assert_eq!(next_link(page).as_deref(), Some("/p/3"));
        let page2 = r#"<a class="next page-numbers" href="https://x.it/p/2">2</a>"#;
        assert_eq!(next_link(page2).as_deref(), Some("https://x.it/p/2"));
        assert_eq!(next_link("<a href='/p/9'>9</a>"), None);
    }

    #[test]
    fn tag_block_and_inner() {
        let s = "<div><ARTICLE class=x>body</article></div>";
        let (a, b) = next_tag_block_ci(s, "<article", "</article>", 0).unwrap();
        let block = &s[a..b];
        assert_eq!(inner_after_open_tag(block), "body");
    }
}
