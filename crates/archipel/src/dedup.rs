//! Removal of repeated `<script>` blocks from a rendered head.
//!
//! Every island instance on a page injects its hydration script into the
//! head, so a page using the same island twice carries identical blocks.

use memchr::memmem;
use std::collections::HashSet;

const OPEN: &[u8] = b"<script";
const CLOSE: &[u8] = b"</script>";

/// A piece of scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    /// From `<script` through the first following `</script>`, inclusive.
    Script(&'a str),
}

/// Splits input into text and script blocks.
///
/// Blocks are the narrowest `<script` .. `</script>` pairs and never
/// overlap. An unterminated `<script` and everything after it is text.
#[derive(Debug, Clone)]
pub struct ScriptScanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> ScriptScanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }
}

impl<'a> Iterator for ScriptScanner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.src.as_bytes();
        if self.pos >= bytes.len() {
            return None;
        }

        let start = self.pos;
        // Both markers are ASCII, so every offset found is a char boundary.
        match memmem::find(&bytes[start..], OPEN) {
            None => {
                self.pos = bytes.len();
                Some(Segment::Text(&self.src[start..]))
            }
            Some(0) => {
                let body = start + OPEN.len();
                match memmem::find(&bytes[body..], CLOSE) {
                    Some(offset) => {
                        self.pos = body + offset + CLOSE.len();
                        Some(Segment::Script(&self.src[start..self.pos]))
                    }
                    None => {
                        self.pos = bytes.len();
                        Some(Segment::Text(&self.src[start..]))
                    }
                }
            }
            Some(offset) => {
                self.pos = start + offset;
                Some(Segment::Text(&self.src[start..self.pos]))
            }
        }
    }
}

/// Keep the first occurrence of each exact script block and drop the rest.
///
/// ```
/// use archipel::dedupe_scripts;
///
/// let head = "<script>a()</script><script>a()</script><script>b()</script>";
/// assert_eq!(dedupe_scripts(head), "<script>a()</script><script>b()</script>");
/// ```
pub fn dedupe_scripts(head: &str) -> String {
    let mut seen = HashSet::new();
    let mut out = String::with_capacity(head.len());

    for segment in ScriptScanner::new(head) {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Script(block) => {
                if seen.insert(block) {
                    out.push_str(block);
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_blocks_collapse() {
        let block = r#"<script type="module">import "/components/Counter.js"</script>"#;
        let head = format!("{block}\n{block}\n{block}");
        let deduped = dedupe_scripts(&head);
        assert_eq!(deduped.matches(block).count(), 1);
        assert_eq!(deduped, format!("{block}\n\n"));
    }

    #[test]
    fn test_distinct_blocks_kept_in_order() {
        let head = "<script>a</script><script>b</script><script>a</script>";
        assert_eq!(dedupe_scripts(head), "<script>a</script><script>b</script>");
    }

    #[test]
    fn test_whitespace_makes_blocks_distinct() {
        let head = "<script>a</script><script> a</script>";
        assert_eq!(dedupe_scripts(head), head);
    }

    #[test]
    fn test_text_outside_blocks_untouched() {
        let head = r#"<title>Home</title><script>x</script><link rel="stylesheet"><script>x</script><meta>"#;
        assert_eq!(
            dedupe_scripts(head),
            r#"<title>Home</title><script>x</script><link rel="stylesheet"><meta>"#
        );
    }

    #[test]
    fn test_narrowest_match() {
        let segments: Vec<_> =
            ScriptScanner::new("<script>a</script>mid<script>b</script>").collect();
        assert_eq!(
            segments,
            vec![
                Segment::Script("<script>a</script>"),
                Segment::Text("mid"),
                Segment::Script("<script>b</script>"),
            ]
        );
    }

    #[test]
    fn test_nested_open_tag_ends_at_first_close() {
        let segments: Vec<_> = ScriptScanner::new("<script><script>x</script></script>").collect();
        assert_eq!(
            segments,
            vec![
                Segment::Script("<script><script>x</script>"),
                Segment::Text("</script>"),
            ]
        );
    }

    #[test]
    fn test_unterminated_block_is_text() {
        let head = "<script>a</script><script>never closed";
        assert_eq!(dedupe_scripts(head), head);
        let segments: Vec<_> = ScriptScanner::new(head).collect();
        assert_eq!(segments.last(), Some(&Segment::Text("<script>never closed")));
    }

    #[test]
    fn test_multibyte_text_preserved() {
        let head = "<title>Café ☕</title><script>é</script><script>é</script>";
        assert_eq!(dedupe_scripts(head), "<title>Café ☕</title><script>é</script>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(dedupe_scripts(""), "");
        assert_eq!(ScriptScanner::new("").count(), 0);
    }
}
