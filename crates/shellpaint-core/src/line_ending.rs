//! Line-ending normalization.
//!
//! Output text can carry bare CR, bare LF, or CRLF. Text devices and the
//! debugger channel each want exactly one form, so runs are split on every
//! separator and rebuilt with the caller's choice.

/// One piece of a run: literal content or a line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSegment<'a> {
    /// Content between separators, never empty.
    Text(&'a str),
    /// A bare CR, a bare LF, or a CRLF pair.
    Break,
}

/// Iterator over the [`LineSegment`]s of a run.
#[derive(Debug, Clone)]
pub struct LineSegments<'a> {
    rest: &'a str,
}

impl<'a> LineSegments<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for LineSegments<'a> {
    type Item = LineSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.rest.as_bytes();
        if bytes.is_empty() {
            return None;
        }
        match memchr::memchr2(b'\r', b'\n', bytes) {
            Some(0) => {
                let len = if bytes.starts_with(b"\r\n") { 2 } else { 1 };
                self.rest = &self.rest[len..];
                Some(LineSegment::Break)
            }
            Some(idx) => {
                let (text, rest) = self.rest.split_at(idx);
                self.rest = rest;
                Some(LineSegment::Text(text))
            }
            None => {
                let text = self.rest;
                self.rest = "";
                Some(LineSegment::Text(text))
            }
        }
    }
}

/// Rewrite every CR, LF, and CRLF in `text` as `line_ending`.
#[must_use]
pub fn normalize_line_endings(text: &str, line_ending: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in LineSegments::new(text) {
        match segment {
            LineSegment::Text(t) => out.push_str(t),
            LineSegment::Break => out.push_str(line_ending),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_separators_become_lf() {
        assert_eq!(normalize_line_endings("A\r\nB\rC\nD", "\n"), "A\nB\nC\nD");
    }

    #[test]
    fn lf_becomes_crlf() {
        assert_eq!(normalize_line_endings("a\nb\n", "\r\n"), "a\r\nb\r\n");
    }

    #[test]
    fn lf_cr_is_two_breaks() {
        assert_eq!(normalize_line_endings("a\n\rb", "|"), "a||b");
    }

    #[test]
    fn no_separators_is_identity() {
        assert_eq!(normalize_line_endings("plain text", "\r\n"), "plain text");
        assert_eq!(normalize_line_endings("", "\r\n"), "");
    }

    #[test]
    fn segments_are_borrowed_slices() {
        let segs: Vec<_> = LineSegments::new("ab\r\n\ncd").collect();
        assert_eq!(
            segs,
            vec![
                LineSegment::Text("ab"),
                LineSegment::Break,
                LineSegment::Break,
                LineSegment::Text("cd"),
            ]
        );
    }
}
