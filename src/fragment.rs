//! Splices a standalone HTML document (as produced by the converter) into the
//! pieces the post template needs: the head's `<style>` and `<script>`
//! elements and the body's inner HTML.
//!
//! This is a textual splice, not an HTML parse. The first `<head>` (or
//! `<body>`) is paired with the last `</head>` (or `</body>`); nested or
//! repeated tags aren't accounted for.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A `<style>` or `<script>` element lifted out of a document head.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// The tag name, `style` or `script`.
    pub name: &'static str,

    /// The opening tag verbatim, attributes included.
    pub open_tag: String,

    /// Everything between the opening and closing tags.
    pub content: String,
}

impl Element {
    /// Re-assembles the complete element.
    pub fn markup(&self) -> String {
        format!("{}{}</{}>", self.open_tag, self.content, self.name)
    }
}

/// The converted content of a post.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fragment {
    /// `<style>` elements from the head, in document order.
    pub styles: Vec<Element>,

    /// `<script>` elements from the head, in document order.
    pub scripts: Vec<Element>,

    /// The inner HTML of the body. This is trusted markup.
    pub body: String,
}

impl Fragment {
    /// The contents of every `<style>` element, newline-separated.
    pub fn style(&self) -> String {
        join(self.styles.iter().map(|e| e.content.as_str()))
    }

    /// The contents of every `<script>` element, newline-separated.
    pub fn script(&self) -> String {
        join(self.scripts.iter().map(|e| e.content.as_str()))
    }

    /// Every `<style>` element in full, newline-separated.
    pub fn style_markup(&self) -> String {
        join(self.styles.iter().map(Element::markup))
    }

    /// Every `<script>` element in full, newline-separated. Scripts which
    /// only carry a `src` attribute (MathJax, for instance) survive intact.
    pub fn script_markup(&self) -> String {
        join(self.scripts.iter().map(Element::markup))
    }
}

fn join<S: AsRef<str>>(parts: impl Iterator<Item = S>) -> String {
    parts
        .map(|s| s.as_ref().to_owned())
        .collect::<Vec<String>>()
        .join("\n")
}

struct Patterns {
    head: Regex,
    body: Regex,
    style: Regex,
    script: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        head: Regex::new(r"(?s)<head>\s*(.*)</head>").unwrap(),
        body: Regex::new(r"(?s)<body>\s*(.*)</body>").unwrap(),
        style: Regex::new(r"(?s)(<style\b[^>]*>)(.*?)</style>").unwrap(),
        script: Regex::new(r"(?s)(<script\b[^>]*>)(.*?)</script>").unwrap(),
    })
}

/// Splits `html` into a [`Fragment`]. Fails if `html` has no `<head>` or no
/// `<body>` region.
pub fn splice(html: &str) -> Result<Fragment> {
    let patterns = patterns();
    let head = capture(&patterns.head, html).ok_or(Error::MissingHead)?;
    let body = capture(&patterns.body, html).ok_or(Error::MissingBody)?;

    Ok(Fragment {
        styles: elements(&patterns.style, "style", head),
        scripts: elements(&patterns.script, "script", head),
        body: body.to_owned(),
    })
}

fn capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn elements(re: &Regex, name: &'static str, head: &str) -> Vec<Element> {
    re.captures_iter(head)
        .map(|c| Element {
            name,
            open_tag: c[1].to_owned(),
            content: c[2].to_owned(),
        })
        .collect()
}

/// Represents the result of a splice operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents malformed converter output.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Returned when the document has no `<head>...</head>` region.
    MissingHead,

    /// Returned when the document has no `<body>...</body>` region.
    MissingBody,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingHead => write!(f, "malformed HTML: no <head> region"),
            Error::MissingBody => write!(f, "malformed HTML: no <body> region"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_splice_minimal() -> Result<()> {
        let fragment = splice(
            "<html><head><style>a{}</style><script>b();</script></head><body>hi</body></html>",
        )?;
        assert_eq!("a{}", fragment.style());
        assert_eq!("b();", fragment.script());
        assert_eq!("hi", fragment.body);
        assert_eq!("<style>a{}</style>", fragment.style_markup());
        assert_eq!("<script>b();</script>", fragment.script_markup());
        Ok(())
    }

    #[test]
    fn test_splice_pandoc_document() -> Result<()> {
        let html = r#"<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" lang="" xml:lang="">
<head>
  <meta charset="utf-8" />
  <title>post</title>
  <style>
    code{white-space: pre-wrap;}
  </style>
  <script
  src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-chtml-full.js"
  type="text/javascript"></script>
  <style type="text/css">span.smallcaps{font-variant: small-caps;}</style>
</head>
<body>
<h1 id="hello">Hello</h1>
<p>World</p>
</body>
</html>
"#;
        let fragment = splice(html)?;
        assert_eq!(2, fragment.styles.len());
        assert_eq!(
            "\n    code{white-space: pre-wrap;}\n  \nspan.smallcaps{font-variant: small-caps;}",
            fragment.style()
        );
        assert_eq!(1, fragment.scripts.len());
        assert_eq!("", fragment.script());
        assert!(fragment.script_markup().contains("tex-chtml-full.js"));
        assert!(fragment.script_markup().ends_with("</script>"));
        assert_eq!(
            "<h1 id=\"hello\">Hello</h1>\n<p>World</p>\n",
            fragment.body
        );
        Ok(())
    }

    #[test]
    fn test_splice_discards_other_head_content() -> Result<()> {
        let fragment =
            splice("<head>\n<title>t</title><meta x /></head><body>\n  <p>x</p></body>")?;
        assert!(fragment.styles.is_empty());
        assert!(fragment.scripts.is_empty());
        assert_eq!("", fragment.style());
        assert_eq!("<p>x</p>", fragment.body);
        Ok(())
    }

    #[test]
    fn test_splice_missing_body() {
        assert_eq!(
            Err(Error::MissingBody),
            splice("<html><head><style>a{}</style></head></html>")
        );
    }

    #[test]
    fn test_splice_missing_head() {
        assert_eq!(Err(Error::MissingHead), splice("<body>hi</body>"));
    }
}
