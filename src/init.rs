//! Scaffolding for new posts.

use crate::post::DATE_FORMAT;
use chrono::NaiveDateTime;
use std::io;
use std::path::Path;

/// Returns a new post document: a header block with placeholder fields,
/// `author` and the `now` timestamp filled in, and a stub body.
pub fn header_template(author: &str, now: &NaiveDateTime) -> String {
    format!(
        "---
post_title:     <FIXME>
post_author:    {author}
post_date:      {date}
post_tags:      [<FIXME>]
post_slug:      <FIXME>
post_summary:   <FIXME>
is_public:      true
---

Post Title
==========

off you go...
",
        author = author,
        date = now.format(DATE_FORMAT),
    )
}

/// Writes a new post document to `path`, stamped with the current local
/// time. An existing file at `path` is overwritten.
pub fn init_post(path: &Path, author: &str) -> io::Result<()> {
    let now = chrono::Local::now().naive_local();
    std::fs::write(path, header_template(author, &now))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::{extract, Error};

    #[test]
    fn test_header_template() {
        let now = NaiveDateTime::parse_from_str("2024-03-09 07:05", DATE_FORMAT).unwrap();
        let doc = header_template("Jane Doe", &now);
        assert!(doc.starts_with("---\npost_title:     <FIXME>\npost_author:    Jane Doe\n"));
        assert!(doc.contains("\npost_date:      2024-03-09 07:05\n"));
        assert!(doc.ends_with("off you go...\n"));

        // The placeholder slug must be replaced before the post will build.
        assert!(matches!(extract(&doc), Err(Error::InvalidSlug(_))));
    }

    #[test]
    fn test_init_post() -> io::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("new.md");
        init_post(&path, "A")?;

        let doc = std::fs::read_to_string(&path)?;
        let filled = doc
            .replace("post_slug:      <FIXME>", "post_slug:      new")
            .replace("[<FIXME>]", "[draft]");
        let metadata = extract(&filled).unwrap().expect("header block");
        assert_eq!("A", metadata.post_author);
        assert_eq!("<FIXME>", metadata.post_title);
        assert!(metadata.date().is_ok());
        Ok(())
    }
}
