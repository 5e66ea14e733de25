//! Builds the post index: every post found under a source directory, sorted
//! most-recent first.

use crate::post::{self, extract, Post};
use chrono::Datelike;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Walks `root_directory` and returns a [`Post`] for every document whose
/// extension is in `extensions` and which begins with a header block. Posts
/// are sorted by date, most recent first; posts with the same date keep
/// their discovery order.
///
/// Documents without a header block are skipped. Documents with a broken
/// header block fail the whole index.
pub fn build_index(root_directory: &Path, extensions: &HashSet<String>) -> Result<Vec<Post>> {
    let mut posts = Vec::new();
    for result in WalkDir::new(root_directory).sort_by_file_name() {
        let entry = result?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
            continue;
        }
        match parse_post(entry.path())? {
            Some(post) => posts.push(post),
            None => log::debug!("skipping `{}`: no header block", entry.path().display()),
        }
    }

    sort_posts(&mut posts);
    Ok(posts)
}

/// Sorts posts by date, most recent first. The sort is stable.
pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Returns the output directory for a post: `YYYY/MM/DD/{slug}`.
pub fn destination_dir(date: &chrono::NaiveDateTime, slug: &str) -> String {
    format!(
        "{:04}/{:02}/{:02}/{}",
        date.year(),
        date.month(),
        date.day(),
        slug
    )
}

fn has_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| extensions.contains(ext))
}

fn parse_post(path: &Path) -> Result<Option<Post>> {
    match _parse_post(path) {
        Ok(post) => Ok(post),
        Err(err) => Err(Error::Annotated(path.to_owned(), Box::new(err))),
    }
}

fn _parse_post(path: &Path) -> Result<Option<Post>> {
    let contents = std::fs::read_to_string(path)?;
    let metadata = match extract(&contents)? {
        Some(metadata) => metadata,
        None => return Ok(None),
    };
    let date = metadata.date()?;
    Ok(Some(Post {
        source_path: path.to_owned(),
        destination_dir: destination_dir(&date, &metadata.post_slug),
        date,
        metadata,
    }))
}

/// Represents the result of an indexing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error building the post index.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post's header block can't be parsed.
    Post(post::Error),

    /// Returned for I/O errors reading a source document.
    Io(std::io::Error),

    /// Returned for errors walking the source directory.
    WalkDir(walkdir::Error),

    /// An error annotated with the source document it concerns.
    Annotated(PathBuf, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Post(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Annotated(path, err) => {
                write!(f, "parsing post `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Post(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<post::Error> for Error {
    fn from(err: post::Error) -> Error {
        Error::Post(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`].
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn header(title: &str, date: &str, slug: &str) -> String {
        format!(
            "---\npost_title: {}\npost_author: A\npost_date: {}\npost_tags: [a]\npost_slug: {}\npost_summary: s\nis_public: true\n---\nbody\n",
            title, date, slug
        )
    }

    fn extensions() -> HashSet<String> {
        vec!["md".to_owned(), "markdown".to_owned()]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_build_index_minimal() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("x.md"),
            "---\npost_title: X\npost_date: 2024-01-01 10:00\npost_slug: x\npost_tags: [a]\npost_summary: s\npost_author: A\nis_public: true\n---\nbody",
        )?;

        let posts = build_index(dir.path(), &extensions())?;
        assert_eq!(1, posts.len());
        assert_eq!("2024/01/01/x", posts[0].destination_dir);
        assert_eq!("X", posts[0].metadata.post_title);
        assert_eq!(dir.path().join("x.md"), posts[0].source_path);
        Ok(())
    }

    #[test]
    fn test_build_index_sorted_recursive_and_filtered() -> Result<()> {
        let dir = TempDir::new()?;
        fs::create_dir_all(dir.path().join("2023/old"))?;
        fs::create_dir_all(dir.path().join("new"))?;
        fs::write(
            dir.path().join("2023/old/post.markdown"),
            header("Old", "2023-12-31 23:59", "old"),
        )?;
        fs::write(
            dir.path().join("new/post.md"),
            header("New", "2024-02-03 08:30", "new"),
        )?;
        fs::write(
            dir.path().join("middle.md"),
            header("Middle", "2024-01-02 00:00", "middle"),
        )?;
        // Wrong extension, wrong case, and a document without a header.
        fs::write(dir.path().join("notes.txt"), header("Txt", "2025-01-01 00:00", "txt"))?;
        fs::write(dir.path().join("shout.MD"), header("Up", "2025-01-01 00:00", "up"))?;
        fs::write(dir.path().join("README.md"), "# Not a post\n")?;

        let posts = build_index(dir.path(), &extensions())?;
        let titles: Vec<&str> = posts
            .iter()
            .map(|p| p.metadata.post_title.as_str())
            .collect();
        assert_eq!(vec!["New", "Middle", "Old"], titles);
        assert_eq!("2024/02/03/new", posts[0].destination_dir);
        assert_eq!("2023/12/31/old", posts[2].destination_dir);
        Ok(())
    }

    #[test]
    fn test_build_index_extra_extension() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("post.txt"), header("Txt", "2024-01-01 00:00", "txt"))?;
        let mut exts = extensions();
        assert!(build_index(dir.path(), &exts)?.is_empty());
        exts.insert("txt".to_owned());
        assert_eq!(1, build_index(dir.path(), &exts)?.len());
        Ok(())
    }

    #[test]
    fn test_build_index_bad_date_names_file() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("bad.md"), header("Bad", "2024/01/01", "bad"))?;
        match build_index(dir.path(), &extensions()) {
            Err(err @ Error::Annotated(..)) => {
                assert!(err.to_string().contains("bad.md"), "{}", err);
                assert!(err.to_string().contains("2024/01/01"), "{}", err);
            }
            other => panic!("expected annotated error, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_sort_is_stable_and_idempotent() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("a.md"), header("A", "2024-01-01 10:00", "a"))?;
        fs::write(dir.path().join("b.md"), header("B", "2024-01-01 10:00", "b"))?;
        fs::write(dir.path().join("c.md"), header("C", "2024-03-01 10:00", "c"))?;

        let posts = build_index(dir.path(), &extensions())?;
        let mut resorted = posts.clone();
        sort_posts(&mut resorted);
        assert_eq!(posts, resorted);

        let titles: Vec<&str> = posts
            .iter()
            .map(|p| p.metadata.post_title.as_str())
            .collect();
        assert_eq!(vec!["C", "A", "B"], titles);
        Ok(())
    }
}
