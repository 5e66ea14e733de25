//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: copying the static source
//! directory into the static output directory, indexing the posts
//! ([`crate::index`]), rendering the index page, and converting and rendering
//! each post page ([`crate::convert`], [`crate::fragment`],
//! [`crate::render`]).

use crate::config::Config;
use crate::convert::{Converter, Error as ConvertError};
use crate::fragment::{splice, Error as SpliceError};
use crate::index::{build_index, Error as IndexError};
use crate::post::Post;
use crate::render::{Error as RenderError, Templates};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The outcome of a build which ran to completion.
#[derive(Debug, Default)]
pub struct Report {
    /// The output files of the posts which were written.
    pub written: Vec<PathBuf>,

    /// The posts which failed, with the reason.
    pub failed: Vec<(PathBuf, Error)>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Builds the site described by `config`.
///
/// Errors that concern the whole site (copying static assets, indexing,
/// writing the index page) abort the build. Errors that concern a single
/// post are logged and recorded in the returned [`Report`], and the build
/// moves on to the next post.
pub fn build_site(
    config: &Config,
    templates: &Templates,
    converter: &dyn Converter,
) -> Result<Report> {
    let static_output_directory = config.output_directory.join("static");
    log::info!(
        "copying `{}` to `{}`",
        config.static_directory.display(),
        static_output_directory.display()
    );
    rmdir(&static_output_directory)?;
    copy_dir(&config.static_directory, &static_output_directory)?;

    let posts = build_index(&config.input_directory, &config.extensions)?;
    log::info!(
        "found {} posts in `{}`",
        posts.len(),
        config.input_directory.display()
    );

    let index_html = templates.render_index(&config.title, &config.root_url, &posts)?;
    write_file(&config.output_directory.join("index.html"), &index_html)?;

    let mut report = Report::default();
    for post in &posts {
        match build_post(config, templates, converter, post) {
            Ok(path) => report.written.push(path),
            Err(err) => {
                log::error!("{}: {}", post.source_path.display(), err);
                report.failed.push((post.source_path.clone(), err));
            }
        }
    }

    Ok(report)
}

/// Converts, splices, and renders a single post, copies the files beside its
/// source document into its output directory, and finally writes the page.
/// Returns the path of the written page.
pub fn build_post(
    config: &Config,
    templates: &Templates,
    converter: &dyn Converter,
    post: &Post,
) -> Result<PathBuf> {
    let output_directory = post_output_directory(&config.output_directory, post);
    let html_path = output_directory.join("index.html");

    // Everything fallible about the page happens before anything is written.
    let raw = converter.convert(&post.source_path, &config.bibliography)?;
    let fragment = splice(&String::from_utf8_lossy(&raw))?;
    let html = templates.render_post(&post.metadata.post_title, &config.root_url, &fragment)?;

    // The page goes last, so a post whose assets can't be copied has no page.
    std::fs::create_dir_all(&output_directory)?;
    copy_siblings(&post.source_path, &output_directory)?;
    write_file(&html_path, &html)?;
    Ok(html_path)
}

/// Returns `{output_root}/YYYY/MM/DD/{slug}` for `post`.
pub fn post_output_directory(output_root: &Path, post: &Post) -> PathBuf {
    post.destination_dir
        .split('/')
        .fold(output_root.to_owned(), |dir, part| dir.join(part))
}

// Copies every file next to `source` (but not `source` itself, nor any
// directory) into `dst`. These are a post's images, data files, and such.
fn copy_siblings(source: &Path, dst: &Path) -> Result<()> {
    let dir = match source.parent() {
        Some(dir) => dir,
        None => return Ok(()),
    };
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() || entry.path() == source {
            continue;
        }
        let target = dst.join(entry.file_name());
        log::info!(
            "copying `{}` to `{}`",
            entry.path().display(),
            dst.display()
        );
        std::fs::copy(entry.path(), target)?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    log::info!("writing `{}`", path.display());
    std::fs::write(path, contents).map_err(|err| Error::Write {
        path: path.to_owned(),
        err,
    })
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    for result in WalkDir::new(src) {
        let entry = result?;
        // strip_prefix() should never fail since `src` is an ancestor of
        // every entry
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during indexing,
/// converting, splicing, rendering, cleaning output directories, and other
/// I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors while indexing posts.
    Index(IndexError),

    /// Returned when the converter fails for a post.
    Convert(ConvertError),

    /// Returned when the converter's output can't be spliced.
    Splice(SpliceError),

    /// Returned for errors loading or applying templates.
    Render(RenderError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while writing an output page.
    Write { path: PathBuf, err: std::io::Error },

    /// Returned for errors walking the static directory.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Index(err) => err.fmt(f),
            Error::Convert(err) => err.fmt(f),
            Error::Splice(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::Write { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Index(err) => Some(err),
            Error::Convert(err) => Some(err),
            Error::Splice(err) => Some(err),
            Error::Render(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<IndexError> for Error {
    /// Converts [`IndexError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: IndexError) -> Error {
        Error::Index(err)
    }
}

impl From<ConvertError> for Error {
    fn from(err: ConvertError) -> Error {
        Error::Convert(err)
    }
}

impl From<SpliceError> for Error {
    fn from(err: SpliceError) -> Error {
        Error::Splice(err)
    }
}

impl From<RenderError> for Error {
    /// Converts [`RenderError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
