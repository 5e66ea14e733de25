//! Renders the index page and post pages from the site's templates.
//!
//! Two templates are expected in the templates directory, both in Go
//! template syntax (see [`gtmpl`]):
//!
//! * `index.html` receives `title`, `root_url`, `style` (the stylesheet
//!   `<link>`), and `posts`, the sorted post list (see
//!   [`crate::value::post_value`] for the fields of each post).
//! * `common.html` receives `title`, `root_url`, `content` (the post body),
//!   `style` (the post's `<style>` elements followed by the stylesheet
//!   `<link>`), and `head_script` (the post's `<script>` elements).
//!
//! No value is escaped; everything handed to the templates is authored or
//! generated markup.

use crate::fragment::Fragment;
use crate::post::Post;
use crate::value::post_value;
use gtmpl::{Context, Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The file name of the index page template.
pub const INDEX_TEMPLATE: &str = "index.html";

/// The file name of the post page template.
pub const COMMON_TEMPLATE: &str = "common.html";

/// Returns the stylesheet `<link>` tag. The link is prefixed with `root_url`
/// unless `root_url` is `/`, which would otherwise double the leading slash.
pub fn stylesheet_link(root_url: &str) -> String {
    format!(
        r#"<link rel="stylesheet" href="{}/static/style.css" />"#,
        url_prefix(root_url)
    )
}

/// Returns the link to a post's page.
pub fn post_url(root_url: &str, destination_dir: &str) -> String {
    format!("{}/{}/", url_prefix(root_url), destination_dir)
}

fn url_prefix(root_url: &str) -> &str {
    match root_url {
        "/" => "",
        _ => root_url,
    }
}

/// The parsed site templates.
pub struct Templates {
    index: Template,
    common: Template,
}

impl Templates {
    /// Loads [`INDEX_TEMPLATE`] and [`COMMON_TEMPLATE`] from `directory`.
    pub fn load(directory: &Path) -> Result<Templates> {
        Ok(Templates {
            index: parse_template_file(&directory.join(INDEX_TEMPLATE))?,
            common: parse_template_file(&directory.join(COMMON_TEMPLATE))?,
        })
    }

    /// Loads the post page template alone. Used by the per-post converter,
    /// which never renders the index.
    pub fn load_common(directory: &Path) -> Result<Template> {
        parse_template_file(&directory.join(COMMON_TEMPLATE))
    }

    /// Builds [`Templates`] from template source text.
    pub fn from_sources(index: &str, common: &str) -> Result<Templates> {
        Ok(Templates {
            index: parse_template(index)?,
            common: parse_template(common)?,
        })
    }

    /// Renders the index page listing `posts`.
    pub fn render_index(&self, title: &str, root_url: &str, posts: &[Post]) -> Result<String> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(title.to_owned()));
        m.insert("root_url".to_owned(), Value::String(root_url.to_owned()));
        m.insert("style".to_owned(), Value::String(stylesheet_link(root_url)));
        m.insert(
            "posts".to_owned(),
            Value::Array(posts.iter().map(|p| post_value(p, root_url)).collect()),
        );
        execute(&self.index, Value::Object(m))
    }

    /// Renders a post page around `fragment`.
    pub fn render_post(&self, title: &str, root_url: &str, fragment: &Fragment) -> Result<String> {
        render_post(&self.common, title, root_url, fragment)
    }
}

/// Renders a post page around `fragment` with the given `common` template.
pub fn render_post(
    common: &Template,
    title: &str,
    root_url: &str,
    fragment: &Fragment,
) -> Result<String> {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("title".to_owned(), Value::String(title.to_owned()));
    m.insert("root_url".to_owned(), Value::String(root_url.to_owned()));
    m.insert("content".to_owned(), Value::String(fragment.body.clone()));
    m.insert(
        "style".to_owned(),
        Value::String(format!(
            "{}\n{}",
            fragment.style_markup(),
            stylesheet_link(root_url)
        )),
    );
    m.insert(
        "head_script".to_owned(),
        Value::String(fragment.script_markup()),
    );
    execute(common, Value::Object(m))
}

fn execute(template: &Template, value: Value) -> Result<String> {
    let context = Context::from(value).map_err(|e| Error::Execute(e.to_string()))?;
    let mut out: Vec<u8> = Vec::new();
    template
        .execute(&mut out, &context)
        .map_err(|e| Error::Execute(e.to_string()))?;
    String::from_utf8(out).map_err(|e| Error::Execute(e.to_string()))
}

fn parse_template_file(path: &Path) -> Result<Template> {
    let contents = std::fs::read_to_string(path).map_err(|err| Error::OpenTemplateFile {
        path: path.to_owned(),
        err,
    })?;
    parse_template(&contents).map_err(|err| match err {
        Error::ParseTemplate { path: _, message } => Error::ParseTemplate {
            path: Some(path.to_owned()),
            message,
        },
        err => err,
    })
}

fn parse_template(contents: &str) -> Result<Template> {
    let mut template = Template::default();
    template
        .parse(contents)
        .map_err(|e| Error::ParseTemplate {
            path: None,
            message: e.to_string(),
        })?;
    Ok(template)
}

/// Represents the result of a rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or applying a template.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate {
        path: Option<PathBuf>,
        message: String,
    },

    /// Returned for errors while executing a template.
    Execute(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate {
                path: Some(path),
                message,
            } => write!(f, "Parsing template '{}': {}", path.display(), message),
            Error::ParseTemplate {
                path: None,
                message,
            } => write!(f, "Parsing template: {}", message),
            Error::Execute(message) => write!(f, "Rendering template: {}", message),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { err, .. } => Some(err),
            Error::ParseTemplate { .. } | Error::Execute(_) => None,
        }
    }
}
