//! Site configuration. A [`Config`] is assembled once at startup from
//! command-line flags ([`Overrides`]), an optional `quire.yaml` project file
//! ([`Project`]), and defaults, in that order of precedence. It is then passed
//! by reference to everything that needs it.

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// The name of the project file searched for by [`Config::load`].
pub const PROJECT_FILE: &str = "quire.yaml";

/// Extensions always recognized as post documents.
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// The contents of a project file. Every field is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub title: Option<String>,
    pub author: Option<String>,
    pub input_directory: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    #[serde(default)]
    pub extensions: Vec<String>,
    pub root_url: Option<String>,
    pub templates_directory: Option<PathBuf>,
    pub static_directory: Option<PathBuf>,
    pub bibliography: Option<PathBuf>,
    pub converter: Option<PathBuf>,
}

/// Settings given on the command line. These win over the project file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub input_directory: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub root_url: Option<String>,
}

/// The configuration for a build.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The site title, handed to the index template.
    pub title: String,

    /// The default author for new posts.
    pub author: String,

    /// The root of the post source tree.
    pub input_directory: PathBuf,

    /// The root of the build output.
    pub output_directory: PathBuf,

    /// Recognized post document extensions, without the leading dot.
    pub extensions: HashSet<String>,

    /// The prefix for every generated internal link.
    pub root_url: String,

    /// The directory holding `index.html` and `common.html`.
    pub templates_directory: PathBuf,

    /// The directory copied verbatim to `{output_directory}/static`.
    pub static_directory: PathBuf,

    /// The bibliography handed to the converter.
    pub bibliography: PathBuf,

    /// The converter program.
    pub converter: PathBuf,
}

impl Default for Config {
    fn default() -> Config {
        Config::from_project(Project::default(), Path::new(""), Overrides::default())
    }
}

impl Config {
    /// Loads the configuration. If `project_file` is given it must exist;
    /// otherwise [`PROJECT_FILE`] is searched for in the current directory
    /// and its parents and defaults are used when none is found.
    pub fn load(project_file: Option<&Path>, overrides: Overrides) -> Result<Config> {
        let path = match project_file {
            Some(path) => Some(path.to_owned()),
            None => find_project_file(&std::env::current_dir()?),
        };
        match path {
            Some(path) => Config::from_project_file(&path, overrides),
            None => Ok(Config::from_project(
                Project::default(),
                Path::new(""),
                overrides,
            )),
        }
    }

    /// Loads the configuration from the project file at `path`. Relative
    /// paths in the file are resolved against its directory.
    pub fn from_project_file(path: &Path, overrides: Overrides) -> Result<Config> {
        let contents = std::fs::read_to_string(path).map_err(|err| Error::OpenProjectFile {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = if contents.trim().is_empty() {
            Project::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|err| Error::ParseProjectFile {
                path: path.to_owned(),
                err,
            })?
        };
        let project_root = path.parent().unwrap_or_else(|| Path::new(""));
        log::debug!("using project file `{}`", path.display());
        Ok(Config::from_project(project, project_root, overrides))
    }

    /// Merges `overrides`, `project`, and defaults into a [`Config`].
    pub fn from_project(project: Project, project_root: &Path, overrides: Overrides) -> Config {
        let resolve = |path: Option<PathBuf>, default: &str| {
            project_root.join(path.unwrap_or_else(|| PathBuf::from(default)))
        };

        let extensions = DEFAULT_EXTENSIONS
            .iter()
            .map(|ext| ext.to_string())
            .chain(project.extensions)
            .chain(overrides.extensions)
            .map(|ext| ext.trim_start_matches('.').to_owned())
            .collect();

        Config {
            title: project.title.unwrap_or_else(|| "Blog".to_owned()),
            author: project.author.unwrap_or_else(|| "<FIXME>".to_owned()),
            input_directory: match overrides.input_directory {
                Some(dir) => dir,
                None => resolve(project.input_directory, "posts"),
            },
            output_directory: match overrides.output_directory {
                Some(dir) => dir,
                None => resolve(project.output_directory, "_build"),
            },
            extensions,
            root_url: overrides
                .root_url
                .or(project.root_url)
                .unwrap_or_else(|| "/".to_owned()),
            templates_directory: resolve(project.templates_directory, "templates"),
            static_directory: resolve(project.static_directory, "static"),
            bibliography: resolve(project.bibliography, "citations.bib"),
            converter: project
                .converter
                .unwrap_or_else(|| PathBuf::from("pandoc")),
        }
    }
}

/// Searches `dir` and its ancestors for [`PROJECT_FILE`].
pub fn find_project_file(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .map(|dir| dir.join(PROJECT_FILE))
        .find(|path| path.is_file())
}

/// Represents the result of loading configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when the project file can't be read.
    OpenProjectFile { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid.
    ParseProjectFile {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenProjectFile { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::ParseProjectFile { path, err } => {
                write!(f, "Loading configuration '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenProjectFile { err, .. } => Some(err),
            Error::ParseProjectFile { err, .. } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
