//! Defines the [`Converter`] trait, the seam between the site builder and the
//! external program which turns a source document into a standalone HTML
//! document, and [`Pandoc`], the implementation backed by `pandoc`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Converts a source document to a standalone HTML document.
pub trait Converter {
    /// Converts the document at `source` and returns the resulting HTML.
    /// Citations are resolved against `bibliography`.
    fn convert(&self, source: &Path, bibliography: &Path) -> Result<Vec<u8>>;
}

/// Runs `pandoc` (or a compatible program) to convert documents.
pub struct Pandoc {
    /// The program to run.
    pub program: PathBuf,
}

impl Pandoc {
    pub fn new<P: Into<PathBuf>>(program: P) -> Pandoc {
        Pandoc {
            program: program.into(),
        }
    }

    fn command(&self, source: &Path, bibliography: &Path) -> Command {
        let mut bib = std::ffi::OsString::from("--bibliography=");
        bib.push(bibliography);

        let mut cmd = Command::new(&self.program);
        cmd.arg("--standalone")
            .arg("--to=html")
            .arg("--mathjax")
            .arg(bib)
            .arg(source);
        cmd
    }
}

impl Converter for Pandoc {
    fn convert(&self, source: &Path, bibliography: &Path) -> Result<Vec<u8>> {
        let mut cmd = self.command(source, bibliography);
        log::debug!("running {:?}", cmd);
        let output = cmd.output().map_err(|err| Error::Spawn {
            program: self.program.clone(),
            err,
        })?;
        if !output.status.success() {
            return Err(Error::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(output.stdout)
    }
}

/// Represents the result of a conversion.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed conversion.
#[derive(Debug)]
pub enum Error {
    /// Returned when the converter program couldn't be started.
    Spawn { program: PathBuf, err: std::io::Error },

    /// Returned when the converter exited unsuccessfully.
    Failed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Spawn { program, err } => {
                write!(f, "running `{}`: {}", program.display(), err)
            }
            Error::Failed {
                program,
                status,
                stderr,
            } => {
                write!(f, "`{}` failed ({})", program.display(), status)?;
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Spawn { err, .. } => Some(err),
            Error::Failed { .. } => None,
        }
    }
}
