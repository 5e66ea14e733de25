//! Writes a new post document with a header block stamped with the current
//! time.

use clap::Parser;
use quire::config::{Config, Overrides};
use quire::init::init_post;
use std::path::PathBuf;
use std::process::exit;

#[derive(Parser)]
#[command(name = "quire-init", version)]
struct Args {
    /// The new post's path, e.g. `posts/hello/index.md`
    path: PathBuf,

    /// The post author [default: `author` from quire.yaml]
    #[arg(long, value_name = "NAME")]
    author: Option<String>,
}

fn main() {
    quire::init_logging();
    let args = Args::parse();

    let author = match args.author {
        Some(author) => author,
        None => match Config::load(None, Overrides::default()) {
            Ok(config) => config.author,
            Err(e) => {
                log::error!("{}", e);
                exit(1);
            }
        },
    };

    if let Err(e) = init_post(&args.path, &author) {
        log::error!("writing `{}`: {}", args.path.display(), e);
        exit(1);
    }
    log::info!("created `{}`", args.path.display());
}
