use clap::Parser;
use quire::build::build_site;
use quire::config::{Config, Overrides};
use quire::convert::Pandoc;
use quire::render::Templates;
use std::path::PathBuf;
use std::process::exit;

/// Builds the final, static site.
#[derive(Parser)]
#[command(name = "quire", version)]
struct Args {
    /// Top directory of posts [default: posts]
    #[arg(short = 'i', long = "input", value_name = "DIR")]
    input: Option<PathBuf>,

    /// Output directory [default: _build]
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    output: Option<PathBuf>,

    /// Additional file extensions to consider
    #[arg(short = 'e', long = "ext", value_name = "STR", num_args = 1..)]
    ext: Vec<String>,

    /// Root URL [default: /]
    #[arg(short = 'r', long = "root", value_name = "URL")]
    root: Option<String>,

    /// Project file [default: the nearest quire.yaml, if any]
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    quire::init_logging();
    let args = Args::parse();

    let config = match Config::load(
        args.config.as_deref(),
        Overrides {
            input_directory: args.input,
            output_directory: args.output,
            extensions: args.ext,
            root_url: args.root,
        },
    ) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            exit(1);
        }
    };

    let templates = match Templates::load(&config.templates_directory) {
        Ok(templates) => templates,
        Err(e) => {
            log::error!("{}", e);
            exit(1);
        }
    };

    match build_site(&config, &templates, &Pandoc::new(&config.converter)) {
        Ok(report) if report.is_success() => {
            log::info!("built {} posts", report.written.len());
        }
        Ok(report) => {
            log::error!(
                "{} of {} posts failed",
                report.failed.len(),
                report.failed.len() + report.written.len()
            );
            exit(1);
        }
        Err(e) => {
            log::error!("{}", e);
            exit(1);
        }
    }
}
