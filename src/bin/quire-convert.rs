//! Renders a single post page: reads the converter's standalone HTML document
//! from stdin and writes the post page to stdout.

use clap::Parser;
use quire::fragment::splice;
use quire::render::{render_post, Templates};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::exit;

#[derive(Parser)]
#[command(name = "quire-convert", version)]
struct Args {
    /// The page title
    title: String,

    /// The root URL
    root_url: String,

    /// The directory holding `common.html`
    #[arg(long, value_name = "DIR", default_value = "templates")]
    templates: PathBuf,
}

fn main() {
    quire::init_logging();
    let args = Args::parse();
    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = run(&args, stdin.lock(), stdout.lock()) {
        log::error!("{}", e);
        exit(1);
    }
}

// Nothing reaches `output` unless the whole page renders.
fn run<R: Read, W: Write>(
    args: &Args,
    mut input: R,
    mut output: W,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut html = String::new();
    input.read_to_string(&mut html)?;

    let fragment = splice(&html)?;
    let common = Templates::load_common(&args.templates)?;
    let page = render_post(&common, &args.title, &args.root_url, &fragment)?;

    writeln!(output, "{}", page)?;
    output.flush()?;
    Ok(())
}
