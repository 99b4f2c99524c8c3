//! viewkit CLI
//!
//! Usage:
//!   viewkit [OPTIONS] <MANIFEST>
//!
//! Options:
//!   -t, --text           Print text content instead of markup
//!   -c, --config <FILE>  Render configuration (TOML, `[render]` table)
//!   -h, --help           Print help
//!
//! Log output goes to stderr and is controlled by `RUST_LOG`.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use viewkit::manifest::Manifest;
use viewkit::RenderConfig;

#[derive(Parser)]
#[command(name = "viewkit")]
#[command(about = "Render named views from a TOML application manifest")]
struct Cli {
    /// Manifest file with templates, controllers and the root view
    manifest: PathBuf,

    /// Print the text content of the rendered view instead of its markup
    #[arg(short, long)]
    text: bool,

    /// Render configuration file, overriding the manifest's [render] table
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let mut manifest = match Manifest::from_file(&cli.manifest) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error loading manifest '{}': {}", cli.manifest.display(), e);
            std::process::exit(1);
        }
    };

    if let Some(path) = &cli.config {
        manifest.render = match RenderConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        };
    }

    match manifest.render() {
        Ok((app, view)) => {
            if cli.text {
                println!("{}", view.text());
            } else {
                println!("{}", view.markup());
            }
            app.destroy();
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
