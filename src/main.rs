use clap::{Parser, Subcommand};
use sitepipe::mode::EnvOptions;
use sitepipe::{config, output, pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sitepipe")]
#[command(about = "Compose the asset build pipeline for a multi-page site")]
#[command(long_about = "\
Compose the asset build pipeline for a multi-page site

Every template in the views directory becomes one HTML page. Scripts,
styles, images and fonts get an ordered chain of transformation steps.
Development and production differ in source maps, style delivery, output
naming and which plugins run.

Project structure:

  project/
  ├── pipeline.toml          # Optional, see 'sitepipe gen-config'
  ├── src/
  │   ├── views/             # index.pug → index.html, about.pug → about.html
  │   ├── js/index.js        # Script entry
  │   ├── styles/            # .css / .scss / .sass
  │   ├── img/ fonts/ assets/  # Copied to the output root
  └── dist/                  # Output root (cleaned in production)")]
#[command(version)]
struct Cli {
    /// Project root
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Build mode: development or production (default development)
    #[arg(long, global = true)]
    mode: Option<String>,

    /// Log discovery and plugin registration
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble and print the build configuration
    Config {
        /// Print JSON for the build executor instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Discover page templates without assembling the rest
    Check,
    /// Print a stock pipeline.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let env = EnvOptions { mode: cli.mode };

    match cli.command {
        Command::Config { json } => {
            let build = pipeline::assemble_project(&env, &cli.root)?;
            if json {
                println!("{}", build.to_json()?);
            } else {
                output::print_configuration(&build);
            }
        }
        Command::Check => {
            let site_config = config::load_config(&cli.root)?;
            let (_, pages) = pipeline::discover_pages(&env, &cli.root, &site_config)?;
            output::print_check_output(&pages);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Warnings by default, debug with `--verbose`; `RUST_LOG` overrides both.
fn init_tracing(verbose: bool) {
    let default = if verbose { "sitepipe=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
