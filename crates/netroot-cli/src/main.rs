use clap::Parser as ClapParser;
use log::info;
use miette::{IntoDiagnostic, Result, WrapErr, bail};
use netroot::{Library, ModuleRegistry, Netlist, WidthPolicy};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(ClapParser)]
#[command(name = "netroot", about = "Resolve the driving source of hierarchical nets")]
struct Cli {
    /// Parsed netlist in JSON form
    #[arg(long)]
    netlist: PathBuf,

    /// Cell library describing primitive pins (.json or .toml)
    #[arg(long)]
    library: Option<PathBuf>,

    /// Name of the root module
    #[arg(long)]
    top: String,

    /// Reject bus width mismatches instead of truncating them
    #[arg(long)]
    strict: bool,

    /// Print the symbol table of every module type
    #[arg(long)]
    dump: bool,

    /// Output structured JSON to stdout
    #[arg(long)]
    json: bool,

    /// Hierarchical paths to resolve, e.g. `u1/u2/q[3]`
    paths: Vec<String>,
}

#[derive(Serialize)]
struct Resolution {
    path: String,
    sources: Vec<String>,
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_netlist(path: &Path) -> Result<Netlist> {
    let text = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Netlist::from_json_str(&text)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to parse netlist {}", path.display()))
}

fn load_library(path: &Path) -> Result<Library> {
    let text = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let parsed = if path.extension().is_some_and(|ext| ext == "toml") {
        Library::from_toml_str(&text).into_diagnostic()
    } else {
        Library::from_json_str(&text).into_diagnostic()
    };
    parsed.wrap_err_with(|| format!("failed to parse cell library {}", path.display()))
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    if cli.paths.is_empty() && !cli.dump {
        bail!("Nothing to do: pass paths to resolve or --dump");
    }

    let netlist = load_netlist(&cli.netlist)?;
    let library = match &cli.library {
        Some(path) => load_library(path)?,
        None => Library::default(),
    };
    info!(
        "loaded {} modules and {} cells",
        netlist.modules.len(),
        library.cells.len()
    );

    let policy = if cli.strict {
        WidthPolicy::Strict
    } else {
        WidthPolicy::Truncate
    };
    let mut registry = ModuleRegistry::builder(&netlist, &library, &cli.top)
        .width_policy(policy)
        .build();
    registry.build_root().into_diagnostic()?;

    if cli.dump {
        println!("{}", registry.dump());
    }

    if cli.json {
        let mut results = Vec::new();
        for path in &cli.paths {
            let sources = registry.resolve(path).into_diagnostic()?;
            results.push(Resolution {
                path: path.clone(),
                sources,
            });
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&results).into_diagnostic()?
        );
    } else {
        for path in &cli.paths {
            println!("{}", registry.format_resolution(path).into_diagnostic()?);
        }
    }
    info!("{} cached sources", registry.cache_len());
    Ok(())
}
