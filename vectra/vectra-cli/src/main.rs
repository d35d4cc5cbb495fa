use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use vectra_vm::config::{DEFAULT_ENTRY_SUFFIX, DEFAULT_MAX_CALL_DEPTH};
use vectra_vm::{Interpreter, VmConfig};

#[derive(Parser)]
#[command(name = "vectra", about = "Run a Vectra bytecode (.vbc) module")]
struct Cli {
    /// Path to the compiled module
    file: Option<PathBuf>,

    /// Suffix identifying the entry method in the constant pool
    #[arg(long, default_value = DEFAULT_ENTRY_SUFFIX)]
    entry: String,

    /// Maximum nested call depth before execution is aborted
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let Some(path) = cli.file else {
        bail!("No file specified");
    };
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }

    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let module = vectra_vm::load_from_reader(BufReader::new(file))
        .with_context(|| format!("loading {}", path.display()))?;
    debug!(
        version = %format_args!("{}.{}", module.version_major, module.version_minor),
        constants = module.constants.len(),
        bodies = module.method_bodies.len(),
        "module loaded"
    );

    let config = VmConfig::default()
        .with_entry_suffix(cli.entry)
        .with_max_call_depth(cli.max_call_depth);
    let mut interpreter = Interpreter::with_stdio(module, config);
    let result = interpreter.run().context("execution failed")?;
    debug!(%result, "entry method returned");
    Ok(())
}
