use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tilekit::{init_logging, Config, Script, ScriptRunner, SettingsStore, BUILD_DATE, VERSION};

/// Replay a tile assembly session script and print the result as JSON.
#[derive(Parser, Debug)]
#[command(name = "tilekit", version)]
struct CliArgs {
    /// Session script (JSON).
    #[arg(value_name = "SCRIPT.json")]
    script: PathBuf,

    /// Configuration file (.toml or .json). Defaults to the platform config
    /// directory; a missing file means default settings.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Remember the final crop and tile settings in the local store.
    #[arg(long)]
    remember_layout: bool,

    /// Pretty-print the report.
    #[arg(short, long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let args = CliArgs::parse();
    tracing::info!("tilekit {} (built {})", VERSION, BUILD_DATE);

    let config_path = match args.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let content = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading {}", args.script.display()))?;
    let script: Script = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", args.script.display()))?;

    let report = ScriptRunner::new(&config).run(&script);

    if args.remember_layout {
        let mut store = SettingsStore::open_default()?;
        store.save_layout(report.crop, report.tile_settings)?;
        tracing::info!("Layout saved to {}", store.path().display());
    }

    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);
    Ok(())
}
