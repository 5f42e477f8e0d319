use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use css_url_rewrite::{Mode, RuleSpec, StylesheetPaths, UrlOptions, UrlRewriter};
use rayon::prelude::*;

/// Rewrite url() references of stylesheets written to another directory.
#[derive(Parser)]
#[command(name = "css-url-rewrite", version)]
struct Cli {
  /// Stylesheets to rewrite
  #[arg(required = true)]
  inputs: Vec<PathBuf>,

  /// Directory the rewritten stylesheets are written to
  #[arg(short, long)]
  out_dir: PathBuf,

  /// Rule configuration file (defaults to url-rewrite.config.json when present)
  #[arg(short, long, conflicts_with = "mode")]
  config: Option<PathBuf>,

  /// Use a single rule with this mode instead of a configuration file
  #[arg(long)]
  mode: Option<String>,

  /// Destination subdirectory for copied assets (with --mode)
  #[arg(long, requires = "mode")]
  assets_path: Option<PathBuf>,

  /// Inline size limit in kilobytes (with --mode)
  #[arg(long, requires = "mode")]
  max_size: Option<f64>,

  /// Log every strategy decision
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
    )
    .with_writer(std::io::stderr)
    .init();

  let root = std::env::current_dir().context("failed to read current directory")?;
  let rewriter = UrlRewriter::with_root(load_options(&cli, &root)?, root);

  let failures: Vec<anyhow::Error> = cli
    .inputs
    .par_iter()
    .filter_map(|input| rewrite_file(&rewriter, input, &cli.out_dir).err())
    .collect();

  for failure in &failures {
    eprintln!("error: {failure:#}");
  }
  if failures.is_empty() {
    Ok(())
  } else {
    Err(anyhow!("{} stylesheet(s) failed", failures.len()))
  }
}

fn load_options(cli: &Cli, root: &Path) -> Result<UrlOptions> {
  if let Some(mode) = &cli.mode {
    let mode: Mode = mode.parse()?;
    let mut rule = RuleSpec::new(mode);
    rule.assets_path = cli.assets_path.clone();
    if let Some(max_size) = cli.max_size {
      rule.max_size = max_size;
    }
    return Ok(rule.into());
  }

  match &cli.config {
    Some(path) => Ok(UrlOptions::from_path(path)?),
    None => Ok(UrlOptions::discover(root)?),
  }
}

fn rewrite_file(rewriter: &UrlRewriter, input: &Path, out_dir: &Path) -> Result<()> {
  let css = fs::read_to_string(input)
    .with_context(|| format!("failed to read {}", input.display()))?;
  let file_name = input
    .file_name()
    .ok_or_else(|| anyhow!("{} has no file name", input.display()))?;
  let output = out_dir.join(file_name);

  let result = rewriter.rewrite_stylesheet(&css, &StylesheetPaths::new(input, &output));
  for warning in &result.warnings {
    eprintln!("{}: {} ({})", input.display(), warning.message, warning.node);
  }

  fs::create_dir_all(out_dir)
    .with_context(|| format!("failed to create {}", out_dir.display()))?;
  fs::write(&output, result.value)
    .with_context(|| format!("failed to write {}", output.display()))?;
  tracing::debug!(
    input = %input.display(),
    output = %output.display(),
    dependencies = result.dependencies.len(),
    "rewrote stylesheet"
  );
  Ok(())
}
