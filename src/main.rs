//! scene-composer: goal-directed scene composition with hypervectors.
//!
//! This is the CLI binary entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use scene_composer::hdc::hypervector::Encoding;
use scene_composer::runtime::composer::Composer;
use scene_composer::runtime::settings::ComposerSettings;
use scene_composer::scene::goal::{validate_goal, GoalObject};
use scene_composer::scene::parser::GoalParser;
use tracing_subscriber::EnvFilter;

/// Compose a 2-D scene from a goal description.
#[derive(Parser, Debug)]
#[command(
    name = "scene-composer",
    about = "Compose a 2-D scene toward a goal using hyperdimensional guidance",
    version
)]
struct Cli {
    /// Goal as a JSON array of goal objects (overrides the description).
    #[arg(short, long)]
    goal: Option<PathBuf>,

    /// TOML settings file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lexicon seed (overrides the settings file).
    #[arg(long)]
    seed: Option<u64>,

    /// Hypervector encoding: binary or bipolar.
    #[arg(long)]
    encoding: Option<Encoding>,

    /// Maximum guidance iterations.
    #[arg(short = 'n', long)]
    max_iterations: Option<usize>,

    /// Print the run report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Goal description, e.g. "a red circle in the center, a blue square to its left".
    #[arg(trailing_var_arg = true)]
    description: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("scene-composer v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = match &cli.config {
        Some(path) => ComposerSettings::from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => ComposerSettings::default(),
    };
    if let Some(seed) = cli.seed {
        settings.hdc.seed = Some(seed);
    }
    if let Some(encoding) = cli.encoding {
        settings.hdc.encoding = encoding;
    }
    if let Some(n) = cli.max_iterations {
        settings.run.max_iterations = n;
    }

    let goal = load_goal(&cli, &settings)?;
    if goal.is_empty() {
        tracing::warn!("goal is empty; nothing to compose");
    }
    for g in &goal {
        tracing::info!(goal = ?g, "goal object");
    }

    let mut composer = Composer::new(settings, goal)?;
    let report = composer.run()?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", composer.canvas());
        println!(
            "{} after {} iteration(s), {} action(s), scene similarity {:.3}{}",
            if report.converged { "converged" } else { "stopped" },
            report.iterations,
            report.actions.len(),
            report.final_similarity,
            if report.target_reached { " (target reached)" } else { "" },
        );
    }

    Ok(())
}

fn load_goal(cli: &Cli, settings: &ComposerSettings) -> anyhow::Result<Vec<GoalObject>> {
    if let Some(path) = &cli.goal {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading goal file {}", path.display()))?;
        let goal: Vec<GoalObject> = serde_json::from_str(&text)
            .with_context(|| format!("parsing goal file {}", path.display()))?;
        validate_goal(&goal)?;
        return Ok(goal);
    }

    let description = cli.description.join(" ");
    tracing::info!(description = %description, "parsing goal description");
    let parser = GoalParser::new(
        &settings.vocabulary,
        settings.canvas.positions.iter().map(|p| p.label.as_str()),
    );
    Ok(parser.parse(&description))
}
