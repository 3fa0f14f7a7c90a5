// src/main.rs

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Command};
use git_scrolly::brush::PixelRect;
use git_scrolly::config::Config;
use git_scrolly::engine::EngineContext;
use git_scrolly::model::Dataset;
use git_scrolly::svg::{SvgFilePanel, SvgScene};
use git_scrolly::{analyzer, loader, logging, renderer};
use std::path::Path;
use std::process;
use std::time::Instant;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let config = Config::load(args.config.as_deref(), &cwd)?;
    logging::init(&config.logging.level, args.verbose)?;

    let start_time = Instant::now();
    match args.command {
        Command::Generate { repo, output } => {
            let rows = analyzer::analyze(&repo)?;
            analyzer::write_log(&rows, &output)?;
            println!(
                "Analysis finished in {:.2?}. Wrote {} lines to {}.",
                start_time.elapsed(),
                rows.len(),
                output.display()
            );
        }
        Command::Summary { input, brush } => {
            let engine = open_engine(&input, &config, brush, start_time);
            println!(
                "{} commits, {} files.",
                engine.commits().len(),
                engine.files().len()
            );
            println!("{}", engine.stats());
            println!("{}", engine.selection_count_text());
            println!("{}", engine.language_breakdown());
        }
        Command::Render {
            input,
            output,
            brush,
        } => {
            let engine = open_engine(&input, &config, brush, start_time);
            std::fs::create_dir_all(&output)
                .with_context(|| format!("failed to create {}", output.display()))?;

            let settled = start_time + config.transitions.longest();
            let scene = engine.scene(settled);
            renderer::write_text(&SvgScene(&scene).to_string(), &output.join("scatter.svg"))?;
            renderer::write_png(&scene, &output.join("scatter.png"))?;
            renderer::write_text(
                &SvgFilePanel(engine.file_panel()).to_string(),
                &output.join("files.svg"),
            )?;
            println!(
                "Rendering finished in {:.2?}. Output in {}.",
                start_time.elapsed(),
                output.display()
            );
        }
        Command::Replay {
            input,
            output,
            frames_per_step,
        } => {
            let mut engine = open_engine(&input, &config, None, start_time);
            println!("Starting frame rendering...");
            let render_start = Instant::now();
            let scenes = renderer::replay_scenes(&mut engine, &config, frames_per_step, start_time);
            let written = renderer::render_frames(&scenes, &output)?;
            println!(
                "Rendered {} frames in {:.2?}.",
                written,
                render_start.elapsed()
            );
        }
    }

    println!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}

/// Loads the log into an engine. A log that cannot be read leaves every view
/// on its placeholder instead of aborting.
fn open_engine(input: &Path, config: &Config, brush: Option<PixelRect>, now: Instant) -> EngineContext {
    let dataset = match loader::load_path(input) {
        Ok(outcome) => Dataset::from_records(outcome.records),
        Err(err) => {
            tracing::error!(error = %err, "failed to load log");
            eprintln!("Error loading data: {err}");
            Dataset::empty()
        }
    };

    let mut engine = EngineContext::new(dataset, config, now);
    if let Some(rect) = brush {
        engine.brush_set(rect);
    }
    engine
}
