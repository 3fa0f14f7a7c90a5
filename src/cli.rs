// src/cli.rs

use clap::{Parser, Subcommand};
use git_scrolly::brush::PixelRect;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (defaults to .scrolly.toml in the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Blame every file at HEAD and write the per-line log
    Generate {
        /// Path to the git repository to analyze
        #[arg(short, long)]
        repo: PathBuf,

        /// Where to write the CSV log
        #[arg(short, long, default_value = "loc.csv")]
        output: PathBuf,
    },

    /// Print stats and language breakdown for a log
    Summary {
        #[arg(short, long, default_value = "loc.csv")]
        input: PathBuf,

        /// Brush rectangle in plot pixels: x0,y0,x1,y1
        #[arg(long, value_parser = parse_rect)]
        brush: Option<PixelRect>,
    },

    /// Write the scatterplot (SVG and PNG) and the file panel (SVG)
    Render {
        #[arg(short, long, default_value = "loc.csv")]
        input: PathBuf,

        /// Directory to save the output files
        #[arg(short, long)]
        output: PathBuf,

        /// Brush rectangle in plot pixels: x0,y0,x1,y1
        #[arg(long, value_parser = parse_rect)]
        brush: Option<PixelRect>,
    },

    /// Scroll through the commit list and save every frame as PNG
    Replay {
        #[arg(short, long, default_value = "loc.csv")]
        input: PathBuf,

        /// Directory to save the output PNG frames
        #[arg(short, long)]
        output: PathBuf,

        /// Frames sampled per scroll step
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
        frames_per_step: u32,
    },
}

fn parse_rect(s: &str) -> Result<PixelRect, String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<_, _>>()?;
    match values[..] {
        [x0, y0, x1, y1] => Ok(PixelRect::from_corners((x0, y0), (x1, y1))),
        _ => Err(format!("expected x0,y0,x1,y1, got {} values", values.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn rect_corners_are_normalized() {
        let rect = parse_rect("300, 200,100,50").unwrap();
        assert_eq!((rect.x0, rect.y0, rect.x1, rect.y1), (100.0, 50.0, 300.0, 200.0));
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_rect("a,2,3,4").is_err());
    }

    #[test]
    fn replay_rejects_zero_frames() {
        let parsed = Args::try_parse_from([
            "git-scrolly",
            "replay",
            "--output",
            "frames",
            "--frames-per-step",
            "0",
        ]);
        assert!(parsed.is_err());
    }
}
