//! CLI interface for pixtone

use clap::{Parser, Subcommand, ValueEnum};
use pixtone::mapping::ToneMode;
use std::path::PathBuf;

/// Play pictures as sound
#[derive(Parser)]
#[command(name = "pixtone")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Tone mode as given on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    #[value(alias = "color")]
    Colour,
    Coordinate,
}

impl From<ModeArg> for ToneMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Colour => ToneMode::ByColor,
            ModeArg::Coordinate => ToneMode::ByCoordinate,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a picture interactively with the mouse
    Play {
        /// PNG to play (a generated pattern when omitted)
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Seed of the generated pattern
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Map one point of a picture and print the result
    Probe {
        /// Column in picture pixels
        #[arg(short, long)]
        x: u32,

        /// Row in picture pixels
        #[arg(short, long)]
        y: u32,

        /// Override the configured tone mode
        #[arg(short, long)]
        mode: Option<ModeArg>,

        /// PNG to probe (a generated pattern when omitted)
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Seed of the generated pattern
        #[arg(long)]
        seed: Option<u64>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Play random sequences through the sound card
    Sequence {
        /// PNG to sample (a generated pattern when omitted)
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Seed of the generated pattern
        #[arg(long)]
        seed: Option<u64>,

        /// Keep playing sequences until Ctrl-C
        #[arg(long = "loop")]
        repeat: bool,
    },

    /// Render random sequences to a WAV file
    Render {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Number of sequences
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Seed for sampling and the pattern (configured seed, else 0)
        #[arg(long)]
        seed: Option<u64>,

        /// PNG to sample (a generated pattern when omitted)
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available audio devices
    Devices,

    /// Validate a configuration file
    Check,

    /// Generate an example configuration file
    Init,
}
