mod commands;

use std::path::PathBuf;

use autopaint_cli::{parse_map_kinds, parse_thresholds, RunOverrides};
use autopaint_core::correction::CorrectionThresholds;
use autopaint_core::models::MapKind;
use clap::{Parser, Subcommand};

use commands::{cmd_correct, cmd_init, cmd_mask, cmd_paint, cmd_run};

#[derive(Parser)]
#[command(name = "autopaint")]
#[command(version, about = "Bake, paint and drift-correct textures for 3D meshes", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bake maps, run the painting process and reattach the corrected textures
    Run {
        /// Scene document (YAML)
        #[arg(long, value_name = "FILE")]
        scene: PathBuf,

        /// Working directory (defaults to the scene's directory)
        #[arg(short, long, value_name = "DIR")]
        workdir: Option<PathBuf>,

        /// Bake and render resolution in pixels
        #[arg(long, value_name = "N")]
        resolution: Option<u32>,

        /// Render samples
        #[arg(long, value_name = "N")]
        samples: Option<u32>,

        /// Correction thresholds (comma-separated: H,S,V)
        #[arg(long, value_name = "H,S,V", value_parser = parse_thresholds)]
        thresholds: Option<CorrectionThresholds>,

        /// Maps to produce (comma-separated: normal,color)
        // Full path keeps clap from treating this as a repeated argument
        #[arg(long, value_name = "MAPS", value_parser = parse_map_kinds)]
        maps: Option<::std::vec::Vec<MapKind>>,

        /// Fixed run seed (0-99999); random when omitted
        #[arg(long, value_name = "N")]
        seed: Option<u32>,

        /// Config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Painting process: render, mask and correct the baked maps in a directory
    Paint {
        /// Working directory holding normals.png and/or colors.png
        #[arg(short, long, value_name = "DIR")]
        workdir: PathBuf,

        /// Correction thresholds (comma-separated: H,S,V)
        #[arg(long, value_name = "H,S,V", value_parser = parse_thresholds)]
        thresholds: Option<CorrectionThresholds>,

        /// Config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Keyword arguments: render_resolution N samples N seed N
        #[arg(last = true, value_name = "ARGS")]
        keyword_args: Vec<String>,
    },

    /// Clamp a candidate image's HSV drift against a reference
    Correct {
        /// Reference image (baked map)
        #[arg(value_name = "REFERENCE")]
        reference: PathBuf,

        /// Candidate image (painted render)
        #[arg(value_name = "CANDIDATE")]
        candidate: PathBuf,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,

        /// Correction thresholds (comma-separated: H,S,V)
        #[arg(long, value_name = "H,S,V", value_parser = parse_thresholds)]
        thresholds: Option<CorrectionThresholds>,

        /// Skip masking with the reference's background
        #[arg(long)]
        no_mask: bool,

        /// Config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Black out a target wherever the reference is pure black
    Mask {
        /// Reference image
        #[arg(value_name = "REFERENCE")]
        reference: PathBuf,

        /// Image to mask
        #[arg(value_name = "TARGET")]
        target: PathBuf,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },

    /// Write a default autopaint.yml
    Init {
        /// Directory to write into (defaults to the current directory)
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Run {
            scene,
            workdir,
            resolution,
            samples,
            thresholds,
            maps,
            seed,
            config,
        } => cmd_run(
            scene,
            RunOverrides {
                working_dir: workdir,
                resolution,
                samples,
                maps,
                thresholds,
                seed,
            },
            config,
        ),

        Commands::Paint {
            workdir,
            thresholds,
            config,
            keyword_args,
        } => cmd_paint(workdir, thresholds, config, keyword_args),

        Commands::Correct {
            reference,
            candidate,
            out,
            thresholds,
            no_mask,
            config,
        } => cmd_correct(reference, candidate, out, thresholds, no_mask, config),

        Commands::Mask {
            reference,
            target,
            out,
        } => cmd_mask(reference, target, out),

        Commands::Init { dir, force } => cmd_init(dir, force),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
