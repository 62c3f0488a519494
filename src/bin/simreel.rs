use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use simreel::{ProjectLayout, RunOptions, pipeline};

/// Build the simulation, run it, and assemble its frames into an MP4.
#[derive(Parser, Debug)]
#[command(name = "simreel", version)]
struct Cli {
    /// Project root containing settings.cpp, build/ and video_frame/.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Disable frame capture and skip the render stage.
    #[arg(long)]
    no_video: bool,

    /// Frame rate of the assembled video.
    #[arg(long, default_value_t = 24)]
    fps: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let layout = ProjectLayout::from_root(&cli.root);
    let opts = RunOptions {
        video: !cli.no_video,
        fps: cli.fps,
    };

    match pipeline::run(&layout, &opts)? {
        Some(video) => eprintln!("wrote {}", video.display()),
        None => eprintln!("done (render stage disabled)"),
    }
    Ok(())
}
