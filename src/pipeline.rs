use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    command, encode,
    error::{SimreelError, SimreelResult},
    frames, settings,
};

/// Name of the video file written into the frame directory.
pub const OUTPUT_FILE: &str = "output.mp4";

/// Filesystem layout of a simulation project, derived from its root.
///
/// All fields are public so embedders can override individual paths or the
/// build command; [`ProjectLayout::from_root`] fills in the conventional
/// CMake debug/release layout the simulation ships with.
#[derive(Clone, Debug)]
pub struct ProjectLayout {
    /// Settings source file holding the capture flag.
    pub settings_file: PathBuf,
    /// Directory the build tool is invoked in.
    pub build_dir: PathBuf,
    /// Directory holding the built simulation executable.
    pub release_dir: PathBuf,
    /// Simulation executable, run with no arguments from `release_dir`.
    pub executable: PathBuf,
    /// Directory the simulation writes frames into.
    pub frames_dir: PathBuf,
    /// Incremental release build invocation, run in `build_dir`.
    pub build_command: Vec<String>,
}

impl ProjectLayout {
    pub fn from_root(root: &Path) -> Self {
        let build_dir = root.join("build");
        let release_dir = build_dir.join("Release");
        let executable = release_dir.join(if cfg!(windows) {
            "XPBDPallet.exe"
        } else {
            "XPBDPallet"
        });
        Self {
            settings_file: root.join("settings.cpp"),
            build_dir,
            release_dir,
            executable,
            frames_dir: root.join("video_frame"),
            build_command: ["cmake", "--build", ".", "--config", "Release"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Whether the simulation writes frames and the render stage runs.
    pub video: bool,
    /// Frame rate of the assembled video.
    pub fps: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { video: true, fps: 24 }
    }
}

/// Run the whole pipeline: patch the capture flag, build, execute the
/// simulation, then assemble the frames into a video if enabled.
///
/// Fail-fast: the first failing stage aborts the run; no stage is retried.
/// Returns the path of the produced video, or `None` when rendering was
/// disabled.
pub fn run(layout: &ProjectLayout, opts: &RunOptions) -> SimreelResult<Option<PathBuf>> {
    settings::set_bool_flag(&layout.settings_file, settings::VIDEO_FLAG, opts.video)?;

    command::run(&layout.build_command, Some(&layout.build_dir))?;

    // The executable is spawned with its own directory as cwd; a relative
    // program path would be resolved after the chdir on some platforms, so
    // absolutize it against the invocation cwd first.
    let exe = std::path::absolute(&layout.executable)
        .with_context(|| format!("absolutize executable path '{}'", layout.executable.display()))?;
    command::run(&[exe.display().to_string()], Some(&layout.release_dir))?;

    if !opts.video {
        return Ok(None);
    }

    if !layout.frames_dir.is_dir() {
        return Err(SimreelError::FrameDirectoryMissing {
            path: layout.frames_dir.clone(),
        });
    }

    let frames = frames::collect(&layout.frames_dir)?;
    let out_path = layout.frames_dir.join(OUTPUT_FILE);
    encode::assemble(&frames, &out_path, opts.fps)?;

    Ok(Some(out_path))
}
