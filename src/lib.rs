#![forbid(unsafe_code)]

pub mod command;
pub mod encode;
pub mod error;
pub mod frames;
pub mod pipeline;
pub mod settings;

pub use encode::{EncodeConfig, FfmpegEncoder, assemble, is_ffmpeg_on_path};
pub use error::{SimreelError, SimreelResult};
pub use pipeline::{OUTPUT_FILE, ProjectLayout, RunOptions};
