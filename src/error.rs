use std::path::PathBuf;

pub type SimreelResult<T> = Result<T, SimreelError>;

#[derive(thiserror::Error, Debug)]
pub enum SimreelError {
    #[error("no `bool {name} = <true|false>` declaration found in '{path}'")]
    ConfigPatternNotFound { name: String, path: PathBuf },

    #[error("command `{argv}` failed with exit code {exit_code}")]
    CommandFailed { argv: String, exit_code: i32 },

    #[error("frame directory '{path}' does not exist")]
    FrameDirectoryMissing { path: PathBuf },

    #[error("no frames found in '{dir}'")]
    NoFramesFound { dir: PathBuf },

    #[error("frame index widths are inconsistent in '{dir}' ('{a}' vs '{b}'); ordering would be wrong")]
    InconsistentFrameIndexWidth { dir: PathBuf, a: String, b: String },

    #[error("cannot decode first frame '{path}': {source}")]
    FirstFrameUnreadable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimreelError {
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn command_failed(argv: &[String], exit_code: i32) -> Self {
        Self::CommandFailed {
            argv: argv.join(" "),
            exit_code,
        }
    }
}
