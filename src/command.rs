use std::{path::Path, process::Command};

use anyhow::Context as _;

use crate::error::{SimreelError, SimreelResult};

/// Run an external command to completion, streaming its stdout/stderr to our
/// own. Returns only on exit status zero. There is no timeout and no retry,
/// since build and simulation durations are unbounded by design.
pub fn run(argv: &[String], cwd: Option<&Path>) -> SimreelResult<()> {
    let (program, args) = argv
        .split_first()
        .context("command argv must not be empty")?;

    tracing::info!(
        argv = %argv.join(" "),
        cwd = %cwd.map(|p| p.display().to_string()).unwrap_or_else(|| ".".to_string()),
        "running command"
    );

    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let status = cmd
        .status()
        .with_context(|| format!("failed to spawn `{}`", argv.join(" ")))?;

    if !status.success() {
        // A signal death has no exit code; report it as -1.
        return Err(SimreelError::command_failed(argv, status.code().unwrap_or(-1)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_argv_is_rejected() {
        assert!(run(&[], None).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn zero_exit_is_ok() {
        run(&argv(&["true"]), None).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_surfaces_argv_and_code() {
        let err = run(&argv(&["sh", "-c", "exit 3"]), None).unwrap_err();
        match err {
            SimreelError::CommandFailed { argv, exit_code } => {
                assert_eq!(argv, "sh -c exit 3");
                assert_eq!(exit_code, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn cwd_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        run(&argv(&["sh", "-c", "touch marker"]), Some(dir.path())).unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn missing_program_is_an_error() {
        assert!(run(&argv(&["simreel-no-such-program"]), None).is_err());
    }
}
