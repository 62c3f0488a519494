use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::error::{SimreelError, SimreelResult};

/// Frame files are written by the simulation as `frame_<index>.ppm` with the
/// index zero-padded to a fixed width (the original writer uses 5 digits).
pub const FRAME_PREFIX: &str = "frame_";
pub const FRAME_EXTENSION: &str = "ppm";

/// Enumerate the frame files in `dir`, ordered by index.
///
/// Ordering relies on lexicographic filename comparison, which matches numeric
/// order only while the index width is uniform, so mixed widths are rejected
/// rather than silently misordered. Files not matching the naming convention
/// are ignored.
pub fn collect(dir: &Path) -> SimreelResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("read frame directory '{}'", dir.display()))?;

    let mut frames: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in '{}'", dir.display()))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if frame_index_digits(name).is_some() {
            frames.push((name.to_string(), entry.path()));
        }
    }

    if frames.is_empty() {
        return Err(SimreelError::NoFramesFound {
            dir: dir.to_path_buf(),
        });
    }

    frames.sort_by(|(a, _), (b, _)| a.cmp(b));

    let width = frame_index_digits(&frames[0].0).unwrap_or(0);
    if let Some((name, _)) = frames
        .iter()
        .find(|(name, _)| frame_index_digits(name) != Some(width))
    {
        return Err(SimreelError::InconsistentFrameIndexWidth {
            dir: dir.to_path_buf(),
            a: frames[0].0.clone(),
            b: name.clone(),
        });
    }

    tracing::info!(dir = %dir.display(), count = frames.len(), "collected frames");
    Ok(frames.into_iter().map(|(_, path)| path).collect())
}

/// Number of index digits if `name` matches `frame_<digits>.ppm`.
fn frame_index_digits(name: &str) -> Option<usize> {
    let rest = name.strip_prefix(FRAME_PREFIX)?;
    let digits = rest.strip_suffix(&format!(".{FRAME_EXTENSION}"))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.len())
}
