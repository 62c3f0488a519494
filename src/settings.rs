use std::{fs, ops::Range, path::Path};

use anyhow::Context as _;

use crate::error::{SimreelError, SimreelResult};

/// Flag the simulation reads to decide whether to write frames at all.
pub const VIDEO_FLAG: &str = "DO_VIDEO";

/// Set a `bool <name> = <true|false>` declaration inside a source-style text
/// file, leaving every other byte untouched.
///
/// The file is rewritten in full via a sibling temp file and an atomic rename,
/// so a crash mid-write never leaves a truncated settings file behind.
pub fn set_bool_flag(path: &Path, name: &str, value: bool) -> SimreelResult<()> {
    let src = fs::read_to_string(path)
        .with_context(|| format!("read settings file '{}'", path.display()))?;

    let Some((token, _current)) = find_bool_declaration(&src, name) else {
        return Err(SimreelError::ConfigPatternNotFound {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
    };

    let mut out = String::with_capacity(src.len() + 1);
    out.push_str(&src[..token.start]);
    out.push_str(if value { "true" } else { "false" });
    out.push_str(&src[token.end..]);

    write_atomic(path, out.as_bytes())?;
    tracing::info!(path = %path.display(), name, value, "settings flag updated");
    Ok(())
}

/// Byte range of the `true`/`false` token of the first `bool <name> = <lit>`
/// declaration, plus its current value. `name` must sit on identifier
/// boundaries and be preceded by the `bool` keyword.
fn find_bool_declaration(src: &str, name: &str) -> Option<(Range<usize>, bool)> {
    let bytes = src.as_bytes();
    let mut from = 0;

    while let Some(rel) = src[from..].find(name) {
        let start = from + rel;
        let end = start + name.len();
        from = start + 1;

        if start > 0 && is_ident_byte(bytes[start - 1]) {
            continue;
        }
        if end < bytes.len() && is_ident_byte(bytes[end]) {
            continue;
        }

        let before = src[..start].trim_end();
        if before.len() == start || !before.ends_with("bool") {
            continue;
        }
        let kw_start = before.len() - "bool".len();
        if kw_start > 0 && is_ident_byte(bytes[kw_start - 1]) {
            continue;
        }

        let mut i = end;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        for (literal, value) in [("true", true), ("false", false)] {
            if src[i..].starts_with(literal) {
                let token_end = i + literal.len();
                if token_end < bytes.len() && is_ident_byte(bytes[token_end]) {
                    break;
                }
                return Some((i..token_end, value));
            }
        }
    }

    None
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn write_atomic(path: &Path, bytes: &[u8]) -> SimreelResult<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("settings path '{}' has no file name", path.display()))?;
    let tmp = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    fs::write(&tmp, bytes).with_context(|| format!("write '{}'", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("replace '{}' with '{}'", path.display(), tmp.display()))?;
    Ok(())
}
