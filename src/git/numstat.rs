use crate::error::{CanaiError, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, trace};

/// Hash of the empty tree, the diff baseline for root commits.
pub const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumstatEntry {
    pub path: String,
    pub added: u32,
    pub removed: u32,
    pub binary: bool,
}

/// Parse `git diff --numstat` output.
///
/// Lines that do not split into exactly `added`, `removed` and a file name are
/// skipped, as are lines whose counts are not numbers. A `-` count (binary
/// file) is recorded as zero.
pub fn parse_numstat(text: &str) -> Vec<NumstatEntry> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<NumstatEntry> {
    let parts: Vec<&str> = line.trim().split('\t').collect();
    let [added, removed, path] = parts.as_slice() else {
        if !line.trim().is_empty() {
            trace!(line, "skipping malformed numstat line");
        }
        return None;
    };

    let (added, added_binary) = parse_count(added)?;
    let (removed, removed_binary) = parse_count(removed)?;

    Some(NumstatEntry {
        path: rename_target(path),
        added,
        removed,
        binary: added_binary || removed_binary,
    })
}

fn parse_count(field: &str) -> Option<(u32, bool)> {
    if field == "-" {
        return Some((0, true));
    }
    match field.parse::<u32>() {
        Ok(n) => Some((n, false)),
        Err(_) => {
            debug!(field, "non-numeric numstat count");
            None
        }
    }
}

/// Destination of a rename as numstat prints it: `old => new` or
/// `dir/{old => new}/rest`. Plain paths come back unchanged.
pub fn rename_target(path: &str) -> String {
    if !path.contains(" => ") {
        return path.to_string();
    }

    if let (Some(open), Some(close)) = (path.find('{'), path.rfind('}')) {
        if open < close {
            let inner = &path[open + 1..close];
            if let Some((_, new)) = inner.split_once(" => ") {
                let joined = format!("{}{}{}", &path[..open], new, &path[close + 1..]);
                return joined.replace("//", "/").trim_start_matches('/').to_string();
            }
        }
    }

    path.split_once(" => ")
        .map(|(_, new)| new.to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Run `git diff --numstat <base> <commit>` in `repo_dir` with the installed
/// git binary and return its stdout.
pub fn run_git_numstat(repo_dir: &Path, base: &str, commit: &str) -> Result<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(["diff", "--no-ext-diff", "--no-color", "--numstat", base, commit])
        .output()?;

    if !output.status.success() {
        return Err(CanaiError::GitCommand {
            command: format!("diff --numstat {base} {commit}"),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
