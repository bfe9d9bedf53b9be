#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

pub fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str]) {
    assert!(
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap()
            .success(),
        "git {args:?} failed"
    );
}

pub fn init_git_repo(dir: &Path) {
    git(dir, &["init", "-b", "main"]);
    git(dir, &["config", "core.autocrlf", "false"]);
    git(dir, &["config", "core.safecrlf", "false"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    git(dir, &["config", "user.email", "you@example.com"]);
    git(dir, &["config", "user.name", "Your Name"]);
}

pub fn write_file(dir: &Path, name: &str, content: &[u8]) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content).unwrap();
    f.sync_all().unwrap();
}

/// Stage everything and commit with both author and committer date set to
/// `date` (anything `git commit` accepts, e.g. `2024-01-01T12:00:00+00:00`).
pub fn commit_all(dir: &Path, message: &str, date: &str) {
    git(dir, &["add", "-A"]);
    assert!(Command::new("git")
        .args(["commit", "-q", "-m", message])
        .env("GIT_AUTHOR_DATE", date)
        .env("GIT_COMMITTER_DATE", date)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

pub fn checkout(dir: &Path, args: &[&str]) {
    let mut full = vec!["checkout", "-q"];
    full.extend_from_slice(args);
    git(dir, &full);
}

pub fn lines(prefix: &str, n: usize) -> String {
    (1..=n).map(|i| format!("{prefix}{i}\n")).collect()
}

/// The two-commit history from the reference scenario: a root commit on
/// 2024-01-01 adding `a.py` (10 lines), and a child on 2024-01-02 editing one
/// line of `a.py`, appending another, and adding `b.unknownext` (5 lines).
///
/// `tz` is appended to the commit times, e.g. `"+00:00"`, or `""` for local
/// time.
pub fn scenario_repo(dir: &Path, tz: &str) {
    init_git_repo(dir);

    write_file(dir, "a.py", lines("line", 10).as_bytes());
    commit_all(dir, "root", &format!("2024-01-01T12:00:00{tz}"));

    let mut edited: Vec<String> = (1..=10).map(|i| format!("line{i}")).collect();
    edited[4] = "changed".to_string();
    edited.push("line11".to_string());
    let mut text = edited.join("\n");
    text.push('\n');
    write_file(dir, "a.py", text.as_bytes());
    write_file(dir, "b.unknownext", lines("x", 5).as_bytes());
    commit_all(dir, "child", &format!("2024-01-02T12:00:00{tz}"));
}

/// Temporary clone directories currently present in the system temp dir.
pub fn scratch_dirs() -> Vec<PathBuf> {
    fs::read_dir(std::env::temp_dir())
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.file_name()
                        .map(|n| n.to_string_lossy().starts_with("canaicode-"))
                        .unwrap_or(false)
                })
                .collect()
        })
        .unwrap_or_default()
}
