use super::repo::GitRepo;
use crate::error::{CanaiError, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;
use tracing::info;

/// Where a repository comes from: a directory on disk or something to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    Local(PathBuf),
    Remote(String),
}

impl RepoSource {
    pub fn parse(input: &str) -> Self {
        let path = Path::new(input);
        if path.is_dir() {
            RepoSource::Local(path.to_path_buf())
        } else {
            RepoSource::Remote(input.to_string())
        }
    }

    /// Name used for the `repository` column and the worksheet.
    pub fn short_name(&self) -> String {
        match self {
            RepoSource::Local(path) => {
                let resolved = absolute_normalized(path);
                resolved
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| resolved.to_string_lossy().into_owned())
            }
            RepoSource::Remote(url) => remote_name(url),
        }
    }

    /// Open the repository, cloning remotes into a scratch directory that
    /// lives exactly as long as the returned [`Checkout`].
    pub fn checkout(&self) -> Result<Checkout> {
        match self {
            RepoSource::Local(path) => {
                info!("Using local repository: {}", path.display());
                Ok(Checkout {
                    repo: GitRepo::open(path)?,
                    scratch: None,
                })
            }
            RepoSource::Remote(url) => {
                let scratch = tempfile::Builder::new().prefix("canaicode-").tempdir()?;
                let dest = scratch.path().join(remote_name(url));
                info!("Cloning {url}...");
                clone_bare(url, &dest)?;
                Ok(Checkout {
                    repo: GitRepo::open(&dest)?,
                    scratch: Some(scratch),
                })
            }
        }
    }
}

/// An opened repository. For cloned remotes this owns the clone directory,
/// which is deleted on drop.
pub struct Checkout {
    // declared first so the repository handle closes before the directory goes
    repo: GitRepo,
    scratch: Option<TempDir>,
}

impl Checkout {
    pub fn repo(&self) -> &GitRepo {
        &self.repo
    }

    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(TempDir::path)
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically. Symlinks are
/// left alone, so a linked checkout keeps the link's name.
fn absolute_normalized(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn clone_bare(url: &str, dest: &Path) -> Result<()> {
    let clone_err = |reason: String| CanaiError::CloneFailed {
        url: url.to_string(),
        reason,
    };

    let mut prepare = gix::prepare_clone_bare(url, dest).map_err(|e| clone_err(e.to_string()))?;
    prepare
        .fetch_only(gix::progress::Discard, &AtomicBool::new(false))
        .map_err(|e| clone_err(e.to_string()))?;
    Ok(())
}

/// Last path segment of a clone URL without a trailing slash or extension.
fn remote_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed
        .rsplit(|c| c == '/' || c == ':')
        .next()
        .unwrap_or(trimmed);
    let stem = Path::new(last)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| last.to_string());
    if stem.is_empty() {
        "repository".to_string()
    } else {
        stem
    }
}
