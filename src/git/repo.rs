use super::numstat::{parse_numstat, run_git_numstat, NumstatEntry, EMPTY_TREE};
use crate::error::{CanaiError, Result};
use crate::language;
use crate::model::{midnight, CommitMetrics};
use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::ValueEnum;
use gix::object::tree::diff::ChangeDetached;
use gix::objs::tree::EntryMode;
use gix::{ObjectId, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use similar::{ChangeTag, TextDiff};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// How many leading bytes are inspected for a NUL when deciding a blob is binary.
const BINARY_PROBE: usize = 8000;

/// Which engine produces the per-file line counts of a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DiffEngine {
    /// In-process tree diff.
    #[default]
    Gix,
    /// `git diff --numstat` through the installed git binary.
    Git,
}

/// Which clock a commit time is read in when bucketing it into a calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeBasis {
    #[default]
    Local,
    Utc,
}

impl TimeBasis {
    pub fn day_of(self, timestamp: &DateTime<Utc>) -> NaiveDate {
        match self {
            TimeBasis::Local => timestamp.with_timezone(&Local).date_naive(),
            TimeBasis::Utc => timestamp.date_naive(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommitHeader {
    pub id: ObjectId,
    pub first_parent: Option<ObjectId>,
    pub committed_at: DateTime<Utc>,
    pub author_email: Option<String>,
}

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open the repository at exactly `path` (a worktree or a bare clone).
    /// Parent directories are not searched.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = gix::open(path.as_ref())?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    /// Every commit reachable from any reference, newest committer time first.
    pub fn commit_headers(&self, show_progress: bool) -> Result<Vec<CommitHeader>> {
        let mut headers = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut stack: Vec<ObjectId> = self.tips()?;

        let pb = if show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg} {pos}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message("Walking history...");
            pb
        } else {
            ProgressBar::hidden()
        };

        while let Some(commit_id) = stack.pop() {
            if !seen.insert(commit_id) {
                continue;
            }

            let commit = self.repo.find_commit(commit_id)?;
            let secs = commit.time()?.seconds;
            let committed_at = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| CanaiError::InvalidDate(format!("Invalid timestamp: {secs}")))?;

            let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.detach()).collect();
            let email = commit.author()?.email.to_string();

            headers.push(CommitHeader {
                id: commit_id,
                first_parent: parents.first().copied(),
                committed_at,
                author_email: (!email.is_empty()).then_some(email),
            });

            stack.extend(parents);
            pb.inc(1);
        }

        pb.finish_and_clear();

        // stable, so equal timestamps keep walk order
        headers.sort_by(|a, b| b.committed_at.cmp(&a.committed_at));
        debug!(commits = headers.len(), path = %self.path.display(), "history walked");
        Ok(headers)
    }

    /// Commits pointed to by refs and HEAD. Refs that do not peel to a commit
    /// (a tag on a tree, say) are skipped.
    fn tips(&self) -> Result<Vec<ObjectId>> {
        let platform = self
            .repo
            .references()
            .map_err(|e| CanaiError::GitRepo(format!("Failed to read references: {e}")))?;
        let refs = platform
            .all()
            .map_err(|e| CanaiError::GitRepo(format!("Failed to iterate references: {e}")))?;

        let mut tips = Vec::new();
        for reference in refs {
            let mut reference =
                reference.map_err(|e| CanaiError::GitRepo(format!("Failed to load reference: {e}")))?;
            let name = reference.name().as_bstr().to_string();
            match reference.peel_to_id_in_place() {
                Ok(id) => tips.push(id.detach()),
                Err(e) => warn!(reference = %name, "cannot peel reference: {e}"),
            }
        }

        if let Ok(head) = self.repo.head_id() {
            tips.push(head.detach());
        }

        tips.retain(|id| self.repo.find_commit(*id).is_ok());
        Ok(tips)
    }

    /// Per-file line counts of `header` against its first parent, or against
    /// the empty tree for a root commit.
    pub fn numstat(&self, header: &CommitHeader, engine: DiffEngine) -> Result<Vec<NumstatEntry>> {
        match engine {
            DiffEngine::Gix => self.numstat_in_process(header),
            DiffEngine::Git => {
                let base = header
                    .first_parent
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| EMPTY_TREE.to_string());
                let out = run_git_numstat(self.repo.path(), &base, &header.id.to_string())?;
                Ok(parse_numstat(&out))
            }
        }
    }

    fn numstat_in_process(&self, header: &CommitHeader) -> Result<Vec<NumstatEntry>> {
        let commit_tree = self.repo.find_commit(header.id)?.tree()?;
        // no parent tree means diffing against the empty tree
        let parent_tree = match header.first_parent {
            Some(parent_id) => Some(self.repo.find_commit(parent_id)?.tree()?),
            None => None,
        };

        let changes: Vec<ChangeDetached> =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), None)?;

        let mut entries = Vec::new();
        for change in changes {
            if let Some(entry) = self.handle_change(change)? {
                entries.push(entry);
            }
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn handle_change(&self, change: ChangeDetached) -> Result<Option<NumstatEntry>> {
        let entry = match change {
            ChangeDetached::Addition {
                id,
                location,
                entry_mode,
                ..
            } => {
                if !is_file(entry_mode) {
                    return Ok(None);
                }
                let data = self.blob_data(id)?;
                let binary = is_binary(&data);
                NumstatEntry {
                    path: location.to_string(),
                    added: if binary { 0 } else { count_lines(&data) },
                    removed: 0,
                    binary,
                }
            }
            ChangeDetached::Deletion {
                id,
                location,
                entry_mode,
                ..
            } => {
                if !is_file(entry_mode) {
                    return Ok(None);
                }
                let data = self.blob_data(id)?;
                let binary = is_binary(&data);
                NumstatEntry {
                    path: location.to_string(),
                    added: 0,
                    removed: if binary { 0 } else { count_lines(&data) },
                    binary,
                }
            }
            ChangeDetached::Modification {
                previous_id,
                id,
                location,
                entry_mode,
                ..
            } => {
                if !is_file(entry_mode) {
                    return Ok(None);
                }
                self.modified_entry(location.to_string(), previous_id, id)?
            }
            ChangeDetached::Rewrite {
                source_id,
                id,
                location,
                entry_mode,
                ..
            } => {
                if !is_file(entry_mode) {
                    return Ok(None);
                }
                self.modified_entry(location.to_string(), source_id, id)?
            }
        };
        Ok(Some(entry))
    }

    fn modified_entry(&self, path: String, old_id: ObjectId, new_id: ObjectId) -> Result<NumstatEntry> {
        let old = self.blob_data(old_id)?;
        let new = self.blob_data(new_id)?;
        let binary = is_binary(&old) || is_binary(&new);
        let (added, removed) = if binary { (0, 0) } else { line_diff(&old, &new) };
        Ok(NumstatEntry {
            path,
            added,
            removed,
            binary,
        })
    }

    fn blob_data(&self, id: ObjectId) -> Result<Vec<u8>> {
        let object = self.repo.find_object(id)?;
        Ok(object.detach().data)
    }

    /// All `CommitMetrics` for commits made on `day`, in commit iteration
    /// order then per-file diff order.
    pub fn metrics_for_day(
        &self,
        headers: &[CommitHeader],
        day: NaiveDate,
        repository: &str,
        engine: DiffEngine,
        basis: TimeBasis,
    ) -> Result<Vec<CommitMetrics>> {
        let mut records = Vec::new();

        for header in commits_on(headers, day, basis) {
            let hash = header.id.to_string();
            let files = self.numstat(header, engine)?;
            debug!(commit = %hash, files = files.len(), "diffed commit");

            records.extend(files.into_iter().map(|file| CommitMetrics {
                hash: hash.clone(),
                repository: repository.to_string(),
                date: midnight(day),
                author: header.author_email.clone(),
                language: language::classify(&file.path).to_string(),
                added_lines: file.added,
                removed_lines: file.removed,
            }));
        }

        Ok(records)
    }
}

/// Headers whose committer date falls on `day` in the given time basis.
pub fn commits_on(
    headers: &[CommitHeader],
    day: NaiveDate,
    basis: TimeBasis,
) -> impl Iterator<Item = &CommitHeader> {
    headers
        .iter()
        .filter(move |h| basis.day_of(&h.committed_at) == day)
}

/// Trees and submodule commits carry no lines of their own.
fn is_file(mode: EntryMode) -> bool {
    !(mode.is_tree() || mode.is_commit())
}

fn is_binary(data: &[u8]) -> bool {
    data.iter().take(BINARY_PROBE).any(|&b| b == 0)
}

fn count_lines(data: &[u8]) -> u32 {
    String::from_utf8_lossy(data).lines().count() as u32
}

fn line_diff(old: &[u8], new: &[u8]) -> (u32, u32) {
    let old = String::from_utf8_lossy(old);
    let new = String::from_utf8_lossy(new);
    let diff = TextDiff::from_lines(&*old, &*new);

    let mut added = 0u32;
    let mut removed = 0u32;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => removed += 1,
            ChangeTag::Equal => {}
        }
    }
    (added, removed)
}
