mod numstat;
mod repo;
mod source;

pub use numstat::{parse_numstat, rename_target, run_git_numstat, NumstatEntry, EMPTY_TREE};
pub use repo::{commits_on, CommitHeader, DiffEngine, GitRepo, TimeBasis};
pub use source::{Checkout, RepoSource};
