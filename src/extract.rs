use crate::error::{CanaiError, Result};
use crate::git::{DiffEngine, RepoSource, TimeBasis};
use crate::model::{CommitMetrics, DateRange, RepositoryMetrics};
use std::path::Path;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub range: DateRange,
    pub engine: DiffEngine,
    pub time_basis: TimeBasis,
    pub verbose: bool,
}

impl ExtractOptions {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            engine: DiffEngine::default(),
            time_basis: TimeBasis::default(),
            verbose: false,
        }
    }
}

/// Extract one repository. Failures are logged and produce no records, so a
/// batch can carry on with the next repository.
pub fn process_repository(input: &str, options: &ExtractOptions) -> Vec<CommitMetrics> {
    match try_process_repository(input, options) {
        Ok(records) => records,
        Err(e) => {
            error!(repository = input, "Error processing repository {input}: {e}");
            Vec::new()
        }
    }
}

pub fn try_process_repository(input: &str, options: &ExtractOptions) -> Result<Vec<CommitMetrics>> {
    let source = RepoSource::parse(input);
    let name = source.short_name();

    // a cloned remote is removed when `checkout` drops, on success or error
    let checkout = source.checkout()?;
    if let Some(dir) = checkout.scratch_dir() {
        debug!(clone = %dir.display(), "working from temporary clone");
    }
    let repo = checkout.repo();
    let headers: Vec<_> = repo
        .commit_headers(options.verbose)?
        .into_iter()
        .filter(|h| options.range.contains(options.time_basis.day_of(&h.committed_at)))
        .collect();
    debug!(
        days = options.range.len_days(),
        commits = headers.len(),
        "commits inside the date range"
    );

    let mut records = Vec::new();
    for day in options.range.days() {
        info!("Fetching commits from {name} on {day}...");
        let day_records =
            repo.metrics_for_day(&headers, day, &name, options.engine, options.time_basis)?;
        records.extend(day_records);
    }

    info!(repository = %name, records = records.len(), "repository done");
    Ok(records)
}

/// Extract every input in order. Repositories without records are left out;
/// a repository name seen twice keeps its first position and the later data.
pub fn run_batch<S: AsRef<str>>(inputs: &[S], options: &ExtractOptions) -> Vec<RepositoryMetrics> {
    let mut results: Vec<RepositoryMetrics> = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        let records = process_repository(input, options);
        let Some(first) = records.first() else {
            info!("No commits found for {input} in the date range");
            continue;
        };
        let name = first.repository.clone();

        match results.iter_mut().find(|r| r.name == name) {
            Some(existing) => {
                warn!("Repository name {name} appears more than once; keeping data from {input}");
                existing.records = records;
            }
            None => results.push(RepositoryMetrics { name, records }),
        }
    }

    results
}

/// Repository inputs from a newline-delimited file. Blank lines and lines
/// starting with `#` are ignored.
pub fn read_batch_file(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(CanaiError::FileNotFound(path.display().to_string()));
    }

    let inputs: Vec<String> = std::fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if inputs.is_empty() {
        return Err(CanaiError::Batch(
            "File is empty or contains no valid entries.".to_string(),
        ));
    }
    Ok(inputs)
}
