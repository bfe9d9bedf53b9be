use crate::export::{default_output_name, output_json, write_workbook};
use crate::extract::{read_batch_file, run_batch, ExtractOptions};
use crate::git::{DiffEngine, TimeBasis};
use crate::model::{DateRange, RepositoryMetrics};
use crate::upload::{upload_file, Auth, UploadRequest};
use crate::{logging, util};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgGroup, Parser};
use console::style;
use std::path::PathBuf;
use std::time::Duration;

const EXTRACT_EXAMPLES: &str = "\
Examples:
  # Single repository
  canaicode-extract /path/to/repo --start 2024-01-01 --end 2024-12-31
  canaicode-extract https://github.com/user/repo.git -s 2024-01-01 -e 2024-12-31

  # Multiple repositories from file
  canaicode-extract --file repos.txt --start 2024-01-01 --end 2024-12-31";

const UPLOAD_EXAMPLES: &str = "\
Examples:
  # Bearer token
  canaicode-upload commits_2024-01-01_to_2024-12-31.xlsx -u https://api.example.com/upload -k YOUR_API_KEY

  # API key with user id
  canaicode-upload commits_2024-01-01_to_2024-12-31.xlsx -u https://api.example.com/upload -i USER -k YOUR_API_KEY

  # No authentication
  canaicode-upload commits_2024-01-01_to_2024-12-31.xlsx -u https://api.example.com/upload";

#[derive(Parser, Debug)]
#[command(name = "canaicode-extract")]
#[command(about = "Extract git commit line changes by language and export them to Excel")]
#[command(version)]
#[command(after_help = EXTRACT_EXAMPLES)]
#[command(group(ArgGroup::new("source").required(true).args(["repository", "file"])))]
pub struct ExtractCli {
    #[arg(help = "Repository URL or local path (single repository)")]
    pub repository: Option<String>,

    #[arg(short, long, value_name = "FILE", help = "File listing repository URLs/paths, one per line")]
    pub file: Option<PathBuf>,

    #[arg(short, long, value_name = "YYYY-MM-DD", value_parser = parse_date_arg, help = "Start date")]
    pub start: NaiveDate,

    #[arg(short, long, value_name = "YYYY-MM-DD", value_parser = parse_date_arg, help = "End date")]
    pub end: NaiveDate,

    #[arg(short, long, help = "Workbook path [default: commits_<start>_to_<end>.xlsx]")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Print JSON to stdout instead of writing a workbook")]
    pub json: bool,

    #[arg(long, value_enum, default_value_t = DiffEngine::Gix, help = "Diff engine for line counts")]
    pub engine: DiffEngine,

    #[arg(long, help = "Bucket commits by UTC day instead of local day")]
    pub utc: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

fn parse_date_arg(input: &str) -> std::result::Result<NaiveDate, String> {
    util::parse_date(input).map_err(|e| e.to_string())
}

impl ExtractCli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        logging::init(self.verbose);

        let range = DateRange::new(self.start, self.end).context("Invalid date range")?;

        let inputs = match (self.repository, self.file.as_deref()) {
            (Some(repository), None) => vec![repository],
            (None, Some(file)) => read_batch_file(file).context("Failed to read repository list")?,
            _ => anyhow::bail!("Provide either a repository path/URL or --file, not both"),
        };

        let options = ExtractOptions {
            range,
            engine: self.engine,
            time_basis: if self.utc { TimeBasis::Utc } else { TimeBasis::Local },
            verbose: self.verbose,
        };

        let repos = run_batch(&inputs, &options);

        if repos.is_empty() {
            println!("No commits found in the date range.");
            return Ok(());
        }

        if self.json {
            output_json(&range, &repos).context("Failed to write JSON output")?;
            return Ok(());
        }

        let output = self.output.unwrap_or_else(|| default_output_name(&range));
        write_workbook(&output, &repos)
            .with_context(|| format!("Failed to write {}", output.display()))?;

        if self.verbose {
            print_summary(&repos);
        }
        println!(
            "Export completed successfully: {}",
            style(output.display()).green()
        );
        Ok(())
    }
}

fn print_summary(repos: &[RepositoryMetrics]) {
    println!("{}", style("Export Summary").bold());
    println!("{}", "─".repeat(50));
    for repo in repos {
        let added: u64 = repo.records.iter().map(|r| r.added_lines as u64).sum();
        let removed: u64 = repo.records.iter().map(|r| r.removed_lines as u64).sum();
        println!(
            "{:<31} {:>6} rows {:>8} {:>8}",
            repo.name,
            style(repo.records.len()).cyan(),
            style(format!("+{added}")).green(),
            style(format!("-{removed}")).red()
        );
    }
}

#[derive(Parser, Debug)]
#[command(name = "canaicode-upload")]
#[command(about = "Upload a file to a specified endpoint")]
#[command(version)]
#[command(after_help = UPLOAD_EXAMPLES)]
pub struct UploadCli {
    #[arg(help = "Path to the file to upload")]
    pub file: PathBuf,

    #[arg(short, long, env = "CANAICODE_UPLOAD_URL", help = "Endpoint URL to upload the file to")]
    pub url: String,

    #[arg(
        short,
        long,
        env = "CANAICODE_UPLOAD_KEY",
        hide_env_values = true,
        help = "Authentication key: a Bearer token, or the X-API-Key value with --user-id"
    )]
    pub key: Option<String>,

    #[arg(short = 'i', long, requires = "key", help = "User id sent as form field; switches --key to X-API-Key")]
    pub user_id: Option<String>,

    #[arg(long, default_value = "5m", value_parser = humantime::parse_duration, help = "Request timeout")]
    pub timeout: Duration,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl UploadCli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Run the upload; `true` on success.
    pub fn execute(self) -> bool {
        logging::init(self.verbose);

        let request = UploadRequest {
            file: self.file,
            url: self.url,
            auth: Auth::from_parts(self.key, self.user_id),
            timeout: self.timeout,
        };
        upload_file(&request)
    }
}
