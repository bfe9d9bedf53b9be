use crate::error::Result;
use crate::model::{DateRange, ExportOutput, RepositoryMetrics, COLUMNS, SCHEMA_VERSION};
use chrono::{Datelike, Utc};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Excel refuses longer worksheet names.
pub const MAX_SHEET_NAME: usize = 31;

const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

pub fn default_output_name(range: &DateRange) -> PathBuf {
    PathBuf::from(format!("commits_{}_to_{}.xlsx", range.start(), range.end()))
}

/// Worksheet name for a repository: forbidden characters replaced and cut to
/// [`MAX_SHEET_NAME`] characters.
pub fn sheet_name(repository: &str) -> String {
    let cleaned: String = repository
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Sheet names for `repos` in order. Names that collide once truncated get a
/// `~N` suffix, still within the length limit.
pub fn sheet_names(repos: &[RepositoryMetrics]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(repos.len());

    for repo in repos {
        let base = sheet_name(&repo.name);
        let mut name = base.clone();
        let mut n = 2;
        // Excel compares sheet names case-insensitively
        while used.contains(&name.to_lowercase()) {
            let suffix = format!("~{n}");
            let keep = MAX_SHEET_NAME - suffix.chars().count();
            name = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
            n += 1;
        }
        used.insert(name.to_lowercase());
        names.push(name);
    }
    names
}

/// Write one worksheet per repository into a workbook at `path`.
pub fn write_workbook(path: &Path, repos: &[RepositoryMetrics]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for (repo, name) in repos.iter().zip(sheet_names(repos)) {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&name)?;
        write_sheet(sheet, repo, &header, &date_format)?;
        debug!(sheet = %name, rows = repo.records.len(), "worksheet written");
    }

    workbook.save(path)?;
    Ok(())
}

fn write_sheet(
    sheet: &mut Worksheet,
    repo: &RepositoryMetrics,
    header: &Format,
    date_format: &Format,
) -> Result<()> {
    for (col, title) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, header)?;
    }

    for (i, record) in repo.records.iter().enumerate() {
        let row = (i + 1) as u32;
        let date = ExcelDateTime::from_ymd(
            record.date.year() as u16,
            record.date.month() as u8,
            record.date.day() as u8,
        )?;

        sheet.write_string(row, 0, &record.hash)?;
        sheet.write_string(row, 1, &record.repository)?;
        sheet.write_datetime_with_format(row, 2, &date, date_format)?;
        if let Some(author) = &record.author {
            sheet.write_string(row, 3, author)?;
        }
        sheet.write_string(row, 4, &record.language)?;
        sheet.write_number(row, 5, record.added_lines)?;
        sheet.write_number(row, 6, record.removed_lines)?;
    }

    sheet.autofit();
    Ok(())
}

pub fn output_json(range: &DateRange, repos: &[RepositoryMetrics]) -> Result<()> {
    let output = ExportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        start: range.start(),
        end: range.end(),
        repositories: repos.to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{midnight, CommitMetrics};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn repo(name: &str, rows: usize) -> RepositoryMetrics {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        RepositoryMetrics {
            name: name.to_string(),
            records: (0..rows)
                .map(|i| CommitMetrics {
                    hash: format!("{i:040x}"),
                    repository: name.to_string(),
                    date: midnight(day),
                    author: (i % 2 == 0).then(|| "dev@example.com".to_string()),
                    language: "Rust".to_string(),
                    added_lines: i as u32,
                    removed_lines: 0,
                })
                .collect(),
        }
    }

    #[test]
    fn output_name_uses_range() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let range = DateRange::new(start, end).unwrap();
        assert_eq!(
            default_output_name(&range),
            PathBuf::from("commits_2024-01-01_to_2024-12-31.xlsx")
        );
    }

    #[test]
    fn long_names_are_truncated() {
        let long = "a-really-long-repository-name-that-keeps-going";
        let name = sheet_name(long);
        assert_eq!(name.chars().count(), MAX_SHEET_NAME);
        assert_eq!(name, &long[..MAX_SHEET_NAME]);
        assert_eq!(sheet_name("short"), "short");
    }

    #[test]
    fn forbidden_characters_are_replaced() {
        assert_eq!(sheet_name("team:[core]/api?"), "team__core__api_");
        assert_eq!(sheet_name("'quoted'"), "quoted");
        assert_eq!(sheet_name(""), "Sheet");
    }

    #[test]
    fn colliding_truncations_get_suffixes() {
        let prefix = "x".repeat(40);
        let repos = vec![
            repo(&format!("{prefix}-one"), 0),
            repo(&format!("{prefix}-two"), 0),
            repo("Other", 0),
            repo("other", 0),
        ];
        let names = sheet_names(&repos);
        assert_eq!(names[0], "x".repeat(31));
        assert_eq!(names[1], format!("{}~2", "x".repeat(29)));
        assert_eq!(names[2], "Other");
        assert_eq!(names[3], "other~2");
        assert!(names.iter().all(|n| n.chars().count() <= MAX_SHEET_NAME));
    }

    #[test]
    fn workbook_has_one_sheet_per_repository() {
        use calamine::{open_workbook, Reader, Xlsx};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let repos = vec![repo("alpha", 3), repo("a-very-long-repository-name-beyond-limits", 1)];
        write_workbook(&path, &repos).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec!["alpha".to_string(), "a-very-long-repository-name-bey".to_string()]
        );

        let range = workbook.worksheet_range("alpha").unwrap();
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>());
        assert_eq!(rows[1][0], format!("{:040x}", 0));
        assert_eq!(rows[1][3], "dev@example.com");
        // odd rows have no author and leave the cell blank
        assert_eq!(rows[2][3], "");
        assert_eq!(rows[3][5], "2");

        let long = workbook.worksheet_range("a-very-long-repository-name-bey").unwrap();
        assert_eq!(long.height(), 2);
    }
}
