use std::{
    fs,
    path::{Path, PathBuf},
};

use common::config::Settings;
use regex::Regex;
use tracing::{debug, info};

use crate::{
    error::{Result, ResultError},
    result::ResultSet,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineSummary {
    pub files: Vec<PathBuf>,
    pub records: usize,
    pub output: PathBuf,
}

/// Result files in `dir` whose name matches `pattern`, sorted by file name
///
/// `exclude` is skipped even when it matches, so the combined output never feeds
/// back into the next run.
pub fn discover_result_files(dir: &Path, pattern: &Regex, exclude: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ResultError::io(dir, e))? {
        let entry = entry.map_err(|e| ResultError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| ResultError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            debug!("Skipping non utf-8 file name {:?}", entry.file_name());
            continue;
        };
        if name != exclude && pattern.is_match(name) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Reads every file in order and concatenates their records
///
/// Stops at the first file that fails to read, parse or validate.
pub fn combine_files(files: &[PathBuf]) -> Result<ResultSet> {
    let mut combined = ResultSet::default();
    for file in files {
        let set = ResultSet::from_path(file)?;
        debug!("Read {} records from {}", set.len(), file.display());
        combined.extend(set.results);
    }
    Ok(combined)
}

/// Combines every result file in `dir` into `dir/output_name`
pub fn combine_dir(dir: &Path, pattern: &str, output_name: &str) -> Result<CombineSummary> {
    let regex = Regex::new(pattern).map_err(|source| ResultError::Pattern {
        pattern: pattern.to_owned(),
        source,
    })?;
    let files = discover_result_files(dir, &regex, output_name)?;
    debug!("Found {} result files in {}", files.len(), dir.display());

    let combined = combine_files(&files)?;
    let output = dir.join(output_name);
    combined.write(&output)?;
    info!(
        "Combined {} records from {} files into {}",
        combined.len(),
        files.len(),
        output.display()
    );

    Ok(CombineSummary {
        files,
        records: combined.len(),
        output,
    })
}

pub fn combine(settings: &Settings) -> Result<CombineSummary> {
    combine_dir(
        &settings.results_dir,
        &settings.file_pattern,
        &settings.combined_file,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ResultRecord;
    use common::config::DEFAULT_COMBINED_FILE;

    const PATTERN: &str = r"^.+\.json$";

    fn record(command: &str, version: &str, times: &[f64]) -> ResultRecord {
        ResultRecord {
            command: command.to_owned(),
            mean: times.iter().sum::<f64>() / times.len() as f64,
            stddev: Some(0.5),
            median: times[times.len() / 2],
            min: times.iter().cloned().fold(f64::MAX, f64::min),
            max: times.iter().cloned().fold(f64::MIN, f64::max),
            times: times.to_vec(),
            exit_codes: vec![0; times.len()],
            parameters: [("python_version".to_owned(), version.to_owned())].into(),
            ..Default::default()
        }
    }

    fn write_set(dir: &Path, name: &str, records: Vec<ResultRecord>) {
        let set: ResultSet = records.into_iter().collect();
        fs::write(dir.join(name), serde_json::to_string_pretty(&set).unwrap()).unwrap();
    }

    #[test]
    fn test_record_counts_add_up() {
        let dir = tempfile::tempdir().unwrap();
        write_set(
            dir.path(),
            "a.json",
            vec![record("import", "3.11", &[1.0, 2.0]), record("run", "3.11", &[3.0])],
        );
        write_set(dir.path(), "b.json", vec![record("import", "3.12", &[1.5])]);
        write_set(dir.path(), "c.json", vec![]);

        let summary = combine_dir(dir.path(), PATTERN, DEFAULT_COMBINED_FILE).unwrap();
        assert_eq!(summary.records, 3);
        assert_eq!(summary.files.len(), 3);

        let combined = ResultSet::from_path(&summary.output).unwrap();
        assert_eq!(combined.len(), 3);
    }

    #[test]
    fn test_files_combined_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_set(dir.path(), "b.json", vec![record("second", "3.12", &[1.0])]);
        write_set(dir.path(), "a.json", vec![record("first", "3.11", &[1.0])]);

        let summary = combine_dir(dir.path(), PATTERN, DEFAULT_COMBINED_FILE).unwrap();
        let combined = ResultSet::from_path(&summary.output).unwrap();
        let commands = combined
            .results
            .iter()
            .map(|r| r.command.as_str())
            .collect::<Vec<_>>();
        assert_eq!(commands, vec!["first", "second"]);
    }

    #[test]
    fn test_no_inputs_writes_empty_results() {
        let dir = tempfile::tempdir().unwrap();
        let summary = combine_dir(dir.path(), PATTERN, DEFAULT_COMBINED_FILE).unwrap();
        assert_eq!(summary.records, 0);
        assert_eq!(
            fs::read_to_string(&summary.output).unwrap(),
            r#"{"results":[]}"#
        );
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        write_set(dir.path(), "a.json", vec![record("import", "3.11", &[0.1, 0.2])]);
        write_set(dir.path(), "b.json", vec![record("import-with-cache", "3.11", &[0.05])]);

        let first = combine_dir(dir.path(), PATTERN, DEFAULT_COMBINED_FILE).unwrap();
        let first_bytes = fs::read(&first.output).unwrap();
        let second = combine_dir(dir.path(), PATTERN, DEFAULT_COMBINED_FILE).unwrap();
        let second_bytes = fs::read(&second.output).unwrap();

        assert_eq!(first.files, second.files);
        assert_eq!(second.records, 2);
        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn test_existing_output_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_COMBINED_FILE), "stale").unwrap();
        write_set(dir.path(), "a.json", vec![record("run", "3.11", &[9.0, 10.0, 11.0])]);

        let summary = combine_dir(dir.path(), PATTERN, DEFAULT_COMBINED_FILE).unwrap();
        assert_eq!(ResultSet::from_path(&summary.output).unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_file_aborts_without_output() {
        let dir = tempfile::tempdir().unwrap();
        write_set(dir.path(), "a.json", vec![record("run", "3.11", &[1.0])]);
        fs::write(dir.path().join("b.json"), "{ not json").unwrap();

        let err = combine_dir(dir.path(), PATTERN, DEFAULT_COMBINED_FILE).unwrap_err();
        assert!(matches!(err, ResultError::Parse { .. }), "{err}");
        assert!(!dir.path().join(DEFAULT_COMBINED_FILE).exists());
    }

    #[test]
    fn test_pattern_filters_files() {
        let dir = tempfile::tempdir().unwrap();
        write_set(dir.path(), "bench_import.json", vec![record("import", "3.11", &[1.0])]);
        fs::write(dir.path().join("notes.txt"), "not a result").unwrap();
        fs::write(dir.path().join("other.json"), "{ not json").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let summary =
            combine_dir(dir.path(), r"^bench_.+\.json$", DEFAULT_COMBINED_FILE).unwrap();
        assert_eq!(summary.files, vec![dir.path().join("bench_import.json")]);
        assert_eq!(summary.records, 1);
    }

    #[test]
    fn test_invalid_pattern() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            combine_dir(dir.path(), "(", DEFAULT_COMBINED_FILE),
            Err(ResultError::Pattern { .. })
        ));
    }

    #[test]
    fn test_missing_dir_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = combine_dir(&dir.path().join("missing"), PATTERN, DEFAULT_COMBINED_FILE)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
