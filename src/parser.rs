use crate::job::{JobState, JobStatus};

/// Parse the CSV-style rows emitted by the platform's
/// `ConvertTo-Csv -NoTypeInformation` output: one header row, then one
/// double-quoted comma-delimited row per job.
///
/// Rows with fewer than five fields are dropped rather than treated as
/// fatal; a sixth field, when present, carries the elapsed minutes for
/// running jobs. Surrounding quotes are stripped per field, but embedded
/// commas inside a field are not supported (the platform does not emit
/// them for the selected columns).
///
/// The jobs were already filtered by `state` at query time, so the row's
/// own status label is not re-interpreted here.
pub fn parse_job_rows(output: &str, state: JobState) -> Vec<JobStatus> {
    let mut lines = output.lines();

    // Header row; nothing to do for empty output.
    if lines.next().is_none() {
        return Vec::new();
    }

    let mut jobs = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(|f| f.trim_matches('"')).collect();
        if fields.len() < 5 {
            continue;
        }

        jobs.push(JobStatus {
            name: fields[0].to_string(),
            status: state,
            start_time: fields[2].to_string(),
            end_time: fields[3].to_string(),
            description: fields[4].to_string(),
            duration: fields.get(5).map(|f| f.to_string()).unwrap_or_default(),
        });
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\"Name\",\"LastResult\",\"LastStart\",\"LastEnd\",\"Description\"";

    #[test]
    fn parses_one_job_per_row_in_order() {
        let output = format!(
            "{}\n\"JobA\",\"Failed\",\"2024-01-01\",\"2024-01-01\",\"Disk full\"\n\"JobB\",\"Failed\",\"2024-01-02\",\"2024-01-02\",\"Tape jam\"\n",
            HEADER
        );
        let jobs = parse_job_rows(&output, JobState::Failed);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].name, "JobA");
        assert_eq!(jobs[0].status, JobState::Failed);
        assert_eq!(jobs[0].start_time, "2024-01-01");
        assert_eq!(jobs[0].description, "Disk full");
        assert_eq!(jobs[1].name, "JobB");
    }

    #[test]
    fn skips_rows_with_fewer_than_five_fields() {
        let output = format!(
            "{}\n\"JobA\",\"Failed\",\"2024-01-01\",\"2024-01-01\",\"Disk full\"\n\"garbage\",\"row\"\n\"JobB\",\"Failed\",\"2024-01-02\",\"2024-01-02\",\"Tape jam\"\n",
            HEADER
        );
        let jobs = parse_job_rows(&output, JobState::Failed);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].name, "JobA");
        assert_eq!(jobs[1].name, "JobB");
    }

    #[test]
    fn sixth_field_populates_duration() {
        let output = format!(
            "{}\n\"JobC\",\"Running\",\"2024-01-01\",\"N/A\",\"Currently running\",\"145.231\"\n",
            HEADER
        );
        let jobs = parse_job_rows(&output, JobState::Running);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].duration, "145.231");
    }

    #[test]
    fn duration_defaults_to_empty_without_sixth_field() {
        let output = format!(
            "{}\n\"JobA\",\"Failed\",\"2024-01-01\",\"2024-01-01\",\"Disk full\"\n",
            HEADER
        );
        let jobs = parse_job_rows(&output, JobState::Failed);
        assert_eq!(jobs[0].duration, "");
    }

    #[test]
    fn empty_input_yields_no_jobs() {
        assert!(parse_job_rows("", JobState::Failed).is_empty());
    }

    #[test]
    fn whitespace_only_input_yields_no_jobs() {
        assert!(parse_job_rows("   \n  \n", JobState::Failed).is_empty());
    }

    #[test]
    fn header_only_input_yields_no_jobs() {
        assert!(parse_job_rows(HEADER, JobState::Failed).is_empty());
    }

    #[test]
    fn strips_surrounding_quotes() {
        let output = format!("{}\n\"JobA\",\"Warning\",\"start\",\"end\",\"desc\"\n", HEADER);
        let jobs = parse_job_rows(&output, JobState::Warning);
        assert_eq!(jobs[0].name, "JobA");
        assert_eq!(jobs[0].end_time, "end");
        assert_eq!(jobs[0].description, "desc");
    }
}
