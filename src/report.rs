use crate::job::{JobState, JobStatus};

/// Rendered alert, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub body: String,
}

/// Render the plain-text digest for one poll cycle. Pure function of its
/// input: groups always appear in the order Failed, Warning, Running, and
/// empty groups emit nothing.
pub fn build_digest(jobs: &[JobStatus]) -> Digest {
    let subject = format!("ALERT: {} Backup Jobs Need Attention", jobs.len());

    let failed: Vec<&JobStatus> = jobs.iter().filter(|j| j.status == JobState::Failed).collect();
    let warning: Vec<&JobStatus> = jobs.iter().filter(|j| j.status == JobState::Warning).collect();
    let running: Vec<&JobStatus> = jobs.iter().filter(|j| j.status == JobState::Running).collect();

    let mut body = String::new();
    body.push_str("Backup & Replication Job Status Report\n");
    body.push_str("======================================\n\n");

    if !failed.is_empty() {
        body.push_str(&format!("FAILED JOBS ({}):\n", failed.len()));
        body.push_str("--------------\n");
        for job in &failed {
            body.push_str(&format!(
                "Job: {}\nStatus: {}\nStart Time: {}\nEnd Time: {}\nDescription: {}\n\n",
                job.name, job.status, job.start_time, job.end_time, job.description
            ));
        }
        body.push('\n');
    }

    if !warning.is_empty() {
        body.push_str(&format!("WARNING JOBS ({}):\n", warning.len()));
        body.push_str("----------------\n");
        for job in &warning {
            body.push_str(&format!(
                "Job: {}\nStatus: {}\nStart Time: {}\nEnd Time: {}\nDescription: {}\n\n",
                job.name, job.status, job.start_time, job.end_time, job.description
            ));
        }
        body.push('\n');
    }

    if !running.is_empty() {
        body.push_str(&format!("LONG-RUNNING JOBS ({}):\n", running.len()));
        body.push_str("---------------------\n");
        for job in &running {
            // Duration is a period-delimited minutes string from the
            // platform; truncate at the first decimal point rather than
            // parsing it as a number.
            let duration_text = if job.duration.is_empty() {
                String::new()
            } else {
                let minutes = job.duration.split('.').next().unwrap_or(&job.duration);
                format!(" (Running for {} minutes)", minutes)
            };

            body.push_str(&format!(
                "Job: {}\nStatus: {}{}\nStart Time: {}\nDescription: {}\n\n",
                job.name, job.status, duration_text, job.start_time, job.description
            ));
        }
    }

    body.push_str("\nThis is an automated message from the backup job monitor.\n");

    Digest { subject, body }
}
