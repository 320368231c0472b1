use anyhow::{Context, Result};

use crate::config::Config;
use crate::job::{Category, JobState, JobStatus};
use crate::parser::parse_job_rows;
use crate::query::StatusQuery;

/// Runs one classification pass per enabled category and merges the
/// results. Categories are independent: a query failure in one is logged
/// and contributes nothing, while the others still run.
pub struct Monitor<Q> {
    query: Q,
}

impl<Q: StatusQuery> Monitor<Q> {
    pub fn new(query: Q) -> Self {
        Self { query }
    }

    /// Collect problematic jobs across all enabled categories, in the
    /// fixed order Failed, Warning, LongRunning.
    pub fn collect(&self, config: &Config) -> Vec<JobStatus> {
        let mut problematic = Vec::new();

        for category in Category::ALL {
            if !config.category_enabled(category) {
                continue;
            }
            match self.check_category(config, category) {
                Ok(jobs) => {
                    log::info!("Found {} {} jobs", jobs.len(), category);
                    problematic.extend(jobs);
                }
                Err(e) => {
                    log::error!("Error checking {} jobs: {:#}", category, e);
                }
            }
        }

        problematic
    }

    fn check_category(&self, config: &Config, category: Category) -> Result<Vec<JobStatus>> {
        match category {
            Category::Failed => self.jobs_by_result(config, JobState::Failed),
            Category::Warning => self.jobs_by_result(config, JobState::Warning),
            Category::LongRunning => self.long_running_jobs(config),
        }
    }

    fn jobs_by_result(&self, config: &Config, state: JobState) -> Result<Vec<JobStatus>> {
        let raw = self
            .query
            .fetch_by_result(config, state)
            .with_context(|| format!("{} job query failed", state.label()))?;
        Ok(parse_job_rows(&raw, state))
    }

    /// Fetch every executing job, keep those whose elapsed minutes exceed
    /// the configured threshold, and rewrite their descriptions with the
    /// threshold context.
    fn long_running_jobs(&self, config: &Config) -> Result<Vec<JobStatus>> {
        let raw = self
            .query
            .fetch_running(config)
            .context("running job query failed")?;

        let threshold = config.long_running_threshold;
        let mut jobs: Vec<JobStatus> = parse_job_rows(&raw, JobState::Running)
            .into_iter()
            .filter(|job| elapsed_minutes(&job.duration).is_some_and(|m| m > threshold as f64))
            .collect();

        for job in &mut jobs {
            job.description = format!(
                "Long-running job (over {} minutes): {}",
                threshold, job.description
            );
        }

        Ok(jobs)
    }
}

/// Elapsed minutes from the platform's TotalMinutes string. The full
/// decimal value is compared against the threshold, so a job at "120.5"
/// still trips a 120-minute threshold; truncation happens only when the
/// digest is rendered. None for an empty or non-numeric value.
fn elapsed_minutes(duration: &str) -> Option<f64> {
    duration.trim().parse().ok()
}
