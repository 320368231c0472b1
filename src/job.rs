/// Result state of a backup job as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Failed,
    Warning,
    Running,
}

impl JobState {
    /// Label used by the platform's LastResult field and in digests.
    pub fn label(&self) -> &'static str {
        match self {
            JobState::Failed => "Failed",
            JobState::Warning => "Warning",
            JobState::Running => "Running",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One of the monitored query categories, checked in this fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Failed,
    Warning,
    LongRunning,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Failed, Category::Warning, Category::LongRunning];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Failed => "failed",
            Category::Warning => "warning",
            Category::LongRunning => "long-running",
        };
        write!(f, "{}", name)
    }
}

/// One backup job's observed state at poll time. Built fresh each cycle
/// and discarded once the digest is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub name: String,
    pub status: JobState,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
    /// Elapsed minutes as reported by the platform. Empty except for
    /// running jobs, where it comes from a sixth output column.
    pub duration: String,
}
