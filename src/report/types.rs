use crate::policy::CommentPostIntent;

/// Whether the reported comments were posted or only decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Posted,
    DryRun,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Posted => write!(f, "POSTED"),
            Outcome::DryRun => write!(f, "DRY RUN"),
        }
    }
}

/// Summary of one bot run.
#[derive(Debug)]
pub struct Report {
    /// Which job ran (e.g., "stale pull requests")
    pub job: String,
    pub outcome: Outcome,
    /// Comments decided, in posting order
    pub intents: Vec<CommentPostIntent>,
    /// Repositories skipped after a transport error
    pub failed_repositories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Posted.to_string(), "POSTED");
        assert_eq!(Outcome::DryRun.to_string(), "DRY RUN");
    }
}
