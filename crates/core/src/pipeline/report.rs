//! Run report

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::relationships::Relationship;

/// A collection left out of the diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedCollection {
    pub collection: String,
    pub reason: String,
}

/// A diagram that could not be rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedDiagram {
    /// Output file name the diagram would have been written to
    pub diagram: String,
    pub error: String,
}

/// Outcome of a generator run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    /// Collections whose schema made it into the output
    pub succeeded: Vec<String>,
    pub skipped: Vec<SkippedCollection>,
    pub failed: Vec<FailedDiagram>,
    pub relationships: Vec<Relationship>,
    /// Files written (or that would be written in a dry run)
    pub files: Vec<PathBuf>,
    pub dry_run: bool,
    pub duration_ms: u64,
}

impl RunReport {
    /// Check if every collection and diagram went through
    pub fn is_success(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }

    /// Get formatted duration
    pub fn duration_formatted(&self) -> String {
        let secs = self.duration_ms / 1000;
        let mins = secs / 60;
        let remaining_secs = secs % 60;

        if mins > 0 {
            format!("{mins}m {remaining_secs}s")
        } else if secs > 0 {
            format!("{secs}s")
        } else {
            format!("{}ms", self.duration_ms)
        }
    }

    /// Print summary to stderr
    pub fn print_summary(&self) {
        eprintln!();
        eprintln!("Run {} finished in {}", self.run_id, self.duration_formatted());
        eprintln!(
            "Collections: {} documented, {} skipped",
            self.succeeded.len(),
            self.skipped.len()
        );
        for skipped in &self.skipped {
            eprintln!("  - {}: {}", skipped.collection, skipped.reason);
        }
        eprintln!("Relationships: {}", self.relationships.len());
        for relationship in &self.relationships {
            eprintln!("  - {}", relationship.describe());
        }
        for failed in &self.failed {
            eprintln!("Diagram {} failed: {}", failed.diagram, failed.error);
        }
        let verb = if self.dry_run { "Would write" } else { "Wrote" };
        for file in &self.files {
            eprintln!("{verb} {}", file.display());
        }
    }
}
