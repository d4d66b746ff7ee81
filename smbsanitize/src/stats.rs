use serde::Serialize;

use crate::process::EntryKind;

/// Counters for one category of entry. `attempted`, `failed` and `renamed`
/// count rename operations, so one entry fixed by two rules adds two.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub total: usize,
    pub skipped: usize,
    pub attempted: usize,
    pub failed: usize,
    pub renamed: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub directories: CategoryStats,
    pub files: CategoryStats,
}

impl RunStatistics {
    pub fn category_mut(&mut self, kind: EntryKind) -> &mut CategoryStats {
        match kind {
            EntryKind::Directory => &mut self.directories,
            EntryKind::File => &mut self.files,
        }
    }

    pub fn print(&self, dry_run: bool) {
        let mode = if dry_run { " (dry-run)" } else { "" };
        for (label, stats) in [("directories", &self.directories), ("files", &self.files)] {
            println!(
                "{label} summary{mode}: total={}, skipped={}, attempted={}, failed={}, renamed={}",
                stats.total, stats.skipped, stats.attempted, stats.failed, stats.renamed
            );
        }
    }
}
