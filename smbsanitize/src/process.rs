use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Settings;
use crate::logging::Journal;
use crate::patterns::Patterns;
use crate::pipeline::run_pipeline;
use crate::rename::Executor;
use crate::resolve::{ClaimedNames, resolve_collision};
use crate::stats::{CategoryStats, RunStatistics};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        })
    }
}

/// One directory's immediate children as handed over by the walker. After
/// processing, skipped entries are gone and renamed entries carry their new
/// names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub path: PathBuf,
    pub directories: Vec<String>,
    pub files: Vec<String>,
}

/// A subdirectory that survived the skip list, with the name it had on entry
/// and the name it carries now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descent {
    pub original: String,
    pub current: String,
}

/// Drives the pipeline over whole directories for one run and owns the run's
/// statistics.
pub struct Sanitizer {
    settings: Settings,
    patterns: Patterns,
    journal: Option<Journal>,
    stats: RunStatistics,
}

impl Sanitizer {
    pub fn new(settings: Settings, patterns: Patterns, journal: Option<Journal>) -> Self {
        Self {
            settings,
            patterns,
            journal,
            stats: RunStatistics::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    /// Files first, then subdirectories. Every name in the listing stays
    /// claimed for collision checks, skipped ones included.
    pub fn process_directory(&mut self, listing: &mut DirectoryListing) -> Vec<Descent> {
        let mut claimed = ClaimedNames::new(listing.directories.iter().chain(&listing.files));
        let mut pass = DirectoryPass {
            dir: &listing.path,
            settings: &self.settings,
            patterns: &self.patterns,
            claimed: &mut claimed,
            executor: Executor::new(self.settings.dry_run, self.journal.as_mut()),
        };

        pass.process_entries(
            EntryKind::File,
            &mut listing.files,
            self.stats.category_mut(EntryKind::File),
        );
        pass.process_entries(
            EntryKind::Directory,
            &mut listing.directories,
            self.stats.category_mut(EntryKind::Directory),
        )
    }
}

struct DirectoryPass<'a> {
    dir: &'a Path,
    settings: &'a Settings,
    patterns: &'a Patterns,
    claimed: &'a mut ClaimedNames,
    executor: Executor<'a>,
}

impl DirectoryPass<'_> {
    /// Runs the skip check and the pipeline over a snapshot of `names`, then
    /// writes the surviving, possibly renamed, names back in order.
    fn process_entries(
        &mut self,
        kind: EntryKind,
        names: &mut Vec<String>,
        stats: &mut CategoryStats,
    ) -> Vec<Descent> {
        let settings = self.settings;
        let (skiplist, enabled) = match kind {
            EntryKind::File => (&settings.file_skiplist, settings.files),
            EntryKind::Directory => (&settings.folder_skiplist, settings.directories),
        };

        let snapshot = std::mem::take(names);
        let mut survivors = Vec::with_capacity(snapshot.len());
        for original in snapshot {
            stats.total += 1;

            if skiplist.contains(&original) {
                stats.skipped += 1;
                info!(%kind, path = %self.dir.join(&original).display(), "skipping {kind}");
                continue;
            }

            let current = if enabled {
                self.sanitize_entry(kind, &original, stats)
            } else {
                original.clone()
            };
            names.push(current.clone());
            survivors.push(Descent { original, current });
        }
        survivors
    }

    fn sanitize_entry(&mut self, kind: EntryKind, name: &str, stats: &mut CategoryStats) -> String {
        let dir = self.dir;
        let settings = self.settings;
        let patterns = self.patterns;
        let claimed = &mut *self.claimed;
        let executor = &mut self.executor;

        run_pipeline(
            name,
            kind,
            &settings.rules,
            patterns,
            settings.replacement,
            |proposal| {
                debug!(
                    %kind,
                    path = %dir.join(&proposal.current).display(),
                    rule = %proposal.step,
                    detail = %proposal.detail,
                    "{} in {kind}",
                    proposal.step
                );
                let target = resolve_collision(&proposal.proposed, kind, claimed, patterns);
                if target != proposal.proposed {
                    debug!(
                        %kind,
                        proposed = %proposal.proposed,
                        resolved = %target,
                        "name taken, using disambiguated name"
                    );
                }
                if executor.execute(dir, kind, proposal.step, &proposal.current, &target, stats) {
                    claimed.transfer(&proposal.current, &target);
                    target
                } else {
                    proposal.current
                }
            },
        )
    }
}
