use std::fs;
use std::path::Path;

use tracing::{error, info, warn};

use crate::error::RenameError;
use crate::logging::Journal;
use crate::pipeline::Step;
use crate::process::EntryKind;
use crate::stats::CategoryStats;

/// Performs or simulates renames and records what happened. Failures are
/// reported here and never propagate to the caller.
pub struct Executor<'j> {
    dry_run: bool,
    journal: Option<&'j mut Journal>,
}

impl<'j> Executor<'j> {
    pub fn new(dry_run: bool, journal: Option<&'j mut Journal>) -> Self {
        Self { dry_run, journal }
    }

    /// Renames `from` to `to` inside `dir`. Returns true when the entry now
    /// carries the new name (or would, in a dry run).
    pub fn execute(
        &mut self,
        dir: &Path,
        kind: EntryKind,
        step: Step,
        from: &str,
        to: &str,
        stats: &mut CategoryStats,
    ) -> bool {
        let source = dir.join(from);
        let destination = dir.join(to);
        stats.attempted += 1;

        info!(
            %kind,
            source = %source.display(),
            destination = %destination.display(),
            rule = %step,
            dry_run = self.dry_run,
            "{} {kind}",
            if self.dry_run { "would rename" } else { "renaming" }
        );

        let result = rename_entry(&source, &destination, to, self.dry_run);
        let outcome = match &result {
            Ok(()) => {
                stats.renamed += 1;
                "renamed"
            }
            Err(err) => {
                stats.failed += 1;
                error!(
                    %kind,
                    source = %source.display(),
                    destination = %destination.display(),
                    reason = err.reason(),
                    "unable to rename {kind}: {err}"
                );
                err.reason()
            }
        };

        if let Some(journal) = self.journal.as_deref_mut() {
            if let Err(err) = journal.record(
                kind,
                step.label(),
                &source,
                &destination,
                outcome,
                self.dry_run,
            ) {
                warn!("journal write failed: {err:#}");
            }
        }

        result.is_ok()
    }
}

/// Checks immediately before acting that the source is present and the
/// destination is free. A dry run only validates the target name.
pub fn rename_entry(
    source: &Path,
    destination: &Path,
    target_name: &str,
    dry_run: bool,
) -> Result<(), RenameError> {
    if !is_usable_name(target_name) {
        return Err(RenameError::InvalidTarget {
            from: source.to_path_buf(),
            name: target_name.to_string(),
        });
    }

    if dry_run {
        return Ok(());
    }

    if fs::symlink_metadata(source).is_err() {
        return Err(RenameError::SourceMissing(source.to_path_buf()));
    }
    if fs::symlink_metadata(destination).is_ok() {
        return Err(RenameError::DestinationExists(destination.to_path_buf()));
    }

    fs::rename(source, destination).map_err(|err| RenameError::RenameFailed {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: err,
    })
}

fn is_usable_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn renames_when_source_present_and_destination_free() {
        let temp = tempdir().expect("temp dir");
        fs::write(temp.path().join(" a.txt"), "data").expect("write");
        let mut stats = CategoryStats::default();
        let mut executor = Executor::new(false, None);

        let ok = executor.execute(
            temp.path(),
            EntryKind::File,
            Step::LeadingSpace,
            " a.txt",
            "a.txt",
            &mut stats,
        );

        assert!(ok);
        assert!(temp.path().join("a.txt").is_file());
        assert!(!temp.path().join(" a.txt").exists());
        assert_eq!((stats.attempted, stats.renamed, stats.failed), (1, 1, 0));
    }

    #[test]
    fn missing_source_is_reported_not_raised() {
        let temp = tempdir().expect("temp dir");
        let err = rename_entry(
            &temp.path().join("gone"),
            &temp.path().join("here"),
            "here",
            false,
        )
        .unwrap_err();
        assert!(matches!(err, RenameError::SourceMissing(_)));

        let mut stats = CategoryStats::default();
        let mut executor = Executor::new(false, None);
        let ok = executor.execute(
            temp.path(),
            EntryKind::File,
            Step::TrailingSpace,
            "gone ",
            "gone",
            &mut stats,
        );
        assert!(!ok);
        assert_eq!((stats.attempted, stats.renamed, stats.failed), (1, 0, 1));
    }

    #[test]
    fn existing_destination_is_never_clobbered() {
        let temp = tempdir().expect("temp dir");
        fs::write(temp.path().join("a:b"), "ugly").expect("write");
        fs::write(temp.path().join("a_b"), "keep").expect("write");

        let err = rename_entry(
            &temp.path().join("a:b"),
            &temp.path().join("a_b"),
            "a_b",
            false,
        )
        .unwrap_err();

        assert!(matches!(err, RenameError::DestinationExists(_)));
        assert_eq!(
            fs::read_to_string(temp.path().join("a_b")).expect("read"),
            "keep"
        );
        assert!(temp.path().join("a:b").exists());
    }

    #[test]
    fn os_level_failure_is_reported_with_its_cause() {
        let temp = tempdir().expect("temp dir");
        fs::write(temp.path().join("a "), "data").expect("write");
        let destination = temp.path().join("no-such-dir").join("a");

        let err = rename_entry(&temp.path().join("a "), &destination, "a", false).unwrap_err();

        assert!(matches!(err, RenameError::RenameFailed { .. }), "{err:?}");
        assert_eq!(err.reason(), "rename-error");
        assert!(std::error::Error::source(&err).is_some());
        assert!(temp.path().join("a ").exists());
    }

    #[test]
    fn dry_run_leaves_the_filesystem_alone() {
        let temp = tempdir().expect("temp dir");
        fs::write(temp.path().join("x "), "data").expect("write");
        let mut stats = CategoryStats::default();
        let mut executor = Executor::new(true, None);

        let ok = executor.execute(
            temp.path(),
            EntryKind::File,
            Step::TrailingSpace,
            "x ",
            "x",
            &mut stats,
        );

        assert!(ok);
        assert!(temp.path().join("x ").exists());
        assert!(!temp.path().join("x").exists());
        assert_eq!(stats.renamed, 1);
    }

    #[test]
    fn unusable_targets_are_rejected_even_in_dry_run() {
        for name in ["", ".", "..", "a/b"] {
            let err = rename_entry(Path::new("src"), Path::new("dst"), name, true).unwrap_err();
            assert!(matches!(err, RenameError::InvalidTarget { .. }));
        }
    }

    #[test]
    fn attempts_are_journaled() {
        let temp = tempdir().expect("temp dir");
        let mut journal = Journal::open(&temp.path().join("journal.jsonl")).expect("journal");
        let mut stats = CategoryStats::default();
        {
            let mut executor = Executor::new(true, Some(&mut journal));
            executor.execute(
                temp.path(),
                EntryKind::Directory,
                Step::UglyCharacters,
                "a|b",
                "a_b",
                &mut stats,
            );
        }
        let text = fs::read_to_string(journal.path()).expect("read");
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("\"rule\":\"ugly character\""));
        assert!(text.contains("\"kind\":\"directory\""));
    }
}
