use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::process::{DirectoryListing, Sanitizer};

/// Walks `root` top-down, handing each directory's listing to `sanitizer`
/// before descending into the subdirectories it kept. The root itself is
/// never renamed.
pub fn sanitize_tree(root: &Path, sanitizer: &mut Sanitizer) -> Result<()> {
    let metadata = fs::metadata(root)
        .with_context(|| format!("unable to read metadata for {}", root.display()))?;
    if !metadata.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let dry_run = sanitizer.settings().dry_run;
    // (where it is on disk, where it would be after this run)
    let mut pending = vec![(root.to_path_buf(), root.to_path_buf())];

    while let Some((physical, logical)) = pending.pop() {
        let mut listing = match read_listing(&physical) {
            Ok((directories, files)) => DirectoryListing {
                path: logical.clone(),
                directories,
                files,
            },
            Err(err) => {
                warn!(path = %physical.display(), "skipping unreadable directory: {err:#}");
                continue;
            }
        };
        debug!(
            path = %logical.display(),
            directories = listing.directories.len(),
            files = listing.files.len(),
            "processing directory"
        );

        let descents = sanitizer.process_directory(&mut listing);
        for descent in descents.into_iter().rev() {
            let on_disk = if dry_run {
                &descent.original
            } else {
                &descent.current
            };
            pending.push((physical.join(on_disk), logical.join(&descent.current)));
        }
    }

    Ok(())
}

/// Immediate children of `dir`, split into real directories and everything
/// else. Symlinks are never followed.
fn read_listing(dir: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let mut directories = Vec::new();
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(
                path = %entry.path().display(),
                "leaving entry with non UTF-8 name alone"
            );
            continue;
        };
        if entry.file_type().is_dir() {
            directories.push(name);
        } else {
            files.push(name);
        }
    }

    Ok((directories, files))
}

/// Canonical roots in command-line order. A root inside another root is
/// dropped, since the outer walk may already have renamed part of its path.
pub fn collect_roots(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen: Vec<PathBuf> = Vec::new();
    for root in roots {
        let canonical = fs::canonicalize(root).unwrap_or_else(|_| root.clone());
        if !seen.contains(&canonical) {
            seen.push(canonical);
        }
    }
    let outer = seen.clone();
    seen.retain(|root| {
        let nested = outer
            .iter()
            .any(|other| other != root && root.starts_with(other));
        if nested {
            debug!(root = %root.display(), "dropping root nested inside another root");
        }
        !nested
    });
    seen
}
