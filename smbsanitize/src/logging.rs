use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::EnvFilter;

use crate::process::EntryKind;

/// Installs the stderr subscriber. `RUST_LOG` overrides the level chosen by
/// `verbose`. A subscriber that is already installed stays in place.
pub fn init_tracing(verbose: bool, ansi: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .try_init();
    if installed.is_err() {
        tracing::debug!("logging already initialized, keeping existing subscriber");
    }
}

#[derive(Debug, Serialize)]
pub struct JournalEntry<'a> {
    pub timestamp: &'a str,
    pub kind: EntryKind,
    pub rule: &'a str,
    pub source: &'a Path,
    pub destination: &'a Path,
    pub outcome: &'a str,
    pub dry_run: bool,
}

/// Append-only JSON-lines record of every rename attempt.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    file: File,
}

impl Journal {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir).with_context(|| format!("creating {dir:?}"))?;
            }
        }
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .with_context(|| format!("opening {path:?}"))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(
        &mut self,
        kind: EntryKind,
        rule: &str,
        source: &Path,
        destination: &Path,
        outcome: &str,
        dry_run: bool,
    ) -> Result<()> {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".into());
        let entry = JournalEntry {
            timestamp: &timestamp,
            kind,
            rule,
            source,
            destination,
            outcome,
            dry_run,
        };
        let json = serde_json::to_string(&entry)?;
        writeln!(self.file, "{json}").with_context(|| format!("writing {:?}", self.path))?;
        Ok(())
    }
}
