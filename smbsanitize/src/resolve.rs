use std::collections::HashSet;

use crate::patterns::{NameComponents, Patterns};
use crate::process::EntryKind;

/// Every name currently known in one directory, files and subdirectories
/// alike. Skipped entries stay claimed because they still exist on disk.
#[derive(Debug, Default, Clone)]
pub struct ClaimedNames {
    names: HashSet<String>,
}

impl ClaimedNames {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            names: names.into_iter().cloned().collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Moves a claim from `old` to `new` after a rename took effect.
    pub fn transfer(&mut self, old: &str, new: &str) {
        self.names.remove(old);
        self.names.insert(new.to_string());
    }
}

/// Returns `proposed` if it is free, otherwise the first free name with a
/// counter appended to the base, before the extension for files.
pub fn resolve_collision(
    proposed: &str,
    kind: EntryKind,
    claimed: &ClaimedNames,
    patterns: &Patterns,
) -> String {
    if !claimed.contains(proposed) {
        return proposed.to_string();
    }

    let parts = match kind {
        EntryKind::File => patterns.split_extension(proposed),
        EntryKind::Directory => None,
    };

    let mut counter = 1usize;
    loop {
        let candidate = disambiguate(proposed, parts, counter);
        if !claimed.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn disambiguate(proposed: &str, parts: Option<NameComponents<'_>>, counter: usize) -> String {
    match parts {
        Some(parts) => NameComponents::join(&format!("{}{counter}", parts.base), parts.extension),
        None => format!("{proposed}{counter}"),
    }
}
