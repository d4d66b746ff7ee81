use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::patterns::{NameComponents, Patterns};
use crate::process::EntryKind;

/// Rules a user can switch on or off.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    LeadingSpace,
    TrailingSpace,
    ExtensionSpace,
    UglyCharacters,
}

impl Rule {
    pub const ALL: [Rule; 4] = [
        Rule::LeadingSpace,
        Rule::TrailingSpace,
        Rule::ExtensionSpace,
        Rule::UglyCharacters,
    ];
}

/// One concrete check within a rule. `ExtensionSpace` has two, and the name
/// is re-split before each because the first can move the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    LeadingSpace,
    TrailingSpace,
    BaseTrailingSpace,
    ExtensionLeadingSpace,
    UglyCharacters,
}

const STEPS: [Step; 5] = [
    Step::LeadingSpace,
    Step::TrailingSpace,
    Step::BaseTrailingSpace,
    Step::ExtensionLeadingSpace,
    Step::UglyCharacters,
];

impl Step {
    pub fn rule(self) -> Rule {
        match self {
            Step::LeadingSpace => Rule::LeadingSpace,
            Step::TrailingSpace => Rule::TrailingSpace,
            Step::BaseTrailingSpace | Step::ExtensionLeadingSpace => Rule::ExtensionSpace,
            Step::UglyCharacters => Rule::UglyCharacters,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::LeadingSpace => "leading space",
            Step::TrailingSpace => "trailing space",
            Step::BaseTrailingSpace => "trailing base name space",
            Step::ExtensionLeadingSpace => "leading extension space",
            Step::UglyCharacters => "ugly character",
        }
    }

    fn applies_to(self, kind: EntryKind) -> bool {
        match self {
            Step::BaseTrailingSpace | Step::ExtensionLeadingSpace => kind == EntryKind::File,
            _ => true,
        }
    }

    fn propose(self, name: &str, patterns: &Patterns, replacement: char) -> Option<Proposal> {
        let (proposed, detail) = match self {
            Step::LeadingSpace => {
                let run = patterns.leading_whitespace(name)?;
                (name[run.len()..].to_string(), run_length(run))
            }
            Step::TrailingSpace => {
                let run = patterns.trailing_whitespace(name)?;
                (name[..name.len() - run.len()].to_string(), run_length(run))
            }
            Step::BaseTrailingSpace => {
                let parts = patterns.split_extension(name)?;
                let run = patterns.trailing_whitespace(parts.base)?;
                let base = &parts.base[..parts.base.len() - run.len()];
                (NameComponents::join(base, parts.extension), run_length(run))
            }
            Step::ExtensionLeadingSpace => {
                let parts = patterns.split_extension(name)?;
                let run = patterns.leading_whitespace(parts.extension)?;
                let extension = &parts.extension[run.len()..];
                (NameComponents::join(parts.base, extension), run_length(run))
            }
            Step::UglyCharacters => {
                if !patterns.has_uglies(name) {
                    return None;
                }
                let replaced = patterns.replace_uglies(name, replacement);
                (replaced, format!("replacement '{replacement}'"))
            }
        };

        Some(Proposal {
            step: self,
            current: name.to_string(),
            proposed,
            detail,
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn run_length(run: &str) -> String {
    format!("length {}", run.chars().count())
}

/// A rename one step wants to make, before collision resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub step: Step,
    pub current: String,
    pub proposed: String,
    pub detail: String,
}

/// Runs the enabled steps over `name` in their fixed order. Each proposal goes
/// to `apply`, which returns the name the entry carries afterwards; later
/// steps see that name.
pub fn run_pipeline<F>(
    name: &str,
    kind: EntryKind,
    rules: &[Rule],
    patterns: &Patterns,
    replacement: char,
    mut apply: F,
) -> String
where
    F: FnMut(Proposal) -> String,
{
    let mut current = name.to_string();
    for step in STEPS {
        if !rules.contains(&step.rule()) || !step.applies_to(kind) {
            continue;
        }
        if let Some(proposal) = step.propose(&current, patterns, replacement) {
            current = apply(proposal);
        }
    }
    current
}
