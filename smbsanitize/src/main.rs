use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use is_terminal::IsTerminal;
use tracing::info;

mod config;
mod error;
mod logging;
mod patterns;
mod pipeline;
mod process;
mod rename;
mod resolve;
mod stats;
mod walk;

use config::{PartialSettings, Settings, load_config};
use logging::{Journal, init_tracing};
use patterns::Patterns;
use pipeline::Rule;
use process::Sanitizer;

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq, Default)]
enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn should_color(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stderr().is_terminal(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let settings = resolve_settings(&cli)?;
    init_tracing(settings.verbose, cli.color.should_color());

    let patterns = Patterns::new(&settings.ugly_characters)
        .map_err(error::ConfigError::from)
        .context("building name patterns")?;
    let journal = cli.journal.as_deref().map(Journal::open).transpose()?;
    let roots = walk::collect_roots(&cli.paths);

    print_run_summary(&settings, &roots, journal.as_ref());
    let dry_run = settings.dry_run;
    let mut sanitizer = Sanitizer::new(settings, patterns, journal);
    for root in &roots {
        info!(root = %root.display(), "walking");
        walk::sanitize_tree(root, &mut sanitizer)
            .with_context(|| format!("processing {}", root.display()))?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(sanitizer.stats())?);
    } else {
        sanitizer.stats().print(dry_run);
        if dry_run {
            println!("dry-run: rerun with --apply to rename.");
        }
    }
    Ok(())
}

/// Defaults, then the config file, then the command line.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::default();
    if let Some(path) = &cli.config {
        let from_file = load_config(path)?;
        settings = settings
            .merge(&from_file)
            .with_context(|| format!("invalid config {}", path.display()))?;
    }
    settings = settings.merge(&cli.overrides())?;
    settings.folder_skiplist.extend(cli.skip_dir.iter().cloned());
    settings.file_skiplist.extend(cli.skip_file.iter().cloned());
    Ok(settings)
}

fn print_run_summary(settings: &Settings, roots: &[PathBuf], journal: Option<&Journal>) {
    let rules: Vec<String> = settings
        .rules
        .iter()
        .filter_map(|rule| rule.to_possible_value())
        .map(|value| value.get_name().to_string())
        .collect();
    let roots: Vec<String> = roots.iter().map(|r| r.display().to_string()).collect();
    info!(
        roots = %roots.join(", "),
        rules = %rules.join(","),
        ugly_characters = %settings.ugly_characters,
        replacement = %settings.replacement,
        files = settings.files,
        directories = settings.directories,
        dry_run = settings.dry_run,
        journal = ?journal.map(|j| j.path().display().to_string()),
        "starting run"
    );
}

#[derive(Debug, Parser)]
#[command(
    name = "smbsanitize",
    version,
    about = "Make file and directory names safe for SMB shares"
)]
struct Cli {
    /// Directories whose contents should be sanitized
    #[arg(value_name = "PATH", required = true, value_hint = ValueHint::DirPath)]
    paths: Vec<PathBuf>,
    /// Actually rename; without this only a preview is produced
    #[arg(long, action = ArgAction::SetTrue)]
    apply: bool,
    /// Rule to run (repeatable); defaults to all rules
    #[arg(long = "rule", value_name = "RULE", value_enum)]
    rules: Vec<Rule>,
    /// Characters to replace
    #[arg(long = "ugly-chars", value_name = "CHARS")]
    ugly_chars: Option<String>,
    /// Replacement for each run of ugly characters
    #[arg(long, value_name = "CHAR")]
    replacement: Option<String>,
    /// Directory name to leave alone and not descend into (repeatable)
    #[arg(long = "skip-dir", value_name = "NAME")]
    skip_dir: Vec<String>,
    /// File name to leave alone (repeatable)
    #[arg(long = "skip-file", value_name = "NAME")]
    skip_file: Vec<String>,
    #[arg(long = "no-files", action = ArgAction::SetTrue)]
    no_files: bool,
    #[arg(long = "no-directories", action = ArgAction::SetTrue)]
    no_directories: bool,
    /// YAML or JSON settings file
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
    /// Append one JSON line per rename attempt to FILE
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    journal: Option<PathBuf>,
    /// Print the final statistics as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
    #[arg(long = "color", value_enum, default_value = "auto")]
    color: ColorChoice,
}

impl Cli {
    fn overrides(&self) -> PartialSettings {
        PartialSettings {
            rules: (!self.rules.is_empty()).then(|| self.rules.clone()),
            ugly_characters: self.ugly_chars.clone(),
            replacement: self.replacement.clone(),
            folder_skiplist: None,
            file_skiplist: None,
            files: self.no_files.then_some(false),
            directories: self.no_directories.then_some(false),
            apply: self.apply.then_some(true),
            verbose: self.verbose.then_some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn preview_is_the_default() {
        let cli = Cli::parse_from(["smbsanitize", "/share"]);
        let settings = resolve_settings(&cli).expect("settings");
        assert!(settings.dry_run);
        assert_eq!(settings.rules, Rule::ALL.to_vec());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "smbsanitize",
            "--apply",
            "--rule",
            "ugly-characters",
            "--rule",
            "leading-space",
            "--replacement",
            "-",
            "--skip-dir",
            "@eaDir",
            "--skip-file",
            ".DS_Store",
            "--no-directories",
            "/share",
        ]);
        let settings = resolve_settings(&cli).expect("settings");
        assert!(!settings.dry_run);
        assert_eq!(settings.rules, vec![Rule::UglyCharacters, Rule::LeadingSpace]);
        assert_eq!(settings.replacement, '-');
        assert!(settings.folder_skiplist.contains("@eaDir"));
        assert!(settings.folder_skiplist.contains(".AppleDouble"));
        assert!(settings.file_skiplist.contains(".DS_Store"));
        assert!(!settings.directories);
    }

    #[test]
    fn bad_replacement_is_a_startup_error() {
        let cli = Cli::parse_from(["smbsanitize", "--replacement", "ab", "/share"]);
        assert!(resolve_settings(&cli).is_err());
    }

    #[test]
    fn cli_beats_config_file() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("cfg.yaml");
        std::fs::write(&path, "replacement: \"+\"\nfiles: false\n").expect("write");
        let cli = Cli::parse_from([
            "smbsanitize".into(),
            "--config".into(),
            path.display().to_string(),
            "--replacement".into(),
            "~".into(),
            "/share".into(),
        ]);
        let settings = resolve_settings(&cli).expect("settings");
        assert_eq!(settings.replacement, '~');
        assert!(!settings.files);
    }

    #[test]
    fn run_sanitizes_a_tree_end_to_end() {
        let temp = tempfile::tempdir().expect("temp dir");
        std::fs::write(temp.path().join("a?b .txt"), "x").expect("write");
        let journal = temp.path().join("journal.jsonl");
        let cli = Cli::parse_from([
            "smbsanitize".into(),
            "--apply".into(),
            "--json".into(),
            "--journal".into(),
            journal.display().to_string(),
            temp.path().display().to_string(),
        ]);
        run(cli).expect("run");
        assert!(temp.path().join("a_b.txt").is_file());
        let text = std::fs::read_to_string(&journal).expect("journal");
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn run_can_be_called_twice_in_one_process() {
        let temp = tempfile::tempdir().expect("temp dir");
        std::fs::write(temp.path().join(" twice"), "x").expect("write");
        for _ in 0..2 {
            let cli = Cli::parse_from([
                "smbsanitize".into(),
                "--apply".into(),
                temp.path().display().to_string(),
            ]);
            run(cli).expect("run");
        }
        assert!(temp.path().join("twice").is_file());
    }
}
