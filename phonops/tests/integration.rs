//! Integration tests for phonops CLI.

use clap::Parser;
use phonops::cli::{Cli, Commands, run_cli};
use std::path::Path;
use tempfile::TempDir;

const DICTIONARY: &str = r#"{
    "features": {"m": [-1, 1, 1], "k": [-1, -1, -1]},
    "languages": {
        "zh": {"美": "m ei3", "国": "k uo2"},
        "en": {"mango": "m ei3 ŋ k uo2", "i": "ˈaɪ", "like": "l aɪ k"}
    }
}"#;

const LEXICON: &str = r#"["美国", {"surface": "美国", "metadata": {"id": 2}}]"#;

const SETTINGS: &str = r#"{
    "metrics": [{"name": "edit"}, {"name": "feature_edit", "weight": 0.5}],
    "weights": {"segmental": 0.9, "tone": 0.15, "stress": 0.1},
    "threshold": 0.3
}"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        std::fs::write(dir.path().join("dict.json"), DICTIONARY).unwrap();
        std::fs::write(dir.path().join("lexicon.json"), LEXICON).unwrap();
        std::fs::write(dir.path().join("settings.json"), SETTINGS).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        path_str(&self.dir.path().join(name))
    }

    fn parse(&self, command: &str, extra: &[&str]) -> Cli {
        let dictionary = self.path("dict.json");
        let settings = self.path("settings.json");
        let lexicon = self.path("lexicon.json");

        let mut argv = vec!["phon", command];
        argv.extend_from_slice(extra);
        argv.extend(["-d", dictionary.as_str(), "-c", settings.as_str()]);
        if command != "distance" {
            argv.extend(["-l", lexicon.as_str()]);
        }

        Cli::parse_from(argv)
    }
}

fn path_str(path: &Path) -> String {
    path.to_str().expect("temp path is not UTF-8").to_owned()
}

#[test]
fn correct_replaces_close_span() {
    let fixture = Fixture::new();
    let cli = fixture.parse("correct", &["I like mango"]);

    let Commands::Correct(args) = cli.command else {
        panic!("unexpected command");
    };
    let result = phonops::correct::correct(&args.try_into().unwrap()).unwrap();

    assert_eq!(result.text, "I like 美国");
    assert_eq!(result.substitutions.len(), 1);
    assert_eq!(result.substitutions[0].original, "mango");
    assert_eq!(result.substitutions[0].entry_index, 0);
}

#[test]
fn suggest_lists_duplicates_in_order() {
    let fixture = Fixture::new();
    let cli = fixture.parse("suggest", &["mango"]);

    let Commands::Suggest(args) = cli.command else {
        panic!("unexpected command");
    };
    let suggestions = phonops::correct::suggest(&args.try_into().unwrap()).unwrap();

    let indices: Vec<_> = suggestions.iter().map(|s| s.entry_index).collect();
    assert_eq!(indices, [0, 1]);
    assert_eq!(suggestions[0].breakdown, suggestions[1].breakdown);
}

#[test]
fn threshold_flag_overrides_settings() {
    let fixture = Fixture::new();
    let cli = fixture.parse("correct", &["mango", "-t", "0"]);

    let Commands::Correct(args) = cli.command else {
        panic!("unexpected command");
    };
    let result = phonops::correct::correct(&args.try_into().unwrap()).unwrap();

    assert_eq!(result.text, "mango");
    assert!(result.substitutions.is_empty());
}

#[test]
fn distance_reports_transcriptions() {
    let fixture = Fixture::new();
    let cli = fixture.parse("distance", &["mango", "美国"]);

    let Commands::Distance(args) = cli.command else {
        panic!("unexpected command");
    };
    let report = phonops::distance::measure(&args.try_into().unwrap()).unwrap();

    assert_eq!(report.a, "m ei ŋ k uo");
    assert_eq!(report.b, "m ei k uo");
    assert!(report.breakdown.total > 0.0);
    assert_eq!(report.breakdown.tone, 0.0);
}

#[test]
fn run_cli_executes_every_subcommand() {
    let fixture = Fixture::new();

    run_cli(fixture.parse("correct", &["mango", "--json"])).expect("correct failed");
    run_cli(fixture.parse("suggest", &["mango"])).expect("suggest failed");
    run_cli(fixture.parse("distance", &["mango", "美国", "--json"])).expect("distance failed");
}

#[test]
fn unknown_word_fails_the_pass() {
    let fixture = Fixture::new();

    let err = run_cli(fixture.parse("correct", &["zebra"])).unwrap_err();

    assert!(format!("{err:?}").contains("zebra"));
}

#[test]
fn missing_lexicon_is_reported() {
    let fixture = Fixture::new();
    let dictionary = fixture.path("dict.json");
    let missing = fixture.path("missing.json");

    let cli = Cli::parse_from([
        "phon",
        "correct",
        "mango",
        "-d",
        dictionary.as_str(),
        "-l",
        missing.as_str(),
    ]);
    let err = run_cli(cli).unwrap_err();

    assert!(err.to_string().contains("failed to load lexicon"));
}
