use nlpb_core::DatasetConfig;

use super::analysis::{clean_labels, resolve_top_k, run_inspect, MAX_TOP_K};
use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["nlpb-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
    assert!(cli.dataset.is_none());
}

#[test]
fn parses_inspect_with_default_sample() {
    let cli = Cli::try_parse_from(["nlpb-cli", "inspect"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Inspect { sample: 5 })));
}

#[test]
fn parses_index_command() {
    let cli = Cli::try_parse_from(["nlpb-cli", "index"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Index)));
}

#[test]
fn parses_search_with_top_k() {
    let cli = Cli::try_parse_from(["nlpb-cli", "search", "entrega atrasada", "--top-k", "3"])
        .expect("expected valid cli args");
    match cli.command {
        Some(Commands::Search { prompt, top_k }) => {
            assert_eq!(prompt, "entrega atrasada");
            assert_eq!(top_k, Some(3));
        }
        other => panic!("expected search, got {other:?}"),
    }
}

#[test]
fn search_requires_a_prompt() {
    assert!(Cli::try_parse_from(["nlpb-cli", "search"]).is_err());
}

#[test]
fn classify_splits_comma_separated_labels() {
    let cli = Cli::try_parse_from([
        "nlpb-cli",
        "classify",
        "quero cancelar",
        "--labels",
        "cancelamento,duvida",
    ])
    .expect("expected valid cli args");
    match cli.command {
        Some(Commands::Classify { labels, .. }) => {
            assert_eq!(
                labels,
                Some(vec!["cancelamento".to_string(), "duvida".to_string()])
            );
        }
        other => panic!("expected classify, got {other:?}"),
    }
}

#[test]
fn classify_without_labels_uses_corpus_categories() {
    let cli = Cli::try_parse_from(["nlpb-cli", "classify", "oi"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Classify { labels: None, .. })
    ));
}

#[test]
fn dataset_flag_is_global() {
    let cli = Cli::try_parse_from(["nlpb-cli", "sentiment", "adorei", "--dataset", "data/x.csv"])
        .expect("expected valid cli args");
    assert_eq!(cli.dataset, Some(PathBuf::from("data/x.csv")));
    assert!(matches!(cli.command, Some(Commands::Sentiment { .. })));
}

#[test]
fn parses_analyze_without_top_k() {
    let cli =
        Cli::try_parse_from(["nlpb-cli", "analyze", "ola"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Analyze { top_k: None, .. })
    ));
}

#[test]
fn top_k_falls_back_to_default_and_is_bounded() {
    assert_eq!(resolve_top_k(None, 5).expect("default"), 5);
    assert_eq!(resolve_top_k(Some(MAX_TOP_K), 5).expect("max"), MAX_TOP_K);
    assert!(resolve_top_k(Some(0), 5).is_err());
    assert!(resolve_top_k(None, MAX_TOP_K + 1).is_err());
}

#[test]
fn clean_labels_trims_and_drops_blanks() {
    assert_eq!(
        clean_labels(Some(vec![" a ".to_string(), String::new(), "b".to_string()])),
        Some(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(clean_labels(Some(vec!["  ".to_string()])), None);
    assert_eq!(clean_labels(None), None);
}

#[test]
fn inspect_runs_from_dataset_settings_alone() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("dataset.csv");
    std::fs::write(&path, "texto,categoria\nbom dia,saudacao\n007,codigo\n").expect("write csv");

    let config = DatasetConfig {
        log_level: "info".to_string(),
        dataset_path: path,
        max_rows: 10,
    };
    run_inspect(&config, 1).expect("inspect without model settings");
}

#[test]
fn inspect_reports_a_missing_dataset() {
    let config = DatasetConfig {
        log_level: "info".to_string(),
        dataset_path: PathBuf::from("/definitely/not/here.csv"),
        max_rows: 10,
    };
    assert!(run_inspect(&config, 1).is_err());
}
