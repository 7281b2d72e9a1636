use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

fn fetch_args(args: &[&str]) -> FetchArgs {
    match parse(args).command {
        Some(CliCommand::Fetch(a)) => a,
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_no_subcommand_is_default_fetch() {
    let cli = parse(&["regfetch"]);
    assert!(cli.command.is_none());
    assert!(cli.config.is_none());
}

#[test]
fn cli_parse_fetch_defaults() {
    let a = fetch_args(&["regfetch", "fetch"]);
    assert!(a.artifact.is_none());
    assert!(a.alias.is_none());
    assert!(a.file.is_none());
    assert!(a.output_dir.is_none());
    assert!(!a.metadata);
}

#[test]
fn cli_parse_fetch_overrides() {
    let a = fetch_args(&[
        "regfetch",
        "fetch",
        "--alias",
        "staging",
        "--file",
        "model.pt",
        "--output-dir",
        "/tmp/out",
        "--metadata",
    ]);
    assert_eq!(a.alias.as_deref(), Some("staging"));
    assert_eq!(a.file.as_deref(), Some("model.pt"));
    assert_eq!(a.output_dir, Some(PathBuf::from("/tmp/out")));
    assert!(a.metadata);
}

#[test]
fn cli_parse_fetch_artifact_reference() {
    let a = fetch_args(&["regfetch", "fetch", "--artifact", "team/reg/coll:v2"]);
    assert_eq!(a.artifact, Some(ArtifactRef::new("team", "reg", "coll", "v2")));
}

#[test]
fn cli_parse_fetch_rejects_bad_reference() {
    assert!(Cli::try_parse_from(["regfetch", "fetch", "--artifact", "no-alias"]).is_err());
}

#[test]
fn cli_parse_global_config_after_subcommand() {
    let cli = parse(&["regfetch", "fetch", "--config", "/etc/regfetch.toml"]);
    assert_eq!(cli.config, Some(PathBuf::from("/etc/regfetch.toml")));
}

#[test]
fn cli_parse_info() {
    match parse(&["regfetch", "info", "--alias", "v7"]).command {
        Some(CliCommand::Info { alias }) => assert_eq!(alias.as_deref(), Some("v7")),
        _ => panic!("expected Info"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["regfetch", "checksum", "/path/to/model.onnx"]).command {
        Some(CliCommand::Checksum { path }) => assert_eq!(path, "/path/to/model.onnx"),
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["regfetch", "completions", "bash"]).command {
        Some(CliCommand::Completions { shell }) => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn fetch_args_apply_layers_over_config() {
    let mut cfg = FetchConfig::default();
    let args = FetchArgs {
        artifact: Some(ArtifactRef::new("team", "reg", "coll", "latest")),
        alias: Some("staging".to_string()),
        file: Some("weights.onnx".to_string()),
        output_dir: Some(PathBuf::from("/tmp/models")),
        metadata: true,
    };
    args.apply(&mut cfg);
    assert_eq!(cfg.reference().to_string(), "team/reg/coll:staging");
    assert_eq!(cfg.filename, "weights.onnx");
    assert_eq!(cfg.resolved_output_dir(), PathBuf::from("/tmp/models"));
    assert!(cfg.write_metadata);
}

#[test]
fn fetch_args_default_leaves_config_untouched() {
    let mut cfg = FetchConfig::default();
    FetchArgs::default().apply(&mut cfg);
    assert_eq!(
        cfg.reference().to_string(),
        "daniele5/model-registry/thumbnail-classifier:production"
    );
    assert!(cfg.output_dir.is_none());
}

#[test]
fn load_config_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "collection = \"other\"\n").unwrap();
    let cfg = load_config(Some(&path)).unwrap();
    assert_eq!(cfg.collection, "other");
}

#[test]
fn load_config_missing_explicit_path_is_error() {
    let err = load_config(Some(Path::new("/nonexistent/regfetch/config.toml"))).unwrap_err();
    assert!(err.to_string().contains("not found"));
}
