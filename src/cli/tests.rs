use super::*;

fn parse_args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv)
        .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
}

#[test]
fn no_subcommand_means_chat() {
    let args = parse_args(&["parley"]);
    assert!(args.command.is_none());
    assert!(!args.no_smart_backtick);
}

#[test]
fn global_flags_work_after_subcommand() {
    let args = parse_args(&["parley", "config", "--server", "https://chat.test"]);
    assert_eq!(args.command, Some(Commands::Config));
    assert_eq!(args.server.as_deref(), Some("https://chat.test"));
}

#[test]
fn flags_override_file_values() {
    let args = parse_args(&[
        "parley",
        "--server",
        "https://chat.test",
        "--channel",
        "c42",
        "--no-smart-backtick",
    ]);
    let mut config = Config {
        server_url: Some("https://old.test".into()),
        ..Config::default()
    };
    apply_overrides(&mut config, &args);

    assert_eq!(config.server_url.as_deref(), Some("https://chat.test"));
    assert_eq!(config.channel_id.as_deref(), Some("c42"));
    assert!(!config.smart_backtick);
}

#[test]
fn missing_server_is_reported_before_token() {
    let config = Config::default();
    assert_eq!(connection(&config), Err(StartupError::MissingServer));

    let config = Config {
        server_url: Some("   ".into()),
        ..Config::default()
    };
    assert_eq!(connection(&config), Err(StartupError::MissingServer));
}

#[test]
fn load_config_reads_explicit_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("parley.toml");
    std::fs::write(&path, "channel_id = \"from-file\"\ntask_workers = 3\n").expect("write");

    let args = parse_args(&["parley", "--config", path.to_str().expect("utf-8 path")]);
    let config = load_config(&args).expect("load");
    assert_eq!(config.channel_id.as_deref(), Some("from-file"));
    assert_eq!(config.task_workers, 3);
}

#[test]
fn version_flag_reports_package_and_git_describe() {
    assert!(VERSION.starts_with(env!("CARGO_PKG_VERSION")));
    assert!(VERSION.ends_with(&format!("({})", env!("VERGEN_GIT_DESCRIBE"))));

    let err = Args::try_parse_from(["parley", "--version"]).expect_err("version exits early");
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    assert!(err.to_string().contains(VERSION));
}
