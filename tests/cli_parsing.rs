//! Argument-parsing coverage for the six `runnerd` subcommands
//! (spec.md §6). Exercises `Cli::try_parse_from` directly — no process
//! spawn, no I/O.

use clap::Parser;
use runnerd::cli::{Cli, Commands};

#[test]
fn auth_parses_with_optional_private_key_and_config() {
    let cli = Cli::parse_from(["runnerd", "auth"]);
    assert!(matches!(
        cli.command,
        Commands::Auth { private_key: None, config: None }
    ));

    let cli = Cli::parse_from([
        "runnerd",
        "auth",
        "--private-key",
        "0xdeadbeef",
        "--config",
        "runnerd.yaml",
    ]);
    match cli.command {
        Commands::Auth { private_key, config } => {
            assert_eq!(private_key.as_deref(), Some("0xdeadbeef"));
            assert_eq!(config.unwrap().to_str().unwrap(), "runnerd.yaml");
        }
        _ => panic!("expected Auth"),
    }
}

#[test]
fn stake_requires_a_positional_amount() {
    let cli = Cli::parse_from(["runnerd", "stake", "12.5"]);
    match cli.command {
        Commands::Stake { amount, .. } => assert_eq!(amount, 12.5),
        _ => panic!("expected Stake"),
    }

    assert!(Cli::try_parse_from(["runnerd", "stake"]).is_err());
}

#[test]
fn balance_server_runner_take_only_an_optional_config() {
    assert!(matches!(
        Cli::parse_from(["runnerd", "balance"]).command,
        Commands::Balance { config: None }
    ));
    assert!(matches!(
        Cli::parse_from(["runnerd", "server"]).command,
        Commands::Server { config: None }
    ));
    assert!(matches!(
        Cli::parse_from(["runnerd", "runner"]).command,
        Commands::Runner { config: None }
    ));
}

#[test]
fn migrate_down_flag_defaults_false() {
    let cli = Cli::parse_from(["runnerd", "migrate"]);
    assert!(matches!(cli.command, Commands::Migrate { down: false, .. }));

    let cli = Cli::parse_from(["runnerd", "migrate", "--down"]);
    assert!(matches!(cli.command, Commands::Migrate { down: true, .. }));
}

#[test]
fn json_flag_is_global_and_defaults_false() {
    let cli = Cli::parse_from(["runnerd", "--json", "balance"]);
    assert!(cli.json);

    let cli = Cli::parse_from(["runnerd", "balance"]);
    assert!(!cli.json);
}

#[test]
fn missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["runnerd"]).is_err());
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["runnerd", "not-a-command"]).is_err());
}
