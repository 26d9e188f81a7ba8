use clap::CommandFactory;
use realtime::event::TableUpdate;
use serde_json::json;

use super::*;

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parse_target_accepts_both_kinds() {
    assert_eq!(parse_target("table:3"), Ok(EntityRef::table(3)));
    assert_eq!(parse_target("object:12"), Ok(EntityRef::decoration(12)));
}

#[test]
fn parse_target_rejects_bad_input() {
    assert!(parse_target("3").is_err());
    assert!(parse_target("table:x").is_err());
    assert!(parse_target("zone:1").is_err());
}

#[test]
fn parse_tag_uses_wire_names() {
    assert_eq!(parse_tag::<TableShape>("hut"), Ok(TableShape::Hut));
    assert_eq!(parse_tag::<MapObjectKind>("water_station"), Ok(MapObjectKind::WaterStation));
    assert!(parse_tag::<TableShape>("triangle").is_err());
}

#[test]
fn layout_move_parses_negative_offsets() {
    let cli = Cli::try_parse_from(["pos-cli", "layout", "move", "object:4", "--dx", "-20", "--dy", "15.5"]).unwrap();
    let Command::Layout(LayoutCommand { command: LayoutSubcommand::Move { target, dx, dy } }) = cli.command else {
        panic!("expected layout move");
    };
    assert_eq!(target, EntityRef::decoration(4));
    assert!((dx + 20.0).abs() < f64::EPSILON);
    assert!((dy - 15.5).abs() < f64::EPSILON);
}

fn env(pairs: &[(&str, &str)]) -> ClientConfig {
    let pairs: Vec<(String, String)> = pairs.iter().map(|&(k, v)| (k.to_owned(), v.to_owned())).collect();
    ClientConfig::from_lookup(|key| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())).unwrap()
}

#[test]
fn flags_override_environment_config() {
    let cli = Cli::try_parse_from([
        "pos-cli",
        "--base-url",
        "https://pos.example.test/",
        "--admin-secret",
        "s3cret",
        "--request-timeout-secs",
        "5",
        "promptpay",
    ])
    .unwrap();
    let config = cli.override_config(env(&[("POS_BASE_URL", "http://env.example.test"), ("POS_CONNECT_TIMEOUT_SECS", "3")]));
    assert_eq!(config.base_url, "https://pos.example.test");
    assert_eq!(config.admin_secret.as_deref(), Some("s3cret"));
    assert_eq!(config.timeouts.request_secs, 5);
    assert_eq!(config.timeouts.connect_secs, 3);
    assert_eq!(config.socket_origin(), "https://pos.example.test");
}

#[test]
fn environment_config_stands_without_flags() {
    let cli = Cli::try_parse_from(["pos-cli", "promptpay"]).unwrap();
    let from_env = env(&[
        ("POS_BASE_URL", "http://env.example.test"),
        ("POS_ADMIN_SECRET", "env-secret"),
        ("POS_SOCKET_URL", "http://rt.example.test"),
    ]);
    assert_eq!(cli.override_config(from_env.clone()), from_env);
}

#[test]
fn deletes_parse_yes_flag() {
    let cli = Cli::try_parse_from(["pos-cli", "table", "delete", "4"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Table(TableCommand { command: TableSubcommand::Delete { table_id: 4, yes: false } })
    ));
    let cli = Cli::try_parse_from(["pos-cli", "layout", "delete", "object:9", "--yes"]).unwrap();
    let Command::Layout(LayoutCommand { command: LayoutSubcommand::Delete { target, yes } }) = cli.command else {
        panic!("expected layout delete");
    };
    assert_eq!(target, EntityRef::decoration(9));
    assert!(yes);
}

#[test]
fn delete_without_yes_is_refused() {
    assert!(matches!(confirm(false, EntityRef::table(4)), Err(CliError::ConfirmationRequired(what)) if what == "table:4"));
    assert!(confirm(true, "zone 2").is_ok());
}

#[test]
fn event_json_unwraps_first_argument() {
    let event = ServerEvent::TableUpdate(TableUpdate { id: Some(7), status: Some("occupied".to_owned()) });
    assert_eq!(event_json(&event), json!({ "event": "table-update", "data": { "id": 7, "status": "occupied" } }));
    assert_eq!(event_json(&ServerEvent::OrderUpdate), json!({ "event": "order-update", "data": null }));
}
