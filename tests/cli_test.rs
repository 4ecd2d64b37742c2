use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut c = Command::new(assert_cmd::cargo_bin!("farefinder"));
    c.env_remove("RUST_LOG");
    c
}

fn configured() -> Command {
    let mut c = cmd();
    c.env("SERPAPI_API_KEY", "test-key-not-used");
    c
}

#[test]
fn top_level_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Search flights by city or airport from the terminal",
        ))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("airport"))
        .stdout(predicate::str::contains("mcp"))
        .stdout(predicate::str::contains("SERPAPI_API_KEY"));
}

#[test]
fn top_level_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "farefinder ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn search_help_shows_options() {
    cmd()
        .args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-f, --from <CITY|IATA>"))
        .stdout(predicate::str::contains("-t, --to <CITY|IATA>"))
        .stdout(predicate::str::contains("-d, --date <YYYY-MM-DD>"))
        .stdout(predicate::str::contains("--return-date"))
        .stdout(predicate::str::contains("--class <CLASS>"))
        .stdout(predicate::str::contains("--adults <N>"))
        .stdout(predicate::str::contains("--currency <CODE>"))
        .stdout(predicate::str::contains("--top <N>"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("--timeout <SECS>"))
        .stdout(predicate::str::contains("One-way:"))
        .stdout(predicate::str::contains("Round-trip:"));
}

#[test]
fn search_requires_from_to_date() {
    cmd()
        .args(["search", "-f", "JFK"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--to"));
}

#[test]
fn airport_lookup_by_city() {
    cmd()
        .args(["airport", "New York"])
        .assert()
        .success()
        .stdout(predicate::str::contains("new york: JFK, LGA, EWR"));
}

#[test]
fn airport_lookup_by_code() {
    cmd()
        .args(["airport", "hnd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HND: HND"));
}

#[test]
fn airport_lookup_unknown_city() {
    cmd()
        .args(["airport", "Atlantis"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("could not find an airport"));
}

#[test]
fn missing_api_key_reports_setup_guidance() {
    cmd()
        .env("SERPAPI_API_KEY", "")
        .args(["search", "-f", "New York", "-t", "Tokyo", "-d", "2099-12-25"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("not configured"))
        .stderr(predicate::str::contains("serpapi.com"));
}

#[test]
fn placeholder_api_key_json_error() {
    let output = cmd()
        .env("SERPAPI_API_KEY", "your_serpapi_api_key_here")
        .args([
            "search", "-f", "JFK", "-t", "NRT", "-d", "2099-12-25", "--json",
        ])
        .assert()
        .code(7)
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["kind"], "not_configured");
    assert!(json["suggestions"].as_array().is_some_and(|s| !s.is_empty()));
}

#[test]
fn invalid_date_exits_with_parameter_error() {
    configured()
        .args(["search", "-f", "JFK", "-t", "NRT", "-d", "12/25/2099"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

#[test]
fn past_date_is_rejected() {
    configured()
        .args(["search", "-f", "JFK", "-t", "NRT", "-d", "2001-01-01"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("in the past"));
}

#[test]
fn return_before_departure_is_rejected() {
    configured()
        .args([
            "search",
            "-f",
            "JFK",
            "-t",
            "NRT",
            "-d",
            "2099-12-25",
            "--return-date",
            "2099-12-20",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("must be after departure date"));
}

#[test]
fn unknown_city_in_search_json() {
    let output = configured()
        .args([
            "search", "-f", "Atlantis", "-t", "NRT", "-d", "2099-12-25", "--json",
        ])
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["kind"], "unknown_airport");
    assert_eq!(json["error"], "Invalid search parameters");
}

#[test]
fn invalid_travel_class_is_rejected() {
    configured()
        .args([
            "search", "-f", "JFK", "-t", "NRT", "-d", "2099-12-25", "--class", "coach",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid travel class"));
}
