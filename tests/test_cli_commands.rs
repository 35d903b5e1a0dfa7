mod common;

use common::{VagueProcess, read_jsonl};

// ============================================================================
// patterns / triangle
// ============================================================================

#[test]
fn patterns_json_lists_catalog() {
    let env = VagueProcess::new();
    let stdout = env.run_ok(&["patterns", "--format", "json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let rows = parsed.as_array().expect("array of presets");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["level"], "newbie");
    assert_eq!(rows[2]["hold"], 7.0);
}

#[test]
fn triangle_svg_has_edge_overlays() {
    let env = VagueProcess::new();
    let stdout = env.run_ok(&["triangle", "--pattern", "3-4-4", "--format", "svg"]);
    assert!(stdout.starts_with("<svg"), "{stdout}");
    assert!(stdout.contains(r#"d="M 200 230 L 80 30 L 320 30 Z""#));
}

#[test]
fn unknown_level_is_rejected_with_suggestion() {
    let env = VagueProcess::new();
    let output = env.run(&["triangle", "--level", "newbe"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("did you mean 'newbie'"), "{stderr}");
}

#[test]
fn invalid_config_exits_with_config_error() {
    let env = VagueProcess::new();
    let config = env.home().join("bad.yaml");
    std::fs::write(&config, "milestones:\n  tolerance: 2\n").unwrap();
    let output = env.run(&["triangle", "--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("milestones.tolerance"), "{stderr}");
}

// ============================================================================
// prefs
// ============================================================================

#[test]
fn prefs_set_then_show() {
    let env = VagueProcess::new();
    env.run_ok(&["prefs", "set", "--level", "medium", "--language", "fr"]);
    assert!(env.default_prefs_path().exists());

    let stdout = env.run_ok(&["prefs", "show", "--format", "json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["language"], "fr");
    assert_eq!(parsed["mode"], "medium");
    assert_eq!(parsed["effective_pattern"], "3-5-6");
}

#[test]
fn prefs_file_uses_storage_key() {
    let env = VagueProcess::new();
    let path = env.home().join("custom.json");
    env.run_ok(&[
        "prefs",
        "--prefs",
        path.to_str().unwrap(),
        "set",
        "--pattern",
        "5-5-5",
    ]);
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let inner = stored["breathing-app-prefs"].as_str().expect("string value");
    let prefs: serde_json::Value = serde_json::from_str(inner).unwrap();
    assert_eq!(prefs["pattern"], "5-5-5");
    assert_eq!(prefs["mode"], "expert");
}

#[test]
fn corrupt_prefs_fall_back_to_defaults() {
    let env = VagueProcess::new();
    let path = env.default_prefs_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"breathing-app-prefs": "{oops"}"#).unwrap();

    let stdout = env.run_ok(&["prefs", "show", "--format", "json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["mode"], "expert");
    assert_eq!(parsed["language"], "en");
}

// ============================================================================
// run
// ============================================================================

#[test]
fn run_stops_after_cycle_limit_and_streams_events() {
    let env = VagueProcess::new();
    let events = env.home().join("events.jsonl");
    env.run_ok(&[
        "run",
        "--quiet",
        "--pattern",
        "0.2-0.2-0.2",
        "--cycles",
        "2",
        "--no-countdown",
        "--events",
        events.to_str().unwrap(),
    ]);

    let lines = read_jsonl(&events);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line["sequence"], i, "sequence must be gapless");
        assert!(line["timestamp"].is_string());
    }

    assert_eq!(lines[0]["type"], "SessionStarted");
    assert_eq!(lines[0]["pattern"]["inhale"], 0.2);

    let completed: Vec<u64> = lines
        .iter()
        .filter(|l| l["type"] == "CycleCompleted")
        .filter_map(|l| l["count"].as_u64())
        .collect();
    assert_eq!(completed, [1, 2]);

    let last = lines.last().unwrap();
    assert_eq!(last["type"], "SessionStopped");
    assert_eq!(last["reason"], "completed");
    assert_eq!(last["cycles_completed"], 2);
}

#[test]
fn run_with_level_updates_preferences() {
    let env = VagueProcess::new();
    env.run_ok(&[
        "run",
        "--quiet",
        "--level",
        "newbie",
        "--duration",
        "100ms",
        "--no-countdown",
    ]);
    let stdout = env.run_ok(&["prefs", "show", "--format", "json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["mode"], "newbie");
}
