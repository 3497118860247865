use pretty_assertions::assert_eq;
use reconcile_trace::commands::{execute_replay, run_script, validate_args, ReplayArgs};
use reconcile_trace::flamegraph::FlamegraphConfig;
use reconcile_trace::output::read_profile;
use reconcile_trace::parser::parse_script;
use reconcile_trace::timing::ProfilerConfig;
use std::path::PathBuf;
use tempfile::TempDir;

fn demo_script() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/interrupted_render.json")
}

#[test]
fn test_replay_writes_profile_and_flamegraph() {
    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("out/profile.json");
    let svg_path = dir.path().join("out/flamegraph.svg");

    let args = ReplayArgs {
        script: demo_script(),
        output_json: json_path.clone(),
        output_svg: Some(svg_path.clone()),
        flamegraph_config: Some(FlamegraphConfig::new().with_title("Demo")),
        ..Default::default()
    };
    validate_args(&args).unwrap();
    execute_replay(args).unwrap();

    let profile = read_profile(&json_path).unwrap();
    assert_eq!(profile.version, "1.0.0");
    assert_eq!(profile.measurement_count, 17);
    assert_eq!(profile.measurements.len(), 17);
    assert_eq!(profile.warning_count, 2);
    assert_eq!(profile.total_duration_us, 323);
    assert_eq!(profile.captured_stacks.len(), 1);
    assert_eq!(
        profile.captured_stacks[0].trace,
        "\n    in Feed (created by App)\n    in App (at App.js:12)"
    );
    assert!(!profile.hot_labels.is_empty());
    assert!(profile
        .hot_labels
        .windows(2)
        .all(|pair| pair[0].total_us >= pair[1].total_us));

    let svg = std::fs::read_to_string(&svg_path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Demo"));
}

#[test]
fn test_replay_with_user_timing_disabled_records_nothing() {
    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("profile.json");

    let args = ReplayArgs {
        script: demo_script(),
        output_json: json_path.clone(),
        profiler: ProfilerConfig::default().with_user_timing(false),
        ..Default::default()
    };
    execute_replay(args).unwrap();

    let profile = read_profile(&json_path).unwrap();
    assert_eq!(profile.measurement_count, 0);
    assert_eq!(profile.total_duration_us, 0);
    // Stack capture is independent of the timing switch.
    assert_eq!(profile.captured_stacks.len(), 1);
}

#[test]
fn test_replay_missing_script_fails() {
    let dir = TempDir::new().unwrap();
    let args = ReplayArgs {
        script: dir.path().join("missing.json"),
        output_json: dir.path().join("profile.json"),
        ..Default::default()
    };
    assert!(execute_replay(args).is_err());
    assert!(!dir.path().join("profile.json").exists());
}

#[test]
fn test_replay_rejects_out_of_range_node() {
    let dir = TempDir::new().unwrap();
    let script_path = dir.path().join("bad.json");
    std::fs::write(
        &script_path,
        r#"{ "nodes": [ { "kind": "HostRoot" } ], "events": [ { "op": "start_node_work", "node": 5 } ] }"#,
    )
    .unwrap();

    let args = ReplayArgs {
        script: script_path,
        output_json: dir.path().join("profile.json"),
        ..Default::default()
    };
    assert!(execute_replay(args).is_err());
}

#[test]
fn test_flamegraph_without_measurements_fails() {
    let dir = TempDir::new().unwrap();
    let args = ReplayArgs {
        script: demo_script(),
        output_json: dir.path().join("profile.json"),
        output_svg: Some(dir.path().join("flamegraph.svg")),
        profiler: ProfilerConfig::default().with_user_timing(false),
        ..Default::default()
    };
    assert!(execute_replay(args).is_err());
}

#[test]
fn test_hidden_host_nodes_drop_host_measurements() {
    let raw = std::fs::read_to_string(demo_script()).unwrap();
    let script = parse_script(&raw).unwrap();

    let shown = run_script(&script, &ProfilerConfig::default(), true);
    let hidden = run_script(
        &script,
        &ProfilerConfig::default().with_hidden_host_nodes(true),
        true,
    );

    assert!(shown.measurements.iter().any(|m| m.name() == "nav [mount]"));
    assert!(!hidden.measurements.iter().any(|m| m.name() == "nav [mount]"));
    assert_eq!(hidden.measurements.len(), shown.measurements.len() - 1);
}
