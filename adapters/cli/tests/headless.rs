use std::process::Command;

#[test]
fn headless_run_prints_a_summary() {
    let output = Command::new(env!("CARGO_BIN_EXE_etd"))
        .args(["headless", "--ticks", "40", "--seed", "3", "--log-level", "warn"])
        .output()
        .expect("failed to launch etd");

    assert!(output.status.success(), "etd headless should succeed");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 summary");
    assert!(stdout.starts_with("tick 40: level 1, gold 30000"), "{stdout}");
}

#[test]
fn malformed_config_is_rejected() {
    let dir = std::env::temp_dir().join(format!("etd-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("bad.toml");
    std::fs::write(&path, "tower_damage = [9, 5, 2]\n").expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_etd"))
        .args(["headless", "--ticks", "1", "--config"])
        .arg(&path)
        .output()
        .expect("failed to launch etd");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"), "{stderr}");
}
