use std::path::Path;
use std::process::{Command, Stdio};

fn run_demo() -> Vec<String> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let output = Command::new(env!("CARGO_BIN_EXE_bunker"))
        .arg("--config")
        .arg(root.join("config/bunker.toml"))
        .arg("--catalog")
        .arg(root.join("config/items.json"))
        .arg("--script")
        .arg(root.join("scripts/demo.json"))
        .stdin(Stdio::null())
        .output()
        .expect("spawn bunker");
    assert!(
        output.status.success(),
        "bunker exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout)
        .expect("utf-8 output")
        .lines()
        .map(str::to_string)
        .collect()
}

fn position(lines: &[String], needle: &str) -> usize {
    lines
        .iter()
        .position(|line| line == needle)
        .unwrap_or_else(|| panic!("missing line {needle:?} in:\n{}", lines.join("\n")))
}

#[test]
fn demo_script_repairs_systems() {
    let lines = run_demo();

    let air = position(
        &lines,
        "[ok] Repaired 25% Air Filtration system durability using Air Filter x1",
    );
    let power = position(
        &lines,
        "[ok] Repaired 40% Power Supply system durability using Battery x2",
    );
    assert!(air < power);
    position(&lines, "backpack[1] -> repair_tray[0]: partial, rest returned");
    position(&lines, "backpack[3] -> toolbox[0]: merged");

    position(&lines, "Air Filtration: 85% (Operational)");
    position(&lines, "Water Purification: 45% (Damaged)");
    position(&lines, "Power Supply: 60% (Damaged)");
    position(&lines, "  [0] Bolt x10");
    position(&lines, "  [1] Battery x1");
}

#[test]
fn demo_script_stops_at_quit() {
    let lines = run_demo();
    assert_eq!(lines.last().map(String::as_str), Some("Leaving the bunker"));
    assert!(!lines.iter().any(|line| line == "> /give scrap 1"));
}
