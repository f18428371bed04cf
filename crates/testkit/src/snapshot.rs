//! Golden-file JSON snapshots.
//!
//! Values are serialized as canonical pretty JSON (object keys sorted, trailing
//! newline) and compared byte-for-byte with the file on disk. Rerun with
//! `BUNKER_UPDATE_SNAPSHOTS=1` to rewrite the goldens.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Environment variable that switches snapshot assertions into update mode.
pub const UPDATE_SNAPSHOTS_ENV: &str = "BUNKER_UPDATE_SNAPSHOTS";

/// Assert that `value` matches the golden file at `path`, or rewrite the
/// golden when update mode is on.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if update_mode() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating golden directory {}", parent.display()))?;
        }
        return fs::write(path, &actual)
            .with_context(|| format!("writing golden {}", path.display()));
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "no golden at {} (set {}=1 to record it)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        )
    })?;

    if expected != actual {
        let line = first_difference(&expected, &actual);
        anyhow::bail!(
            "golden {} differs from line {} (set {}=1 to update)\n--- actual ---\n{}",
            path.display(),
            line,
            UPDATE_SNAPSHOTS_ENV,
            actual
        );
    }
    Ok(())
}

/// Serialize `value` the way goldens are stored.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("serializing snapshot value")?;
    let mut out = serde_json::to_string_pretty(&sorted(value)).context("formatting snapshot")?;
    out.push('\n');
    Ok(out)
}

fn update_mode() -> bool {
    std::env::var(UPDATE_SNAPSHOTS_ENV)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn first_difference(expected: &str, actual: &str) -> usize {
    expected
        .lines()
        .zip(actual.lines())
        .position(|(e, a)| e != a)
        .unwrap_or_else(|| expected.lines().count().min(actual.lines().count()))
        + 1
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(values) => Value::Array(values.into_iter().map(sorted).collect()),
        other => other,
    }
}
