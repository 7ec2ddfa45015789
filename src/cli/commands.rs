//! Command implementations for the CLI.
//!
//! Each command builds a [`Driver`], loads the requested modules from the reference framework catalog and
//! prints what the driver returns.

use std::collections::BTreeMap;

use testbridge_core::{Action, Value};
use testbridge_framework::catalog;

use super::{CliError, CliResult, ExitCode, LoadArgs};
use crate::driver::Driver;
use crate::errors::BridgeError;
use crate::session::Settings;

/// Parse a `key=value` setting. The value is read as JSON, falling back to a plain string.
pub fn parse_setting(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("setting `{raw}` has an empty key"));
    }
    let value = match serde_json::from_str::<serde_json::Value>(value) {
        Ok(json) => json_to_value(json),
        Err(_) => Value::from(value),
    };
    Ok((key.to_string(), value))
}

/// Convert a JSON value into a controller setting value.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).map_or(Value::Int64(i), Value::Int32)
            } else if let Some(u) = n.as_u64() {
                Value::UInt64(u)
            } else {
                Value::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::from(s),
        serde_json::Value::Array(items) => {
            // Arrays become maps keyed by position.
            let map: BTreeMap<String, Value> = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), json_to_value(item)))
                .collect();
            Value::from(map)
        }
        serde_json::Value::Object(fields) => {
            let map: BTreeMap<String, Value> = fields.into_iter().map(|(k, v)| (k, json_to_value(v))).collect();
            Value::from(map)
        }
    }
}

fn report(err: BridgeError) -> CliError {
    CliError::failure(format!("{:?}", miette::Report::new(err)))
}

/// Build a driver with every `--module` loaded against the chosen framework.
fn load_driver(args: &LoadArgs) -> CliResult<Driver> {
    let framework = catalog::framework(&args.framework)
        .ok_or_else(|| CliError::failure(format!("Error: unknown framework `{}`", args.framework)))?;
    let settings: Settings = args.settings.iter().cloned().collect();

    let mut driver = Driver::new();
    driver.set_id(args.id.clone());
    for name in &args.modules {
        let module = catalog::module(name).ok_or_else(|| {
            CliError::failure(format!(
                "Error: unknown module `{name}` (available: {})",
                catalog::MODULES.join(", ")
            ))
        })?;
        driver.load(&framework, module, &settings).map_err(report)?;
    }
    Ok(driver)
}

pub fn count(args: &LoadArgs, filter: &str) -> CliResult<ExitCode> {
    let driver = load_driver(args)?;
    let total = driver.count_test_cases(filter).map_err(report)?;
    println!("{total}");
    Ok(ExitCode::SUCCESS)
}

pub fn explore(args: &LoadArgs, filter: &str) -> CliResult<ExitCode> {
    let driver = load_driver(args)?;
    let document = driver.explore(filter).map_err(report)?;
    println!("{document}");
    Ok(ExitCode::SUCCESS)
}

pub fn run(args: &LoadArgs, filter: &str, progress: bool, background: bool) -> CliResult<ExitCode> {
    let driver = load_driver(args)?;
    let callback = progress.then(|| Action::progress(|notice| eprintln!("{notice}")));

    let document = if background {
        driver.run_async(callback, filter).and_then(|handle| handle.wait())
    } else {
        driver.run(callback.as_ref(), filter)
    }
    .map_err(report)?;

    println!("{document}");
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn settings_are_read_as_json() {
        let (key, value) = parse_setting("StopOnError=true").unwrap();
        assert_eq!(key, "StopOnError");
        assert_eq!(value.as_bool(), Some(true));

        assert!(matches!(parse_setting("Workers=4").unwrap().1, Value::Int32(4)));
        assert!(matches!(parse_setting("Seed=5000000000").unwrap().1, Value::Int64(5_000_000_000)));
        assert!(matches!(parse_setting("Ratio=0.5").unwrap().1, Value::Double(_)));
        assert!(parse_setting("Nothing=null").unwrap().1.is_null());
    }

    #[test]
    fn non_json_values_are_kept_as_strings() {
        let (_, value) = parse_setting("WorkDirectory=/tmp/work").unwrap();
        assert_eq!(value.as_str(), Some("/tmp/work"));
    }

    #[test]
    fn nested_objects_become_maps() {
        let (_, value) = parse_setting(r#"Params={"a":1,"b":"x"}"#).unwrap();
        let map = value.as_map().unwrap();
        assert!(matches!(map.get("a"), Some(Value::Int32(1))));
        assert_eq!(map.get("b").and_then(Value::as_str), Some("x"));
    }

    #[test]
    fn malformed_settings_are_rejected() {
        assert!(parse_setting("no-equals-sign").is_err());
        assert!(parse_setting("=1").is_err());
    }
}
