//! config.local.js generation, mirroring the browser deployment flow: a
//! credential is read from the environment (or a local `.env`) and written
//! into a script the dashboard page loads before its own code. The reverse
//! direction, reading the key back out, lets the CLI reuse a file that was
//! generated for the page.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

pub const CONFIG_FILENAME: &str = "config.local.js";

const ENV_VAR: &str = "OPENWEATHER_API_KEY";
const ENV_VAR_ALT: &str = "OPEN_WEATHER_API_KEY";

const EXIT_NO_CREDENTIAL: u8 = 2;
const EXIT_WRITE_FAILED: u8 = 3;

pub fn run(out: Option<&Path>) -> ExitCode {
    let credential =
        credential_from_env().or_else(|| credential_from_dotenv(Path::new(".env")));
    let Some(key) = credential else {
        eprintln!("ERROR: {ENV_VAR} not found in environment or .env file.");
        eprintln!("Set {ENV_VAR} (or add it to .env) and re-run this command.");
        return ExitCode::from(EXIT_NO_CREDENTIAL);
    };

    let dest: PathBuf =
        out.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    match fs::write(&dest, render_config_js(&key)) {
        Ok(()) => {
            println!("Wrote {}", dest.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Failed to write {}: {err}", dest.display());
            ExitCode::from(EXIT_WRITE_FAILED)
        }
    }
}

fn credential_from_env() -> Option<String> {
    [ENV_VAR, ENV_VAR_ALT]
        .into_iter()
        .find_map(|name| std::env::var(name).ok().filter(|value| !value.is_empty()))
}

/// Minimal .env reader: one `KEY = value` per line, `#` comments, optional
/// surrounding quotes.
fn credential_from_dotenv(path: &Path) -> Option<String> {
    let data = fs::read_to_string(path).ok()?;
    for line in data.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some(rest) = trimmed.strip_prefix(ENV_VAR) else {
            continue;
        };
        let Some(value) = rest.trim_start().strip_prefix('=') else {
            continue;
        };
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

/// The single line the dashboard page loads before its own scripts.
fn render_config_js(key: &str) -> String {
    // serde_json produces the quoting/escaping the page expects
    let quoted = serde_json::to_string(key).unwrap_or_else(|_| "\"\"".to_string());
    format!("window.OPENWEATHER_API_KEY = {quoted};\n")
}

/// Read the key back out of an existing config.local.js, if present.
pub fn read_config_js(path: &Path) -> Option<String> {
    let data = fs::read_to_string(path).ok()?;
    for line in data.lines() {
        let Some(rest) = line.trim().strip_prefix("window.OPENWEATHER_API_KEY") else {
            continue;
        };
        let Some(quoted) = rest.trim_start().strip_prefix('=') else {
            continue;
        };
        let quoted = quoted.trim().trim_end_matches(';').trim_end();
        if let Ok(key) = serde_json::from_str::<String>(quoted) {
            if !key.is_empty() {
                return Some(key);
            }
        }
    }
    None
}
