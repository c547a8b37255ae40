//! A stable identifier for this installation.
//!
//! The id lives under the `clientId` key of a small JSON state file.  Other
//! keys in that file belong to someone else and are left alone.

use std::fs;
use std::io;

use serde_json::{Map, Value};
use utf8path::Path;

use crate::{Error, Result};

/// Key under which the identifier is stored.
pub const CLIENT_ID_KEY: &str = "clientId";

/// Return the id stored at `path`, generating and persisting one if absent.
///
/// A missing file, or one without a non-empty string under `clientId`, gets
/// a fresh UUID v4.  Parent directories are created as needed.
pub fn get_or_create_client_id(path: &Path) -> Result<String> {
    let mut state = read_state(path)?;
    if let Some(Value::String(id)) = state.get(CLIENT_ID_KEY) {
        if !id.is_empty() {
            return Ok(id.clone());
        }
    }
    let id = uuid::Uuid::new_v4().to_string();
    state.insert(CLIENT_ID_KEY.to_string(), Value::String(id.clone()));
    write_state(path, &state)?;
    Ok(id)
}

fn read_state(path: &Path) -> Result<Map<String, Value>> {
    let text = match fs::read_to_string(path.as_str()) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(err) => {
            return Err(Error::io(format!("failed to read {}", path.as_str()), err));
        }
    };
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(&text)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::validation(
            format!("{} does not hold a JSON object", path.as_str()),
            Some(CLIENT_ID_KEY.to_string()),
        )),
    }
}

fn write_state(path: &Path, state: &Map<String, Value>) -> Result<()> {
    if let Some(dir) = std::path::Path::new(path.as_str()).parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|err| {
                Error::io(format!("failed to create {}", dir.display()), err)
            })?;
        }
    }
    let text = serde_json::to_string_pretty(state)?;
    fs::write(path.as_str(), text)
        .map_err(|err| Error::io(format!("failed to write {}", path.as_str()), err))
}
