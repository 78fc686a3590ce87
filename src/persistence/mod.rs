use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    de::DeserializeOwned,
    Serialize,
};

use crate::core::DashboardError;

const APP_NAME: &str = "f1-dashboard";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn get_data_file_path(filename: &str) -> PathBuf {
    get_app_data_dir().join(filename)
}

pub fn save_json<T: Serialize>(data: &T, path: &Path) -> Result<(), DashboardError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    tracing::debug!(path = %path.display(), "data saved");
    Ok(())
}

/// Reads a JSON document. A missing file is `Ok(None)`; unreadable or
/// malformed content is an error.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DashboardError> {
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(path)?;
    let data: T = serde_json::from_str(&json)?;
    tracing::debug!(path = %path.display(), "data loaded");
    Ok(Some(data))
}

pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json::<T>(path) {
        Ok(Some(data)) => data,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to load, using defaults");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn save_then_load_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sample.json");
        let sample = Sample { name: "monza".into(), count: 3 };

        save_json(&sample, &path).unwrap();
        let loaded: Option<Sample> = load_json(&path).unwrap();
        assert_eq!(loaded, Some(sample));
    }

    #[test]
    fn missing_and_corrupt_files_fall_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(load_json::<Sample>(&missing).unwrap(), None);

        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{ not json").unwrap();
        assert!(load_json::<Sample>(&corrupt).is_err());
        assert_eq!(load_json_or_default::<Sample>(&corrupt), Sample::default());
    }
}
