// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Load and persist `config.json` in the data directory.

use std::path::Path;

use pagewright_core::AppConfig;
use pagewright_core::error::Result;
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.json";

/// Read the stored configuration. A missing file gives the defaults; an
/// unreadable one is logged and also gives the defaults. Viewer limits the
/// session cannot work with are normalized.
pub fn load_config(data_dir: &Path) -> AppConfig {
    let path = data_dir.join(CONFIG_FILE);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no stored config, using defaults");
            return AppConfig::default();
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "config unreadable, using defaults");
            return AppConfig::default();
        }
    };
    match serde_json::from_str(&data) {
        Ok(config) => AppConfig::normalized(config),
        Err(err) => {
            warn!(path = %path.display(), %err, "config invalid, using defaults");
            AppConfig::default()
        }
    }
}

/// Write the configuration as pretty JSON.
pub fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    debug!(path = %path.display(), "config persisted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewright_core::PaperSize;

    #[test]
    fn missing_config_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(dir.path()), AppConfig::default());
    }

    #[test]
    fn persisted_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.paper_size = PaperSize::Letter;
        config.viewer.max_scale = 2.0;

        persist_config(dir.path(), &config).unwrap();
        assert_eq!(load_config(dir.path()), config);
    }

    #[test]
    fn garbage_config_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert_eq!(load_config(dir.path()), AppConfig::default());
    }

    #[test]
    fn inverted_viewer_limits_are_repaired_on_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "viewer": { "min_scale": 4.0, "zoom_step": 0.004 } }"#,
        )
        .unwrap();

        let viewer = load_config(dir.path()).viewer;
        assert!(viewer.min_scale <= viewer.max_scale);
        assert_eq!(viewer.zoom_step, 0.01);
    }
}
