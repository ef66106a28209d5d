// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::PathBuf;

const APP_DIR: &str = "pagewright";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = resolve_base(
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
    .join(APP_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// XDG data dir, then `~/.local/share`, then the system temp dir.
fn resolve_base(xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    if let Some(xdg) = xdg_data_home.filter(|p| !p.as_os_str().is_empty()) {
        return xdg;
    }
    if let Some(home) = home {
        return home.join(".local").join("share");
    }
    std::env::temp_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins_over_home() {
        let base = resolve_base(Some("/xdg".into()), Some("/home/u".into()));
        assert_eq!(base, PathBuf::from("/xdg"));
    }

    #[test]
    fn empty_xdg_falls_back_to_home() {
        let base = resolve_base(Some(PathBuf::new()), Some("/home/u".into()));
        assert_eq!(base, PathBuf::from("/home/u/.local/share"));
    }
}
