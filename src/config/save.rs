use crate::config::types::{SETTINGS_FILE_NAME, UserSettings};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save_settings(settings: &UserSettings) -> Result<()> {
    // Save to bench_settings.json in the current working directory
    save_settings_to(settings, Path::new(SETTINGS_FILE_NAME))
}

pub fn save_settings_to(settings: &UserSettings, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::Config;

    #[test]
    fn test_saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench_settings.json");

        let mut settings = UserSettings::default();
        settings.stream_url = "rtsp://cam.lan/stream".to_string();
        settings.live_check.reference_cpu_percent = 12.5;

        save_settings_to(&settings, &path).unwrap();
        let loaded = Config::load_settings(&path).unwrap();

        assert_eq!(loaded.stream_url, "rtsp://cam.lan/stream");
        assert!((loaded.live_check.reference_cpu_percent - 12.5).abs() < f64::EPSILON);
    }
}
