use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("無法建立資料夾: {}", path.display()))?;
    }
    Ok(())
}

/// 刪除上一次測試留下的輸出檔；回傳是否有刪除
pub fn remove_stale_file(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)
        .with_context(|| format!("無法刪除舊的輸出檔案: {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_directory_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_directory_exists(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_directory_exists(&nested).unwrap();
    }

    #[test]
    fn test_ensure_directory_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(ensure_directory_exists(&file).is_err());
    }

    #[test]
    fn test_remove_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("old.mp4");
        assert!(!remove_stale_file(&file).unwrap());

        fs::write(&file, "old").unwrap();
        assert!(remove_stale_file(&file).unwrap());
        assert!(!file.exists());
    }
}
