use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

/// 小於此大小的輸出檔視為無效
pub const MIN_VALID_ARTIFACT_BYTES: u64 = 1024;

/// 輸出檔的容器層級資訊
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatSummary {
    pub duration_seconds: f64,
    pub bit_rate: u64,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
    bit_rate: Option<String>,
}

/// 取得輸出檔大小，不存在或過小時回傳錯誤
pub fn artifact_size(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("輸出檔案不存在: {}", path.display()))?;

    if !metadata.is_file() {
        bail!("輸出路徑不是檔案: {}", path.display());
    }
    if metadata.len() < MIN_VALID_ARTIFACT_BYTES {
        bail!(
            "輸出檔案過小 ({} bytes): {}",
            metadata.len(),
            path.display()
        );
    }

    Ok(metadata.len())
}

/// 使用 ffprobe 取得輸出檔的長度與位元率
pub fn probe_format(ffprobe: &str, path: &Path) -> Result<FormatSummary> {
    let output = Command::new(ffprobe)
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe 執行失敗 ({}): {stderr}", output.status);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_format_summary(&stdout)
}

pub fn parse_format_summary(json: &str) -> Result<FormatSummary> {
    let probe: FfprobeOutput =
        serde_json::from_str(json).with_context(|| "無法解析 ffprobe 輸出")?;

    let format = probe
        .format
        .ok_or_else(|| anyhow!("ffprobe 輸出缺少 format 區段"))?;

    let duration_seconds = format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .ok_or_else(|| anyhow!("無法取得影片長度"))?;

    // bit_rate 通常是整數字串，部分容器會輸出小數
    let bit_rate = format
        .bit_rate
        .as_deref()
        .and_then(|b| {
            let b = b.trim();
            b.parse::<u64>()
                .ok()
                .or_else(|| b.parse::<f64>().ok().map(|v| v.round() as u64))
        })
        .ok_or_else(|| anyhow!("無法取得位元率"))?;

    Ok(FormatSummary {
        duration_seconds,
        bit_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_parse_format_summary() {
        let json = r#"{
            "format": {
                "filename": "/tmp/encoding_test/test1_h264_vaapi.mp4",
                "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
                "duration": "180.032000",
                "size": "47185920",
                "bit_rate": "2096741"
            }
        }"#;
        let summary = parse_format_summary(json).unwrap();
        assert!((summary.duration_seconds - 180.032).abs() < 1e-9);
        assert_eq!(summary.bit_rate, 2_096_741);
    }

    #[test]
    fn test_parse_format_summary_missing_bit_rate() {
        let json = r#"{ "format": { "duration": "12.5" } }"#;
        assert!(parse_format_summary(json).is_err());
    }

    #[test]
    fn test_parse_format_summary_invalid_json() {
        assert!(parse_format_summary("not json").is_err());
        assert!(parse_format_summary("{}").is_err());
    }

    #[test]
    fn test_artifact_size_rules() {
        let dir = tempfile::tempdir().unwrap();

        assert!(artifact_size(&dir.path().join("missing.mp4")).is_err());

        let tiny = dir.path().join("tiny.mp4");
        fs::write(&tiny, b"short").unwrap();
        assert!(artifact_size(&tiny).is_err());

        let full = dir.path().join("full.mp4");
        File::create(&full).unwrap().set_len(104_857_600).unwrap();
        assert_eq!(artifact_size(&full).unwrap(), 104_857_600);
    }
}
