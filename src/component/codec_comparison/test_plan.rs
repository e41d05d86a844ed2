use crate::config::UserSettings;
use crate::tools::{EncodeProfile, HwAccel, OutputTarget};
use std::time::Duration;

/// 程序未自行結束時，在片段長度之外額外等待的秒數
pub const RUN_TIMEOUT_MARGIN_SECS: u64 = 60;

/// 第一個為比較基準
#[must_use]
pub fn default_profiles(settings: &UserSettings) -> Vec<EncodeProfile> {
    let comparison = &settings.codec_comparison;
    let directory = &settings.output_directory;
    let vaapi = HwAccel::Vaapi {
        device: settings.vaapi_device.clone(),
    };

    let mut profiles = vec![
        EncodeProfile::new(
            "TEST 1: H.264 VAAPI (Baseline)",
            "H.264 VAAPI",
            vaapi.clone(),
            "h264_vaapi",
            &comparison.video_bitrate,
            OutputTarget::File(directory.join("test1_h264_vaapi.mp4")),
        ),
        EncodeProfile::new(
            "TEST 2: H.265 VAAPI (Target)",
            "H.265 VAAPI",
            vaapi,
            "hevc_vaapi",
            &comparison.video_bitrate,
            OutputTarget::File(directory.join("test2_h265_vaapi.mp4")),
        ),
        EncodeProfile::new(
            "TEST 3: H.265 NVENC (Alternative)",
            "H.265 NVENC",
            HwAccel::Cuda,
            "hevc_nvenc",
            &comparison.video_bitrate,
            OutputTarget::File(directory.join("test3_h265_nvenc.mp4")),
        ),
    ];

    profiles[2].preset = Some("p4".to_string());
    for profile in &mut profiles {
        profile.duration_limit_secs = Some(comparison.clip_duration_secs);
    }

    profiles
}

#[must_use]
pub fn expected_sample_count(clip_duration_secs: u64, sample_interval_secs: u64) -> u64 {
    clip_duration_secs / sample_interval_secs.max(1)
}

/// 單次比較測試的執行時限
#[must_use]
pub fn run_timeout(clip_duration_secs: u64) -> Duration {
    Duration::from_secs(clip_duration_secs.saturating_add(RUN_TIMEOUT_MARGIN_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_profiles() {
        let settings = UserSettings::default();
        let profiles = default_profiles(&settings);

        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[0].video_codec, "h264_vaapi");
        assert_eq!(profiles[1].video_codec, "hevc_vaapi");
        assert_eq!(profiles[2].video_codec, "hevc_nvenc");
        assert_eq!(profiles[2].hw_accel, HwAccel::Cuda);
        assert_eq!(profiles[2].preset.as_deref(), Some("p4"));
        assert!(profiles.iter().all(|p| p.duration_limit_secs == Some(180)));
        assert_eq!(
            profiles[0].artifact_path(),
            Some(Path::new("/tmp/encoding_test/test1_h264_vaapi.mp4"))
        );
    }

    #[test]
    fn test_expected_sample_count() {
        assert_eq!(expected_sample_count(180, 5), 36);
        assert_eq!(expected_sample_count(10, 0), 10);
    }

    #[test]
    fn test_run_timeout() {
        assert_eq!(run_timeout(180), Duration::from_secs(240));
        assert_eq!(run_timeout(u64::MAX), Duration::from_secs(u64::MAX));
    }
}
