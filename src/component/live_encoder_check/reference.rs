use crate::config::{LiveCheckSettings, UserSettings};
use crate::tools::{EncodeProfile, HwAccel, MetricDelta, OutputTarget};
use std::time::Duration;

/// 即時轉碼設定：VAAPI H.264，輸出丟棄只量測 CPU
#[must_use]
pub fn live_profile(settings: &UserSettings) -> EncodeProfile {
    let live = &settings.live_check;
    let mut profile = EncodeProfile::new(
        "VAAPI H.264 Live Encoding",
        "H.264 VAAPI",
        HwAccel::Vaapi {
            device: settings.vaapi_device.clone(),
        },
        "h264_vaapi",
        &live.video_bitrate,
        OutputTarget::Discard,
    );
    profile.max_rate = Some(live.video_bitrate.clone());
    profile.buffer_size = Some(live.buffer_size.clone());
    profile.resolution = Some(live.resolution.clone());
    profile.frame_rate = Some(live.frame_rate);
    profile
}

/// 取樣完成後即停止程序，逾時只作為保險：暖機加上多兩個間隔
#[must_use]
pub fn safety_timeout(warmup: Duration, interval: Duration, sample_count: usize) -> Duration {
    let intervals = u32::try_from(sample_count).unwrap_or(u32::MAX).saturating_add(2);
    warmup.saturating_add(interval.saturating_mul(intervals))
}

/// 預估的測試長度（秒）
#[must_use]
pub fn planned_duration_secs(live: &LiveCheckSettings) -> u64 {
    let sample_count = u64::try_from(live.sample_count).unwrap_or(u64::MAX);
    live.warmup_secs
        .saturating_add(live.sample_interval_secs.saturating_mul(sample_count))
}

/// 與參考編碼器的每路攝影機 CPU 使用率比較
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceComparison {
    pub reference_cpu: f64,
    pub candidate_cpu: f64,
    /// 正值代表節省
    pub savings: f64,
    pub savings_percent: f64,
    pub camera_count: u32,
}

impl ReferenceComparison {
    #[must_use]
    pub fn evaluate(candidate_cpu: f64, reference_cpu: f64, camera_count: u32) -> Self {
        let delta = MetricDelta::between(reference_cpu, candidate_cpu);
        Self {
            reference_cpu,
            candidate_cpu,
            savings: -delta.absolute,
            savings_percent: -delta.percent,
            camera_count,
        }
    }

    #[must_use]
    pub fn is_more_efficient(&self) -> bool {
        self.candidate_cpu < self.reference_cpu
    }

    #[must_use]
    pub fn total_reference(&self) -> f64 {
        self.reference_cpu * f64::from(self.camera_count)
    }

    #[must_use]
    pub fn total_candidate(&self) -> f64 {
        self.candidate_cpu * f64::from(self.camera_count)
    }

    #[must_use]
    pub fn total_savings(&self) -> f64 {
        self.savings * f64::from(self.camera_count)
    }
}
