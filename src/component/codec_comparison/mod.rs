//! H.265 與 H.264 編碼效能比較
//!
//! 依序執行多個硬體編碼設定，取樣 ffmpeg 的 CPU 使用率，
//! 並以第一個測試為基準輸出比較表

mod main;
mod test_plan;

pub use main::{CodecComparison, ComparisonReport};
pub use test_plan::{RUN_TIMEOUT_MARGIN_SECS, default_profiles, expected_sample_count, run_timeout};
