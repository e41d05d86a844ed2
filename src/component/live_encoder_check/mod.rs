//! VAAPI 即時轉碼 CPU 測試
//!
//! 以固定樣本數量測即時轉碼的 CPU 負載，並與參考編碼器比較

mod main;
mod reference;

pub use main::LiveEncoderCheck;
pub use reference::{ReferenceComparison, live_profile, planned_duration_secs, safety_timeout};
