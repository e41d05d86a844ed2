//! 功能元件模組
//!
//! 每個子模組實現一組獨立的轉碼效能測試

pub mod codec_comparison;
mod console_report;
pub mod live_encoder_check;
mod suite_outcome;

pub use codec_comparison::CodecComparison;
pub use live_encoder_check::LiveEncoderCheck;
pub use suite_outcome::SuiteOutcome;
