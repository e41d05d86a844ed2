pub mod load;
pub mod save;
pub mod types;

pub use types::{
    CodecComparisonSettings, Config, LiveCheckSettings, SETTINGS_FILE_NAME, UserSettings,
    redact_credentials,
};
