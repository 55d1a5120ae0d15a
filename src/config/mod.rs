#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use toml_config::WorkshopConfig;

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// 設定檔沒有金鑰時改讀環境變數
pub(crate) fn api_key_or_env(configured: Option<&str>) -> String {
    configured
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .unwrap_or_default()
}
