use thiserror::Error;

pub const SEED_VAR: &str = "ONIRIM_SEED";
pub const BOARD_VAR: &str = "ONIRIM_BOARD";

/// 棋盘快照的输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// 固定种子，便于复现同一局；未设置时使用当前时间
    pub seed: Option<u64>,
    pub board: BoardFormat,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ONIRIM_SEED must be an unsigned integer, got {0:?}")]
    InvalidSeed(String),
    #[error("ONIRIM_BOARD must be `text` or `json`, got {0:?}")]
    InvalidBoardFormat(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let seed: Option<u64> = match get(SEED_VAR) {
            Some(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::InvalidSeed(raw))?),
            None => None,
        };
        let board = match get(BOARD_VAR).as_deref().map(str::trim) {
            None | Some("") => BoardFormat::Text,
            Some(raw) if raw.eq_ignore_ascii_case("text") => BoardFormat::Text,
            Some(raw) if raw.eq_ignore_ascii_case("json") => BoardFormat::Json,
            Some(raw) => return Err(ConfigError::InvalidBoardFormat(raw.to_string())),
        };
        Ok(Config { seed, board })
    }
}
