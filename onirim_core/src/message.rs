use crate::error::GameError;
use crate::state::Board;
use serde::{Deserialize, Serialize};

// --- 状态机 -> 交互层 的消息 ---

/// 提示中的一个选项
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// 形如 `P2`、`D4`、`H0`、`Y` 的选项键，在同一个提示内唯一
    pub key: String,
    /// 给玩家看的描述
    pub name: String,
}

/// 一次提示：一段说明文字和一组有序选项
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub message: String,
    pub choices: Vec<Choice>,
}

impl Prompt {
    pub fn new(message: impl Into<String>) -> Self {
        Prompt { message: message.into(), choices: Vec::new() }
    }

    pub fn add_choice(&mut self, key: impl Into<String>, name: impl Into<String>) {
        self.choices.push(Choice { key: key.into(), name: name.into() });
    }

    /// 根据玩家输入找到对应的选项 (忽略首尾空白和大小写)
    pub fn choose(&self, input: &str) -> Result<&Choice, GameError> {
        let input = input.trim();
        self.choices
            .iter()
            .find(|c| c.key.eq_ignore_ascii_case(input))
            .ok_or_else(|| GameError::InvalidChoice(input.to_string()))
    }
}

/// 状态机发往交互层的所有消息，按发送顺序到达
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum GameMessage {
    /// 进度信息，不需要回应
    Status(String),
    /// 需要玩家回应的提示
    Prompt(Prompt),
    /// 棋盘快照
    Board(Board),
}

// --- 选项键解析 ---

/// 解析后的选项键：动作字母 + 序号。
/// `P2` 表示第 2 张牌；`H0`、`T0` 的序号为 0；`Y`、`N` 没有数字，序号也记为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceKey {
    pub action: char,
    pub number: usize,
}

impl ChoiceKey {
    pub fn parse(key: &str) -> Result<Self, GameError> {
        let malformed = || GameError::MalformedLabel(key.to_string());
        let mut chars = key.chars();
        let action = chars.next().filter(char::is_ascii_uppercase).ok_or_else(malformed)?;
        let digits = chars.as_str();
        let number: usize = if digits.is_empty() {
            0
        } else if digits.chars().all(|c| c.is_ascii_digit()) {
            digits.parse().map_err(|_| malformed())?
        } else {
            return Err(malformed());
        };
        Ok(ChoiceKey { action, number })
    }

    /// 把 1 起始的序号转成 0 起始的下标
    pub fn index(&self) -> Option<usize> {
        self.number.checked_sub(1)
    }
}
