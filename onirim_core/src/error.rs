use thiserror::Error;

/// 核心库的错误类型。
/// 只有 `EmptyPile` 会穿过状态机与交互层的边界，其余错误都在产生它的那一层处理。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// 试图从空牌堆抽牌，当前这局直接判负
    #[error("no cards left, you lose")]
    EmptyPile,

    /// 收到的选择不在本次提示给出的选项中
    #[error("invalid choice: {0}")]
    InvalidChoice(String),

    /// 选项键无法解析为 `<动作字母><序号>`
    #[error("malformed choice label: {0}")]
    MalformedLabel(String),

    /// 交互层的另一端已经关闭
    #[error("interaction boundary disconnected")]
    Disconnected,
}
