//! # Onirim 单人纸牌游戏核心逻辑库
//!
//! 这个 `core` crate 包含了 Onirim 的卡牌模型、牌堆操作、
//! 回合状态机以及状态机与玩家之间的提示/选择协议。
//! 它不负责终端输入输出，也不关心网络，
//! 上层应用只需要实现 `Interaction` 或直接使用 `ChannelBoundary`。

mod boundary;
mod card;
mod error;
mod logic;
mod message;
mod pile;
mod state;

pub use boundary::*;

pub use card::*;

pub use error::GameError;

pub use logic::Game;

pub use message::*;

pub use pile::Pile;

pub use state::*;
