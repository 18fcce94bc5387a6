use crate::error::GameError;
use crate::message::{GameMessage, Prompt};
use crate::state::Board;
use tokio::sync::mpsc;
use tracing::warn;

/// 状态机与玩家之间的交互层。
///
/// 状态机每次只会有一个未回应的提示：先 `send_prompt`，再 `receive_choice`。
/// 实现方负责校验玩家的输入，`receive_choice` 只能返回本次提示中给出的选项键。
pub trait Interaction {
    fn send_prompt(&mut self, prompt: Prompt) -> Result<(), GameError>;

    /// 阻塞直到玩家做出合法选择
    fn receive_choice(&mut self) -> Result<String, GameError>;

    /// 进度信息，尽力送达，不能阻塞游戏逻辑
    fn status(&mut self, message: String);

    /// 每回合开始和游戏结束时收到棋盘快照
    fn observe(&mut self, _board: &Board) {}
}

/// 基于 `tokio::sync::mpsc` 的交互层实现。
///
/// 状态机运行在阻塞线程上 (例如 `spawn_blocking`)，
/// 通过 `blocking_recv` 等待另一端的异步任务送回选择。
pub struct ChannelBoundary {
    outgoing: mpsc::UnboundedSender<GameMessage>,
    choices: mpsc::Receiver<String>,
    outstanding: Option<Prompt>,
}

impl ChannelBoundary {
    pub fn new(outgoing: mpsc::UnboundedSender<GameMessage>, choices: mpsc::Receiver<String>) -> Self {
        ChannelBoundary { outgoing, choices, outstanding: None }
    }

    /// 同时创建两条通道，返回交互层以及另一端需要的收发端
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<GameMessage>, mpsc::Sender<String>) {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        // 提示与选择严格一一对应，缓冲 1 就够了
        let (choice_tx, choice_rx) = mpsc::channel(1);
        (Self::new(msg_tx, choice_rx), msg_rx, choice_tx)
    }

    fn send(&self, msg: GameMessage) -> Result<(), GameError> {
        self.outgoing.send(msg).map_err(|_| GameError::Disconnected)
    }
}

impl Interaction for ChannelBoundary {
    fn send_prompt(&mut self, prompt: Prompt) -> Result<(), GameError> {
        self.send(GameMessage::Prompt(prompt.clone()))?;
        self.outstanding = Some(prompt);
        Ok(())
    }

    fn receive_choice(&mut self) -> Result<String, GameError> {
        loop {
            let raw = self.choices.blocking_recv().ok_or(GameError::Disconnected)?;
            // 没有未回应的提示时收到的输入无法校验，按格式错误处理
            let Some(prompt) = &self.outstanding else {
                warn!(input = %raw, "choice without outstanding prompt");
                return Err(GameError::MalformedLabel(raw));
            };
            match prompt.choose(&raw) {
                Ok(choice) => {
                    let key = choice.key.clone();
                    self.outstanding = None;
                    return Ok(key);
                }
                Err(err) => {
                    // 非法输入在这一层重新提示，不会到达状态机
                    warn!(input = %raw, "rejected choice");
                    let prompt = prompt.clone();
                    self.status(err.to_string());
                    self.send(GameMessage::Prompt(prompt))?;
                }
            }
        }
    }

    fn status(&mut self, message: String) {
        if self.send(GameMessage::Status(message)).is_err() {
            warn!("status dropped, receiver is gone");
        }
    }

    fn observe(&mut self, board: &Board) {
        if self.send(GameMessage::Board(board.clone())).is_err() {
            warn!("board dropped, receiver is gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn door_prompt() -> Prompt {
        let mut prompt = Prompt::new("You've drawn a door:");
        prompt.add_choice("Y", "Discard Red Key to play Red Door");
        prompt.add_choice("N", "Keep Red Key and move Red Door to Limbo");
        prompt
    }

    #[test]
    fn test_valid_choice_round_trip() {
        let (mut boundary, mut msg_rx, choice_tx) = ChannelBoundary::channel();
        let player = thread::spawn(move || {
            let msg = msg_rx.blocking_recv().unwrap();
            assert!(matches!(msg, GameMessage::Prompt(ref p) if p.choices.len() == 2));
            choice_tx.blocking_send("n".to_string()).unwrap();
        });

        boundary.send_prompt(door_prompt()).unwrap();
        assert_eq!(boundary.receive_choice(), Ok("N".to_string()));
        player.join().unwrap();
    }

    #[test]
    fn test_invalid_choice_is_reprompted() {
        let (mut boundary, mut msg_rx, choice_tx) = ChannelBoundary::channel();
        let player = thread::spawn(move || {
            let mut seen = Vec::new();
            choice_tx.blocking_send("Q7".to_string()).unwrap();
            choice_tx.blocking_send("Y".to_string()).unwrap();
            while let Some(msg) = msg_rx.blocking_recv() {
                seen.push(msg);
            }
            seen
        });

        boundary.send_prompt(door_prompt()).unwrap();
        assert_eq!(boundary.receive_choice(), Ok("Y".to_string()));
        drop(boundary);

        let seen = player.join().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(matches!(&seen[0], GameMessage::Prompt(_)));
        assert!(matches!(&seen[1], GameMessage::Status(s) if s.contains("Q7")));
        assert!(matches!(&seen[2], GameMessage::Prompt(_)));
    }

    #[test]
    fn test_closed_choice_channel_disconnects() {
        let (mut boundary, _msg_rx, choice_tx) = ChannelBoundary::channel();
        drop(choice_tx);
        boundary.send_prompt(door_prompt()).unwrap();
        assert_eq!(boundary.receive_choice(), Err(GameError::Disconnected));
    }

    #[test]
    fn test_choice_without_prompt_is_malformed() {
        let (mut boundary, _msg_rx, choice_tx) = ChannelBoundary::channel();
        choice_tx.blocking_send("Y".to_string()).unwrap();
        assert_eq!(boundary.receive_choice(), Err(GameError::MalformedLabel("Y".to_string())));
    }

    #[test]
    fn test_observe_after_receiver_closed_is_ignored() {
        let (mut boundary, msg_rx, _choice_tx) = ChannelBoundary::channel();
        drop(msg_rx);
        let board = crate::state::GameState::from_cards(Vec::new(), 0).board();
        boundary.observe(&board);
        boundary.status("still running".to_string());
    }

    #[test]
    fn test_closed_message_channel_disconnects() {
        let (mut boundary, msg_rx, _choice_tx) = ChannelBoundary::channel();
        drop(msg_rx);
        assert_eq!(boundary.send_prompt(door_prompt()), Err(GameError::Disconnected));
    }
}
