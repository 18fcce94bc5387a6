use crate::boundary::Interaction;
use crate::card::{CardId, Class};
use crate::error::GameError;
use crate::message::{ChoiceKey, Prompt};
use crate::pile::Pile;
use crate::state::*;
use tracing::{debug, info, info_span};
use uuid::Uuid;

/// 预言一次查看的牌数
const PROPHECY_SIZE: usize = 5;
/// 梦魇选择丢弃牌库顶部时丢弃的牌数
const NIGHTMARE_DECK_DISCARD: usize = 5;

/// 一局游戏：状态加上与玩家交互的接口。
///
/// 状态机是单线程的：每次只执行一个阶段处理函数，
/// 需要玩家输入时阻塞在 `Interaction::receive_choice` 上。
pub struct Game<I: Interaction> {
    pub id: Uuid,
    pub state: GameState,
    io: I,
}

// --- 核心游戏流程函数 ---

impl<I: Interaction> Game<I> {
    pub fn new(state: GameState, io: I) -> Self {
        Game { id: Uuid::new_v4(), state, io }
    }

    pub fn io(&self) -> &I {
        &self.io
    }

    /// 一直运行到游戏结束，返回最终的棋盘快照。
    /// 只有交互层断开等非牌局错误才会返回 `Err`，牌库耗尽是正常的输局。
    pub fn run(&mut self) -> Result<Board, GameError> {
        let span = info_span!("game", id = %self.id);
        let _enter = span.enter();
        while !self.state.done {
            self.step()?;
        }
        let board = self.state.board();
        self.io.observe(&board);
        Ok(board)
    }

    /// 执行当前阶段的处理函数并切换到下一个阶段
    pub fn step(&mut self) -> Result<(), GameError> {
        let phase = self.state.phase;
        let result = match phase {
            Phase::StartOfTurn => self.handle_start_of_turn(),
            Phase::PlayOrDiscard => self.handle_play_or_discard(),
            Phase::EndOfTurn => self.handle_end_of_turn(),
            Phase::DoorDrawn => self.handle_door_drawn(),
            Phase::DreamDrawn => self.handle_dream_drawn(),
            Phase::Prophecy => self.handle_prophecy(),
            Phase::EndOfGame => self.handle_end_of_game(),
        };
        let next = match result {
            Ok(next) => next,
            Err(GameError::EmptyPile) => {
                info!(?phase, "deck exhausted");
                self.io.status(GameError::EmptyPile.to_string());
                Phase::EndOfGame
            }
            Err(err) => return Err(err),
        };
        debug!(from = ?phase, to = ?next, "phase transition");
        self.state.phase = next;
        Ok(())
    }

    // --- 阶段处理函数 ---

    /// 列出所有可打出的牌和可弃掉的牌，然后等待选择
    fn handle_start_of_turn(&mut self) -> Result<Phase, GameError> {
        self.io.observe(&self.state.board());

        let mut prompt = Prompt::new("Select card to play or discard");
        for (i, id) in self.state.hand.iter().enumerate() {
            if self.state.is_playable(id) {
                prompt.add_choice(format!("P{}", i + 1), format!("Play {}", self.state.card(id)));
            }
        }
        for (i, id) in self.state.hand.iter().enumerate() {
            let card = self.state.card(id);
            let name = if card.is_key() {
                format!("Discard {} and trigger prophecy", card)
            } else {
                format!("Discard {}", card)
            };
            prompt.add_choice(format!("D{}", i + 1), name);
        }
        self.io.send_prompt(prompt)?;
        Ok(Phase::PlayOrDiscard)
    }

    fn handle_play_or_discard(&mut self) -> Result<Phase, GameError> {
        let key = self.receive_key()?;
        let index = self.hand_index(key)?;

        match key.action {
            'D' => {
                let id = self.state.hand.remove_at(index);
                self.discard(id);
                if self.state.card(id).is_key() {
                    return Ok(Phase::Prophecy);
                }
                Ok(Phase::EndOfTurn)
            }
            'P' => {
                let id = self.state.hand.remove_at(index);
                self.play_card(id);
                if self.state.is_door_discovered() && self.play_door(id) {
                    self.consume_top_of_row();
                    if self.check_win() {
                        return Ok(Phase::EndOfGame);
                    }
                }
                Ok(Phase::EndOfTurn)
            }
            _ => Err(GameError::MalformedLabel(format!("{}{}", key.action, key.number))),
        }
    }

    /// 预言：抽 5 张 (不经过补手牌的过滤)，弃掉其中一张，
    /// 其余依次放回牌库顶。每次选中的牌都压在当前顶部，所以最后放的在最上面。
    fn handle_prophecy(&mut self) -> Result<Phase, GameError> {
        info!("prophecy triggered");
        self.io.status("Prophecy triggered".to_string());

        let mut temp = Pile::new();
        for _ in 0..PROPHECY_SIZE {
            match self.state.draw_card() {
                Ok(id) => temp.push(id),
                Err(err) => {
                    // 保持每张牌都在某个牌堆中
                    for id in temp.take_all().into_iter().rev() {
                        self.state.deck.prepend(id);
                    }
                    return Err(err);
                }
            }
        }

        let mut prompt = Prompt::new("Select one card to discard:");
        for (i, id) in temp.iter().enumerate() {
            prompt.add_choice(format!("D{}", i + 1), format!("Discard {}", self.state.card(id)));
        }
        let index = self.ask_index(prompt, &temp)?;
        let id = temp.remove_at(index);
        self.discard(id);

        while temp.len() > 1 {
            let mut prompt = Prompt::new("Select card to place on top of deck:");
            for (i, id) in temp.iter().enumerate() {
                prompt.add_choice(format!("P{}", i + 1), format!("Place {} on deck", self.state.card(id)));
            }
            let index = self.ask_index(prompt, &temp)?;
            let id = temp.remove_at(index);
            self.place_on_deck(id);
        }
        for id in temp.take_all() {
            self.place_on_deck(id);
        }
        Ok(Phase::EndOfTurn)
    }

    /// 手牌已满则把 Limbo 洗回牌库并开始新回合，否则抽一张并按类别分流
    fn handle_end_of_turn(&mut self) -> Result<Phase, GameError> {
        if self.state.hand.len() >= HAND_SIZE {
            self.state.shuffle_limbo_into_deck();
            return Ok(Phase::StartOfTurn);
        }

        let id = self.state.draw_card()?;
        let card = self.state.card(id);
        self.io.status(format!("Drew {}", card));
        if card.is_labyrinth() {
            self.state.hand.push(id);
            return Ok(Phase::EndOfTurn);
        }
        self.state.drawn = Some(id);
        match card.class() {
            Class::Door => Ok(Phase::DoorDrawn),
            _ => Ok(Phase::DreamDrawn),
        }
    }

    /// 抽到门：手中有同色钥匙时可以弃钥匙拿门，否则门进入 Limbo
    fn handle_door_drawn(&mut self) -> Result<Phase, GameError> {
        let Some(door) = self.state.drawn else {
            return Ok(Phase::EndOfTurn);
        };
        let Some(color) = self.state.card(door).color() else {
            return Ok(Phase::EndOfTurn);
        };

        let Some(index) = self.state.matching_key_in_hand(color) else {
            self.state.drawn = None;
            self.move_to_limbo(door);
            return Ok(Phase::EndOfTurn);
        };

        let mut prompt = Prompt::new("You've drawn a door:");
        prompt.add_choice("Y", format!("Discard {} Key to play {} Door", color, color));
        prompt.add_choice("N", format!("Keep {} Key and move {} Door to Limbo", color, color));
        self.io.send_prompt(prompt)?;
        let key = self.receive_key()?;

        self.state.drawn = None;
        if key.action == 'Y' {
            let key_card = self.state.hand.remove_at(index);
            self.discard(key_card);
            self.add_door(door);
            if self.check_win() {
                return Ok(Phase::EndOfGame);
            }
        } else {
            self.move_to_limbo(door);
        }
        Ok(Phase::EndOfTurn)
    }

    /// 梦魇：必须选择一种代价，不能跳过。梦魇本身处理完后进入弃牌堆。
    fn handle_dream_drawn(&mut self) -> Result<Phase, GameError> {
        let mut prompt = Prompt::new("You've drawn a Nightmare:");
        for (i, id) in self.state.hand.iter().enumerate() {
            let card = self.state.card(id);
            if card.is_key() {
                prompt.add_choice(format!("K{}", i + 1), format!("Discard {} from hand", card));
            }
        }
        for (i, id) in self.state.doors.iter().enumerate() {
            prompt.add_choice(format!("R{}", i + 1), format!("Move {} to Limbo", self.state.card(id)));
        }
        prompt.add_choice("H0", "Discard your hand");
        prompt.add_choice("T0", "Discard cards from the deck");
        self.io.send_prompt(prompt)?;
        let key = self.receive_key()?;

        if let Some(nightmare) = self.state.drawn.take() {
            self.discard(nightmare);
        }

        match key.action {
            'K' => {
                let index = self.hand_index(key)?;
                let id = self.state.hand.remove_at(index);
                self.discard(id);
            }
            'R' => {
                let index = key
                    .index()
                    .filter(|&i| i < self.state.doors.len())
                    .ok_or(GameError::MalformedLabel(format!("R{}", key.number)))?;
                let id = self.state.doors.remove_at(index);
                self.move_to_limbo(id);
            }
            'H' => {
                for id in self.state.hand.take_all() {
                    self.discard(id);
                }
                self.state.fill_hand()?;
            }
            'T' => {
                for _ in 0..NIGHTMARE_DECK_DISCARD {
                    let id = self.state.draw_card()?;
                    if self.state.card(id).is_labyrinth() {
                        self.discard(id);
                    } else {
                        self.move_to_limbo(id);
                    }
                }
                self.state.shuffle_limbo_into_deck();
            }
            _ => return Err(GameError::MalformedLabel(format!("{}{}", key.action, key.number))),
        }
        Ok(Phase::EndOfTurn)
    }

    fn handle_end_of_game(&mut self) -> Result<Phase, GameError> {
        self.state.done = true;
        if self.state.won {
            info!(doors = self.state.doors.len(), "game won");
            self.io.status("All eight doors found, you win!".to_string());
        } else {
            info!(remaining = self.state.deck.len(), "game lost");
        }
        Ok(Phase::EndOfGame)
    }

    // --- 辅助函数 ---

    fn receive_key(&mut self) -> Result<ChoiceKey, GameError> {
        let raw = self.io.receive_choice()?;
        ChoiceKey::parse(&raw)
    }

    fn ask_index(&mut self, prompt: Prompt, pile: &Pile) -> Result<usize, GameError> {
        self.io.send_prompt(prompt)?;
        let key = self.receive_key()?;
        key.index()
            .filter(|&i| i < pile.len())
            .ok_or(GameError::MalformedLabel(format!("{}{}", key.action, key.number)))
    }

    fn hand_index(&self, key: ChoiceKey) -> Result<usize, GameError> {
        key.index()
            .filter(|&i| i < self.state.hand.len())
            .ok_or(GameError::MalformedLabel(format!("{}{}", key.action, key.number)))
    }

    /// 在牌库中寻找与刚打出的牌同色的门，找到则放入门区
    fn play_door(&mut self, played: CardId) -> bool {
        let Some(color) = self.state.card(played).color() else {
            return false;
        };
        match self.state.take_door_from_deck(color) {
            Some(door) => {
                info!(%color, "door discovered");
                self.add_door(door);
                true
            }
            None => false,
        }
    }

    /// 标记牌列顶部 3 张已用于发现门
    fn consume_top_of_row(&mut self) {
        let top: Vec<CardId> = self.state.row.iter().rev().take(3).collect();
        self.state.found_door.extend(top);
    }

    /// 门区达到 8 张即获胜，随后进入 `EndOfGame`
    fn check_win(&mut self) -> bool {
        if self.state.doors.len() >= DOORS_TO_WIN {
            self.state.won = true;
        }
        self.state.won
    }

    fn add_door(&mut self, id: CardId) {
        self.state.doors.push(id);
        self.io.status(format!("Played {}", self.state.card(id)));
    }

    fn discard(&mut self, id: CardId) {
        self.state.discard.push(id);
        self.io.status(format!("Discarded {}", self.state.card(id)));
    }

    fn play_card(&mut self, id: CardId) {
        self.state.row.push(id);
        self.io.status(format!("Played {} to row", self.state.card(id)));
    }

    fn place_on_deck(&mut self, id: CardId) {
        self.state.deck.prepend(id);
        self.io.status(format!("Placed {} on deck", self.state.card(id)));
    }

    fn move_to_limbo(&mut self, id: CardId) {
        self.state.limbo.push(id);
        self.io.status(format!("Moved {} to Limbo", self.state.card(id)));
    }
}

// --- 单元测试 ---
