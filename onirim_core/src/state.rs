use crate::card::{create_deck, Card, CardId, Color};
use crate::error::GameError;
use crate::pile::Pile;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

pub const HAND_SIZE: usize = 5;
pub const DOORS_TO_WIN: usize = 8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    StartOfTurn,
    PlayOrDiscard,
    EndOfTurn,
    DoorDrawn,
    DreamDrawn,
    Prophecy,
    EndOfGame, // 终止状态
}

/// 一局游戏的全部状态。
/// 每张牌任何时刻都恰好位于一个牌堆或 `drawn` 中。
#[derive(Debug, Clone)]
pub struct GameState {
    /// 卡牌 arena，`CardId` 是这里的下标
    pub cards: Vec<Card>,
    pub deck: Pile,
    pub hand: Pile,    // 顺序无意义，只用于编号选项
    pub row: Pile,     // 打出的迷宫牌
    pub discard: Pile,
    pub limbo: Pile,   // 等待洗回牌库的门和梦魇
    pub doors: Pile,   // 已发现的门，顺序无意义
    /// 刚抽到、尚未处理的门或梦魇
    pub drawn: Option<CardId>,
    /// 已经用来发现过门的迷宫牌
    pub found_door: HashSet<CardId>,
    pub phase: Phase,
    pub done: bool,
    pub won: bool,
    rng: StdRng,
}

/// 棋盘快照，给外部观察者看的只读投影，不参与游戏逻辑
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Board {
    pub hand: Vec<String>,
    pub discard: Vec<String>,
    pub doors: Vec<String>,
    pub row: Vec<String>,
    pub cards_remaining: usize,
    pub done: bool,
    pub won: bool,
}

// --- GameState 的实现方法 ---

impl GameState {
    /// 用随机种子开始新的一局
    pub fn new() -> Result<Self, GameError> {
        let seed: u64 = rand::rng().random();
        Self::with_seed(seed)
    }

    /// 创建并洗好 76 张牌，再补满起手手牌。
    /// 补手牌时牌库耗尽会返回 `EmptyPile`。
    pub fn with_seed(seed: u64) -> Result<Self, GameError> {
        let mut state = Self::from_cards(create_deck(), seed);
        state.deck.shuffle(&mut state.rng);
        state.fill_hand()?;
        debug!(seed, "new game dealt");
        Ok(state)
    }

    /// 按给定顺序把所有牌放进牌库，不洗牌也不发牌
    pub fn from_cards(cards: Vec<Card>, seed: u64) -> Self {
        let deck = (0..cards.len()).map(CardId).collect();
        GameState {
            cards,
            deck,
            hand: Pile::new(),
            row: Pile::new(),
            discard: Pile::new(),
            limbo: Pile::new(),
            doors: Pile::new(),
            drawn: None,
            found_door: HashSet::new(),
            phase: Phase::StartOfTurn,
            done: false,
            won: false,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn card(&self, id: CardId) -> Card {
        self.cards[id.0]
    }

    /// 从牌库顶部抽一张
    pub fn draw_card(&mut self) -> Result<CardId, GameError> {
        let id = self.deck.draw()?;
        debug!(card = %self.card(id), remaining = self.deck.len(), "drew card");
        Ok(id)
    }

    /// 补手牌规则：不断抽牌直到手牌有 5 张。
    /// 只有迷宫牌进入手牌，门和梦魇进入 Limbo；补满后 Limbo 洗回牌库。
    /// 中途牌库耗尽返回 `EmptyPile`，已经分好的牌不回滚。
    pub fn fill_hand(&mut self) -> Result<(), GameError> {
        while self.hand.len() < HAND_SIZE {
            let id = self.draw_card()?;
            if self.card(id).is_labyrinth() {
                self.hand.push(id);
            } else {
                debug!(card = %self.card(id), "moved to limbo");
                self.limbo.push(id);
            }
        }
        self.shuffle_limbo_into_deck();
        Ok(())
    }

    pub fn shuffle_limbo_into_deck(&mut self) {
        if self.limbo.is_empty() {
            return;
        }
        debug!(count = self.limbo.len(), "shuffling limbo into deck");
        self.deck.append(&mut self.limbo);
        self.deck.shuffle(&mut self.rng);
    }

    /// 出牌是否合法：空牌列可以打任意牌；
    /// 否则只能打符号与牌列最后一张不同的迷宫牌。
    pub fn is_playable(&self, id: CardId) -> bool {
        let Some(top) = self.row.last() else {
            return true;
        };
        let card = self.card(id);
        card.is_labyrinth() && card.symbol() != self.card(top).symbol()
    }

    /// 发现门：牌列最后 3 张颜色相同，且都没有参与过之前的发现。
    /// 从末尾往前检查，遇到颜色不同或已用过的牌立刻失败。
    pub fn is_door_discovered(&self) -> bool {
        let Some(color) = self.row.last().and_then(|id| self.card(id).color()) else {
            return false;
        };
        let run = self
            .row
            .iter()
            .rev()
            .take(3)
            .take_while(|id| !self.found_door.contains(id) && self.card(*id).color() == Some(color))
            .count();
        run == 3
    }

    /// 手牌中与 `color` 匹配的钥匙牌下标
    pub fn matching_key_in_hand(&self, color: Color) -> Option<usize> {
        self.hand.iter().position(|id| {
            let card = self.card(id);
            card.is_key() && card.color() == Some(color)
        })
    }

    /// 在牌库中找到一张指定颜色的门并移出
    pub fn take_door_from_deck(&mut self, color: Color) -> Option<CardId> {
        let index = self
            .deck
            .iter()
            .position(|id| self.card(id) == Card::Door { color })?;
        Some(self.deck.remove_at(index))
    }

    /// 每张牌出现在几个位置 (各牌堆加上 `drawn`)，下标即 `CardId`。
    /// 正常情况下每一项都是 1。
    pub fn card_locations(&self) -> Vec<usize> {
        let mut counts = vec![0; self.cards.len()];
        let piles = [&self.deck, &self.hand, &self.row, &self.discard, &self.limbo, &self.doors];
        for id in piles.into_iter().flat_map(|p| p.iter()).chain(self.drawn) {
            counts[id.0] += 1;
        }
        counts
    }

    /// 生成棋盘快照
    pub fn board(&self) -> Board {
        let tokens = |pile: &Pile| -> Vec<String> { pile.iter().map(|id| self.card(id).token()).collect() };
        Board {
            hand: tokens(&self.hand),
            discard: tokens(&self.discard),
            doors: tokens(&self.doors),
            row: tokens(&self.row),
            cards_remaining: self.deck.len(),
            done: self.done,
            won: self.won,
        }
    }
}
