use serde::{Deserialize, Serialize};
use std::fmt;

// --- 核心数据结构定义 ---

/// 卡牌类别 (Class)
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Class {
    Dream,     // 梦魇 (Nightmare)
    Door,      // 门
    Labyrinth, // 迷宫
}

/// 颜色 (Color)，只对门和迷宫牌有意义
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Green,
    Brown,
}

/// 符号 (Symbol)，只对迷宫牌有意义
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Symbol {
    Key,
    Sun,
    Moon,
}

/// 单张卡牌 (Card)
/// 用枚举表达三种类别，梦魇牌不可能携带颜色或符号。
/// 卡牌本身是不可变的值，身份由 `CardId` 区分。
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Card {
    Labyrinth { color: Color, symbol: Symbol },
    Door { color: Color },
    Dream,
}

/// 卡牌在牌库 (arena) 中的下标。
/// 两张属性完全相同的牌拥有不同的 `CardId`。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct CardId(pub usize);

impl Card {
    pub fn class(&self) -> Class {
        match self {
            Card::Labyrinth { .. } => Class::Labyrinth,
            Card::Door { .. } => Class::Door,
            Card::Dream => Class::Dream,
        }
    }

    pub fn color(&self) -> Option<Color> {
        match *self {
            Card::Labyrinth { color, .. } | Card::Door { color } => Some(color),
            Card::Dream => None,
        }
    }

    pub fn symbol(&self) -> Option<Symbol> {
        match *self {
            Card::Labyrinth { symbol, .. } => Some(symbol),
            _ => None,
        }
    }

    pub fn is_labyrinth(&self) -> bool {
        matches!(self, Card::Labyrinth { .. })
    }

    /// 是否为钥匙迷宫牌
    pub fn is_key(&self) -> bool {
        self.symbol() == Some(Symbol::Key)
    }

    /// 3 个字符的简写，用于 `Board` 快照：类别 + 颜色 + 符号。
    /// 门牌没有符号，用 `-` 占位；梦魇牌固定为 `DNM`。
    pub fn token(&self) -> String {
        match *self {
            Card::Labyrinth { color, symbol } => format!("L{}{}", color.letter(), symbol.letter()),
            Card::Door { color } => format!("R{}-", color.letter()),
            Card::Dream => "DNM".to_string(),
        }
    }
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Brown];

    fn letter(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Blue => 'B',
            Color::Green => 'G',
            Color::Brown => 'Y',
        }
    }

    /// 每种颜色的太阳牌数量，刻意不对称
    fn sun_count(self) -> usize {
        match self {
            Color::Red => 9,
            Color::Blue => 8,
            Color::Green => 7,
            Color::Brown => 6,
        }
    }
}

impl Symbol {
    fn letter(self) -> char {
        match self {
            Symbol::Key => 'K',
            Symbol::Sun => 'S',
            Symbol::Moon => 'M',
        }
    }
}

// --- 实现辅助功能 ---

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Color::Red => "Red",
            Color::Blue => "Blue",
            Color::Green => "Green",
            Color::Brown => "Brown",
        })
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Symbol::Key => "Key",
            Symbol::Sun => "Sun",
            Symbol::Moon => "Moon",
        })
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Card::Labyrinth { color, symbol } => write!(f, "{} {}", color, symbol),
            Card::Door { color } => write!(f, "{} Door", color),
            Card::Dream => write!(f, "Nightmare"),
        }
    }
}

// --- 牌组生成 ---

pub const DECK_SIZE: usize = 76;
pub const KEYS_PER_COLOR: usize = 3;
pub const MOONS_PER_COLOR: usize = 4;
pub const DOORS_PER_COLOR: usize = 2;
pub const DREAM_COUNT: usize = 10;

/// 创建一副完整的 76 张 Onirim 牌 (未洗牌)。
/// 返回值即卡牌 arena，`CardId(i)` 指向第 i 张。
pub fn create_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for color in Color::ALL {
        let labyrinth = |symbol| Card::Labyrinth { color, symbol };
        deck.extend(std::iter::repeat_n(labyrinth(Symbol::Key), KEYS_PER_COLOR));
        deck.extend(std::iter::repeat_n(labyrinth(Symbol::Moon), MOONS_PER_COLOR));
        deck.extend(std::iter::repeat_n(labyrinth(Symbol::Sun), color.sun_count()));
    }
    for color in Color::ALL {
        deck.extend(std::iter::repeat_n(Card::Door { color }, DOORS_PER_COLOR));
    }
    deck.extend(std::iter::repeat_n(Card::Dream, DREAM_COUNT));
    deck
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;

    fn count(deck: &[Card], pred: impl Fn(&Card) -> bool) -> usize {
        deck.iter().filter(|c| pred(*c)).count()
    }

    #[test]
    fn test_deck_size() {
        assert_eq!(create_deck().len(), DECK_SIZE);
    }

    #[test]
    fn test_deck_composition_per_color() {
        let deck = create_deck();
        for (color, suns) in [(Color::Red, 9), (Color::Blue, 8), (Color::Green, 7), (Color::Brown, 6)] {
            let of = |symbol| count(&deck, |c| *c == Card::Labyrinth { color, symbol });
            assert_eq!(of(Symbol::Key), 3, "{} keys", color);
            assert_eq!(of(Symbol::Moon), 4, "{} moons", color);
            assert_eq!(of(Symbol::Sun), suns, "{} suns", color);
            assert_eq!(count(&deck, |c| *c == Card::Door { color }), 2, "{} doors", color);
        }
        assert_eq!(count(&deck, Card::is_labyrinth), 58);
        assert_eq!(count(&deck, |c| c.class() == Class::Door), 8);
        assert_eq!(count(&deck, |c| c.class() == Class::Dream), 10);
    }

    #[test]
    fn test_tokens_are_three_chars() {
        for card in create_deck() {
            assert_eq!(card.token().len(), 3, "{}", card);
        }
        assert_eq!(Card::Labyrinth { color: Color::Brown, symbol: Symbol::Key }.token(), "LYK");
        assert_eq!(Card::Door { color: Color::Blue }.token(), "RB-");
        assert_eq!(Card::Dream.token(), "DNM");
    }

    #[test]
    fn test_attributes() {
        let moon = Card::Labyrinth { color: Color::Green, symbol: Symbol::Moon };
        assert_eq!(moon.class(), Class::Labyrinth);
        assert_eq!(moon.color(), Some(Color::Green));
        assert!(!moon.is_key());
        assert_eq!(Card::Door { color: Color::Red }.symbol(), None);
        assert_eq!(Card::Dream.color(), None);
        assert_eq!(Card::Dream.to_string(), "Nightmare");
        assert_eq!(moon.to_string(), "Green Moon");
    }
}
