use crate::card::CardId;
use crate::error::GameError;
use rand::Rng;
use rand::prelude::SliceRandom;
use serde::{Deserialize, Serialize};

/// 有序的牌堆 (Pile)
/// 牌库、手牌、牌列、弃牌堆、Limbo、门区都用它表示。
/// 下标 0 是牌库的顶部，`draw` 从这里取牌。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pile(Vec<CardId>);

impl Pile {
    pub fn new() -> Self {
        Pile(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = CardId> + ExactSizeIterator + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.0.contains(&id)
    }

    /// 放到牌堆末尾
    pub fn push(&mut self, id: CardId) {
        self.0.push(id);
    }

    /// 取出第 `index` 张牌，剩余牌的顺序保持不变。
    ///
    /// # Panics
    /// `index` 必须来自之前列出的合法选项，越界会 panic。
    pub fn remove_at(&mut self, index: usize) -> CardId {
        self.0.remove(index)
    }

    /// 查看最后一张牌，不修改牌堆
    pub fn last(&self) -> Option<CardId> {
        self.0.last().copied()
    }

    /// 从顶部 (下标 0) 抽一张牌
    pub fn draw(&mut self) -> Result<CardId, GameError> {
        if self.0.is_empty() {
            return Err(GameError::EmptyPile);
        }
        Ok(self.0.remove(0))
    }

    /// 放到顶部，下一次 `draw` 会先拿到它
    pub fn prepend(&mut self, id: CardId) {
        self.0.insert(0, id);
    }

    /// 原地均匀洗牌 (Fisher-Yates)
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.0.shuffle(rng);
    }

    /// 把 `other` 的所有牌按顺序移到本牌堆末尾，`other` 变为空
    pub fn append(&mut self, other: &mut Pile) {
        self.0.append(&mut other.0);
    }

    /// 清空并返回所有牌
    pub fn take_all(&mut self) -> Vec<CardId> {
        std::mem::take(&mut self.0)
    }
}

impl FromIterator<CardId> for Pile {
    fn from_iter<T: IntoIterator<Item = CardId>>(iter: T) -> Self {
        Pile(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pile(ids: &[usize]) -> Pile {
        ids.iter().map(|&i| CardId(i)).collect()
    }

    #[test]
    fn test_draw_from_front() {
        let mut p = pile(&[3, 1, 2]);
        assert_eq!(p.draw(), Ok(CardId(3)));
        assert_eq!(p, pile(&[1, 2]));
    }

    #[test]
    fn test_draw_empty_fails() {
        let mut p = Pile::new();
        assert_eq!(p.draw(), Err(GameError::EmptyPile));
    }

    #[test]
    fn test_remove_at_preserves_order() {
        let mut p = pile(&[0, 1, 2, 3]);
        assert_eq!(p.remove_at(1), CardId(1));
        assert_eq!(p, pile(&[0, 2, 3]));
    }

    #[test]
    fn test_prepend_and_last() {
        let mut p = pile(&[5]);
        p.prepend(CardId(7));
        assert_eq!(p.draw(), Ok(CardId(7)));
        assert_eq!(p.last(), Some(CardId(5)));
        assert_eq!(Pile::new().last(), None);
    }

    #[test]
    fn test_shuffle_preserves_cards() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let original = pile(&(0..76).collect::<Vec<_>>());
            let mut shuffled = original.clone();
            shuffled.shuffle(&mut rng);

            let mut sorted = shuffled.take_all();
            sorted.sort();
            assert_eq!(sorted, original.iter().collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_append_moves_everything() {
        let mut a = pile(&[1]);
        let mut b = pile(&[2, 3]);
        a.append(&mut b);
        assert_eq!(a, pile(&[1, 2, 3]));
        assert!(b.is_empty());
    }
}
