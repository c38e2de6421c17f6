use serde::{Deserialize, Serialize};

use crate::coords::TilePos;
use crate::records::Positioned;

/// Per-level record list kept in (x, y) order.
///
/// Positions in the table are 1-based ordinals, matching how plates refer
/// to gates. Tables decoded from a ROM keep the file order even if it is not
/// sorted; ordered inserts still land before the first record that sorts
/// after the new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectTable<T> {
    records: Vec<T>,
}

impl<T> Default for ObjectTable<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Positioned> ObjectTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<T>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    pub fn get(&self, ordinal: usize) -> Option<&T> {
        ordinal.checked_sub(1).and_then(|i| self.records.get(i))
    }

    pub fn find(&self, pos: TilePos) -> Option<&T> {
        self.records.iter().find(|r| r.pos() == pos)
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        self.find(pos).is_some()
    }

    pub fn ordinal_of(&self, pos: TilePos) -> Option<usize> {
        self.records.iter().position(|r| r.pos() == pos).map(|i| i + 1)
    }

    /// Ordinal a record at `pos` would get if inserted now.
    pub fn insertion_ordinal(&self, pos: TilePos) -> usize {
        self.records
            .iter()
            .position(|r| {
                let at = r.pos();
                (at.x == pos.x && at.y > pos.y) || at.x > pos.x
            })
            .unwrap_or(self.records.len())
            + 1
    }

    pub fn is_sorted(&self) -> bool {
        self.records.windows(2).all(|w| w[0].pos() <= w[1].pos())
    }

    pub(crate) fn find_mut(&mut self, pos: TilePos) -> Option<&mut T> {
        self.records.iter_mut().find(|r| r.pos() == pos)
    }

    /// Append without reordering; used when decoding.
    pub(crate) fn push(&mut self, record: T) {
        self.records.push(record);
    }

    pub(crate) fn insert(&mut self, record: T) -> usize {
        let ordinal = self.insertion_ordinal(record.pos());
        self.records.insert(ordinal - 1, record);
        ordinal
    }

    pub(crate) fn remove(&mut self, pos: TilePos) -> Option<(usize, T)> {
        let index = self.records.iter().position(|r| r.pos() == pos)?;
        Some((index + 1, self.records.remove(index)))
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.records.iter_mut()
    }
}

impl<'a, T> IntoIterator for &'a ObjectTable<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Spike;

    fn spike(x: usize, y: usize) -> Spike {
        Spike { x, y }
    }

    #[test]
    fn insert_keeps_x_then_y_order() {
        let mut table = ObjectTable::new();
        assert_eq!(table.insert(spike(5, 2)), 1);
        assert_eq!(table.insert(spike(2, 3)), 1);
        assert_eq!(table.insert(spike(5, 1)), 2);
        assert_eq!(table.insert(spike(9, 1)), 4);
        assert_eq!(table.insert(spike(2, 1)), 1);
        let order: Vec<(usize, usize)> = table.iter().map(|s| (s.x, s.y)).collect();
        assert_eq!(order, vec![(2, 1), (2, 3), (5, 1), (5, 2), (9, 1)]);
        assert!(table.is_sorted());
    }

    #[test]
    fn remove_reports_ordinal_of_first_match() {
        let mut table = ObjectTable::from_records(vec![spike(1, 1), spike(3, 2), spike(4, 1)]);
        let (ordinal, removed) = table.remove(TilePos::new(3, 2)).unwrap();
        assert_eq!(ordinal, 2);
        assert_eq!(removed, spike(3, 2));
        assert!(table.remove(TilePos::new(3, 2)).is_none());
        assert_eq!(table.len(), 2);
    }
}
