//! Deduplicated transactions (one playlist each).

use super::item::Item;

/// A set of unique items kept in first-seen order.
///
/// Built by the transaction builder and moved into the miner. The only way to
/// add an item is [`Transaction::insert`], which rejects duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    items: Vec<Item>,
}

impl Transaction {
    /// Create an empty transaction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transaction from items, dropping repeats.
    pub fn from_items<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        let mut transaction = Self::new();
        for item in items {
            transaction.insert(item.into());
        }
        transaction
    }

    /// Append `item` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, item: Item) -> bool {
        if self.items.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Append `item` without the duplicate check. The caller guarantees that
    /// `item` is not already present.
    pub(crate) fn push_unique(&mut self, item: Item) {
        debug_assert!(!self.items.contains(&item));
        self.items.push(item);
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.items.contains(item)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_duplicates() {
        let mut tx = Transaction::new();
        assert!(tx.insert(Item::from("a")));
        assert!(tx.insert(Item::from("b")));
        assert!(!tx.insert(Item::from("a")));
        assert_eq!(tx.len(), 2);
    }

    #[test]
    fn from_items_keeps_first_seen_order() {
        let tx = Transaction::from_items(["c", "a", "c", "b", "a"]);
        let items: Vec<&str> = tx.items().iter().map(Item::as_str).collect();
        assert_eq!(items, vec!["c", "a", "b"]);
    }

    #[test]
    fn empty_transaction() {
        let tx = Transaction::new();
        assert!(tx.is_empty());
        assert!(!tx.contains(&Item::from("a")));
    }
}
