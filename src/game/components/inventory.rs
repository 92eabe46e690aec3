use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::ItemId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("inventory is full")]
    Full,

    #[error("not enough items")]
    NotEnoughItems,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub item: ItemId,
    pub quantity: u32,
}

/// Ordered list of item stacks. Order is stable across mutation so numbered
/// displays and fuzzy matching stay consistent between commands.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    pub entries: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn count(&self, item: &ItemId) -> u32 {
        self.entries
            .iter()
            .filter(|entry| &entry.item == item)
            .map(|entry| entry.quantity)
            .sum()
    }

    pub fn has(&self, item: &ItemId, quantity: u32) -> bool {
        self.count(item) >= quantity
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stackable items merge onto an existing entry; everything else appends
    /// one entry per unit. Fails without mutating when the entry cap would be
    /// exceeded.
    pub fn try_add(
        &mut self,
        item: &ItemId,
        quantity: u32,
        stackable: bool,
        capacity: usize,
    ) -> Result<(), InventoryError> {
        if quantity == 0 {
            return Ok(());
        }

        if stackable {
            if let Some(entry) = self.entries.iter_mut().find(|entry| &entry.item == item) {
                entry.quantity += quantity;
                return Ok(());
            }
            if self.entries.len() >= capacity {
                return Err(InventoryError::Full);
            }
            self.entries.push(InventoryEntry {
                item: item.clone(),
                quantity,
            });
            Ok(())
        } else {
            if self.entries.len() + quantity as usize > capacity {
                return Err(InventoryError::Full);
            }
            for _ in 0..quantity {
                self.entries.push(InventoryEntry {
                    item: item.clone(),
                    quantity: 1,
                });
            }
            Ok(())
        }
    }

    /// Removes exactly `quantity`, or fails without mutating.
    pub fn try_remove(&mut self, item: &ItemId, quantity: u32) -> Result<(), InventoryError> {
        if !self.has(item, quantity) {
            return Err(InventoryError::NotEnoughItems);
        }

        let mut remaining = quantity;
        for entry in self.entries.iter_mut() {
            if &entry.item != item || remaining == 0 {
                continue;
            }
            let taken = entry.quantity.min(remaining);
            entry.quantity -= taken;
            remaining -= taken;
        }
        self.entries.retain(|entry| entry.quantity > 0);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAP: usize = 4;

    #[test]
    fn test_stackable_items_merge() {
        let mut inventory = Inventory::default();
        inventory.try_add(&ItemId::new("thyme"), 2, true, CAP).unwrap();
        inventory.try_add(&ItemId::new("thyme"), 3, true, CAP).unwrap();
        assert_eq!(inventory.entries.len(), 1);
        assert_eq!(inventory.count(&ItemId::new("thyme")), 5);
    }

    #[test]
    fn test_unstackable_items_append() {
        let mut inventory = Inventory::default();
        inventory
            .try_add(&ItemId::new("rusty_sword"), 2, false, CAP)
            .unwrap();
        assert_eq!(inventory.entries.len(), 2);
        assert_eq!(inventory.count(&ItemId::new("rusty_sword")), 2);
    }

    #[test]
    fn test_capacity_enforced_without_mutation() {
        let mut inventory = Inventory::default();
        for n in 0..CAP {
            inventory
                .try_add(&ItemId::new(format!("item{n}")), 1, true, CAP)
                .unwrap();
        }
        assert_eq!(
            inventory.try_add(&ItemId::new("one_more"), 1, true, CAP),
            Err(InventoryError::Full)
        );
        assert_eq!(inventory.entries.len(), CAP);
        // A stack that already exists still accepts quantity.
        assert!(inventory.try_add(&ItemId::new("item0"), 5, true, CAP).is_ok());
    }

    #[test]
    fn test_remove_exact_or_nothing() {
        let mut inventory = Inventory::default();
        inventory.try_add(&ItemId::new("thyme"), 2, true, CAP).unwrap();
        assert_eq!(
            inventory.try_remove(&ItemId::new("thyme"), 3),
            Err(InventoryError::NotEnoughItems)
        );
        assert_eq!(inventory.count(&ItemId::new("thyme")), 2);

        inventory.try_remove(&ItemId::new("thyme"), 2).unwrap();
        assert!(inventory.is_empty());
    }
}
