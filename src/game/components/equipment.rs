use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{EquipmentSlot, ItemId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EquipmentError {
    #[error("the {} slot is already occupied", .0.display_name())]
    SlotOccupied(EquipmentSlot),

    #[error("nothing is equipped in the {} slot", .0.display_name())]
    SlotEmpty(EquipmentSlot),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Equipment {
    pub slots: EnumMap<EquipmentSlot, Option<ItemId>>,
}

impl Equipment {
    /// Occupied slots fail rather than swapping; the caller unequips first.
    pub fn equip(&mut self, slot: EquipmentSlot, item: ItemId) -> Result<(), EquipmentError> {
        if self.slots[slot].is_some() {
            return Err(EquipmentError::SlotOccupied(slot));
        }
        self.slots[slot] = Some(item);
        Ok(())
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Result<ItemId, EquipmentError> {
        self.slots[slot].take().ok_or(EquipmentError::SlotEmpty(slot))
    }

    pub fn get(&self, slot: EquipmentSlot) -> Option<&ItemId> {
        self.slots[slot].as_ref()
    }

    pub fn is_equipped(&self, item: &ItemId) -> bool {
        self.slots.values().any(|slot| slot.as_ref() == Some(item))
    }

    pub fn slot_of(&self, item: &ItemId) -> Option<EquipmentSlot> {
        self.slots
            .iter()
            .find(|(_, equipped)| equipped.as_ref() == Some(item))
            .map(|(slot, _)| slot)
    }

    pub fn iter_equipped(&self) -> impl Iterator<Item = (EquipmentSlot, &ItemId)> {
        self.slots
            .iter()
            .filter_map(|(slot, item)| item.as_ref().map(|item| (slot, item)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equip_occupied_slot_fails() {
        let mut equipment = Equipment::default();
        equipment
            .equip(EquipmentSlot::MainHand, ItemId::new("rusty_sword"))
            .unwrap();
        assert_eq!(
            equipment.equip(EquipmentSlot::MainHand, ItemId::new("iron_sword")),
            Err(EquipmentError::SlotOccupied(EquipmentSlot::MainHand))
        );
        assert_eq!(
            equipment.get(EquipmentSlot::MainHand),
            Some(&ItemId::new("rusty_sword"))
        );
    }

    #[test]
    fn test_unequip_round_trip() {
        let mut equipment = Equipment::default();
        assert_eq!(
            equipment.unequip(EquipmentSlot::Head),
            Err(EquipmentError::SlotEmpty(EquipmentSlot::Head))
        );

        equipment
            .equip(EquipmentSlot::Head, ItemId::new("leather_cap"))
            .unwrap();
        assert!(equipment.is_equipped(&ItemId::new("leather_cap")));
        assert_eq!(
            equipment.slot_of(&ItemId::new("leather_cap")),
            Some(EquipmentSlot::Head)
        );

        let item = equipment.unequip(EquipmentSlot::Head).unwrap();
        assert_eq!(item, ItemId::new("leather_cap"));
        assert!(!equipment.is_equipped(&ItemId::new("leather_cap")));
    }
}
