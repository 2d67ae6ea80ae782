use serde::{Deserialize, Serialize};

use super::time::DisplayTime;
use crate::error::{TimeParseError, ValidationError};

/// One reminder definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSlot {
    pub label: String,
    /// Display form, e.g. "07:00 AM". Kept verbatim so saved data round-trips.
    pub time: String,
    /// Records written before the toggle existed have no `enabled` field.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ReminderSlot {
    pub fn new(label: impl Into<String>, time: DisplayTime) -> Self {
        Self {
            label: label.into(),
            time: time.to_string(),
            enabled: true,
        }
    }

    pub fn display_time(&self) -> Result<DisplayTime, TimeParseError> {
        self.time.parse()
    }
}

/// Identifier handed back by the platform for an installed trigger, together
/// with the slot it was installed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub id: String,
    /// Position of the source slot in the full list at scheduling time.
    pub index: usize,
    pub label: String,
}

/// Ordered reminder slots as edited by the user.
///
/// Order is display order only; scheduling treats every enabled slot alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderList {
    slots: Vec<ReminderSlot>,
}

impl ReminderList {
    pub fn new(slots: Vec<ReminderSlot>) -> Self {
        Self { slots }
    }

    /// Morning, Noon, Evening and Night, all enabled.
    pub fn defaults() -> Self {
        let slot = |label: &str, time: &str| ReminderSlot {
            label: label.to_string(),
            time: time.to_string(),
            enabled: true,
        };
        Self {
            slots: vec![
                slot("Morning", "07:00 AM"),
                slot("Noon", "12:00 PM"),
                slot("Evening", "06:00 PM"),
                slot("Night", "10:00 PM"),
            ],
        }
    }

    pub fn slots(&self) -> &[ReminderSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ReminderSlot> {
        self.slots.get(index)
    }

    /// Enabled slots paired with their position in the full list.
    pub fn enabled(&self) -> impl Iterator<Item = (usize, &ReminderSlot)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.enabled)
    }

    pub fn push(&mut self, slot: ReminderSlot) {
        self.slots.push(slot);
    }

    /// Flip the enabled flag. Returns the new value.
    pub fn toggle(&mut self, index: usize) -> Result<bool, ValidationError> {
        let slot = self.slot_mut(index)?;
        slot.enabled = !slot.enabled;
        Ok(slot.enabled)
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Result<(), ValidationError> {
        self.slot_mut(index)?.enabled = enabled;
        Ok(())
    }

    pub fn set_time(&mut self, index: usize, time: DisplayTime) -> Result<(), ValidationError> {
        self.slot_mut(index)?.time = time.to_string();
        Ok(())
    }

    pub fn rename(&mut self, index: usize, label: impl Into<String>) -> Result<(), ValidationError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "label".to_string(),
                message: "label must not be empty".to_string(),
            });
        }
        self.slot_mut(index)?.label = label;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<ReminderSlot, ValidationError> {
        self.check_index(index)?;
        Ok(self.slots.remove(index))
    }

    /// Every slot's time must parse before the list is persisted.
    pub fn validate(&self) -> Result<(), TimeParseError> {
        for slot in &self.slots {
            slot.display_time()?;
        }
        Ok(())
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut ReminderSlot, ValidationError> {
        self.check_index(index)?;
        Ok(&mut self.slots[index])
    }

    fn check_index(&self, index: usize) -> Result<(), ValidationError> {
        if index >= self.slots.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "reminders".to_string(),
                index,
                len: self.slots.len(),
            });
        }
        Ok(())
    }
}

impl Default for ReminderList {
    fn default() -> Self {
        Self::defaults()
    }
}

impl From<Vec<ReminderSlot>> for ReminderList {
    fn from(slots: Vec<ReminderSlot>) -> Self {
        Self::new(slots)
    }
}
