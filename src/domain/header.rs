use serde::{Deserialize, Serialize};

/// Free-text header of the batch form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormHeader {
    pub sender_name: String,
    /// Seal number ("lacre") identifying the batch
    pub seal_number: String,
    pub note: Option<String>,
}

impl FormHeader {
    pub fn new(sender_name: impl Into<String>, seal_number: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
            seal_number: seal_number.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.trim().is_empty() { None } else { Some(note) };
        self
    }

    pub fn has_sender(&self) -> bool {
        !self.sender_name.trim().is_empty()
    }

    pub fn has_seal_number(&self) -> bool {
        !self.seal_number.trim().is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
