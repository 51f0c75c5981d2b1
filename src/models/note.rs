use serde::{Deserialize, Serialize};

/// A note stored in the `notes` table.
///
/// `id` and `created_at` are assigned by storage. Responses that echo a
/// request payload rather than a stored row carry an empty `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// RFC 3339 timestamp, or empty when the note was not read from storage.
    pub created_at: String,
}

/// Input for creating a note. Missing fields decode as empty strings.
///
/// `created_at` is never written to storage; it is only echoed back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateNoteInput {
    pub title: String,
    pub content: String,
    pub created_at: String,
}

/// Input for updating a note.
///
/// An empty `title` or `content` leaves that column unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateNoteInput {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Echoed back unchanged; the stored timestamp is never modified.
    pub created_at: String,
}

impl UpdateNoteInput {
    pub fn updates_title(&self) -> bool {
        !self.title.is_empty()
    }

    pub fn updates_content(&self) -> bool {
        !self.content.is_empty()
    }
}

impl From<UpdateNoteInput> for Note {
    fn from(input: UpdateNoteInput) -> Self {
        Note {
            id: input.id,
            title: input.title,
            content: input.content,
            created_at: input.created_at,
        }
    }
}
