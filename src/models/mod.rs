//! Domain models for the notes service.
//!
//! - [`Note`]: the only persisted entity.
//! - [`CreateNoteInput`] / [`UpdateNoteInput`]: request bodies for the write routes.

mod note;

pub use note::*;
