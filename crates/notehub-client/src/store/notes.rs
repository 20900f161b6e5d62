//! Notes slice: the user's notes, the community feed, selection and filters.

use uuid::Uuid;

use notehub_core::NoteWithRelations;

use super::LoadState;
use crate::view::{filter_notes, NoteFilters};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotesState {
    pub items: Vec<NoteWithRelations>,
    pub public_items: Vec<NoteWithRelations>,
    pub selected: Option<NoteWithRelations>,
    pub filters: NoteFilters,
    pub phase: LoadState,
    pub error: Option<String>,
}

impl NotesState {
    pub fn pending(&mut self) {
        self.phase = LoadState::Pending;
        self.error = None;
    }

    pub fn rejected(&mut self, message: String) {
        self.phase = LoadState::Rejected;
        self.error = Some(message);
    }

    pub fn loaded(&mut self, notes: Vec<NoteWithRelations>) {
        self.phase = LoadState::Fulfilled;
        self.items = notes;
    }

    pub fn public_loaded(&mut self, notes: Vec<NoteWithRelations>) {
        self.phase = LoadState::Fulfilled;
        self.public_items = notes;
    }

    /// Newest first, so a created note goes to the front.
    pub fn created(&mut self, note: NoteWithRelations) {
        self.phase = LoadState::Fulfilled;
        self.items.insert(0, note);
    }

    pub fn updated(&mut self, note: NoteWithRelations) {
        self.phase = LoadState::Fulfilled;
        let id = note.note.id;
        if let Some(slot) = self.items.iter_mut().find(|n| n.note.id == id) {
            *slot = note.clone();
        }
        if self.selected.as_ref().map(|n| n.note.id) == Some(id) {
            self.selected = Some(note);
        }
    }

    pub fn deleted(&mut self, note_id: Uuid) {
        self.phase = LoadState::Fulfilled;
        self.items.retain(|n| n.note.id != note_id);
        self.public_items.retain(|n| n.note.id != note_id);
        if self.selected.as_ref().map(|n| n.note.id) == Some(note_id) {
            self.selected = None;
        }
    }

    pub fn attachment_deleted(&mut self, note_id: Uuid, attachment_id: Uuid) {
        self.phase = LoadState::Fulfilled;
        let notes = self.items.iter_mut().chain(self.selected.iter_mut());
        for note in notes.filter(|n| n.note.id == note_id) {
            note.attachments.retain(|a| a.id != attachment_id);
        }
    }

    pub fn select(&mut self, note: NoteWithRelations) {
        self.selected = Some(note);
    }

    pub fn clear_selected(&mut self) {
        self.selected = None;
    }

    pub fn set_filters(&mut self, filters: NoteFilters) {
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters = NoteFilters::default();
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// The user's notes that pass the current filters.
    pub fn visible(&self) -> Vec<&NoteWithRelations> {
        filter_notes(&self.items, &self.filters)
    }
}
