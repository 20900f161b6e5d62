//! # notehub-client
//!
//! Typed client for the NoteHub API and the local store a UI renders from.
//!
//! - [`ApiClient`]: one method per endpoint, taking the [`Session`] explicitly
//! - [`Store`]: auth, notes, courses and groups slices driven by async actions
//! - [`view`]: note filtering, video cards and form checks

pub mod api;
pub mod error;
pub mod session;
pub mod store;
pub mod view;

pub use api::{ApiClient, FileUpload, NoteDraft, Registration};
pub use error::{ClientError, Result};
pub use session::{Session, SessionFile};
pub use store::{AuthState, CoursesState, GroupsState, LoadState, NotesState, Store};
pub use view::NoteFilters;
