//! Courses slice.

use notehub_core::Course;

use super::LoadState;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoursesState {
    pub items: Vec<Course>,
    pub phase: LoadState,
    pub error: Option<String>,
}

impl CoursesState {
    pub fn pending(&mut self) {
        self.phase = LoadState::Pending;
        self.error = None;
    }

    pub fn rejected(&mut self, message: String) {
        self.phase = LoadState::Rejected;
        self.error = Some(message);
    }

    pub fn loaded(&mut self, courses: Vec<Course>) {
        self.phase = LoadState::Fulfilled;
        self.items = courses;
    }

    pub fn created(&mut self, course: Course) {
        self.phase = LoadState::Fulfilled;
        self.items.push(course);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
