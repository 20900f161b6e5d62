//! Groups slice: group lists plus the group currently open.

use uuid::Uuid;

use notehub_core::{GroupDetails, MemberInfo, NoteWithRelations, StudyGroup, UserGroups};

use super::LoadState;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupsState {
    pub admin_of: Vec<StudyGroup>,
    pub member_of: Vec<StudyGroup>,
    pub selected: Option<GroupDetails>,
    pub group_notes: Vec<NoteWithRelations>,
    pub phase: LoadState,
    pub error: Option<String>,
}

impl GroupsState {
    pub fn pending(&mut self) {
        self.phase = LoadState::Pending;
        self.error = None;
    }

    pub fn rejected(&mut self, message: String) {
        self.phase = LoadState::Rejected;
        self.error = Some(message);
    }

    /// Store both lists, dropping from `member_of` anything already in
    /// `admin_of`.
    pub fn loaded(&mut self, groups: UserGroups) {
        self.phase = LoadState::Fulfilled;
        let UserGroups {
            admin_of,
            mut member_of,
        } = groups;
        member_of.retain(|g| !admin_of.iter().any(|a| a.id == g.id));
        self.admin_of = admin_of;
        self.member_of = member_of;
    }

    pub fn created(&mut self, group: StudyGroup) {
        self.phase = LoadState::Fulfilled;
        self.admin_of.push(group);
    }

    /// Open a group. Notes from a previously open group are dropped.
    pub fn details_loaded(&mut self, details: GroupDetails) {
        self.phase = LoadState::Fulfilled;
        if self.selected.as_ref().map(|d| d.group.id) != Some(details.group.id) {
            self.group_notes.clear();
        }
        self.selected = Some(details);
    }

    pub fn notes_loaded(&mut self, notes: Vec<NoteWithRelations>) {
        self.phase = LoadState::Fulfilled;
        self.group_notes = notes;
    }

    pub fn member_added(&mut self, group_id: Uuid, member: MemberInfo) {
        self.phase = LoadState::Fulfilled;
        if let Some(details) = self.selected.as_mut().filter(|d| d.group.id == group_id) {
            if !details.members.iter().any(|m| m.id == member.id) {
                details.members.push(member);
            }
        }
    }

    pub fn member_removed(&mut self, group_id: Uuid, member_id: Uuid) {
        self.phase = LoadState::Fulfilled;
        if let Some(details) = self.selected.as_mut().filter(|d| d.group.id == group_id) {
            details.members.retain(|m| m.id != member_id);
        }
    }

    pub fn close(&mut self) {
        self.selected = None;
        self.group_notes.clear();
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn group(name: &str) -> StudyGroup {
        StudyGroup {
            id: Uuid::now_v7(),
            name: name.to_string(),
            description: None,
            admin_user_id: Uuid::now_v7(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_loaded_deduplicates_member_of() {
        let owned = group("owned");
        let joined = group("joined");
        let mut state = GroupsState::default();
        state.loaded(UserGroups {
            admin_of: vec![owned.clone()],
            member_of: vec![owned.clone(), joined.clone()],
        });
        assert_eq!(state.admin_of, vec![owned]);
        assert_eq!(state.member_of, vec![joined]);
    }

    #[test]
    fn test_member_changes_only_touch_the_open_group() {
        let g = group("g");
        let admin = notehub_core::UserSummary {
            id: g.admin_user_id,
            email: "a@inst.edu".to_string(),
            full_name: "A".to_string(),
        };
        let mut state = GroupsState::default();
        state.details_loaded(GroupDetails {
            group: g.clone(),
            admin,
            members: vec![],
            is_admin: true,
        });

        let member = MemberInfo {
            id: Uuid::now_v7(),
            email: "b@inst.edu".to_string(),
            full_name: "B".to_string(),
            joined_at: Utc::now(),
        };
        state.member_added(Uuid::now_v7(), member.clone());
        assert!(state.selected.as_ref().unwrap().members.is_empty());

        state.member_added(g.id, member.clone());
        state.member_added(g.id, member.clone());
        assert_eq!(state.selected.as_ref().unwrap().members.len(), 1);

        state.member_removed(g.id, member.id);
        assert!(state.selected.as_ref().unwrap().members.is_empty());
    }
}
