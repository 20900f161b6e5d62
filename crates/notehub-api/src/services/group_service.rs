//! Study groups: creation, membership and shared notes.

use tracing::info;
use uuid::Uuid;

use notehub_core::{
    normalize_email, CreateGroupRequest, Error, GroupDetails, GroupRepository, MemberInfo,
    NoteRepository, NoteWithRelations, Result, StudyGroup, UserGroups, UserRepository,
};
use notehub_db::Database;

const GROUP_NOT_FOUND: &str = "Group not found";

#[derive(Clone)]
pub struct GroupService {
    db: Database,
}

impl GroupService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Groups the user administers, and the other groups they belong to.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<UserGroups> {
        Ok(UserGroups {
            admin_of: self.db.groups.list_admin_of(user_id).await?,
            member_of: self.db.groups.list_member_of(user_id).await?,
        })
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        description: Option<String>,
    ) -> Result<StudyGroup> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Group name is required".to_string()));
        }
        self.db
            .groups
            .create(CreateGroupRequest {
                admin_user_id: user_id,
                name: name.to_string(),
                description: description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
            })
            .await
    }

    pub async fn details(&self, user_id: Uuid, group_id: Uuid) -> Result<GroupDetails> {
        let group = self.require_group(group_id).await?;
        self.ensure_can_view(&group, user_id).await?;

        let admin = self
            .db
            .users
            .fetch(group.admin_user_id)
            .await?
            .ok_or_else(|| Error::Internal(format!("Group {} has no admin row", group.id)))?;
        let members = self.db.groups.members(group_id).await?;

        Ok(GroupDetails {
            is_admin: group.admin_user_id == user_id,
            admin: admin.to_summary(),
            members,
            group,
        })
    }

    /// Add the user with `email` to the group. Admin only.
    pub async fn invite(&self, user_id: Uuid, group_id: Uuid, email: &str) -> Result<MemberInfo> {
        let group = self.require_group(group_id).await?;
        ensure_admin(&group, user_id, "Only the group admin can invite members")?;

        if email.trim().is_empty() {
            return Err(Error::InvalidInput("Email is required".to_string()));
        }
        let invitee = self
            .db
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| Error::NotFound("User with this email not found".to_string()))?;

        let membership = self.db.groups.add_member(group_id, invitee.id).await?;
        info!(
            subsystem = "api",
            component = "groups",
            op = "invite",
            group_id = %group_id,
            user_id = %invitee.id,
            "Member added"
        );

        Ok(MemberInfo {
            id: invitee.id,
            email: invitee.email,
            full_name: invitee.full_name,
            joined_at: membership.joined_at,
        })
    }

    /// Remove a member. Admin only; the admin can never be removed.
    /// Removing someone who is not a member succeeds.
    pub async fn remove_member(&self, user_id: Uuid, group_id: Uuid, member_id: Uuid) -> Result<()> {
        let group = self.require_group(group_id).await?;
        ensure_admin(&group, user_id, "Only the group admin can remove members")?;

        if member_id == group.admin_user_id {
            return Err(Error::InvalidInput(
                "The group admin cannot be removed".to_string(),
            ));
        }

        let removed = self.db.groups.remove_member(group_id, member_id).await?;
        info!(
            subsystem = "api",
            component = "groups",
            op = "remove_member",
            group_id = %group_id,
            user_id = %member_id,
            removed,
            "Member removal processed"
        );
        Ok(())
    }

    /// Notes shared into the group. Members and the admin only.
    pub async fn list_notes(&self, user_id: Uuid, group_id: Uuid) -> Result<Vec<NoteWithRelations>> {
        let group = self.require_group(group_id).await?;
        self.ensure_can_view(&group, user_id).await?;
        self.db.notes.list_by_group(group_id).await
    }

    async fn require_group(&self, group_id: Uuid) -> Result<StudyGroup> {
        self.db
            .groups
            .fetch(group_id)
            .await?
            .ok_or_else(|| Error::NotFound(GROUP_NOT_FOUND.to_string()))
    }

    async fn ensure_can_view(&self, group: &StudyGroup, user_id: Uuid) -> Result<()> {
        if group.admin_user_id == user_id || self.db.groups.is_member(group.id, user_id).await? {
            Ok(())
        } else {
            Err(Error::Forbidden(
                "You are not a member of this group".to_string(),
            ))
        }
    }
}

fn ensure_admin(group: &StudyGroup, user_id: Uuid, message: &str) -> Result<()> {
    if group.admin_user_id == user_id {
        Ok(())
    } else {
        Err(Error::Forbidden(message.to_string()))
    }
}
