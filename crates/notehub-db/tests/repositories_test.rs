//! Repository integration tests against a live PostgreSQL database.
//!
//! Every test skips when `DATABASE_URL` is not set. Users are created with
//! fresh emails so tests can share one database.

use notehub_db::test_fixtures::{unique_email, TestDatabase, FIXTURE_PASSWORD_HASH};
use notehub_db::{
    AttachmentRepository, CourseRepository, CreateCourseRequest, CreateGroupRequest,
    CreateNoteRequest, Error, FileKind, GroupRepository, NewAttachment, NewUser, NoteRepository,
    UpdateNoteRequest, UserRepository,
};
use uuid::Uuid;

macro_rules! require_db {
    () => {
        match TestDatabase::connect().await {
            Some(t) => t,
            None => return,
        }
    };
}

fn note(user_id: Uuid, title: &str, is_public: bool) -> CreateNoteRequest {
    CreateNoteRequest {
        user_id,
        title: title.to_string(),
        content: "hello".to_string(),
        tags: vec!["exam".to_string(), "exam".to_string()],
        is_public,
        course_id: None,
        group_id: None,
    }
}

#[tokio::test]
async fn test_duplicate_email_conflicts_without_second_row() {
    let t = require_db!();
    let email = unique_email("dup");
    let new_user = || NewUser {
        email: email.clone(),
        password_hash: FIXTURE_PASSWORD_HASH.to_string(),
        full_name: "Dup".to_string(),
    };

    t.db.users.insert(new_user()).await.unwrap();
    let err = t.db.users.insert(new_user()).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "{err:?}");

    // Case differences are the same account.
    let err = t
        .db
        .users
        .insert(NewUser {
            email: email.to_uppercase(),
            ..new_user()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let count = t
        .db
        .users
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.email == email)
        .count();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_find_by_email_is_case_insensitive() {
    let t = require_db!();
    let user = t.create_user("case").await;
    let found = t
        .db
        .users
        .find_by_email(&user.email.to_uppercase())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);
    assert!(t.db.users.fetch(Uuid::now_v7()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_own_and_public_listing_visibility() {
    let t = require_db!();
    let a = t.create_user("a").await;
    let b = t.create_user("b").await;

    let private = t.db.notes.insert(note(a.id, "private", false)).await.unwrap();
    let public = t.db.notes.insert(note(a.id, "public", true)).await.unwrap();

    let b_notes = t.db.notes.list_by_owner(b.id).await.unwrap();
    assert!(b_notes.is_empty());

    let a_notes = t.db.notes.list_by_owner(a.id).await.unwrap();
    assert_eq!(a_notes.len(), 2);
    // Newest first.
    assert_eq!(a_notes[0].note.id, public.id);
    assert!(a_notes.iter().all(|n| n.owner.is_none()));
    assert_eq!(a_notes[1].note.tags, vec!["exam", "exam"]);

    let feed = t.db.notes.list_public().await.unwrap();
    let public_entry = feed.iter().find(|n| n.note.id == public.id).unwrap();
    assert_eq!(public_entry.owner.as_ref().unwrap().full_name, a.full_name);
    assert!(feed.iter().all(|n| n.note.id != private.id));
}

#[tokio::test]
async fn test_course_name_joined_on_listing() {
    let t = require_db!();
    let user = t.create_user("course").await;
    let course = t
        .db
        .courses
        .insert(CreateCourseRequest {
            name: format!("Java {}", Uuid::new_v4()),
            semester: Some(2),
            teacher_name: None,
        })
        .await
        .unwrap();

    let mut req = note(user.id, "with course", false);
    req.course_id = Some(course.id);
    let created = t.db.notes.insert(req).await.unwrap();

    let full = t
        .db
        .notes
        .fetch_with_relations(created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(full.course.unwrap().name, course.name);
}

#[tokio::test]
async fn test_partial_update_and_clearing_group() {
    let t = require_db!();
    let user = t.create_user("upd").await;
    let group = t
        .db
        .groups
        .create(CreateGroupRequest {
            admin_user_id: user.id,
            name: "G".to_string(),
            description: None,
        })
        .await
        .unwrap();

    let mut req = note(user.id, "before", false);
    req.group_id = Some(group.id);
    let created = t.db.notes.insert(req).await.unwrap();

    let updated = t
        .db
        .notes
        .update(
            created.id,
            UpdateNoteRequest {
                title: Some("after".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "after");
    assert_eq!(updated.content, "hello");
    assert_eq!(updated.group_id, Some(group.id));
    assert!(updated.updated_at >= created.updated_at);

    let cleared = t
        .db
        .notes
        .update(
            created.id,
            UpdateNoteRequest {
                group_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.group_id, None);
    assert_eq!(cleared.title, "after");

    let missing = t
        .db
        .notes
        .update(Uuid::now_v7(), UpdateNoteRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(missing, Error::NotFound(_)));
}

#[tokio::test]
async fn test_delete_owned_removes_note_and_attachments() {
    let t = require_db!();
    let owner = t.create_user("owner").await;
    let other = t.create_user("other").await;

    let created = t.db.notes.insert(note(owner.id, "doomed", false)).await.unwrap();
    for name in ["a.png", "b.pdf"] {
        t.db.attachments
            .insert(NewAttachment {
                note_id: created.id,
                file_url: format!("/uploads/{}", name),
                file_type: if name.ends_with(".pdf") {
                    FileKind::Pdf
                } else {
                    FileKind::Image
                },
                original_name: name.to_string(),
            })
            .await
            .unwrap();
    }

    // Non-owner: nothing happens.
    assert!(t
        .db
        .notes
        .delete_owned(created.id, other.id)
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        t.db.attachments.list_for_note(created.id).await.unwrap().len(),
        2
    );
    assert!(t.db.notes.fetch_owned(created.id, owner.id).await.unwrap().is_some());

    let removed = t
        .db
        .notes
        .delete_owned(created.id, owner.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(removed.len(), 2);
    assert!(t.db.attachments.list_for_note(created.id).await.unwrap().is_empty());
    assert!(t.db.notes.fetch_owned(created.id, owner.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_single_attachment_requires_ownership() {
    let t = require_db!();
    let owner = t.create_user("att").await;
    let other = t.create_user("att-other").await;
    let created = t.db.notes.insert(note(owner.id, "n", false)).await.unwrap();
    let other_note = t.db.notes.insert(note(owner.id, "m", false)).await.unwrap();

    let attachment = t
        .db
        .attachments
        .insert(NewAttachment {
            note_id: created.id,
            file_url: "/uploads/x.pdf".to_string(),
            file_type: FileKind::Pdf,
            original_name: "x.pdf".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(attachment.file_type, FileKind::Pdf);

    let by_other = t
        .db
        .attachments
        .delete_owned(created.id, attachment.id, other.id)
        .await
        .unwrap();
    assert!(by_other.is_none());

    let wrong_note = t
        .db
        .attachments
        .delete_owned(other_note.id, attachment.id, owner.id)
        .await
        .unwrap();
    assert!(wrong_note.is_none());

    let removed = t
        .db
        .attachments
        .delete_owned(created.id, attachment.id, owner.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(removed.id, attachment.id);
}

#[tokio::test]
async fn test_group_membership_lifecycle() {
    let t = require_db!();
    let admin = t.create_user("admin").await;
    let member = t.create_user("member").await;

    let group = t
        .db
        .groups
        .create(CreateGroupRequest {
            admin_user_id: admin.id,
            name: "G".to_string(),
            description: Some("study".to_string()),
        })
        .await
        .unwrap();

    assert!(t.db.groups.is_member(group.id, admin.id).await.unwrap());
    let members = t.db.groups.members(group.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, admin.id);

    t.db.groups.add_member(group.id, member.id).await.unwrap();
    let dup = t.db.groups.add_member(group.id, member.id).await.unwrap_err();
    assert!(matches!(dup, Error::Conflict(_)));
    assert_eq!(t.db.groups.members(group.id).await.unwrap().len(), 2);

    // Admin sees it only under adminOf; member only under memberOf.
    let admin_of = t.db.groups.list_admin_of(admin.id).await.unwrap();
    assert!(admin_of.iter().any(|g| g.id == group.id));
    let admin_member_of = t.db.groups.list_member_of(admin.id).await.unwrap();
    assert!(admin_member_of.iter().all(|g| g.id != group.id));
    let member_of = t.db.groups.list_member_of(member.id).await.unwrap();
    assert!(member_of.iter().any(|g| g.id == group.id));

    assert!(t.db.groups.remove_member(group.id, member.id).await.unwrap());
    assert!(!t.db.groups.remove_member(group.id, member.id).await.unwrap());
    assert_eq!(t.db.groups.members(group.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_group_notes_listing() {
    let t = require_db!();
    let admin = t.create_user("gn").await;
    let group = t
        .db
        .groups
        .create(CreateGroupRequest {
            admin_user_id: admin.id,
            name: "Notes".to_string(),
            description: None,
        })
        .await
        .unwrap();

    let mut shared = note(admin.id, "shared", false);
    shared.group_id = Some(group.id);
    let shared = t.db.notes.insert(shared).await.unwrap();
    t.db.notes.insert(note(admin.id, "not shared", false)).await.unwrap();

    let listed = t.db.notes.list_by_group(group.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].note.id, shared.id);
    assert_eq!(listed[0].owner.as_ref().unwrap().id, admin.id);
}

#[tokio::test]
async fn test_course_find_or_create_is_idempotent() {
    let t = require_db!();
    let name = format!("Econometrics {}", Uuid::new_v4());

    let (first, created) = t.db.courses.find_or_create_by_name(&name).await.unwrap();
    assert!(created);
    let (second, created_again) = t.db.courses.find_or_create_by_name(&name).await.unwrap();
    assert!(!created_again);
    assert_eq!(first.id, second.id);
    assert!(t.db.courses.list().await.unwrap().iter().any(|c| c.id == first.id));

    let empty = t
        .db
        .courses
        .insert(CreateCourseRequest {
            name: "   ".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(empty, Error::InvalidInput(_)));
}
