//! End-to-end API scenarios against a live PostgreSQL database.
//!
//! Every test skips when `DATABASE_URL` is not set. Users are registered
//! with fresh emails so tests can share one database.

mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{empty_request, json_request, multipart_request, pdf_bytes, TestApp};
use notehub_core::{AttachmentRepository, GroupRepository, NoteRepository, UserRepository};

macro_rules! require_app {
    () => {
        match TestApp::connect().await {
            Some(app) => app,
            None => return,
        }
    };
}

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap().to_string())
        .collect()
}

async fn create_note(app: &TestApp, token: &str, body: Value) -> Value {
    let (status, note) = app
        .send(json_request(Method::POST, "/api/notes", Some(token), body))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{note}");
    note
}

async fn create_group(app: &TestApp, token: &str, name: &str) -> String {
    let (status, group) = app
        .send(json_request(
            Method::POST,
            "/api/groups",
            Some(token),
            json!({ "name": name }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{group}");
    group["id"].as_str().unwrap().to_string()
}

async fn member_ids(app: &TestApp, token: &str, group_id: &str) -> Vec<String> {
    let (status, details) = app
        .send(empty_request(
            Method::GET,
            &format!("/api/groups/{}", group_id),
            Some(token),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{details}");
    ids(&details["members"])
}

// =============================================================================
// AUTH
// =============================================================================

#[tokio::test]
async fn test_register_login_create_and_list_scenario() {
    let app = require_app!();
    let (user_id, _, token) = app.signup("scenario").await;

    let note = create_note(
        &app,
        &token,
        json!({"title": "T1", "content": "hello", "is_public": false}),
    )
    .await;
    assert_eq!(note["title"], "T1");
    assert_eq!(note["user_id"], user_id.to_string());

    let (status, own) = app
        .send(empty_request(Method::GET, "/api/notes", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let own = own.as_array().unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0]["title"], "T1");

    let (status, feed) = app
        .send(empty_request(Method::GET, "/api/notes/public", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(feed
        .as_array()
        .unwrap()
        .iter()
        .all(|n| n["user_id"] != user_id.to_string()));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = require_app!();
    let (_, email, _) = app.signup("dup").await;

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/auth/register",
            None,
            json!({"email": email.to_uppercase(), "password": "pw123456", "full_name": "Again"}),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already in use");

    let count = app
        .state
        .db
        .users
        .list_all()
        .await
        .unwrap()
        .iter()
        .filter(|u| u.email == email)
        .count();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
    let app = require_app!();
    let (_, email, _) = app.signup("login").await;

    let attempt = |email: String, password: &str| {
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({"email": email, "password": password}),
        )
    };

    let wrong_password = app.send(attempt(email, "wrong-password")).await;
    let unknown_email = app
        .send(attempt(
            format!("ghost-{}@inst.edu", Uuid::new_v4().simple()),
            "pw123456",
        ))
        .await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password.1["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_token_identifies_user_until_expiry() {
    let app = require_app!();
    let (user_id, email, token) = app.signup("token").await;

    let claims = app.state.tokens.verify(&token).unwrap();
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.exp - claims.iat, 24 * 3600);

    let (status, profile) = app
        .send(empty_request(Method::GET, "/api/auth/profile", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"], user_id.to_string());
    assert_eq!(profile["email"], email);
    assert!(profile.get("password_hash").is_none());

    // Just inside and just past the lifetime.
    let now = Utc::now().timestamp();
    let fresh = app
        .state
        .tokens
        .issue_at(user_id, &email, now - 24 * 3600 + 60)
        .unwrap();
    let (status, _) = app
        .send(empty_request(Method::GET, "/api/auth/profile", Some(&fresh)))
        .await;
    assert_eq!(status, StatusCode::OK);

    let stale = app
        .state
        .tokens
        .issue_at(user_id, &email, now - 24 * 3600 - 1)
        .unwrap();
    let (status, _) = app
        .send(empty_request(Method::GET, "/api/auth/profile", Some(&stale)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_of_deleted_account_is_not_found() {
    let app = require_app!();
    let token = app.token_for(Uuid::now_v7(), "gone@inst.edu");
    let (status, body) = app
        .send(empty_request(Method::GET, "/api/auth/profile", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

// =============================================================================
// NOTES
// =============================================================================

#[tokio::test]
async fn test_note_visibility_between_users() {
    let app = require_app!();
    let (_, _, token_a) = app.signup("vis-a").await;
    let (_, _, token_b) = app.signup("vis-b").await;

    let private = create_note(&app, &token_a, json!({"title": "private"})).await;
    let public = create_note(
        &app,
        &token_a,
        json!({"title": "public", "is_public": "true", "tags": "exam, ch1"}),
    )
    .await;
    assert_eq!(public["is_public"], true);
    assert_eq!(public["tags"], json!(["exam", "ch1"]));

    let (_, b_notes) = app
        .send(empty_request(Method::GET, "/api/notes", Some(&token_b)))
        .await;
    assert!(b_notes.as_array().unwrap().is_empty());

    let (_, feed) = app
        .send(empty_request(Method::GET, "/api/notes/public", None))
        .await;
    let feed_ids = ids(&feed);
    assert!(feed_ids.contains(&public["id"].as_str().unwrap().to_string()));
    assert!(!feed_ids.contains(&private["id"].as_str().unwrap().to_string()));

    let entry = feed
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == public["id"])
        .unwrap();
    assert_eq!(entry["owner"]["full_name"], "vis-a");
}

#[tokio::test]
async fn test_update_applies_fields_and_checks_ownership() {
    let app = require_app!();
    let (_, _, owner) = app.signup("upd").await;
    let (_, _, other) = app.signup("upd-other").await;
    let note = create_note(&app, &owner, json!({"title": "before", "content": "c"})).await;
    let uri = format!("/api/notes/{}", note["id"].as_str().unwrap());

    let (status, updated) = app
        .send(json_request(
            Method::PUT,
            &uri,
            Some(&owner),
            json!({"title": "after", "tags": ["x", "x"]}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["title"], "after");
    assert_eq!(updated["content"], "c");
    assert_eq!(updated["tags"], json!(["x", "x"]));

    let (status, _) = app
        .send(json_request(
            Method::PUT,
            &uri,
            Some(&other),
            json!({"title": "hijack"}),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_by_non_owner_leaves_rows_untouched() {
    let app = require_app!();
    let (_, _, owner) = app.signup("del").await;
    let (_, _, other) = app.signup("del-other").await;

    let (status, note) = app
        .send(multipart_request(
            Method::POST,
            "/api/notes",
            &owner,
            &[("title", "with file")],
            Some(("notes.pdf", "application/pdf", &pdf_bytes(1024))),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{note}");
    let note_id = Uuid::parse_str(note["id"].as_str().unwrap()).unwrap();
    let uri = format!("/api/notes/{}", note_id);

    let (status, body) = app
        .send(empty_request(Method::DELETE, &uri, Some(&other)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Note not found");
    assert_eq!(
        app.state.db.attachments.list_for_note(note_id).await.unwrap().len(),
        1
    );

    let (status, body) = app
        .send(empty_request(Method::DELETE, &uri, Some(&owner)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Note deleted successfully");
    assert!(app
        .state
        .db
        .attachments
        .list_for_note(note_id)
        .await
        .unwrap()
        .is_empty());
    assert!(app
        .state
        .db
        .notes
        .fetch_with_relations(note_id)
        .await
        .unwrap()
        .is_none());
    assert_eq!(std::fs::read_dir(app.upload_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_two_megabyte_pdf_is_stored_as_pdf() {
    let app = require_app!();
    let (_, _, token) = app.signup("pdf").await;

    let (status, note) = app
        .send(multipart_request(
            Method::POST,
            "/api/notes",
            &token,
            &[
                ("title", "Lecture slides"),
                ("tags", "[\"exam\",\"ch1\"]"),
                ("is_public", "false"),
            ],
            Some(("slides.pdf", "application/pdf", &pdf_bytes(2 * 1024 * 1024))),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{note}");
    assert_eq!(note["tags"], json!(["exam", "ch1"]));

    let attachments = note["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0]["file_type"], "pdf");
    assert_eq!(attachments[0]["original_name"], "slides.pdf");

    let url = attachments[0]["file_url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/") && url.ends_with(".pdf"));
    let name = url.trim_start_matches("/uploads/");
    let stored = std::fs::metadata(app.upload_dir.path().join(name)).unwrap();
    assert_eq!(stored.len(), 2 * 1024 * 1024);
}

#[tokio::test]
async fn test_stored_extension_ignores_client_filename() {
    let app = require_app!();
    let (_, _, token) = app.signup("ext").await;

    let (status, note) = app
        .send(multipart_request(
            Method::POST,
            "/api/notes",
            &token,
            &[("title", "renamed")],
            Some(("page.html", "application/pdf", &pdf_bytes(256))),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{note}");

    let attachment = &note["attachments"][0];
    assert_eq!(attachment["file_type"], "pdf");
    assert_eq!(attachment["original_name"], "page.html");
    assert!(attachment["file_url"].as_str().unwrap().ends_with(".pdf"));
}

#[tokio::test]
async fn test_update_with_file_adds_attachment() {
    let app = require_app!();
    let (_, _, token) = app.signup("add").await;
    let (status, note) = app
        .send(multipart_request(
            Method::POST,
            "/api/notes",
            &token,
            &[("title", "n")],
            Some(("a.pdf", "application/pdf", &pdf_bytes(100))),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let note_id = note["id"].as_str().unwrap().to_string();

    let (status, updated) = app
        .send(multipart_request(
            Method::PUT,
            &format!("/api/notes/{}", note_id),
            &token,
            &[],
            Some(("b.pdf", "application/pdf", &pdf_bytes(100))),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["attachments"].as_array().unwrap().len(), 2);
    assert_eq!(updated["title"], "n");

    // Remove one attachment.
    let first = updated["attachments"][0]["id"].as_str().unwrap().to_string();
    let (status, body) = app
        .send(empty_request(
            Method::DELETE,
            &format!("/api/notes/{}/attachments/{}", note_id, first),
            Some(&token),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Attachment deleted successfully");

    let (status, _) = app
        .send(empty_request(
            Method::DELETE,
            &format!("/api/notes/{}/attachments/{}", note_id, first),
            Some(&token),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_note_group_assignment_requires_membership() {
    let app = require_app!();
    let (_, _, admin) = app.signup("assign-admin").await;
    let (_, _, outsider) = app.signup("assign-out").await;
    let group_id = create_group(&app, &admin, "G").await;

    let (status, _) = app
        .send(json_request(
            Method::POST,
            "/api/notes",
            Some(&outsider),
            json!({"title": "sneaky", "group_id": group_id}),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let shared = create_note(&app, &admin, json!({"title": "shared", "group_id": group_id})).await;
    assert_eq!(shared["group_id"], group_id.as_str());
}

#[tokio::test]
async fn test_removed_member_can_still_edit_own_group_note() {
    let app = require_app!();
    let (_, _, admin) = app.signup("left-admin").await;
    let (b_id, b_email, token_b) = app.signup("left-b").await;
    let group_id = create_group(&app, &admin, "G").await;

    let (status, _) = app
        .send(json_request(
            Method::POST,
            &format!("/api/groups/{}/invite", group_id),
            Some(&admin),
            json!({ "email": b_email }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let note = create_note(
        &app,
        &token_b,
        json!({"title": "draft", "content": "c", "group_id": group_id}),
    )
    .await;
    let other = create_note(&app, &token_b, json!({"title": "private"})).await;

    let (status, _) = app
        .send(empty_request(
            Method::DELETE,
            &format!("/api/groups/{}/members/{}", group_id, b_id),
            Some(&admin),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    // The full draft is sent back, unchanged group included.
    let (status, updated) = app
        .send(json_request(
            Method::PUT,
            &format!("/api/notes/{}", note["id"].as_str().unwrap()),
            Some(&token_b),
            json!({
                "title": "final",
                "content": "c",
                "tags": [],
                "is_public": false,
                "course_id": null,
                "group_id": group_id,
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["title"], "final");
    assert_eq!(updated["group_id"], group_id.as_str());

    // Moving another note into the group still needs membership.
    let (status, body) = app
        .send(json_request(
            Method::PUT,
            &format!("/api/notes/{}", other["id"].as_str().unwrap()),
            Some(&token_b),
            json!({ "group_id": group_id }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You are not a member of this group");
}

// =============================================================================
// COURSES
// =============================================================================

#[tokio::test]
async fn test_course_create_and_list() {
    let app = require_app!();
    let (_, _, token) = app.signup("course").await;
    let name = format!("Econometrics {}", Uuid::new_v4());

    let (status, course) = app
        .send(json_request(
            Method::POST,
            "/api/courses",
            Some(&token),
            json!({"name": name, "semester": 2, "teacher_name": "Prof"}),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{course}");

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/courses",
            Some(&token),
            json!({"name": "  "}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Course name is required");

    let (status, list) = app
        .send(empty_request(Method::GET, "/api/courses", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(ids(&list).contains(&course["id"].as_str().unwrap().to_string()));

    let note = create_note(
        &app,
        &token,
        json!({"title": "with course", "course_id": course["id"]}),
    )
    .await;
    assert_eq!(note["course"]["name"], name);
}

// =============================================================================
// GROUPS
// =============================================================================

#[tokio::test]
async fn test_group_invite_and_remove_scenario() {
    let app = require_app!();
    let (a_id, _, token_a) = app.signup("grp-a").await;
    let (b_id, b_email, token_b) = app.signup("grp-b").await;
    let group_id = create_group(&app, &token_a, "G").await;

    let (_, details) = app
        .send(empty_request(
            Method::GET,
            &format!("/api/groups/{}", group_id),
            Some(&token_a),
        ))
        .await;
    assert_eq!(details["is_admin"], true);
    assert_eq!(details["admin"]["id"], a_id.to_string());
    assert_eq!(ids(&details["members"]), vec![a_id.to_string()]);

    let invite = |email: &str, token: &str| {
        json_request(
            Method::POST,
            &format!("/api/groups/{}/invite", group_id),
            Some(token),
            json!({ "email": email }),
        )
    };

    let (status, member) = app.send(invite(&b_email, &token_a)).await;
    assert_eq!(status, StatusCode::CREATED, "{member}");
    assert_eq!(member["id"], b_id.to_string());
    assert_eq!(member["email"], b_email);

    let (status, body) = app.send(invite(&b_email, &token_a)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User is already a member of this group");

    let (status, _) = app
        .send(invite(
            &format!("nobody-{}@inst.edu", Uuid::new_v4().simple()),
            &token_a,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let members = member_ids(&app, &token_a, &group_id).await;
    assert_eq!(members.len(), 2);
    assert!(members.contains(&b_id.to_string()));

    // B sees the group under memberOf and gets a non-admin view.
    let (_, groups) = app
        .send(empty_request(Method::GET, "/api/groups", Some(&token_b)))
        .await;
    assert!(ids(&groups["memberOf"]).contains(&group_id));
    assert!(ids(&groups["adminOf"]).is_empty());
    let (_, b_view) = app
        .send(empty_request(
            Method::GET,
            &format!("/api/groups/{}", group_id),
            Some(&token_b),
        ))
        .await;
    assert_eq!(b_view["is_admin"], false);

    let (status, _) = app
        .send(empty_request(
            Method::DELETE,
            &format!("/api/groups/{}/members/{}", group_id, b_id),
            Some(&token_a),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        member_ids(&app, &token_a, &group_id).await,
        vec![a_id.to_string()]
    );

    // Removing again is not an error.
    let (status, _) = app
        .send(empty_request(
            Method::DELETE,
            &format!("/api/groups/{}/members/{}", group_id, b_id),
            Some(&token_a),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_only_admin_manages_membership() {
    let app = require_app!();
    let (a_id, _, token_a) = app.signup("adm-a").await;
    let (b_id, b_email, token_b) = app.signup("adm-b").await;
    let (_, c_email, _) = app.signup("adm-c").await;
    let group_id = create_group(&app, &token_a, "G").await;
    let group_uuid = Uuid::parse_str(&group_id).unwrap();

    let (status, _) = app
        .send(json_request(
            Method::POST,
            &format!("/api/groups/{}/invite", group_id),
            Some(&token_a),
            json!({ "email": b_email }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Member B cannot invite C or remove anyone.
    let (status, _) = app
        .send(json_request(
            Method::POST,
            &format!("/api/groups/{}/invite", group_id),
            Some(&token_b),
            json!({ "email": c_email }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for target in [a_id, b_id] {
        let (status, _) = app
            .send(empty_request(
                Method::DELETE,
                &format!("/api/groups/{}/members/{}", group_id, target),
                Some(&token_b),
            ))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
    assert_eq!(app.state.db.groups.members(group_uuid).await.unwrap().len(), 2);

    // Not even the admin can remove the admin.
    let (status, body) = app
        .send(empty_request(
            Method::DELETE,
            &format!("/api/groups/{}/members/{}", group_id, a_id),
            Some(&token_a),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "The group admin cannot be removed");
    assert!(app.state.db.groups.is_member(group_uuid, a_id).await.unwrap());
}

#[tokio::test]
async fn test_group_notes_forbidden_to_outsiders() {
    let app = require_app!();
    let (_, _, admin) = app.signup("gn-admin").await;
    let (_, _, outsider) = app.signup("gn-out").await;
    let group_id = create_group(&app, &admin, "Readers").await;

    let shared = create_note(&app, &admin, json!({"title": "shared", "group_id": group_id})).await;
    create_note(&app, &admin, json!({"title": "mine"})).await;

    let (status, notes) = app
        .send(empty_request(
            Method::GET,
            &format!("/api/groups/{}/notes", group_id),
            Some(&admin),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&notes), vec![shared["id"].as_str().unwrap().to_string()]);
    assert_eq!(notes[0]["owner"]["full_name"], "gn-admin");

    let (status, body) = app
        .send(empty_request(
            Method::GET,
            &format!("/api/groups/{}/notes", group_id),
            Some(&outsider),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, _) = app
        .send(empty_request(
            Method::GET,
            &format!("/api/groups/{}", group_id),
            Some(&outsider),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(empty_request(
            Method::GET,
            &format!("/api/groups/{}/notes", Uuid::now_v7()),
            Some(&admin),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
