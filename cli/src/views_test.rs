use super::*;

fn alice() -> User {
    User::new("alice", "alice@example.com")
}

// =============================================================
// View::for_session
// =============================================================

#[test]
fn nothing_renders_before_initialize() {
    assert_eq!(View::for_session(&Session::default()), None);
}

#[test]
fn nothing_renders_while_loading() {
    assert_eq!(View::for_session(&Session::loading("tok")), None);
}

#[test]
fn signed_out_session_routes_to_login() {
    assert_eq!(View::for_session(&Session::unauthenticated()), Some(View::Login));
}

#[test]
fn authenticated_session_routes_to_dashboard() {
    let session = Session::authenticated("tok", alice());
    assert_eq!(View::for_session(&session), Some(View::Dashboard(&alice())));
}

#[test]
fn authenticated_flag_without_user_routes_to_login() {
    let mut session = Session::authenticated("tok", alice());
    session.user = None;
    assert_eq!(View::for_session(&session), Some(View::Login));
}

// =============================================================
// render
// =============================================================

#[test]
fn dashboard_greets_user_and_shows_details() {
    let user = alice();
    let text = View::Dashboard(&user).render();
    assert!(text.contains("Welcome, alice!"));
    assert!(text.contains("Username: alice"));
    assert!(text.contains("Email: alice@example.com"));
    assert!(text.contains("Sample Visualization"));
}

#[test]
fn login_view_has_no_user_content() {
    let text = View::Login.render();
    assert!(text.contains("not signed in"));
    assert!(!text.contains("Welcome"));
}
