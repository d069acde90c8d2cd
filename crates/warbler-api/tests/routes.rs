use std::path::Path;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use warbler_api::auth::signup;
use warbler_api::router::build_router;
use warbler_api::state::{AppState, AppStateInner};
use warbler_db::Database;
use warbler_db::models::UserRow;
use warbler_db::seed::{SeedData, SeedUser};

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Reply {
    fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

/// A browser stand-in that keeps the session cookie between requests.
struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    fn new(app: &Router) -> Self {
        Self {
            app: app.clone(),
            cookie: None,
        }
    }

    async fn send(&mut self, req: Request<Body>) -> Reply {
        let resp = self.app.clone().oneshot(req).await.expect("router call");
        if let Some(set_cookie) = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default();
            self.cookie = Some(pair.to_string());
        }

        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.into_body().collect().await.expect("read body").to_bytes();
        Reply {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    async fn get(&mut self, path: &str) -> Reply {
        let mut req = Request::builder().method("GET").uri(path);
        if let Some(cookie) = &self.cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    async fn post(&mut self, path: &str, fields: &[(&str, &str)]) -> Reply {
        let body = serde_urlencoded::to_string(fields).expect("encode form");

        let mut req = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = &self.cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::from(body)).unwrap()).await
    }

    /// A POST with no body and no content type at all.
    async fn post_bare(&mut self, path: &str) -> Reply {
        let mut req = Request::builder().method("POST").uri(path);
        if let Some(cookie) = &self.cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    /// Loads a page to obtain the session's CSRF token.
    async fn csrf(&mut self) -> String {
        let page = self.get("/login").await;
        extract_csrf(&page.body).expect("csrf token on login page")
    }

    async fn login(&mut self, username: &str, password: &str) -> Reply {
        let csrf = self.csrf().await;
        self.post(
            "/login",
            &[("csrf_token", csrf.as_str()), ("username", username), ("password", password)],
        )
        .await
    }
}

fn extract_csrf(html: &str) -> Option<String> {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')? + start;
    Some(html[start..end].to_string())
}

fn test_app() -> (Router, AppState) {
    let state = AppStateInner::new(Database::open_in_memory().unwrap(), "test-secret-key");
    let app = build_router(state.clone(), Path::new("static"));
    (app, state)
}

fn add_user(state: &AppState, username: &str) -> UserRow {
    signup(
        &state.db,
        username,
        &format!("{username}@test.com"),
        "password123",
        None,
    )
    .unwrap()
}

#[tokio::test]
async fn signup_creates_user_and_logs_in() {
    let (app, state) = test_app();
    let mut browser = Browser::new(&app);

    let page = browser.get("/signup").await;
    assert_eq!(page.status, StatusCode::OK);
    let csrf = extract_csrf(&page.body).unwrap();

    let resp = browser
        .post(
            "/signup",
            &[
                ("csrf_token", csrf.as_str()),
                ("username", "lupa"),
                ("email", "lupa@dogmail.com"),
                ("password", "i-love-laura"),
                ("image_url", ""),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), "/");

    let user = state.db.get_user_by_username("lupa").unwrap().unwrap();
    assert_eq!(user.email, "lupa@dogmail.com");

    let home = browser.get("/").await;
    assert!(home.body.contains("@lupa"));
    assert!(home.body.contains("Log out"));
}

#[tokio::test]
async fn duplicate_signup_reshows_form() {
    let (app, state) = test_app();
    add_user(&state, "testuser1");
    let mut browser = Browser::new(&app);
    let csrf = browser.csrf().await;

    let resp = browser
        .post(
            "/signup",
            &[
                ("csrf_token", csrf.as_str()),
                ("username", "testuser1"),
                ("email", "different@test.com"),
                ("password", "password123"),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Username or email already taken"));
    assert_eq!(state.db.search_users(None).unwrap().len(), 1);
}

#[tokio::test]
async fn signup_without_csrf_is_rejected() {
    let (app, state) = test_app();
    let mut browser = Browser::new(&app);

    let resp = browser
        .post(
            "/signup",
            &[
                ("username", "sneaky"),
                ("email", "sneaky@test.com"),
                ("password", "password123"),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("The CSRF token is invalid."));
    assert!(state.db.get_user_by_username("sneaky").unwrap().is_none());
}

#[tokio::test]
async fn login_checks_credentials() {
    let (app, state) = test_app();
    add_user(&state, "testuser1");
    let mut browser = Browser::new(&app);

    let bad = browser.login("testuser1", "wrong-password").await;
    assert_eq!(bad.status, StatusCode::OK);
    assert!(bad.body.contains("Invalid credentials."));

    let good = browser.login("testuser1", "password123").await;
    assert_eq!(good.status, StatusCode::SEE_OTHER);

    let home = browser.get("/").await;
    assert!(home.body.contains("Hello, testuser1!"));
    // Flashes are shown once
    let again = browser.get("/").await;
    assert!(!again.body.contains("Hello, testuser1!"));
}

#[tokio::test]
async fn logout_clears_session() {
    let (app, state) = test_app();
    add_user(&state, "testuser1");
    let mut browser = Browser::new(&app);
    browser.login("testuser1", "password123").await;

    let csrf = browser.csrf().await;
    let resp = browser.post("/logout", &[("csrf_token", csrf.as_str())]).await;
    assert_eq!(resp.location(), "/");

    let home = browser.get("/").await;
    assert!(home.body.contains("You&#x27;ve successfully logged out!"));
    assert!(home.body.contains("Sign up now"));
}

#[tokio::test]
async fn protected_routes_redirect_anonymous_users() {
    let (app, state) = test_app();
    let target = add_user(&state, "testuser2");
    let msg = state.db.create_message(target.id, "still here").unwrap();
    let mut browser = Browser::new(&app);
    let csrf = browser.csrf().await;

    let resp = browser
        .post(
            &format!("/users/follow/{}", target.id),
            &[("csrf_token", csrf.as_str()), ("came-from", "/users")],
        )
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), "/");

    let home = browser.get("/").await;
    assert!(home.body.contains("Access unauthorized."));

    let following = browser.get(&format!("/users/{}/following", target.id)).await;
    assert_eq!(following.location(), "/");
    assert_eq!(browser.get(&format!("/users/{}/followers", target.id)).await.location(), "/");
    assert_eq!(
        browser.get(&format!("/users/{}/liked_messages", target.id)).await.location(),
        "/"
    );
    assert_eq!(browser.get("/messages/new").await.location(), "/");
    assert_eq!(browser.get("/users/profile").await.location(), "/");

    let posts = [
        "/logout".to_string(),
        "/users/delete".to_string(),
        "/users/profile".to_string(),
        "/messages/new".to_string(),
        format!("/users/follow/{}", target.id),
        format!("/users/stop-following/{}", target.id),
        format!("/messages/{}/delete", msg.id),
        format!("/like/{}", msg.id),
        format!("/unlike/{}", msg.id),
    ];
    for path in &posts {
        let csrf = browser.csrf().await;
        let resp = browser
            .post(path, &[("csrf_token", csrf.as_str()), ("came-from", "/users")])
            .await;
        assert_eq!(resp.status, StatusCode::SEE_OTHER, "POST {path}");
        assert_eq!(resp.location(), "/", "POST {path}");

        // No body and no content type still gets the redirect, not a 415
        let resp = browser.post_bare(path).await;
        assert_eq!(resp.status, StatusCode::SEE_OTHER, "bare POST {path}");
        assert_eq!(resp.location(), "/", "bare POST {path}");
        let home = browser.get("/").await;
        assert!(home.body.contains("Access unauthorized."), "bare POST {path}");
    }

    assert!(state.db.get_user(target.id).unwrap().is_some());
    assert!(state.db.get_message(msg.id).unwrap().is_some());
    assert!(state.db.list_followers(target.id).unwrap().is_empty());
}

#[tokio::test]
async fn logged_in_post_without_body_fails_csrf() {
    let (app, state) = test_app();
    let u1 = add_user(&state, "testuser1");
    let msg = state.db.create_message(u1.id, "keep me").unwrap();
    let mut browser = Browser::new(&app);
    browser.login("testuser1", "password123").await;

    let resp = browser.post_bare(&format!("/messages/{}/delete", msg.id)).await;
    assert_eq!(resp.location(), format!("/users/{}", u1.id));
    assert!(state.db.get_message(msg.id).unwrap().is_some());

    let resp = browser.post_bare("/users/delete").await;
    assert_eq!(resp.location(), "/signup");
    assert!(state.db.get_user(u1.id).unwrap().is_some());

    let resp = browser.post_bare("/logout").await;
    assert_eq!(resp.location(), "/");
    let home = browser.get("/").await;
    assert!(home.body.contains("Log out"));
}

#[tokio::test]
async fn following_page_lists_followed_users() {
    let (app, state) = test_app();
    let u1 = add_user(&state, "testuser1");
    let u2 = add_user(&state, "testuser2");
    add_user(&state, "bystander");
    state.db.follow(u1.id, u2.id).unwrap();

    let mut browser = Browser::new(&app);
    browser.login("testuser1", "password123").await;

    let page = browser.get(&format!("/users/{}/following", u1.id)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("@testuser2"));
    assert!(!page.body.contains("@bystander"));
    assert!(page.body.contains(&format!("/users/stop-following/{}", u2.id)));

    let page = browser.get(&format!("/users/{}/followers", u2.id)).await;
    assert!(page.body.contains("@testuser1"));
}

#[tokio::test]
async fn liked_messages_page_lists_likes() {
    let (app, state) = test_app();
    let liker = add_user(&state, "liker");
    let author = add_user(&state, "author");
    let liked = state.db.create_message(author.id, "a liked warble").unwrap();
    state.db.create_message(author.id, "an ignored warble").unwrap();
    state.db.like(liker.id, liked.id).unwrap();

    let mut browser = Browser::new(&app);
    browser.login("liker", "password123").await;

    let page = browser.get(&format!("/users/{}/liked_messages", liker.id)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("a liked warble"));
    assert!(!page.body.contains("an ignored warble"));
    assert!(page.body.contains(&format!("/unlike/{}", liked.id)));

    let missing = browser.get("/users/999/liked_messages").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn seeded_bcrypt_user_can_log_in() {
    let (app, state) = test_app();
    state
        .db
        .load_seed(&SeedData {
            users: vec![SeedUser {
                id: Some(1),
                email: "seeded@test.com".to_string(),
                username: "seeded".to_string(),
                image_url: None,
                header_image_url: None,
                bio: None,
                location: None,
                password: bcrypt::hash("password", 4).unwrap(),
            }],
            ..Default::default()
        })
        .unwrap();
    let mut browser = Browser::new(&app);

    let resp = browser.login("seeded", "password").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    let home = browser.get("/").await;
    assert!(home.body.contains("Hello, seeded!"));

    let stored = state.db.get_user(1).unwrap().unwrap();
    assert!(stored.password.starts_with("$argon2"));
}

#[tokio::test]
async fn follow_and_unfollow_through_routes() {
    let (app, state) = test_app();
    let u1 = add_user(&state, "testuser1");
    let u2 = add_user(&state, "testuser2");
    let mut browser = Browser::new(&app);
    browser.login("testuser1", "password123").await;
    let csrf = browser.csrf().await;

    let resp = browser
        .post(
            &format!("/users/follow/{}", u2.id),
            &[("csrf_token", csrf.as_str()), ("came-from", "/users?q=test")],
        )
        .await;
    assert_eq!(resp.location(), "/users?q=test");
    assert_eq!(state.db.list_following(u1.id).unwrap(), vec![u2.clone()]);
    assert_eq!(state.db.list_followers(u2.id).unwrap(), vec![u1.clone()]);

    let page = browser.get(&format!("/users/{}/followers", u2.id)).await;
    assert!(page.body.contains("You are now following testuser2!"));
    assert!(page.body.contains("@testuser1"));

    let resp = browser
        .post(
            &format!("/users/stop-following/{}", u2.id),
            &[("csrf_token", csrf.as_str()), ("came-from", "https://elsewhere.example")],
        )
        .await;
    assert_eq!(resp.location(), "/");
    assert!(state.db.list_following(u1.id).unwrap().is_empty());
    assert!(state.db.list_followers(u2.id).unwrap().is_empty());
}

#[tokio::test]
async fn follow_with_bad_csrf_changes_nothing() {
    let (app, state) = test_app();
    let u1 = add_user(&state, "testuser1");
    let u2 = add_user(&state, "testuser2");
    let mut browser = Browser::new(&app);
    browser.login("testuser1", "password123").await;

    let resp = browser
        .post(
            &format!("/users/follow/{}", u2.id),
            &[("csrf_token", "forged"), ("came-from", "/users")],
        )
        .await;
    assert_eq!(resp.location(), "/users");
    assert!(!state.db.is_following(u1.id, u2.id).unwrap());
}

#[tokio::test]
async fn follow_unknown_user_is_not_found() {
    let (app, state) = test_app();
    add_user(&state, "testuser1");
    let mut browser = Browser::new(&app);
    browser.login("testuser1", "password123").await;
    let csrf = browser.csrf().await;

    let resp = browser
        .post("/users/follow/999", &[("csrf_token", csrf.as_str()), ("came-from", "/")])
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn compose_and_delete_message() {
    let (app, state) = test_app();
    let u1 = add_user(&state, "testuser1");
    let mut browser = Browser::new(&app);
    browser.login("testuser1", "password123").await;
    let csrf = browser.csrf().await;

    let too_long = "x".repeat(141);
    let resp = browser
        .post("/messages/new", &[("csrf_token", csrf.as_str()), ("text", too_long.as_str())])
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Field cannot be longer than 140 characters."));

    let resp = browser
        .post("/messages/new", &[("csrf_token", csrf.as_str()), ("text", "Hello <world>")])
        .await;
    assert_eq!(resp.location(), format!("/users/{}", u1.id));

    let messages = state.db.messages_for_user(u1.id).unwrap();
    assert_eq!(messages.len(), 1);
    let msg = &messages[0];

    let page = browser.get(&format!("/messages/{}", msg.id)).await;
    assert!(page.body.contains("Hello &lt;world&gt;"));

    let resp = browser
        .post(&format!("/messages/{}/delete", msg.id), &[("csrf_token", csrf.as_str())])
        .await;
    assert_eq!(resp.location(), format!("/users/{}", u1.id));
    assert!(state.db.get_message(msg.id).unwrap().is_none());

    let profile = browser.get(&format!("/users/{}", u1.id)).await;
    assert!(profile.body.contains("Your Warble has been deleted."));
}

#[tokio::test]
async fn only_the_author_can_delete_a_message() {
    let (app, state) = test_app();
    let author = add_user(&state, "author");
    add_user(&state, "intruder");
    let msg = state.db.create_message(author.id, "mine").unwrap();

    let mut browser = Browser::new(&app);
    browser.login("intruder", "password123").await;
    let csrf = browser.csrf().await;

    let resp = browser
        .post(&format!("/messages/{}/delete", msg.id), &[("csrf_token", csrf.as_str())])
        .await;
    assert_eq!(resp.location(), "/");
    assert!(state.db.get_message(msg.id).unwrap().is_some());
}

#[tokio::test]
async fn like_and_unlike() {
    let (app, state) = test_app();
    let liker = add_user(&state, "liker");
    let author = add_user(&state, "author");
    let msg = state.db.create_message(author.id, "like me").unwrap();

    let mut browser = Browser::new(&app);
    browser.login("liker", "password123").await;
    let csrf = browser.csrf().await;
    let came_from = format!("/messages/{}", msg.id);

    let resp = browser
        .post(
            &format!("/like/{}", msg.id),
            &[("csrf_token", csrf.as_str()), ("came-from", came_from.as_str())],
        )
        .await;
    assert_eq!(resp.location(), came_from);
    // Liking twice keeps a single edge
    browser
        .post(
            &format!("/like/{}", msg.id),
            &[("csrf_token", csrf.as_str()), ("came-from", came_from.as_str())],
        )
        .await;
    assert_eq!(state.db.liked_message_ids(liker.id).unwrap().len(), 1);

    let page = browser.get(&came_from).await;
    assert!(page.body.contains("Warble message liked!"));
    assert!(page.body.contains(&format!("/unlike/{}", msg.id)));

    let resp = browser
        .post(
            &format!("/unlike/{}", msg.id),
            &[("csrf_token", "forged"), ("came-from", came_from.as_str())],
        )
        .await;
    assert_eq!(resp.location(), came_from);
    assert_eq!(state.db.liked_message_ids(liker.id).unwrap().len(), 1);

    browser
        .post(
            &format!("/unlike/{}", msg.id),
            &[("csrf_token", csrf.as_str()), ("came-from", came_from.as_str())],
        )
        .await;
    assert!(state.db.liked_message_ids(liker.id).unwrap().is_empty());

    // Unliking again is a silent no-op
    let resp = browser
        .post(
            &format!("/unlike/{}", msg.id),
            &[("csrf_token", csrf.as_str()), ("came-from", came_from.as_str())],
        )
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn home_feed_shows_own_and_followed_messages() {
    let (app, state) = test_app();
    let me = add_user(&state, "me");
    let friend = add_user(&state, "friend");
    let stranger = add_user(&state, "stranger");
    state.db.follow(me.id, friend.id).unwrap();
    state.db.create_message(me.id, "from me").unwrap();
    state.db.create_message(friend.id, "from friend").unwrap();
    state.db.create_message(stranger.id, "from stranger").unwrap();

    let mut browser = Browser::new(&app);
    browser.login("me", "password123").await;
    let home = browser.get("/").await;

    assert!(home.body.contains("from me"));
    assert!(home.body.contains("from friend"));
    assert!(!home.body.contains("from stranger"));
    assert!(home.body.find("from friend") < home.body.find("from me"));
}

#[tokio::test]
async fn edit_profile_requires_current_password() {
    let (app, state) = test_app();
    let u1 = add_user(&state, "testuser1");
    let mut browser = Browser::new(&app);
    browser.login("testuser1", "password123").await;

    let page = browser.get("/users/profile").await;
    assert!(page.body.contains(r#"value="testuser1@test.com""#));
    let csrf = extract_csrf(&page.body).unwrap();

    let resp = browser
        .post(
            "/users/profile",
            &[
                ("csrf_token", csrf.as_str()),
                ("username", "renamed"),
                ("email", "renamed@test.com"),
                ("bio", "Birds!"),
                ("password", "not-my-password"),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Incorrect password."));
    assert_eq!(state.db.get_user(u1.id).unwrap().unwrap().username, "testuser1");

    let resp = browser
        .post(
            "/users/profile",
            &[
                ("csrf_token", csrf.as_str()),
                ("username", "renamed"),
                ("email", "renamed@test.com"),
                ("bio", "Birds!"),
                ("password", "password123"),
            ],
        )
        .await;
    assert_eq!(resp.location(), format!("/users/{}", u1.id));
    let updated = state.db.get_user(u1.id).unwrap().unwrap();
    assert_eq!(updated.username, "renamed");
    assert_eq!(updated.bio.as_deref(), Some("Birds!"));
}

#[tokio::test]
async fn delete_account_removes_everything() {
    let (app, state) = test_app();
    let doomed = add_user(&state, "doomed");
    let other = add_user(&state, "other");
    let mine = state.db.create_message(doomed.id, "goodbye").unwrap();
    let theirs = state.db.create_message(other.id, "hello").unwrap();
    state.db.follow(doomed.id, other.id).unwrap();
    state.db.follow(other.id, doomed.id).unwrap();
    state.db.like(doomed.id, theirs.id).unwrap();
    state.db.like(other.id, mine.id).unwrap();

    let mut browser = Browser::new(&app);
    browser.login("doomed", "password123").await;
    let csrf = browser.csrf().await;

    let resp = browser.post("/users/delete", &[("csrf_token", csrf.as_str())]).await;
    assert_eq!(resp.location(), "/signup");

    assert!(state.db.get_user(doomed.id).unwrap().is_none());
    assert!(state.db.get_message(mine.id).unwrap().is_none());
    assert!(state.db.list_followers(other.id).unwrap().is_empty());
    assert!(state.db.list_following(other.id).unwrap().is_empty());
    assert!(state.db.liked_message_ids(other.id).unwrap().is_empty());

    let signup_page = browser.get("/signup").await;
    assert!(signup_page.body.contains("User successfully deleted :("));
    assert!(!signup_page.body.contains("Log out"));
}

#[tokio::test]
async fn user_search_filters_by_username() {
    let (app, state) = test_app();
    add_user(&state, "testuser1");
    add_user(&state, "testuser2");
    add_user(&state, "lupa");
    let mut browser = Browser::new(&app);

    let all = browser.get("/users").await;
    assert!(all.body.contains("@lupa"));
    assert!(all.body.contains("@testuser1"));

    let some = browser.get("/users?q=test").await;
    assert!(some.body.contains("@testuser2"));
    assert!(!some.body.contains("@lupa"));

    let none = browser.get("/users?q=zzz").await;
    assert!(none.body.contains("Sorry, no users found"));
}

#[tokio::test]
async fn missing_things_are_not_found() {
    let (app, _state) = test_app();
    let mut browser = Browser::new(&app);

    assert_eq!(browser.get("/users/42").await.status, StatusCode::NOT_FOUND);
    assert_eq!(browser.get("/messages/42").await.status, StatusCode::NOT_FOUND);
    assert_eq!(browser.get("/no/such/page").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_ids_are_not_found() {
    let (app, state) = test_app();
    add_user(&state, "testuser1");
    let mut browser = Browser::new(&app);

    assert_eq!(browser.get("/users/abc").await.status, StatusCode::NOT_FOUND);
    assert_eq!(browser.get("/messages/abc").await.status, StatusCode::NOT_FOUND);

    browser.login("testuser1", "password123").await;
    let csrf = browser.csrf().await;
    assert_eq!(browser.get("/users/abc/following").await.status, StatusCode::NOT_FOUND);
    let resp = browser
        .post("/like/abc", &[("csrf_token", csrf.as_str()), ("came-from", "/")])
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_are_not_cached() {
    let (app, _state) = test_app();
    let mut browser = Browser::new(&app);

    let resp = browser.get("/").await;
    assert_eq!(
        resp.headers.get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
        Some("no-store")
    );
}
