//! HTML rendering. Plain string building; every interpolated value from the
//! database or a form goes through [`escape`].

use std::collections::HashSet;
use std::fmt::Write;

use warbler_db::models::{MessageRow, UserRow, UserStats};
use warbler_types::forms::{
    EditProfileForm, FieldErrors, LoginForm, MAX_MESSAGE_LEN, MessageForm, SignupForm,
};
use warbler_types::session::Flash;

/// Who is looking at a page, and what their buttons should say.
pub struct Viewer<'a> {
    pub user: Option<&'a UserRow>,
    pub csrf: &'a str,
    pub following: &'a HashSet<i64>,
    pub liked: &'a HashSet<i64>,
    /// Where follow/like buttons send the browser back to.
    pub came_from: &'a str,
}

impl Viewer<'_> {
    fn is(&self, user_id: i64) -> bool {
        self.user.is_some_and(|u| u.id == user_id)
    }
}

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn layout(
    title: &str,
    user: Option<&UserRow>,
    flashes: &[Flash],
    csrf: &str,
    body: &str,
) -> String {
    let nav = match user {
        Some(u) => format!(
            r#"<li><a href="/users/{id}"><img src="{img}" alt="{name}">{name}</a></li>
        <li><a href="/messages/new">New Message</a></li>
        <li>
          <form method="POST" action="/logout">
            {csrf}
            <button class="btn btn-link">Log out</button>
          </form>
        </li>"#,
            id = u.id,
            img = escape(&u.image_url),
            name = escape(&u.username),
            csrf = csrf_input(csrf),
        ),
        None => r#"<li><a href="/signup">Sign up</a></li>
        <li><a href="/login">Log in</a></li>"#
            .to_string(),
    };

    let mut flash_html = String::new();
    for flash in flashes {
        let _ = write!(
            flash_html,
            r#"<div class="alert alert-{}">{}</div>"#,
            flash.category.as_str(),
            escape(&flash.message)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>{title} | Warbler</title>
  <link rel="stylesheet" href="/static/stylesheets/style.css">
</head>
<body>
  <nav class="navbar">
    <a href="/" class="navbar-brand">Warbler</a>
    <form class="navbar-form" action="/users">
      <input name="q" placeholder="Search Warbler">
      <button class="btn">Search</button>
    </form>
    <ul class="nav">
        {nav}
    </ul>
  </nav>
  <div class="container">
    {flash_html}
    {body}
  </div>
</body>
</html>"#,
        title = escape(title),
    )
}

/// Minimal page for error responses rendered without a session.
pub fn bare_page(status: u16, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>{status} | Warbler</title></head>
<body>
  <h1>{status}</h1>
  <p>{message}</p>
  <p><a href="/">Back to Warbler</a></p>
</body>
</html>"#,
        message = escape(message),
    )
}

fn csrf_input(csrf: &str) -> String {
    format!(
        r#"<input type="hidden" name="csrf_token" value="{}">"#,
        escape(csrf)
    )
}

fn errors_for(errors: &FieldErrors, field: &str) -> String {
    errors
        .for_field(field)
        .map(|m| format!(r#"<span class="text-danger">{}</span>"#, escape(m)))
        .collect()
}

fn input(errors: &FieldErrors, kind: &str, name: &str, label: &str, value: &str) -> String {
    format!(
        r#"<div class="form-group">
      <input type="{kind}" name="{name}" placeholder="{label}" value="{value}" class="form-control">
      {errs}
    </div>"#,
        value = escape(value),
        errs = errors_for(errors, name),
    )
}

fn form_page(heading: &str, action: &str, csrf: &str, errors: &FieldErrors, fields: &str, button: &str) -> String {
    format!(
        r#"<div class="row justify-content-md-center">
  <div class="col-md-7 col-lg-5">
    <h2 class="join-message">{heading}</h2>
    <form method="POST" action="{action}" id="user_form">
      {csrf}
      {csrf_errs}
      {fields}
      <button class="btn btn-primary btn-lg btn-block">{button}</button>
    </form>
  </div>
</div>"#,
        csrf = csrf_input(csrf),
        csrf_errs = errors_for(errors, "csrf_token"),
    )
}

pub fn signup_page(form: &SignupForm, errors: &FieldErrors, csrf: &str) -> String {
    let fields = [
        input(errors, "text", "username", "Username", &form.username),
        input(errors, "email", "email", "E-mail", &form.email),
        input(errors, "password", "password", "Password", ""),
        input(errors, "text", "image_url", "(Optional) Image URL", &form.image_url),
    ]
    .concat();
    form_page("Join Warbler today.", "/signup", csrf, errors, &fields, "Sign me up!")
}

pub fn login_page(form: &LoginForm, errors: &FieldErrors, csrf: &str) -> String {
    let fields = [
        input(errors, "text", "username", "Username", &form.username),
        input(errors, "password", "password", "Password", ""),
    ]
    .concat();
    form_page("Welcome back.", "/login", csrf, errors, &fields, "Log in")
}

pub fn edit_profile_page(form: &EditProfileForm, errors: &FieldErrors, csrf: &str) -> String {
    let fields = [
        input(errors, "text", "username", "Username", &form.username),
        input(errors, "email", "email", "E-mail", &form.email),
        input(errors, "text", "image_url", "(Optional) Image URL", &form.image_url),
        input(errors, "text", "header_image_url", "(Optional) Header Image URL", &form.header_image_url),
        input(errors, "text", "location", "(Optional) Location", &form.location),
        format!(
            r#"<div class="form-group">
      <textarea name="bio" placeholder="(Optional) Tell us about yourself" class="form-control">{}</textarea>
      {}
    </div>"#,
            escape(&form.bio),
            errors_for(errors, "bio"),
        ),
        "<p>To confirm changes, enter your password:</p>".to_string(),
        input(errors, "password", "password", "Password", ""),
    ]
    .concat();

    let mut page = form_page("Edit Your Profile.", "/users/profile", csrf, errors, &fields, "Edit this user!");
    let _ = write!(
        page,
        r#"
<form method="POST" action="/users/delete" class="delete-account">
  {}
  <button class="btn btn-outline-danger">Delete Profile</button>
</form>"#,
        csrf_input(csrf)
    );
    page
}

pub fn new_message_page(form: &MessageForm, errors: &FieldErrors, csrf: &str) -> String {
    format!(
        r#"<div class="row justify-content-md-center">
  <div class="col-md-7 col-lg-5">
    <form method="POST" action="/messages/new">
      {csrf}
      {csrf_errs}
      <div class="form-group">
        <textarea name="text" maxlength="{max}" placeholder="What's happening?" class="form-control">{text}</textarea>
        {text_errs}
      </div>
      <button class="btn btn-outline-success btn-block">Add my message!</button>
    </form>
  </div>
</div>"#,
        csrf = csrf_input(csrf),
        csrf_errs = errors_for(errors, "csrf_token"),
        max = MAX_MESSAGE_LEN,
        text = escape(&form.text),
        text_errs = errors_for(errors, "text"),
    )
}

fn posted_at(message: &MessageRow) -> String {
    message
        .posted_at()
        .map(|t| t.format("%d %B %Y").to_string())
        .unwrap_or_else(|| message.timestamp.clone())
}

fn like_button(message: &MessageRow, viewer: &Viewer<'_>) -> String {
    if viewer.user.is_none() || viewer.is(message.user_id) {
        return String::new();
    }
    let (action, label) = if viewer.liked.contains(&message.id) {
        ("unlike", "&#9733;")
    } else {
        ("like", "&#9734;")
    };
    format!(
        r#"<form method="POST" action="/{action}/{id}" class="messages-like">
        {csrf}
        <input type="hidden" name="came-from" value="{came_from}">
        <button class="btn btn-sm btn-link">{label}</button>
      </form>"#,
        id = message.id,
        csrf = csrf_input(viewer.csrf),
        came_from = escape(viewer.came_from),
    )
}

fn message_item(message: &MessageRow, viewer: &Viewer<'_>) -> String {
    format!(
        r#"<li class="list-group-item">
      <a href="/messages/{id}" class="message-link"></a>
      <a href="/users/{uid}"><img src="{img}" alt="" class="timeline-image"></a>
      <div class="message-area">
        <a href="/users/{uid}">@{name}</a>
        <span class="text-muted">{when}</span>
        <p>{text}</p>
      </div>
      {like}
    </li>"#,
        id = message.id,
        uid = message.user_id,
        img = escape(&message.author_image_url),
        name = escape(&message.author_username),
        when = posted_at(message),
        text = escape(&message.text),
        like = like_button(message, viewer),
    )
}

fn message_list(messages: &[MessageRow], viewer: &Viewer<'_>) -> String {
    let items: String = messages.iter().map(|m| message_item(m, viewer)).collect();
    format!(r#"<ul class="list-group" id="messages">{items}</ul>"#)
}

fn follow_button(target: &UserRow, viewer: &Viewer<'_>) -> String {
    if viewer.user.is_none() || viewer.is(target.id) {
        return String::new();
    }
    let (action, label, class) = if viewer.following.contains(&target.id) {
        ("stop-following", "Unfollow", "btn-primary")
    } else {
        ("follow", "Follow", "btn-outline-primary")
    };
    format!(
        r#"<form method="POST" action="/users/{action}/{id}">
        {csrf}
        <input type="hidden" name="came-from" value="{came_from}">
        <button class="btn {class} btn-sm">{label}</button>
      </form>"#,
        id = target.id,
        csrf = csrf_input(viewer.csrf),
        came_from = escape(viewer.came_from),
    )
}

fn user_card(user: &UserRow, viewer: &Viewer<'_>) -> String {
    format!(
        r#"<div class="col-lg-4 col-md-6 col-12">
      <div class="card user-card">
        <a href="/users/{id}" class="card-link">
          <img src="{img}" alt="Image for {name}" class="card-image">
          <p>@{name}</p>
        </a>
        {follow}
        <p class="card-bio">{bio}</p>
      </div>
    </div>"#,
        id = user.id,
        img = escape(&user.image_url),
        name = escape(&user.username),
        follow = follow_button(user, viewer),
        bio = escape(user.bio.as_deref().unwrap_or("")),
    )
}

fn user_cards(users: &[UserRow], viewer: &Viewer<'_>) -> String {
    let cards: String = users.iter().map(|u| user_card(u, viewer)).collect();
    format!(r#"<div class="row">{cards}</div>"#)
}

/// Profile header and stats shared by every `/users/{id}/...` page.
fn profile_frame(owner: &UserRow, stats: &UserStats, viewer: &Viewer<'_>, content: &str) -> String {
    let actions = if viewer.is(owner.id) {
        r#"<a href="/users/profile" class="btn btn-outline-secondary">Edit Profile</a>"#.to_string()
    } else {
        follow_button(owner, viewer)
    };

    format!(
        r#"<div id="warbler-hero" class="full-width">
  <img src="{header}" alt="">
</div>
<img src="{img}" alt="Image for {name}" id="profile-avatar">
<div class="row full-width">
  <div class="container">
    <ul class="user-stats nav nav-pills">
      <li class="stat"><p class="small">Messages</p><h4><a href="/users/{id}">{messages}</a></h4></li>
      <li class="stat"><p class="small">Following</p><h4><a href="/users/{id}/following">{following}</a></h4></li>
      <li class="stat"><p class="small">Followers</p><h4><a href="/users/{id}/followers">{followers}</a></h4></li>
      <li class="stat"><p class="small">Likes</p><h4><a href="/users/{id}/liked_messages">{likes}</a></h4></li>
      <li class="ml-auto">{actions}</li>
    </ul>
  </div>
</div>
<div class="row">
  <div class="col-sm-3">
    <h4 id="sidebar-username">@{name}</h4>
    <p class="user-bio">{bio}</p>
    <p class="user-location">{location}</p>
  </div>
  <div class="col-sm-9">
    {content}
  </div>
</div>"#,
        id = owner.id,
        header = escape(&owner.header_image_url),
        img = escape(&owner.image_url),
        name = escape(&owner.username),
        bio = escape(owner.bio.as_deref().unwrap_or("")),
        location = escape(owner.location.as_deref().unwrap_or("")),
        messages = stats.messages,
        following = stats.following,
        followers = stats.followers,
        likes = stats.likes,
    )
}

pub fn user_profile(owner: &UserRow, stats: &UserStats, messages: &[MessageRow], viewer: &Viewer<'_>) -> String {
    profile_frame(owner, stats, viewer, &message_list(messages, viewer))
}

pub fn user_connections(owner: &UserRow, stats: &UserStats, users: &[UserRow], viewer: &Viewer<'_>) -> String {
    profile_frame(owner, stats, viewer, &user_cards(users, viewer))
}

pub fn liked_messages(owner: &UserRow, stats: &UserStats, messages: &[MessageRow], viewer: &Viewer<'_>) -> String {
    profile_frame(owner, stats, viewer, &message_list(messages, viewer))
}

pub fn users_index(users: &[UserRow], search: Option<&str>, viewer: &Viewer<'_>) -> String {
    if users.is_empty() {
        return match search {
            Some(q) => format!("<h3>Sorry, no users found matching \"{}\"</h3>", escape(q)),
            None => "<h3>Sorry, no users found</h3>".to_string(),
        };
    }
    user_cards(users, viewer)
}

pub fn message_page(message: &MessageRow, viewer: &Viewer<'_>) -> String {
    let delete = if viewer.is(message.user_id) {
        format!(
            r#"<form method="POST" action="/messages/{id}/delete">
      {csrf}
      <button class="btn btn-outline-danger">Delete</button>
    </form>"#,
            id = message.id,
            csrf = csrf_input(viewer.csrf),
        )
    } else {
        like_button(message, viewer)
    };

    format!(
        r#"<div class="bg"></div>
<div class="row justify-content-center">
  <div class="col-md-6">
    <ul class="list-group no-hover" id="messages">
      <li class="list-group-item">
        <a href="/users/{uid}"><img src="{img}" alt="" class="timeline-image"></a>
        <div class="message-area">
          <div class="message-heading">
            <a href="/users/{uid}">@{name}</a>
            {delete}
          </div>
          <p class="single-message">{text}</p>
          <span class="text-muted">{when}</span>
        </div>
      </li>
    </ul>
  </div>
</div>"#,
        uid = message.user_id,
        img = escape(&message.author_image_url),
        name = escape(&message.author_username),
        text = escape(&message.text),
        when = posted_at(message),
    )
}

pub fn home_anon() -> String {
    r#"<div class="home-hero">
  <h1>What's Happening?</h1>
  <h4>New to Warbler?</h4>
  <a href="/signup" class="btn btn-primary">Sign up now</a>
</div>"#
        .to_string()
}

pub fn home(user: &UserRow, stats: &UserStats, feed: &[MessageRow], viewer: &Viewer<'_>) -> String {
    format!(
        r#"<div class="row">
  <aside class="col-md-4 col-lg-3" id="home-aside">
    <div class="card user-card">
      <a href="/users/{id}"><img src="{img}" alt="Image for {name}" class="card-image"></a>
      <p>@{name}</p>
      <ul class="user-stats nav nav-pills">
        <li class="stat"><p class="small">Messages</p><h4><a href="/users/{id}">{messages}</a></h4></li>
        <li class="stat"><p class="small">Following</p><h4><a href="/users/{id}/following">{following}</a></h4></li>
        <li class="stat"><p class="small">Followers</p><h4><a href="/users/{id}/followers">{followers}</a></h4></li>
      </ul>
    </div>
  </aside>
  <div class="col-lg-6 col-md-8 col-sm-12">
    {feed}
  </div>
</div>"#,
        id = user.id,
        img = escape(&user.image_url),
        name = escape(&user.username),
        messages = stats.messages,
        following = stats.following,
        followers = stats.followers,
        feed = message_list(feed, viewer),
    )
}

pub fn not_found() -> String {
    r#"<div class="not-found">
  <h1>404</h1>
  <p>There's nothing here. <a href="/">Go home</a>.</p>
</div>"#
        .to_string()
}
