use stockroom_auth::{PublicUser, Role, SessionUser};

use super::{alert, escape_html, page};

pub fn list(user: &SessionUser, users: &[PublicUser], error: Option<&str>) -> String {
    let rows: String = users
        .iter()
        .map(|u| {
            let delete = if u.id == user.id {
                r#"<span class="badge info">You</span>"#.to_string()
            } else {
                format!(
                    r#"<form class="inline" method="post" action="/users/delete/{}" onsubmit="return confirm('Delete this user?')"><button>Delete</button></form>"#,
                    escape_html(u.id.as_str())
                )
            };
            format!(
                r#"<tr><td>{name}</td><td>{role}</td><td>{created}</td><td>
    <a href="/users/edit/{id}">Edit</a> <a href="/logs/user/{id}">Activity</a> {delete}
</td></tr>"#,
                id = escape_html(u.id.as_str()),
                name = escape_html(&u.username),
                role = u.role.label(),
                created = u.created_at.format("%Y-%m-%d"),
                delete = delete,
            )
        })
        .collect();

    page(
        "Users",
        Some(user),
        &format!(
            r#"<h1>Users</h1>{}
<p><a href="/users/add">Add user</a></p>
<table><thead><tr><th>Username</th><th>Role</th><th>Created</th><th></th></tr></thead><tbody>{}</tbody></table>"#,
            alert("danger", error),
            rows
        ),
    )
}

/// `editing` is `None` when adding.
pub fn form(user: &SessionUser, editing: Option<&PublicUser>, username: &str, role: Role, error: Option<&str>) -> String {
    let (title, action, password_hint) = match editing {
        Some(u) => (
            "Edit user",
            format!("/users/edit/{}", escape_html(u.id.as_str())),
            "Leave blank to keep the current password.",
        ),
        None => ("Add user", "/users/add".to_string(), ""),
    };
    let role_options: String = Role::ALL
        .iter()
        .map(|r| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                r.as_str(),
                if *r == role { " selected" } else { "" },
                r.label()
            )
        })
        .collect();

    page(
        title,
        Some(user),
        &format!(
            r#"<h1>{title}</h1>{error}
<form class="card" method="post" action="{action}">
    <p><label>Username<br><input name="username" value="{username}" required></label></p>
    <p><label>Password<br><input type="password" name="password"{required}></label><br><small>{hint}</small></p>
    <p><label>Role<br><select name="role">{role_options}</select></label></p>
    <p><button type="submit">Save</button> <a href="/users">Cancel</a></p>
</form>"#,
            title = title,
            error = alert("danger", error),
            action = action,
            username = escape_html(username),
            required = if editing.is_none() { " required" } else { "" },
            hint = password_hint,
            role_options = role_options,
        ),
    )
}
