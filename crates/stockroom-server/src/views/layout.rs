//! Page chrome and shared helpers.

use axum::http::StatusCode;
use stockroom_auth::{Role, SessionUser};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6f8; color: #222; }
nav { background: #1f2937; padding: 0.75rem 1.5rem; display: flex; gap: 1rem; align-items: center; }
nav a { color: #e5e7eb; text-decoration: none; }
nav .spacer { flex: 1; }
nav .who { color: #9ca3af; }
main { max-width: 1100px; margin: 1.5rem auto; padding: 0 1rem; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { padding: 0.5rem; border-bottom: 1px solid #e5e7eb; text-align: left; }
.alert { padding: 0.75rem 1rem; border-radius: 4px; margin-bottom: 1rem; }
.alert-danger { background: #fee2e2; color: #991b1b; }
.alert-success { background: #dcfce7; color: #166534; }
.alert-info { background: #dbeafe; color: #1e40af; }
.badge { padding: 0.1rem 0.5rem; border-radius: 999px; font-size: 0.8rem; background: #e5e7eb; }
.badge.success { background: #dcfce7; } .badge.warning { background: #fef9c3; }
.badge.danger { background: #fee2e2; } .badge.info { background: #dbeafe; }
.badge.primary { background: #e0e7ff; } .badge.dark { background: #d1d5db; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 1rem; }
.card { background: #fff; border-radius: 6px; padding: 1rem; box-shadow: 0 1px 2px rgba(0,0,0,.08); }
.card img { width: 100%; height: 160px; object-fit: cover; }
form.inline { display: inline; }
.pagination { display: flex; gap: 0.5rem; margin-top: 1rem; }
.pagination .current { font-weight: bold; }
"#;

/// Wrap a body in the site layout.
pub fn page(title: &str, user: Option<&SessionUser>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} | Stockroom</title>
    <style>{style}</style>
</head>
<body>
    {nav}
    <main>
        {body}
    </main>
</body>
</html>"#,
        title = escape_html(title),
        style = STYLE,
        nav = render_nav(user),
        body = body,
    )
}

fn render_nav(user: Option<&SessionUser>) -> String {
    let Some(user) = user else {
        return r#"<nav><a href="/products"><strong>Stockroom</strong></a><span class="spacer"></span><a href="/auth/login">Log in</a><a href="/auth/register">Register</a></nav>"#.to_string();
    };

    let mut links = vec![r#"<a href="/products">Products</a>"#, r#"<a href="/cart">Cart</a>"#];
    if user.has_permission(Role::Staff) {
        links.push(r#"<a href="/products/inventory">Inventory</a>"#);
    }
    if user.is_admin() {
        links.extend([
            r#"<a href="/products/deleted">Deleted</a>"#,
            r#"<a href="/categories">Categories</a>"#,
            r#"<a href="/users">Users</a>"#,
            r#"<a href="/logs">Audit log</a>"#,
        ]);
    }

    format!(
        r#"<nav><a href="/products"><strong>Stockroom</strong></a>{}<span class="spacer"></span><span class="who">{} ({})</span><a href="/auth/logout">Log out</a></nav>"#,
        links.join(""),
        escape_html(&user.username),
        user.role.label(),
    )
}

/// An alert box, or nothing when there is no message.
pub fn alert(kind: &str, message: Option<&str>) -> String {
    match message.filter(|m| !m.is_empty()) {
        Some(message) => format!(
            r#"<div class="alert alert-{}">{}</div>"#,
            kind,
            escape_html(message)
        ),
        None => String::new(),
    }
}

/// Standalone error page.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let heading = status.canonical_reason().unwrap_or("Error");
    page(
        heading,
        None,
        &format!(
            r#"<div class="card">
    <h1>{} {}</h1>
    <p>{}</p>
    <p><a href="/products">Back to products</a></p>
</div>"#,
            status.as_u16(),
            escape_html(heading),
            escape_html(message)
        ),
    )
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Percent-encode a query string component.
pub fn url_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 3);
    for byte in s.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char)
            }
            b' ' => result.push('+'),
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }
    result
}
