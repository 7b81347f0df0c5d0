//! Audit log pages.

use stockroom_auth::SessionUser;
use stockroom_commerce::audit::{AuditAction, AuditStats, EnrichedLogEntry};

use super::{escape_html, page};

fn render_table(logs: &[EnrichedLogEntry]) -> String {
    if logs.is_empty() {
        return r#"<p class="empty">No entries.</p>"#.to_string();
    }
    let rows: String = logs
        .iter()
        .map(|log| {
            let entry = &log.entry;
            format!(
                r#"<tr>
    <td>{time}</td>
    <td><a href="/logs/action/{action_tag}"><span class="badge {class}">{label}</span></a></td>
    <td><a href="/logs/product/{product_id}">{product}</a></td>
    <td><a href="/logs/user/{user_id}">{user}</a></td>
    <td><code>{details}</code></td>
</tr>"#,
                time = entry.time.format("%Y-%m-%d %H:%M:%S"),
                action_tag = entry.action.as_str().to_lowercase(),
                class = entry.action.css_class(),
                label = entry.action.label(),
                product_id = escape_html(entry.product_id.as_str()),
                product = escape_html(&log.product_name),
                user_id = escape_html(entry.user_id.as_str()),
                user = escape_html(&log.username),
                details = escape_html(&entry.details.to_string()),
            )
        })
        .collect();
    format!(
        r#"<table><thead><tr><th>Time</th><th>Action</th><th>Product</th><th>User</th><th>Details</th></tr></thead><tbody>{}</tbody></table>"#,
        rows
    )
}

pub fn list(user: &SessionUser, logs: &[EnrichedLogEntry], stats: &AuditStats) -> String {
    let counts: String = stats
        .by_action
        .iter()
        .map(|(action, count)| {
            format!(
                r#"<a class="card" href="/logs/action/{}"><span class="badge {}">{}</span> {}</a>"#,
                action.as_str().to_lowercase(),
                action.css_class(),
                action.label(),
                count
            )
        })
        .collect();

    page(
        "Audit log",
        Some(user),
        &format!(
            r#"<h1>Audit log</h1>
<p>{} entries</p>
<div class="grid">{}</div>
{}"#,
            stats.total,
            counts,
            render_table(logs)
        ),
    )
}

/// A filtered log view with a heading such as "Product abc".
pub fn filtered(user: &SessionUser, heading: &str, logs: &[EnrichedLogEntry]) -> String {
    page(
        heading,
        Some(user),
        &format!(
            r#"<h1>{}</h1><p><a href="/logs">All entries</a></p>{}"#,
            escape_html(heading),
            render_table(logs)
        ),
    )
}

pub fn action_heading(action: AuditAction) -> String {
    format!("{} entries", action.label())
}
