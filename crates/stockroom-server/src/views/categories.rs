use stockroom_auth::SessionUser;
use stockroom_commerce::catalog::Category;

use super::{alert, escape_html, page};

pub fn list(user: &SessionUser, categories: &[Category], error: Option<&str>) -> String {
    let rows: String = categories
        .iter()
        .map(|c| {
            format!(
                r#"<tr><td>{name}</td><td>{description}</td><td>
    <a href="/categories/edit/{id}">Edit</a>
    <form class="inline" method="post" action="/categories/delete/{id}" onsubmit="return confirm('Products in this category will keep it as a dangling reference. Delete?')"><button>Delete</button></form>
</td></tr>"#,
                id = escape_html(c.id.as_str()),
                name = escape_html(&c.name),
                description = escape_html(c.description.as_deref().unwrap_or("")),
            )
        })
        .collect();

    page(
        "Categories",
        Some(user),
        &format!(
            r#"<h1>Categories</h1>{}
<p><a href="/categories/add">Add category</a></p>
<table><thead><tr><th>Name</th><th>Description</th><th></th></tr></thead><tbody>{}</tbody></table>"#,
            alert("danger", error),
            rows
        ),
    )
}

/// `category` is `None` when adding.
pub fn form(user: &SessionUser, category: Option<&Category>, name: &str, description: &str, error: Option<&str>) -> String {
    let (title, action) = match category {
        Some(c) => ("Edit category", format!("/categories/edit/{}", escape_html(c.id.as_str()))),
        None => ("Add category", "/categories/add".to_string()),
    };
    page(
        title,
        Some(user),
        &format!(
            r#"<h1>{title}</h1>{error}
<form class="card" method="post" action="{action}">
    <p><label>Name<br><input name="name" value="{name}" required></label></p>
    <p><label>Description<br><textarea name="description" rows="3">{description}</textarea></label></p>
    <p><button type="submit">Save</button> <a href="/categories">Cancel</a></p>
</form>"#,
            title = title,
            error = alert("danger", error),
            action = action,
            name = escape_html(name),
            description = escape_html(description),
        ),
    )
}
