//! Product listing, forms and stock pages.

use stockroom_auth::SessionUser;
use stockroom_commerce::catalog::{Category, InventoryStats, Product};
use stockroom_commerce::search::Page;
use stockroom_commerce::Currency;

use super::{alert, escape_html, page, url_encode};
use crate::media::StoredImage;

/// Filter values echoed back into the search form and page links.
#[derive(Debug, Clone, Default)]
pub struct FilterEcho {
    pub search: String,
    pub category: String,
    pub min_price: String,
    pub max_price: String,
    pub include_deleted: bool,
}

impl FilterEcho {
    /// Query string without `page`, ending in `&` when non-empty.
    fn query_prefix(&self) -> String {
        let mut parts = Vec::new();
        for (key, value) in [
            ("search", &self.search),
            ("category", &self.category),
            ("minPrice", &self.min_price),
            ("maxPrice", &self.max_price),
        ] {
            if !value.is_empty() {
                parts.push(format!("{}={}", key, url_encode(value)));
            }
        }
        if self.include_deleted {
            parts.push("includeDeleted=true".to_string());
        }
        parts.into_iter().map(|p| p + "&").collect()
    }
}

pub struct ListPage<'a> {
    pub user: &'a SessionUser,
    pub page: &'a Page<Product>,
    pub categories: &'a [Category],
    pub filters: &'a FilterEcho,
    pub currency: Currency,
    pub error: Option<&'a str>,
    pub notice: Option<&'a str>,
}

fn category_name<'a>(categories: &'a [Category], product: &Product) -> &'a str {
    match &product.category_id {
        Some(id) => categories
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.name.as_str())
            .unwrap_or("Uncategorized"),
        None => "Uncategorized",
    }
}

fn image_tag(product: &Product) -> String {
    match product.image_url.as_deref() {
        Some(url) => format!(
            r#"<img src="{}" alt="{}" loading="lazy">"#,
            escape_html(url),
            escape_html(&product.name)
        ),
        None => r#"<div class="no-image">No image</div>"#.to_string(),
    }
}

pub fn list(view: &ListPage<'_>) -> String {
    let is_admin = view.user.is_admin();
    let filters = view.filters;

    let category_options: String = view
        .categories
        .iter()
        .map(|c| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape_html(c.id.as_str()),
                if c.id.as_str() == filters.category { " selected" } else { "" },
                escape_html(&c.name)
            )
        })
        .collect();

    let cards: String = view
        .page
        .items
        .iter()
        .map(|p| render_card(p, view))
        .collect();

    let empty = if view.page.items.is_empty() {
        r#"<p class="empty">No products found.</p>"#
    } else {
        ""
    };

    let admin_tools = if is_admin {
        format!(
            r#"<p><a href="/products/add">Add product</a> | <a href="/products/deleted">Deleted products</a>
    | <label><input type="checkbox" name="includeDeleted" value="true" form="filters"{}> Include deleted</label></p>"#,
            if filters.include_deleted { " checked" } else { "" }
        )
    } else {
        String::new()
    };

    let body = format!(
        r#"<h1>Products</h1>
{notice}{error}
{admin_tools}
<form id="filters" method="get" action="/products" class="card">
    <input name="search" placeholder="Search by name" value="{search}">
    <select name="category"><option value="">All categories</option>{category_options}</select>
    <input name="minPrice" placeholder="Min price" value="{min}" size="8">
    <input name="maxPrice" placeholder="Max price" value="{max}" size="8">
    <button type="submit">Filter</button>
    <a href="/products">Reset</a>
</form>
<p>{total} product(s)</p>
<div class="grid">{cards}</div>
{empty}
{pagination}"#,
        notice = alert("success", view.notice),
        error = alert("danger", view.error),
        admin_tools = admin_tools,
        search = escape_html(&filters.search),
        category_options = category_options,
        min = escape_html(&filters.min_price),
        max = escape_html(&filters.max_price),
        total = view.page.pagination.total_items,
        cards = cards,
        empty = empty,
        pagination = render_pagination(view.page, filters),
    );
    page("Products", Some(view.user), &body)
}

fn render_card(product: &Product, view: &ListPage<'_>) -> String {
    let status = product.stock_status();
    let actions = if product.is_deleted {
        if view.user.is_admin() {
            format!(
                r#"<span class="badge danger">Deleted</span>
        <form class="inline" method="post" action="/products/restore/{id}"><button>Restore</button></form>"#,
                id = escape_html(product.id.as_str())
            )
        } else {
            String::new()
        }
    } else {
        let mut actions = String::new();
        if product.is_purchasable() {
            actions.push_str(&format!(
                r#"<form class="inline add-to-cart" method="post" action="/cart/add">
            <input type="hidden" name="productId" value="{id}">
            <input type="number" name="quantity" value="1" min="1" max="{max}" style="width:4em">
            <button type="submit">Add to cart</button>
        </form>"#,
                id = escape_html(product.id.as_str()),
                max = product.quantity
            ));
        }
        if view.user.is_admin() {
            actions.push_str(&format!(
                r#"
        <a href="/products/edit/{id}">Edit</a>
        <form class="inline" method="post" action="/products/delete/{id}"><button>Delete</button></form>
        <a href="/logs/product/{id}">History</a>"#,
                id = escape_html(product.id.as_str())
            ));
        }
        actions
    };

    format!(
        r#"<article class="card" data-product-id="{id}">
    {image}
    <h3>{name}</h3>
    <p>{category}</p>
    <p><strong>{price}</strong></p>
    <p><span class="badge {class}">{label}</span> {quantity} in stock</p>
    {actions}
</article>"#,
        id = escape_html(product.id.as_str()),
        image = image_tag(product),
        name = escape_html(&product.name),
        category = escape_html(category_name(view.categories, product)),
        price = escape_html(&view.currency.format(product.price)),
        class = status.css_class(),
        label = status.label(),
        quantity = product.quantity,
        actions = actions,
    )
}

fn render_pagination(page: &Page<Product>, filters: &FilterEcho) -> String {
    let pagination = &page.pagination;
    if pagination.total_pages <= 1 {
        return String::new();
    }
    let prefix = filters.query_prefix();
    let link = |n: usize, label: &str| format!(r#"<a href="/products?{}page={}">{}</a>"#, prefix, n, label);

    let mut html = String::from(r#"<nav class="pagination">"#);
    if pagination.has_prev {
        html.push_str(&link(pagination.current_page - 1, "&larr; Prev"));
    }
    for n in pagination.page_numbers(7) {
        if n == pagination.current_page {
            html.push_str(&format!(r#"<span class="current">{}</span>"#, n));
        } else {
            html.push_str(&link(n, &n.to_string()));
        }
    }
    if pagination.has_next {
        html.push_str(&link(pagination.current_page + 1, "Next &rarr;"));
    }
    html.push_str("</nav>");
    html
}

pub fn deleted(user: &SessionUser, products: &[Product], categories: &[Category], currency: Currency, error: Option<&str>) -> String {
    let rows: String = products
        .iter()
        .map(|p| {
            format!(
                r#"<tr>
    <td>{name}</td><td>{category}</td><td>{price}</td><td>{quantity}</td><td>{deleted_at}</td>
    <td>
        <form class="inline" method="post" action="/products/restore/{id}"><button>Restore</button></form>
        <form class="inline" method="post" action="/products/hard-delete/{id}" onsubmit="return confirm('Delete permanently?')"><button>Delete permanently</button></form>
        <a href="/logs/product/{id}">History</a>
    </td>
</tr>"#,
                id = escape_html(p.id.as_str()),
                name = escape_html(&p.name),
                category = escape_html(category_name(categories, p)),
                price = escape_html(&currency.format(p.price)),
                quantity = p.quantity,
                deleted_at = p
                    .deleted_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
            )
        })
        .collect();

    let table = if products.is_empty() {
        r#"<p class="empty">The trash is empty.</p>"#.to_string()
    } else {
        format!(
            r#"<table><thead><tr><th>Name</th><th>Category</th><th>Price</th><th>Quantity</th><th>Deleted</th><th></th></tr></thead><tbody>{}</tbody></table>"#,
            rows
        )
    };

    page(
        "Deleted products",
        Some(user),
        &format!(
            r#"<h1>Deleted products</h1>{}{}<p><a href="/products">Back to products</a></p>"#,
            alert("danger", error),
            table
        ),
    )
}

/// Add and edit form. `product` is `None` when adding.
pub struct FormPage<'a> {
    pub user: &'a SessionUser,
    pub product: Option<&'a Product>,
    pub categories: &'a [Category],
    pub images: &'a [StoredImage],
    pub currency: Currency,
    pub error: Option<&'a str>,
}

pub fn form(view: &FormPage<'_>) -> String {
    let (title, action) = match view.product {
        Some(p) => ("Edit product", format!("/products/edit/{}", escape_html(p.id.as_str()))),
        None => ("Add product", "/products/add".to_string()),
    };
    let name = view.product.map(|p| p.name.as_str()).unwrap_or_default();
    let price = view
        .product
        .map(|p| view.currency.format_plain(p.price))
        .unwrap_or_default();
    let quantity = view.product.map(|p| p.quantity.to_string()).unwrap_or_default();
    let current_category = view.product.and_then(|p| p.category_id.as_ref());
    let current_image = view.product.and_then(|p| p.image_url.as_deref());

    let category_options: String = view
        .categories
        .iter()
        .map(|c| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape_html(c.id.as_str()),
                if Some(&c.id) == current_category { " selected" } else { "" },
                escape_html(&c.name)
            )
        })
        .collect();

    let image_options: String = view
        .images
        .iter()
        .map(|img| {
            format!(
                r#"<option value="{}">{}</option>"#,
                escape_html(&img.url),
                escape_html(&img.key)
            )
        })
        .collect();

    let current = match current_image {
        Some(url) => format!(
            r#"<p>Current image:<br><img src="{url}" alt="" style="max-width:200px"></p>
        <input type="hidden" name="oldImage" value="{url}">"#,
            url = escape_html(url)
        ),
        None => String::new(),
    };

    page(
        title,
        Some(view.user),
        &format!(
            r#"<h1>{title}</h1>
{error}
<form class="card" method="post" action="{action}" enctype="multipart/form-data">
    <p><label>Name<br><input name="name" value="{name}" required></label></p>
    <p><label>Price ({currency})<br><input name="price" value="{price}" required></label></p>
    <p><label>Quantity<br><input type="number" name="quantity" min="0" value="{quantity}" required></label></p>
    <p><label>Category<br><select name="categoryId"><option value="">Uncategorized</option>{category_options}</select></label></p>
    {current}
    <p><label>Upload image<br><input type="file" name="image" accept="image/*"></label></p>
    <p><label>Or pick an existing image<br><select name="selectedImage"><option value="">(none)</option>{image_options}</select></label></p>
    <p><button type="submit">Save</button> <a href="/products">Cancel</a></p>
</form>"#,
            title = title,
            error = alert("danger", view.error),
            action = action,
            name = escape_html(name),
            currency = view.currency.code(),
            price = escape_html(&price),
            quantity = quantity,
            category_options = category_options,
            current = current,
            image_options = image_options,
        ),
    )
}

pub fn inventory(user: &SessionUser, stats: &InventoryStats, low: &[Product], currency: Currency) -> String {
    let rows: String = low
        .iter()
        .map(|p| {
            let status = p.stock_status();
            format!(
                r#"<tr><td>{}</td><td>{}</td><td><span class="badge {}">{}</span></td></tr>"#,
                escape_html(&p.name),
                p.quantity,
                status.css_class(),
                status.label()
            )
        })
        .collect();

    page(
        "Inventory",
        Some(user),
        &format!(
            r#"<h1>Inventory</h1>
<div class="grid">
    <div class="card"><h3>Products</h3><p>{total}</p></div>
    <div class="card"><h3>In stock</h3><p>{in_stock}</p></div>
    <div class="card"><h3>Low stock</h3><p>{low_stock}</p></div>
    <div class="card"><h3>Out of stock</h3><p>{out_of_stock}</p></div>
    <div class="card"><h3>Stock value</h3><p>{value}</p></div>
</div>
<h2>Needs restocking</h2>
<table><thead><tr><th>Name</th><th>Quantity</th><th>Status</th></tr></thead><tbody>{rows}</tbody></table>"#,
            total = stats.total,
            in_stock = stats.in_stock,
            low_stock = stats.low_stock,
            out_of_stock = stats.out_of_stock,
            value = escape_html(&currency.format(stats.total_value)),
            rows = rows,
        ),
    )
}
