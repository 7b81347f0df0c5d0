use stockroom_auth::SessionUser;
use stockroom_commerce::cart::CartView;
use stockroom_commerce::Currency;

use super::{alert, escape_html, page};

pub fn index(user: &SessionUser, cart: &CartView, currency: Currency, error: Option<&str>) -> String {
    if cart.is_empty() {
        return page(
            "Cart",
            Some(user),
            &format!(
                r#"<h1>Your cart</h1>{}<p>Your cart is empty. <a href="/products">Continue shopping</a></p>"#,
                alert("danger", error)
            ),
        );
    }

    let rows: String = cart
        .items
        .iter()
        .map(|line| {
            let warning = if line.is_available {
                String::new()
            } else {
                format!(
                    r#"<br><span class="badge danger">Only {} left</span>"#,
                    line.product.quantity
                )
            };
            format!(
                r#"<tr data-cart-item="{id}">
    <td>{name}{warning}</td>
    <td>{price}</td>
    <td><form class="inline" method="post" action="/cart/update/{id}">
        <input type="number" name="quantity" value="{quantity}" min="0" max="{max}" style="width:4em">
        <button>Update</button></form></td>
    <td>{subtotal}</td>
    <td><span class="badge {class}">{label}</span></td>
    <td><form class="inline" method="post" action="/cart/remove/{id}"><button>Remove</button></form></td>
</tr>"#,
                id = escape_html(line.item.id.as_str()),
                name = escape_html(&line.product.name),
                warning = warning,
                price = escape_html(&currency.format(line.product.price)),
                quantity = line.item.quantity,
                max = line.product.quantity,
                subtotal = escape_html(&currency.format(line.subtotal)),
                class = line.stock_status.css_class(),
                label = line.stock_status.label(),
            )
        })
        .collect();

    page(
        "Cart",
        Some(user),
        &format!(
            r#"<h1>Your cart</h1>{error}
<table>
    <thead><tr><th>Product</th><th>Price</th><th>Quantity</th><th>Subtotal</th><th>Stock</th><th></th></tr></thead>
    <tbody>{rows}</tbody>
    <tfoot><tr><th colspan="3">{lines} line(s), {units} unit(s)</th><th>{total}</th><th colspan="2"></th></tr></tfoot>
</table>
<form method="post" action="/cart/clear" onsubmit="return confirm('Empty the cart?')"><button>Clear cart</button></form>
<p><a href="/products">Continue shopping</a></p>"#,
            error = alert("danger", error),
            rows = rows,
            lines = cart.total_items,
            units = cart.unit_count(),
            total = escape_html(&currency.format(cart.total_amount)),
        ),
    )
}
