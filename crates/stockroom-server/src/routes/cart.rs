//! Cart endpoints. AJAX callers get JSON, plain form posts get redirects.

use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use stockroom_auth::SessionUser;
use stockroom_commerce::cart::CartView;
use stockroom_commerce::{CommerceError, ProductId};
use tracing::{error, warn};

use super::{redirect_with_error, MessageQuery};
use crate::extract::{Ajax, CurrentUser};
use crate::state::AppState;
use crate::views;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/add", post(add))
        .route("/update/:id", post(update))
        .route("/remove/:id", post(remove))
        .route("/clear", post(clear))
        .route("/count", get(count))
}

#[derive(Debug, Deserialize)]
struct AddForm {
    #[serde(rename = "productId", alias = "product_id")]
    product_id: String,
    #[serde(default)]
    quantity: Option<String>,
}

impl AddForm {
    /// Missing, unparsable or zero quantities mean one.
    fn quantity(&self) -> i64 {
        self.quantity
            .as_deref()
            .and_then(|q| q.trim().parse::<i64>().ok())
            .filter(|q| *q != 0)
            .unwrap_or(1)
    }
}

#[derive(Debug, Deserialize)]
struct QuantityForm {
    #[serde(default)]
    quantity: String,
}

impl QuantityForm {
    fn quantity(&self) -> Result<i64, CommerceError> {
        self.quantity
            .trim()
            .parse()
            .map_err(|_| CommerceError::ValidationError("quantity must be a whole number".to_string()))
    }
}

/// Report a failed cart operation the way the caller expects.
fn failure(ajax: bool, back: &str, user: &SessionUser, e: CommerceError) -> Response {
    if e.is_client_error() {
        warn!(user = %user.username, error = %e, "cart operation rejected");
    } else {
        error!(user = %user.username, error = %e, "cart operation failed");
    }
    let message = e.to_string();
    if ajax {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    } else {
        redirect_with_error(back, &message)
    }
}

async fn cart_json(state: &AppState, user: &SessionUser) -> Result<Response, CommerceError> {
    let cart = state.carts.get_cart(&user.id).await?;
    Ok(Json(json!({ "success": true, "cart": cart })).into_response())
}

async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MessageQuery>,
) -> Html<String> {
    let currency = state.config.server.currency;
    match state.carts.get_cart(&user.id).await {
        Ok(cart) => Html(views::cart::index(&user, &cart, currency, query.error())),
        Err(e) => {
            error!(user = %user.username, error = %e, "cart could not be loaded");
            let message = format!("Could not load your cart: {}", e);
            Html(views::cart::index(&user, &CartView::default(), currency, Some(&message)))
        }
    }
}

async fn add(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Ajax(ajax): Ajax,
    Form(form): Form<AddForm>,
) -> Response {
    let product_id = ProductId::from(form.product_id.as_str());
    let result = async {
        state
            .carts
            .add_to_cart(&user.id, &product_id, form.quantity())
            .await?;
        state.carts.count(&user.id).await
    }
    .await;

    match result {
        Ok(count) if ajax => Json(json!({ "success": true, "cartCount": count })).into_response(),
        Ok(_) => Redirect::to("/cart").into_response(),
        Err(e) => failure(ajax, "/products", &user, e),
    }
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Ajax(ajax): Ajax,
    Path(id): Path<String>,
    Form(form): Form<QuantityForm>,
) -> Response {
    let result = async {
        let quantity = form.quantity()?;
        state.carts.update_quantity(&user.id, &id, quantity).await?;
        if ajax {
            cart_json(&state, &user).await
        } else {
            Ok(Redirect::to("/cart").into_response())
        }
    }
    .await;
    result.unwrap_or_else(|e| failure(ajax, "/cart", &user, e))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Ajax(ajax): Ajax,
    Path(id): Path<String>,
) -> Response {
    let result = async {
        state.carts.remove(&user.id, &id).await?;
        if ajax {
            cart_json(&state, &user).await
        } else {
            Ok(Redirect::to("/cart").into_response())
        }
    }
    .await;
    result.unwrap_or_else(|e| failure(ajax, "/cart", &user, e))
}

async fn clear(State(state): State<AppState>, CurrentUser(user): CurrentUser, Ajax(ajax): Ajax) -> Response {
    match state.carts.clear(&user.id).await {
        Ok(_) if ajax => Json(json!({ "success": true })).into_response(),
        Ok(_) => Redirect::to("/cart").into_response(),
        Err(e) => failure(ajax, "/cart", &user, e),
    }
}

/// Badge count. Errors read as an empty cart.
async fn count(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Json<serde_json::Value> {
    let count = state.carts.count(&user.id).await.unwrap_or_else(|e| {
        warn!(user = %user.username, error = %e, "cart count failed");
        0
    });
    Json(json!({ "count": count }))
}
