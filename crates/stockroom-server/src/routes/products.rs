use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use stockroom_auth::SessionUser;
use stockroom_commerce::catalog::{Product, ProductInput, StockStatus};
use stockroom_commerce::search::ProductFilter;
use stockroom_commerce::{CategoryId, Currency};
use tracing::{debug, info, warn};

use super::{redirect_with_error, MessageQuery};
use crate::error::{AppError, AppResult};
use crate::extract::{AdminUser, CurrentUser, StaffUser};
use crate::state::AppState;
use crate::views;
use crate::views::products::{FilterEcho, FormPage, ListPage};

/// Largest accepted product form, image included.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/deleted", get(deleted))
        .route("/inventory", get(inventory))
        .route("/add", get(add_form).post(add))
        .route("/edit/:id", get(edit_form).post(edit))
        .route("/delete/:id", post(soft_delete))
        .route("/hard-delete/:id", post(hard_delete))
        .route("/restore/:id", post(restore))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    search: Option<String>,
    category: Option<String>,
    min_price: Option<String>,
    max_price: Option<String>,
    page: Option<String>,
    include_deleted: Option<String>,
    error: Option<String>,
    notice: Option<String>,
}

fn is_set(flag: Option<&str>) -> bool {
    matches!(flag, Some("1" | "true" | "on"))
}

impl ListQuery {
    fn filter(&self, currency: Currency, include_deleted: bool) -> ProductFilter {
        let price = |v: &Option<String>| v.as_deref().and_then(|s| currency.parse_amount(s));
        ProductFilter {
            category_id: self.category.as_deref().map(CategoryId::from),
            min_price: price(&self.min_price),
            max_price: price(&self.max_price),
            search: self.search.clone(),
            include_deleted,
        }
        .normalized()
    }

    fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }

    fn echo(&self, include_deleted: bool) -> FilterEcho {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        FilterEcho {
            search: text(&self.search),
            category: text(&self.category),
            min_price: text(&self.min_price),
            max_price: text(&self.max_price),
            include_deleted,
        }
    }
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Html<String>> {
    let currency = state.config.server.currency;
    let include_deleted = user.is_admin() && is_set(query.include_deleted.as_deref());
    let filter = query.filter(currency, include_deleted);

    let page = state
        .products
        .paginate(query.page(), state.config.server.page_size, &filter)
        .await?;
    let categories = state.categories.list().await?;
    let filters = query.echo(include_deleted);

    Ok(Html(views::products::list(&ListPage {
        user: &user,
        page: &page,
        categories: &categories,
        filters: &filters,
        currency,
        error: query.error.as_deref().filter(|e| !e.is_empty()),
        notice: query.notice.as_deref().filter(|n| !n.is_empty()),
    })))
}

async fn deleted(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Query(query): Query<MessageQuery>,
) -> AppResult<Html<String>> {
    let products = state.products.list_deleted().await?;
    let categories = state.categories.list().await?;
    Ok(Html(views::products::deleted(
        &user,
        &products,
        &categories,
        state.config.server.currency,
        query.error(),
    )))
}

async fn inventory(State(state): State<AppState>, StaffUser(user): StaffUser) -> AppResult<Html<String>> {
    let stats = state.products.inventory_stats().await?;
    let mut low: Vec<Product> = state
        .products
        .list_active()
        .await?
        .into_iter()
        .filter(|p| p.stock_status() != StockStatus::InStock)
        .collect();
    low.sort_by_key(|p| p.quantity);
    Ok(Html(views::products::inventory(
        &user,
        &stats,
        &low,
        state.config.server.currency,
    )))
}

/// Fields of the multipart product form.
#[derive(Debug, Default)]
struct ProductForm {
    name: String,
    price: String,
    quantity: String,
    category_id: String,
    selected_image: String,
    upload: Option<(String, Vec<u8>)>,
}

impl ProductForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = ProductForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.upload = Some((file_name, bytes.to_vec()));
                }
                continue;
            }
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            match name.as_str() {
                "name" => form.name = value,
                "price" => form.price = value,
                "quantity" => form.quantity = value,
                "categoryId" => form.category_id = value,
                "selectedImage" => form.selected_image = value,
                // oldImage is implied by the stored product
                _ => {}
            }
        }
        Ok(form)
    }

    fn to_input(&self, currency: Currency) -> Result<ProductInput, String> {
        let price = currency
            .parse_amount(&self.price)
            .ok_or_else(|| "Price must be a number".to_string())?;
        let quantity = self
            .quantity
            .trim()
            .parse::<i64>()
            .map_err(|_| "Quantity must be a whole number".to_string())?;
        let category_id = Some(self.category_id.trim())
            .filter(|c| !c.is_empty())
            .map(CategoryId::from);
        Ok(ProductInput {
            name: self.name.clone(),
            price,
            quantity,
            category_id,
            image_url: None,
        })
    }

    /// A fresh upload wins over a picked library image. `None` keeps the current one.
    async fn image_url(&self, state: &AppState) -> Option<String> {
        if let Some((file_name, bytes)) = &self.upload {
            match state.media.save(file_name, bytes).await {
                Ok(url) => return Some(url),
                Err(e) => warn!(file = %file_name, error = %e, "image upload failed"),
            }
        }
        Some(self.selected_image.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

async fn render_form(
    state: &AppState,
    user: &SessionUser,
    product: Option<&Product>,
    error: Option<&str>,
) -> AppResult<Response> {
    let categories = state.categories.list().await?;
    let images = state.media.list().await?;
    let html = views::products::form(&FormPage {
        user,
        product,
        categories: &categories,
        images: &images,
        currency: state.config.server.currency,
        error,
    });
    let status = if error.is_some() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    Ok((status, Html(html)).into_response())
}

async fn add_form(State(state): State<AppState>, AdminUser(user): AdminUser) -> AppResult<Response> {
    render_form(&state, &user, None, None).await
}

async fn add(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = ProductForm::read(multipart).await?;
    let mut input = match form.to_input(state.config.server.currency) {
        Ok(input) => input,
        Err(msg) => return render_form(&state, &user, None, Some(&msg)).await,
    };
    input.image_url = form.image_url(&state).await;

    match state.products.create(input, &user.id).await {
        Ok(_) => Ok(Redirect::to("/products").into_response()),
        Err(e) if e.is_client_error() => render_form(&state, &user, None, Some(&e.to_string())).await,
        Err(e) => Err(e.into()),
    }
}

async fn edit_form(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let product = state.products.get(&id).await?;
    render_form(&state, &user, Some(&product), None).await
}

async fn edit(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Response> {
    let product = state.products.get(&id).await?;
    let form = ProductForm::read(multipart).await?;
    let mut input = match form.to_input(state.config.server.currency) {
        Ok(input) => input,
        Err(msg) => return render_form(&state, &user, Some(&product), Some(&msg)).await,
    };
    input.image_url = form.image_url(&state).await;

    match state.products.update(&id, input, &user.id).await {
        Ok(_) => Ok(Redirect::to("/products").into_response()),
        Err(e) if e.is_client_error() && !e.is_not_found() => {
            render_form(&state, &user, Some(&product), Some(&e.to_string())).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn soft_delete(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    match state.products.soft_delete(&id, &user.id).await {
        Ok(()) => Ok(Redirect::to("/products").into_response()),
        Err(e) if e.is_client_error() => Ok(redirect_with_error("/products", &e.to_string())),
        Err(e) => Err(e.into()),
    }
}

async fn hard_delete(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let image_url = match state.products.get(&id).await {
        Ok(product) => product.image_url,
        Err(e) if e.is_client_error() => {
            return Ok(redirect_with_error("/products/deleted", &e.to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    state.products.hard_delete(&id, &user.id).await?;

    if let Some(url) = image_url {
        let shared = state
            .products
            .list_all()
            .await?
            .iter()
            .any(|p| p.image_url.as_deref() == Some(url.as_str()));
        if shared {
            debug!(product_id = %id, url = %url, "product image still in use, kept");
            return Ok(Redirect::to("/products/deleted").into_response());
        }
        match state.media.delete_by_url(&url).await {
            Ok(true) => info!(product_id = %id, url = %url, "product image removed"),
            Ok(false) => {}
            Err(e) => warn!(product_id = %id, url = %url, error = %e, "product image not removed"),
        }
    }
    Ok(Redirect::to("/products/deleted").into_response())
}

async fn restore(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    match state.products.restore(&id, &user.id).await {
        Ok(()) => Ok(Redirect::to("/products/deleted").into_response()),
        Err(e) if e.is_client_error() => Ok(redirect_with_error("/products/deleted", &e.to_string())),
        Err(e) => Err(e.into()),
    }
}
