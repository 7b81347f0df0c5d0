//! End-to-end requests against the router over the memory backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use stockroom_auth::{PasswordHasher, Role};
use stockroom_commerce::catalog::{Product, ProductInput};
use stockroom_commerce::{Money, UserId};
use stockroom_db::MemoryStore;
use stockroom_server::config::AppConfig;
use stockroom_server::telemetry::REQUEST_ID_HEADER;
use stockroom_server::{router, AppState};
use tower::ServiceExt;

struct TestApp {
    state: AppState,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let mut config = AppConfig::default();
        config.media.dir = std::env::temp_dir().join(format!("stockroom-http-{}", uuid::Uuid::new_v4()));
        let state = AppState::new(config, Arc::new(MemoryStore::new()), PasswordHasher::low_cost());
        state.users.ensure_user("admin", "admin123", Role::Admin).await.unwrap();
        state.users.ensure_user("staff", "staff123", Role::Staff).await.unwrap();
        state.users.ensure_user("carol", "carol123", Role::Customer).await.unwrap();
        let router = router(state.clone());
        Self { state, router }
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Log in and return the `Cookie` header value.
    async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .send(form("/auth/login", &format!("username={}&password={}", username, password), None))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login sets a cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn user_id(&self, username: &str) -> UserId {
        self.state
            .users
            .find_by_username(username)
            .await
            .unwrap()
            .unwrap()
            .id
    }

    async fn product(&self, name: &str, price: i64, quantity: i64) -> Product {
        let admin = self.user_id("admin").await;
        let input = ProductInput {
            name: name.to_string(),
            price: Money::new(price),
            quantity,
            category_id: None,
            image_url: None,
        };
        self.state.products.create(input, &admin).await.unwrap()
    }
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn ajax(uri: &str, body: &str, cookie: &str) -> Request<Body> {
    let mut request = form(uri, body, Some(cookie));
    request
        .headers_mut()
        .insert("x-requested-with", "XMLHttpRequest".parse().unwrap());
    request
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json(response: Response<Body>) -> Value {
    serde_json::from_str(&text(response).await).unwrap()
}

#[tokio::test]
async fn test_anonymous_requests_go_to_login() {
    let app = TestApp::new().await;

    let response = app.send(get("/products", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");

    let response = app.send(get("/", None)).await;
    assert_eq!(location(&response), "/products");

    let response = app.send(get("/auth/login", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_login_messages() {
    let app = TestApp::new().await;

    let response = app.send(form("/auth/login", "username=nobody&password=whatever", None)).await;
    assert!(text(response).await.contains("Username does not exist"));

    let response = app.send(form("/auth/login", "username=admin&password=wrong", None)).await;
    assert!(text(response).await.contains("Incorrect password"));

    let cookie = app.login("admin", "admin123").await;
    let response = app.send(get("/auth/login", Some(&cookie))).await;
    assert_eq!(location(&response), "/products");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new().await;
    let cookie = app.login("carol", "carol123").await;

    let response = app.send(get("/products", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(get("/auth/logout", Some(&cookie))).await;
    assert_eq!(location(&response), "/auth/login");

    let response = app.send(get("/products", Some(&cookie))).await;
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::new().await;

    let response = app
        .send(form(
            "/auth/register",
            "username=newbie&password=secret1&confirmPassword=secret1",
            None,
        ))
        .await;
    assert_eq!(location(&response), "/auth/login?registered=1");

    let response = app
        .send(form(
            "/auth/register",
            "username=newbie&password=secret1&confirmPassword=secret1",
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("newbie"));

    let cookie = app.login("newbie", "secret1").await;
    let response = app.send(get("/products", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_role_checks() {
    let app = TestApp::new().await;
    let customer = app.login("carol", "carol123").await;
    let staff = app.login("staff", "staff123").await;
    let admin = app.login("admin", "admin123").await;

    for path in ["/users", "/categories", "/logs", "/products/add", "/products/deleted"] {
        let response = app.send(get(path, Some(&staff))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", path);
        let response = app.send(get(path, Some(&admin))).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", path);
    }

    let response = app.send(get("/products/inventory", Some(&customer))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app.send(get("/products/inventory", Some(&staff))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cart_ajax_flow() {
    let app = TestApp::new().await;
    let lamp = app.product("Desk lamp", 2_500, 3).await;
    let cookie = app.login("carol", "carol123").await;

    let body = format!("productId={}&quantity=2", lamp.id);
    let response = app.send(ajax("/cart/add", &body, &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let value = json(response).await;
    assert_eq!(value["success"], true);
    assert_eq!(value["cartCount"], 2);

    // 2 in the cart + 2 more is over the stock of 3.
    let response = app.send(ajax("/cart/add", &body, &cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = json(response).await;
    assert_eq!(value["success"], false);
    assert!(value["message"].as_str().unwrap().contains("Insufficient inventory"));

    let response = app.send(get("/cart/count", Some(&cookie))).await;
    assert_eq!(json(response).await["count"], 2);

    let carol = app.user_id("carol").await;
    let line = app.state.carts.get_cart(&carol).await.unwrap().items[0].item.id.clone();

    let response = app
        .send(ajax(&format!("/cart/update/{}", line), "quantity=3", &cookie))
        .await;
    let value = json(response).await;
    assert_eq!(value["success"], true);
    assert_eq!(value["cart"]["items"][0]["quantity"], 3);

    let response = app.send(ajax(&format!("/cart/remove/{}", line), "", &cookie)).await;
    let value = json(response).await;
    assert_eq!(value["cart"]["total_items"], 0);

    let response = app.send(ajax("/cart/clear", "", &cookie)).await;
    assert_eq!(json(response).await["success"], true);
}

#[tokio::test]
async fn test_cart_form_errors_redirect() {
    let app = TestApp::new().await;
    let cookie = app.login("carol", "carol123").await;

    let response = app
        .send(form("/cart/add", "productId=missing", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/products?error="));

    let response = app
        .send(form("/cart/remove/nope", "", Some(&cookie)))
        .await;
    assert!(location(&response).starts_with("/cart?error="));

    let response = app.send(get("/cart", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_soft_delete_and_restore_visibility() {
    let app = TestApp::new().await;
    let kettle = app.product("Copper kettle", 4_900, 10).await;
    let admin = app.login("admin", "admin123").await;
    let customer = app.login("carol", "carol123").await;

    let response = app.send(get("/products", Some(&customer))).await;
    assert!(text(response).await.contains("Copper kettle"));

    let response = app
        .send(form(&format!("/products/delete/{}", kettle.id), "", Some(&admin)))
        .await;
    assert_eq!(location(&response), "/products");

    let response = app.send(get("/products", Some(&customer))).await;
    assert!(!text(response).await.contains("Copper kettle"));
    let response = app.send(get("/products/deleted", Some(&admin))).await;
    assert!(text(response).await.contains("Copper kettle"));

    // Deleted products cannot be added to a cart.
    let body = format!("productId={}", kettle.id);
    let response = app.send(ajax("/cart/add", &body, &customer)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(form(&format!("/products/restore/{}", kettle.id), "", Some(&admin)))
        .await;
    assert_eq!(location(&response), "/products/deleted");

    let response = app.send(get("/products", Some(&customer))).await;
    assert!(text(response).await.contains("Copper kettle"));
}

#[tokio::test]
async fn test_hard_delete_removes_product() {
    let app = TestApp::new().await;
    let stool = app.product("Bar stool", 3_000, 4).await;
    let admin = app.login("admin", "admin123").await;

    app.send(form(&format!("/products/delete/{}", stool.id), "", Some(&admin)))
        .await;
    let response = app
        .send(form(&format!("/products/hard-delete/{}", stool.id), "", Some(&admin)))
        .await;
    assert_eq!(location(&response), "/products/deleted");
    assert!(app.state.products.get(stool.id.as_str()).await.is_err());

    let response = app
        .send(get(&format!("/products/edit/{}", stool.id), Some(&admin)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hard_delete_keeps_shared_image() {
    let app = TestApp::new().await;
    let admin_id = app.user_id("admin").await;
    let url = app.state.media.save("shared.png", b"PNGDATA").await.unwrap();
    let with_image = |name: &str| ProductInput {
        name: name.to_string(),
        price: Money::new(2_000),
        quantity: 3,
        category_id: None,
        image_url: Some(url.clone()),
    };
    let lamp = app.state.products.create(with_image("Desk lamp"), &admin_id).await.unwrap();
    app.state.products.create(with_image("Floor lamp"), &admin_id).await.unwrap();
    let admin = app.login("admin", "admin123").await;

    app.send(form(&format!("/products/delete/{}", lamp.id), "", Some(&admin)))
        .await;
    let response = app
        .send(form(&format!("/products/hard-delete/{}", lamp.id), "", Some(&admin)))
        .await;
    assert_eq!(location(&response), "/products/deleted");

    let response = app.send(get(&url, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "PNGDATA");
}

#[tokio::test]
async fn test_huge_page_number_renders() {
    let app = TestApp::new().await;
    app.product("Tea towel", 500, 20).await;
    let customer = app.login("carol", "carol123").await;

    let uri = format!("/products?page={}", usize::MAX);
    let response = app.send(get(&uri, Some(&customer))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!text(response).await.contains("Tea towel"));
}

#[tokio::test]
async fn test_audit_log_endpoints() {
    let app = TestApp::new().await;
    let chair = app.product("Office chair", 15_000, 7).await;
    let admin = app.login("admin", "admin123").await;

    app.send(form(&format!("/products/delete/{}", chair.id), "", Some(&admin)))
        .await;
    app.send(form(&format!("/products/restore/{}", chair.id), "", Some(&admin)))
        .await;

    let response = app.send(get("/logs/api/stats", Some(&admin))).await;
    let stats = json(response).await;
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["by_action"]["CREATE"], 1);
    assert_eq!(stats["by_action"]["DELETE"], 1);
    assert_eq!(stats["by_action"]["RESTORE"], 1);

    let response = app
        .send(get(&format!("/logs/product/{}", chair.id), Some(&admin)))
        .await;
    assert!(text(response).await.contains("Office chair"));

    let response = app.send(get("/logs/action/delete", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(get("/logs/action/explode", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = TestApp::new().await;
    let admin = app.login("admin", "admin123").await;
    let id = app.user_id("admin").await;

    let response = app
        .send(form(&format!("/users/delete/{}", id), "", Some(&admin)))
        .await;
    assert!(location(&response).starts_with("/users?error="));
    assert!(app.state.users.get(&id).await.is_ok());

    let staff = app.user_id("staff").await;
    let response = app
        .send(form(&format!("/users/delete/{}", staff), "", Some(&admin)))
        .await;
    assert_eq!(location(&response), "/users");
    assert!(app.state.users.get(&staff).await.is_err());
}

#[tokio::test]
async fn test_product_upload_and_media() {
    let app = TestApp::new().await;
    let admin = app.login("admin", "admin123").await;

    let boundary = "stockroom-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nPoster\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"price\"\r\n\r\n12.50\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"quantity\"\r\n\r\n8\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"categoryId\"\r\n\r\n\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"poster.png\"\r\n\
         Content-Type: image/png\r\n\r\nPNGDATA\r\n\
         --{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/products/add")
        .header(header::COOKIE, &admin)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(location(&response), "/products");

    let products = app.state.products.list_active().await.unwrap();
    let poster = products.iter().find(|p| p.name == "Poster").unwrap();
    assert_eq!(poster.price, Money::new(1250));
    let url = poster.image_url.clone().unwrap();
    assert_eq!(url, "/media/products/images/poster.png");

    let response = app.send(get(&url, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(text(response).await, "PNGDATA");

    let response = app.send(get("/media/products/images/missing.png", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
