mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{fixture, Fixture, ADMIN_PASSWORD};
use restaurant_pos::build_router;

fn app(fx: &Fixture) -> Router {
    build_router(fx.state.clone())
}

fn request(method: Method, uri: &str, auth: Option<(&str, &str)>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((name, value)) = auth {
        builder = builder.header(name, value);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health_check() {
    let fx = fixture().await;
    let (status, body) = send(app(&fx), request(Method::GET, "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_requests_without_credentials_are_rejected() {
    let fx = fixture().await;
    let (status, body) = send(app(&fx), request(Method::GET, "/api/orders", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["message"], "Token de autorización requerido");

    let (status, _) = send(
        app(&fx),
        request(Method::GET, "/api/orders", Some(("x-waiter-token", "NOEXISTE")), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_login_and_me() {
    let fx = fixture().await;

    let (status, _) = send(
        app(&fx),
        request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "identifier": "laura", "password": "incorrecta" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        app(&fx),
        request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "identifier": "laura", "password": ADMIN_PASSWORD })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tokenType"], "Bearer");
    assert_eq!(body["data"]["user"]["role"], "administrator");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let bearer = format!("Bearer {}", token);
    let (status, body) = send(
        app(&fx),
        request(Method::GET, "/api/auth/me", Some(("authorization", &bearer)), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["identifier"], "laura");
}

#[tokio::test]
async fn test_waiters_cannot_log_in_with_password() {
    let fx = fixture().await;
    let (status, _) = send(
        app(&fx),
        request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "identifier": "pedro", "password": ADMIN_PASSWORD })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_waiter_order_to_bill_over_http() {
    let fx = fixture().await;
    let waiter = ("x-waiter-token", fx.waiter_token.as_str());

    let (status, body) = send(
        app(&fx),
        request(
            Method::POST,
            "/api/orders",
            Some(waiter),
            Some(json!({
                "tableNumber": 7,
                "items": [
                    { "productId": fx.mojarra.id, "quantity": 2 },
                    { "productId": fx.caldo.id, "quantity": 1, "notes": "sin cebolla" }
                ]
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["total"], 150.0);
    assert_eq!(body["data"]["status"], "new");

    let (status, body) = send(app(&fx), request(Method::GET, "/api/tables", Some(waiter), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["tableNumber"], 7);
    assert_eq!(body[0]["activeOrdersCount"], 1);

    let (status, body) = send(
        app(&fx),
        request(
            Method::POST,
            "/api/accounts/table/7/close",
            Some(waiter),
            Some(json!({ "paymentMethod": "cash", "cashReceived": 100 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Monto recibido insuficiente");

    let (status, body) = send(
        app(&fx),
        request(
            Method::POST,
            "/api/accounts/table/7/close",
            Some(waiter),
            Some(json!({ "paymentMethod": "cash", "cashReceived": 200 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["folio"], 1);
    assert_eq!(body["data"]["change"], 50.0);

    let (status, _) = send(
        app(&fx),
        request(
            Method::DELETE,
            "/api/accounts/folio/1/cancel",
            Some(waiter),
            Some(json!({ "reason": "el cliente pidió anular" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_kitchen_cancel_over_http() {
    let fx = fixture().await;
    let order = common::place_order(&fx, 3, vec![common::item(fx.caldo.id, 1)]).await;
    let kitchen_token = fx
        .repos()
        .users
        .find_by_identifier("rosa")
        .await
        .unwrap()
        .and_then(|u| u.access_token)
        .unwrap();
    let kitchen = ("x-waiter-token", kitchen_token.as_str());

    let uri = format!("/api/kitchen/{}/cancel", order.id);
    let (status, body) = send(
        app(&fx),
        request(Method::PUT, &uri, Some(kitchen), Some(json!({ "missingIngredient": "pan" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        app(&fx),
        request(Method::PUT, &uri, Some(kitchen), Some(json!({ "missingIngredient": "camarón" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, body) = send(
        app(&fx),
        request(Method::PUT, &uri, Some(kitchen), Some(json!({ "missingIngredient": "camarón" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_STATE");
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let fx = fixture().await;
    let uri = format!("/api/orders/{}", uuid::Uuid::new_v4());
    let (status, body) = send(
        app(&fx),
        request(Method::GET, &uri, Some(("x-waiter-token", fx.waiter_token.as_str())), None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
