#![allow(dead_code)]

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use restaurant_pos::config::EnvironmentConfig;
use restaurant_pos::controllers::OrderController;
use restaurant_pos::dto::order_dto::{CreateOrderRequest, OrderItemRequest};
use restaurant_pos::models::auth::{Caller, UserRole};
use restaurant_pos::models::order::{NewOrder, Order, OrderItem};
use restaurant_pos::models::product::Product;
use restaurant_pos::models::user::User;
use restaurant_pos::repositories::Repositories;
use restaurant_pos::services::auth_service::hash_password;
use restaurant_pos::AppState;

pub const ADMIN_PASSWORD: &str = "clave-segura-1";

pub struct Fixture {
    pub state: AppState,
    pub admin: Caller,
    pub waiter: Caller,
    pub kitchen: Caller,
    pub waiter_token: String,
    pub mojarra: Product,
    pub caldo: Product,
    pub coca: Product,
}

impl Fixture {
    pub fn repos(&self) -> &Repositories {
        &self.state.repos
    }
}

async fn insert_user(repos: &Repositories, user: User) -> User {
    repos.users.insert(&user).await.unwrap()
}

async fn insert_product(repos: &Repositories, name: &str, price: i64, category: &str) -> Product {
    let product = Product::new(
        name.to_string(),
        String::new(),
        Decimal::new(price, 0),
        category.to_string(),
        true,
        String::new(),
    );
    repos.products.insert(&product).await.unwrap()
}

pub async fn fixture() -> Fixture {
    let repos = Repositories::memory();

    let mut admin = User::new("Laura".into(), "Méndez".into(), "laura".into(), UserRole::Administrator);
    admin.password_hash = Some(hash_password(ADMIN_PASSWORD).unwrap());
    let admin = insert_user(&repos, admin).await;
    let waiter = insert_user(
        &repos,
        User::new("Pedro".into(), "Ruiz".into(), "pedro".into(), UserRole::Waiter),
    )
    .await;
    let kitchen = insert_user(
        &repos,
        User::new("Rosa".into(), "Díaz".into(), "rosa".into(), UserRole::Kitchen),
    )
    .await;

    let mojarra = insert_product(&repos, "Mojarra Frita", 60, "Comidas").await;
    let caldo = insert_product(&repos, "Caldo de camarón", 30, "Comidas").await;
    let coca = insert_product(&repos, "Coca chica", 25, "Bebidas").await;

    Fixture {
        state: AppState::new(EnvironmentConfig::default(), repos),
        waiter_token: waiter.access_token.clone().unwrap(),
        admin: admin.to_caller(),
        waiter: waiter.to_caller(),
        kitchen: kitchen.to_caller(),
        mojarra,
        caldo,
        coca,
    }
}

pub fn item(product_id: Uuid, quantity: i32) -> OrderItemRequest {
    OrderItemRequest {
        product_id,
        quantity,
        notes: String::new(),
    }
}

pub fn order_request(table_number: i32, items: Vec<OrderItemRequest>) -> CreateOrderRequest {
    CreateOrderRequest {
        table_number: Some(table_number),
        items,
        customer_name: String::new(),
        number_of_people: 2,
        observations: String::new(),
    }
}

pub async fn place_order(fx: &Fixture, table_number: i32, items: Vec<OrderItemRequest>) -> Order {
    OrderController::new(&fx.state)
        .create(&fx.waiter, order_request(table_number, items))
        .await
        .unwrap()
        .data
        .unwrap()
}

pub fn money(units: i64) -> Decimal {
    Decimal::new(units, 0)
}

/// Mesero adicional para probar el alcance de los listados
pub async fn add_waiter(fx: &Fixture, first_name: &str, identifier: &str) -> Caller {
    let user = User::new(first_name.into(), "López".into(), identifier.into(), UserRole::Waiter);
    insert_user(fx.repos(), user).await.to_caller()
}

/// Registra un pedido de una unidad creado hace `minutes_ago` minutos
pub async fn backdated_order(
    fx: &Fixture,
    waiter: &Caller,
    table_number: i32,
    product: &Product,
    minutes_ago: i64,
) -> Order {
    let mut order = Order::new(
        NewOrder {
            table_number,
            customer_name: String::new(),
            number_of_people: 2,
            items: vec![OrderItem {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                quantity: 1,
                notes: String::new(),
            }],
            observations: String::new(),
        },
        waiter,
    );
    order.created_at = Utc::now() - Duration::minutes(minutes_ago);
    order.updated_at = order.created_at;
    let (order, _) = fx.repos().orders.create_with_table(order).await.unwrap();
    order
}
