use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{attendance, credits, notifications, pets, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/pets", post(pets::register))
        .route("/pets/{id}", get(pets::get))
        .route("/pets/{id}/balance", get(pets::balance))
        .route("/pets/{id}/eligibility", get(pets::eligibility))
        .route("/pets/{id}/ledger", get(pets::ledger))
        .route("/pets/{id}/events", get(pets::events))
        .route("/pets/{id}/tutors", get(pets::tutors).post(pets::assign_tutor))
        .route("/checkIn", post(attendance::check_in))
        .route("/checkOut", post(attendance::check_out))
        .route("/credits/purchase", post(credits::purchase))
        .route("/credits/refund", post(credits::refund))
        .route("/credits/bonus", post(credits::bonus))
        .route("/credits/expiration", post(credits::expiration))
        .route("/credits/adjustment", post(credits::adjustment))
        .route("/notifications", get(notifications::list))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

/// Build the router for the given engine and database (also used by tests).
pub fn app(engine: Engine, db: DatabaseConnection) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
        db,
    })
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);
    axum::serve(listener, app(engine, db)).await
}

pub async fn run(engine: Engine, db: DatabaseConnection, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(engine, db, listener).await
}
