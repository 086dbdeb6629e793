//! Car listing handlers.

use std::collections::HashMap;

use axum::extract::State;
use axum::response::Html;
use axum::Extension;

use crate::auth::Session;
use crate::db::CarRepository;
use crate::template::{TemplateContext, Value};
use crate::web::error::WebError;

use super::AppState;

/// GET / and GET /cars - the car listing, newest first.
///
/// The page is public; logged-in visitors just get their name in the
/// header and a greeting.
pub async fn index(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, WebError> {
    let repo = CarRepository::new(state.db.pool());
    let cars = repo.list_all().await?;

    let mut context = TemplateContext::new();
    context.set("has_cars", Value::Bool(!cars.is_empty()));
    context.set(
        "cars",
        Value::List(
            cars.into_iter()
                .map(|car| {
                    Value::Map(HashMap::from([
                        ("make".to_string(), Value::from(car.make)),
                        ("model".to_string(), Value::from(car.model)),
                        ("year".to_string(), Value::Int(car.year)),
                        ("price".to_string(), Value::from(format!("{} €", car.price))),
                    ]))
                })
                .collect(),
        ),
    );

    state.render_page(&session, "home/index", "Cars", context)
}
