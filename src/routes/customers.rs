use axum::{
    body::HttpBody,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    BoxError, Json, Router,
};

use crate::model::{Customer, CustomerPayload, Error, State};

/// Route under which the customer operations are mounted.
pub const BASE_ROUTE: &str = "/api/values";

/// Customer router, nested under [`BASE_ROUTE`].
pub fn customers_router<B>(state: State) -> Router<(), B>
where
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    let routes = Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/:id", get(get_customer).put(update_customer))
        .with_state(state);
    Router::new().nest(BASE_ROUTE, routes)
}

/// Load the stored list for the current request. An empty store and a failed
/// read both come back as not found.
async fn load_customers(state: &State) -> Result<Vec<Customer>, Error> {
    match state.store.read_customers().await {
        Ok(customers) if !customers.is_empty() => Ok(customers),
        Ok(_) => Err(Error::NotFound),
        Err(e) => {
            tracing::error!("Unable to read customers, responding with not found: {e}");
            Err(Error::NotFound)
        }
    }
}

fn validate_payload(
    payload: Result<Json<Option<CustomerPayload>>, JsonRejection>,
) -> Result<Customer, Error> {
    let Json(payload) = payload?;
    payload.ok_or(Error::NullPayload)?.validate()
}

#[tracing::instrument(level = "info", skip_all)]
async fn list_customers(
    axum::extract::State(state): axum::extract::State<State>,
) -> Result<Json<Vec<Customer>>, Error> {
    let customers = load_customers(&state).await?;
    Ok(Json(customers))
}

#[tracing::instrument(level = "info", skip(state))]
async fn get_customer(
    axum::extract::State(state): axum::extract::State<State>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Customer>, Error> {
    let Path(id) = id?;
    let customers = load_customers(&state).await?;
    customers
        .into_iter()
        .find(|c| c.id == id)
        .map(Json)
        .ok_or(Error::NotFound)
}

#[tracing::instrument(level = "info", skip(state))]
async fn create_customer(
    axum::extract::State(state): axum::extract::State<State>,
    payload: Result<Json<Option<CustomerPayload>>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let customer = validate_payload(payload)?;
    // Unlike the read-only operations, a failed read must not be mistaken
    // for an empty store here since the write below would then drop every
    // existing customer.
    let mut customers = state.store.read_customers().await?;
    customers.push(customer.clone());
    state.store.write_customers(&customers).await?;
    tracing::info!("Created customer {}.", customer.id);

    let location = format!("{BASE_ROUTE}/{}", customer.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(customer),
    ))
}

#[tracing::instrument(level = "info", skip(state))]
async fn update_customer(
    axum::extract::State(state): axum::extract::State<State>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Option<CustomerPayload>>, JsonRejection>,
) -> Result<StatusCode, Error> {
    let Path(id) = id?;
    let update = validate_payload(payload)?;
    let mut customers = load_customers(&state).await?;
    let existing = customers
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or(Error::NotFound)?;
    // Only the name is taken from the payload.
    existing.name = update.name;
    state.store.write_customers(&customers).await?;
    tracing::info!("Updated customer {id}.");
    Ok(StatusCode::NO_CONTENT)
}
