//! Page handlers: customer list, search, top customers, detail, and forms.
//!
//! Handlers receive plain request parameters, run model calls on the
//! blocking pool, and hand the results to templates. Successful writes
//! redirect back to a page; failures propagate as [`PageError`] and render
//! the error page. Form parsing (timestamps, party size) happens here — the
//! models deliberately do not validate.

use askama::Template;
use axum::extract::{Extension, Form, Path, Query};
use axum::http::StatusCode;
use axum::response::{Html, Redirect, Response};
use brasserie_models::{
    get_customer, list_customers, save_customer, save_reservation, search_customers,
    top_customers, Customer, Reservation, StoreError, TieBreak, DEFAULT_TOP_LIMIT,
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{render_error_page, PageError};
use crate::AppState;

/// Accepted datetime formats for the reservation form. The first is what an
/// HTML `datetime-local` input submits.
const START_AT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Runs a model operation on the blocking pool with a pooled connection.
async fn with_conn<T, F>(state: Arc<AppState>, op: F) -> Result<T, PageError>
where
    F: FnOnce(&rusqlite::Connection) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || -> Result<T, StoreError> {
        let conn = state.pool.get().map_err(StoreError::from)?;
        op(&conn)
    })
    .await?;
    Ok(result?)
}

// Template variables are plain strings mapped from model instances; the
// templates never poke into `Option` fields themselves.

struct CustomerRow {
    id: i64,
    full_name: String,
    phone: String,
}

struct TopCustomerRow {
    id: i64,
    full_name: String,
    reservation_count: i64,
}

struct ReservationRow {
    start_at: String,
    num_guests: i64,
    notes: String,
}

fn customer_row(customer: &Customer) -> CustomerRow {
    CustomerRow {
        // Rows loaded from the store always carry an id.
        id: customer.id.unwrap_or_default(),
        full_name: customer.full_name(),
        phone: customer.phone.clone().unwrap_or_default(),
    }
}

fn reservation_row(reservation: &Reservation) -> ReservationRow {
    ReservationRow {
        start_at: reservation.start_at.format("%Y-%m-%d %H:%M").to_string(),
        num_guests: reservation.num_guests,
        notes: reservation.notes.clone().unwrap_or_default(),
    }
}

/// Empty form fields mean "no value", not an empty string in the store.
fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Template)]
#[template(path = "customer_list.html")]
struct CustomerListTemplate {
    heading: String,
    query: String,
    customers: Vec<CustomerRow>,
}

#[derive(Template)]
#[template(path = "top_customers.html")]
struct TopCustomersTemplate {
    customers: Vec<TopCustomerRow>,
}

#[derive(Template)]
#[template(path = "customer_detail.html")]
struct CustomerDetailTemplate {
    id: i64,
    full_name: String,
    phone: String,
    notes: String,
    reservations: Vec<ReservationRow>,
}

#[derive(Template)]
#[template(path = "customer_new.html")]
struct CustomerNewTemplate;

#[derive(Template)]
#[template(path = "customer_edit.html")]
struct CustomerEditTemplate {
    id: i64,
    full_name: String,
    first_name: String,
    last_name: String,
    phone: String,
    notes: String,
}

/// GET /
pub async fn customer_list_page(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Html<String>, PageError> {
    let customers = with_conn(state, |conn| list_customers(conn)).await?;
    let template = CustomerListTemplate {
        heading: "Customers".to_string(),
        query: String::new(),
        customers: customers.iter().map(customer_row).collect(),
    };
    Ok(Html(template.render()?))
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET /search?q=…
pub async fn customer_search_page(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, PageError> {
    let fragment = params.q.clone();
    let customers = with_conn(state, move |conn| search_customers(conn, &fragment)).await?;
    let template = CustomerListTemplate {
        heading: format!("Search results for \"{}\"", params.q),
        query: params.q,
        customers: customers.iter().map(customer_row).collect(),
    };
    Ok(Html(template.render()?))
}

/// GET /top
pub async fn top_customers_page(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Html<String>, PageError> {
    let customers = with_conn(state, |conn| {
        top_customers(conn, DEFAULT_TOP_LIMIT, TieBreak::default())
    })
    .await?;
    let rows = customers
        .iter()
        .map(|c| TopCustomerRow {
            id: c.id.unwrap_or_default(),
            full_name: c.full_name(),
            reservation_count: c.reservation_count.unwrap_or_default(),
        })
        .collect();
    let template = TopCustomersTemplate { customers: rows };
    Ok(Html(template.render()?))
}

/// GET /customers/{id}
pub async fn customer_detail_page(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, PageError> {
    let (customer, reservations) = with_conn(state, move |conn| {
        let customer = get_customer(conn, id)?;
        let reservations = customer.reservations(conn)?;
        Ok((customer, reservations))
    })
    .await?;

    let template = CustomerDetailTemplate {
        id,
        full_name: customer.full_name(),
        phone: customer.phone.clone().unwrap_or_default(),
        notes: customer.notes.clone().unwrap_or_default(),
        reservations: reservations.iter().map(reservation_row).collect(),
    };
    Ok(Html(template.render()?))
}

#[derive(Deserialize)]
pub struct CustomerForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub notes: String,
}

/// GET /customers/new
pub async fn new_customer_page() -> Result<Html<String>, PageError> {
    Ok(Html(CustomerNewTemplate.render()?))
}

/// POST /customers/new
pub async fn create_customer_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<CustomerForm>,
) -> Result<Redirect, PageError> {
    let mut customer = Customer::new(
        form.first_name,
        form.last_name,
        blank_to_none(form.phone),
        blank_to_none(form.notes),
    );
    let id = with_conn(state, move |conn| {
        save_customer(conn, &mut customer)?;
        Ok(customer.id.unwrap_or_default())
    })
    .await?;
    Ok(Redirect::to(&format!("/customers/{id}")))
}

/// GET /customers/{id}/edit
pub async fn edit_customer_page(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, PageError> {
    let customer = with_conn(state, move |conn| get_customer(conn, id)).await?;
    let template = CustomerEditTemplate {
        id,
        full_name: customer.full_name(),
        first_name: customer.first_name.clone(),
        last_name: customer.last_name.clone(),
        phone: customer.phone.clone().unwrap_or_default(),
        notes: customer.notes.clone().unwrap_or_default(),
    };
    Ok(Html(template.render()?))
}

/// POST /customers/{id}/edit
pub async fn update_customer_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    Form(form): Form<CustomerForm>,
) -> Result<Redirect, PageError> {
    with_conn(state, move |conn| {
        // Load first so a stale id surfaces as NotFound before any write.
        let mut customer = get_customer(conn, id)?;
        customer.first_name = form.first_name;
        customer.last_name = form.last_name;
        customer.phone = blank_to_none(form.phone);
        customer.notes = blank_to_none(form.notes);
        save_customer(conn, &mut customer)
    })
    .await?;
    Ok(Redirect::to(&format!("/customers/{id}")))
}

#[derive(Deserialize)]
pub struct ReservationForm {
    #[serde(default)]
    pub start_at: String,
    #[serde(default)]
    pub num_guests: String,
    #[serde(default)]
    pub notes: String,
}

fn parse_start_at(raw: &str) -> Result<NaiveDateTime, PageError> {
    for format in START_AT_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }
    Err(PageError::BadRequest(format!(
        "could not parse reservation time: {raw:?}"
    )))
}

fn parse_num_guests(raw: &str) -> Result<i64, PageError> {
    let num_guests: i64 = raw
        .trim()
        .parse()
        .map_err(|_| PageError::BadRequest(format!("party size must be a number, got {raw:?}")))?;
    if num_guests < 1 {
        return Err(PageError::BadRequest(
            "party size must be at least 1".to_string(),
        ));
    }
    Ok(num_guests)
}

/// POST /customers/{id}/reservations
pub async fn create_reservation_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    Form(form): Form<ReservationForm>,
) -> Result<Redirect, PageError> {
    let start_at = parse_start_at(&form.start_at)?;
    let num_guests = parse_num_guests(&form.num_guests)?;
    let notes = blank_to_none(form.notes);

    with_conn(state, move |conn| {
        // Load the customer first so a missing id is a 404, not a bare
        // foreign-key violation.
        let customer = get_customer(conn, id)?;
        let mut reservation = Reservation::new(
            customer.id.unwrap_or_default(),
            start_at,
            num_guests,
            notes,
        );
        save_reservation(conn, &mut reservation)
    })
    .await?;
    Ok(Redirect::to(&format!("/customers/{id}")))
}

/// Fallback for unmatched routes: the 404 page.
pub async fn not_found_page() -> Response {
    render_error_page(StatusCode::NOT_FOUND, "page not found".to_string())
}
