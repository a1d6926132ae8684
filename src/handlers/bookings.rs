use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, NewBooking};
use crate::services::notify::messages::{self, BookingDigest};
use crate::state::AppState;

const MISSING_PARAMS: &str = "Please provide booking ID and phone number";
const NOT_FOUND_HINT: &str =
    "Booking not found. Please check your booking reference and phone number.";

// ── Payload normalization ──

/// Raw creation payload. The booking form, the chat widget and older
/// clients disagree on field names, so every logical field accepts its
/// known aliases and is collapsed into one canonical shape below.
#[derive(Debug, Deserialize)]
pub struct BookingPayload {
    #[serde(alias = "fullName", alias = "customerName")]
    name: Option<String>,
    #[serde(alias = "customerPhone")]
    phone: Option<String>,
    #[serde(alias = "customerEmail")]
    email: Option<String>,
    #[serde(alias = "serviceName")]
    service: Option<String>,
    #[serde(alias = "categoryId")]
    category: Option<String>,
    price: Option<i64>,
    #[serde(rename = "priceUGX")]
    price_ugx: Option<i64>,
    date: Option<String>,
    time: Option<String>,
    notes: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn normalize_payload(payload: BookingPayload) -> Result<NewBooking, AppError> {
    let name = trimmed(payload.name);
    let phone = trimmed(payload.phone);
    let (Some(name), Some(phone)) = (name, phone) else {
        return Err(AppError::Validation(
            "Please provide your name and phone number".to_string(),
        ));
    };
    if !phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Please provide a valid phone number".to_string(),
        ));
    }

    let price = payload.price_ugx.or(payload.price).unwrap_or(0);
    if price < 0 {
        return Err(AppError::Validation("Price cannot be negative".to_string()));
    }

    Ok(NewBooking {
        customer_name: name,
        customer_phone: phone,
        customer_email: trimmed(payload.email),
        service: trimmed(payload.service).unwrap_or_else(|| "Beauty Service".to_string()),
        category: trimmed(payload.category).unwrap_or_else(|| "General".to_string()),
        price,
        date: trimmed(payload.date).unwrap_or_else(|| "TBD".to_string()),
        time: trimmed(payload.time).unwrap_or_else(|| "TBD".to_string()),
        notes: trimmed(payload.notes),
    })
}

// ── Response shapes ──

#[derive(Serialize)]
pub struct BookingSummary {
    id: String,
    service: String,
    date: String,
    time: String,
    price: i64,
    status: String,
}

impl From<&Booking> for BookingSummary {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id.clone(),
            service: b.service.clone(),
            date: b.date.clone(),
            time: b.time.clone(),
            price: b.price,
            status: b.status.as_str().to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBookingView {
    id: String,
    name: String,
    phone: String,
    email: Option<String>,
    service: String,
    category: String,
    price: i64,
    date: String,
    time: String,
    notes: Option<String>,
    status: String,
    created_at: String,
    cancelled_at: Option<String>,
}

impl From<&Booking> for AdminBookingView {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id.clone(),
            name: b.customer_name.clone(),
            phone: b.customer_phone.clone(),
            email: b.customer_email.clone(),
            service: b.service.clone(),
            category: b.category.clone(),
            price: b.price,
            date: b.date.clone(),
            time: b.time.clone(),
            notes: b.notes.clone(),
            status: b.status.as_str().to_string(),
            created_at: b.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            cancelled_at: b
                .cancelled_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

// ── Admin credential ──

/// Exact-equality check against the environment-configured shared secret.
/// With no secret configured, every admin request is rejected.
fn check_admin_key(config: &AppConfig, provided: Option<&str>) -> Result<(), AppError> {
    match (&config.admin_key, provided) {
        (Some(expected), Some(given)) if expected == given => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

// ── POST /bookings ──

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    success: bool,
    booking_ref: String,
    message: String,
    owner_whats_app_link: String,
    owner_email_sent: bool,
    customer_email_sent: bool,
    chat_ops_sent: bool,
    cancel_info: String,
    booking: BookingSummary,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BookingPayload>,
) -> Result<Json<CreateBookingResponse>, AppError> {
    let new = normalize_payload(payload)?;

    let booking = Booking {
        id: state.references.next(),
        customer_name: new.customer_name,
        customer_phone: new.customer_phone,
        customer_email: new.customer_email,
        service: new.service,
        category: new.category,
        price: new.price,
        date: new.date,
        time: new.time,
        notes: new.notes,
        status: BookingStatus::Confirmed,
        created_at: Utc::now().naive_utc(),
        cancelled_at: None,
    };

    {
        let db = state.db.lock().unwrap();
        queries::insert_booking(&db, &booking)?;
    }
    tracing::info!(reference = %booking.id, service = %booking.service, "booking created");

    // Best-effort fan-out. Delivery failures only show up as flags below.
    let outcome = state.notifier.booking_created(&booking).await;

    let owner_msg = messages::owner_created_summary(&BookingDigest::from(&booking));

    Ok(Json(CreateBookingResponse {
        success: true,
        booking_ref: booking.id.clone(),
        message: messages::thank_you(&booking.customer_name, &booking.service),
        owner_whats_app_link: state.notifier.owner_whatsapp_link(&owner_msg),
        owner_email_sent: outcome.owner_email_sent,
        customer_email_sent: outcome.customer_email_sent,
        chat_ops_sent: outcome.chat_ops_sent,
        cancel_info: messages::cancel_info(state.notifier.owner_phone(), &booking.id),
        booking: BookingSummary::from(&booking),
    }))
}

// ── GET /bookings (customer cancel / status lookup / admin list) ──

#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    action: Option<String>,
    id: Option<String>,
    phone: Option<String>,
    key: Option<String>,
}

#[derive(Serialize)]
pub struct CancelledSummary {
    id: String,
    status: String,
    service: String,
}

#[derive(Serialize)]
pub struct CancelResponse {
    success: bool,
    message: String,
    booking: CancelledSummary,
}

#[derive(Serialize)]
pub struct LookupResponse {
    booking: BookingSummary,
}

#[derive(Serialize)]
pub struct AdminListResponse {
    total: i64,
    confirmed: i64,
    cancelled: i64,
    completed: i64,
    bookings: Vec<AdminBookingView>,
}

pub async fn bookings_query(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Response, AppError> {
    match query {
        BookingsQuery {
            action: Some(action),
            id: Some(id),
            phone: Some(phone),
            ..
        } if action == "cancel" => {
            let res = cancel_for_customer(&state, &id, &phone).await?;
            Ok(Json(res).into_response())
        }
        BookingsQuery {
            id: Some(id),
            phone: Some(phone),
            ..
        } => {
            let booking = {
                let db = state.db.lock().unwrap();
                queries::find_by_id_and_phone(&db, &id, &phone)?
            }
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

            Ok(Json(LookupResponse {
                booking: BookingSummary::from(&booking),
            })
            .into_response())
        }
        BookingsQuery { key: Some(key), .. } => {
            check_admin_key(&state.config, Some(&key))?;

            let (counts, mut bookings) = {
                let db = state.db.lock().unwrap();
                (queries::status_counts(&db)?, queries::list_bookings(&db)?)
            };
            // Most recent first for the dashboard.
            bookings.reverse();

            Ok(Json(AdminListResponse {
                total: bookings.len() as i64,
                confirmed: counts.confirmed,
                cancelled: counts.cancelled,
                completed: counts.completed,
                bookings: bookings.iter().map(AdminBookingView::from).collect(),
            })
            .into_response())
        }
        _ => Err(AppError::Validation(MISSING_PARAMS.to_string())),
    }
}

/// Shared customer-cancellation path for the GET and DELETE shapes.
/// Cancelling an already-cancelled booking is a success-with-notice, not
/// an error, and leaves `cancelled_at` untouched.
async fn cancel_for_customer(
    state: &AppState,
    id: &str,
    phone: &str,
) -> Result<CancelResponse, AppError> {
    let existing = {
        let db = state.db.lock().unwrap();
        queries::find_by_id_and_phone(&db, id, phone)?
    }
    .ok_or_else(|| AppError::NotFound(NOT_FOUND_HINT.to_string()))?;

    if existing.status == BookingStatus::Cancelled {
        return Ok(CancelResponse {
            success: true,
            message: "This booking has already been cancelled.".to_string(),
            booking: CancelledSummary {
                id: existing.id,
                status: BookingStatus::Cancelled.as_str().to_string(),
                service: existing.service,
            },
        });
    }

    let updated = {
        let db = state.db.lock().unwrap();
        queries::update_status(&db, &existing.id, BookingStatus::Cancelled)?
    }
    .ok_or_else(|| AppError::NotFound(NOT_FOUND_HINT.to_string()))?;

    tracing::info!(reference = %updated.id, "booking cancelled by customer");
    state.notifier.booking_cancelled(&updated).await;

    Ok(CancelResponse {
        success: true,
        message: format!(
            "Your booking {} has been cancelled. We're sorry to see you go! Feel free to book again anytime. 💕",
            updated.id
        ),
        booking: CancelledSummary {
            id: updated.id,
            status: updated.status.as_str().to_string(),
            service: updated.service,
        },
    })
}

// ── PATCH /bookings (admin status update) ──

#[derive(Debug, Deserialize)]
pub struct AdminUpdateRequest {
    id: Option<String>,
    status: Option<String>,
    key: Option<String>,
}

#[derive(Serialize)]
pub struct AdminUpdateResponse {
    success: bool,
    booking: AdminBookingView,
}

pub async fn admin_update_status(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AdminUpdateRequest>,
) -> Result<Json<AdminUpdateResponse>, AppError> {
    check_admin_key(&state.config, body.key.as_deref())?;

    let (Some(id), Some(status)) = (trimmed(body.id), trimmed(body.status)) else {
        return Err(AppError::Validation(
            "Please provide booking id and status".to_string(),
        ));
    };
    let status = BookingStatus::parse(&status)
        .ok_or_else(|| AppError::Validation(format!("Unknown status: {status}")))?;

    // Admin override: any status may be set directly, no transition rules.
    let updated = {
        let db = state.db.lock().unwrap();
        queries::update_status(&db, &id, status)?
    }
    .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    tracing::info!(reference = %updated.id, status = status.as_str(), "booking status updated by admin");

    Ok(Json(AdminUpdateResponse {
        success: true,
        booking: AdminBookingView::from(&updated),
    }))
}

// ── DELETE /bookings (admin hard delete / customer cancel) ──

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    key: Option<String>,
    #[serde(rename = "bookingId", alias = "id")]
    booking_id: Option<String>,
    phone: Option<String>,
}

pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeleteRequest>,
) -> Result<Response, AppError> {
    // With a key this is the admin hard delete; without one it is the
    // delete-shaped customer cancellation.
    if body.key.is_some() {
        check_admin_key(&state.config, body.key.as_deref())?;

        let id = trimmed(body.booking_id)
            .ok_or_else(|| AppError::Validation("Please provide the booking id".to_string()))?;

        let removed = {
            let db = state.db.lock().unwrap();
            queries::delete_booking(&db, &id)?
        };
        if !removed {
            return Err(AppError::NotFound("Booking not found".to_string()));
        }

        tracing::info!(reference = %id, "booking deleted by admin");
        return Ok(Json(serde_json::json!({
            "success": true,
            "message": format!("Booking {id} has been permanently deleted."),
        }))
        .into_response());
    }

    match (trimmed(body.booking_id), trimmed(body.phone)) {
        (Some(id), Some(phone)) => {
            let res = cancel_for_customer(&state, &id, &phone).await?;
            Ok(Json(res).into_response())
        }
        _ => Err(AppError::Validation(MISSING_PARAMS.to_string())),
    }
}

// ── POST /bookings/notify (chat-ops side channel) ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    booking_ref: Option<String>,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    service: Option<String>,
    date: Option<String>,
    time: Option<String>,
    price: Option<i64>,
    notes: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    success: bool,
    notification_sent: bool,
    message: String,
}

/// Secondary notifier: independently re-attempts the chat-ops channels
/// for a booking summary. Always 200; the flag reports what happened.
pub async fn send_notification(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NotifyRequest>,
) -> Json<NotifyResponse> {
    let digest = BookingDigest {
        reference: body.booking_ref.unwrap_or_default(),
        customer_name: body.customer_name.unwrap_or_default(),
        customer_phone: body.customer_phone.unwrap_or_default(),
        customer_email: None,
        service: body.service.unwrap_or_default(),
        category: "General".to_string(),
        price: body.price.unwrap_or(0),
        date: body.date.unwrap_or_else(|| "TBD".to_string()),
        time: body.time.unwrap_or_else(|| "TBD".to_string()),
        notes: body.notes,
    };

    let message = messages::owner_created_summary(&digest);
    let sent = state.notifier.send_chat_ops(&message).await;

    Json(NotifyResponse {
        success: true,
        notification_sent: sent,
        message: if sent {
            "WhatsApp notification sent!".to_string()
        } else {
            "Notification logged (no chat-ops channel configured)".to_string()
        },
    })
}
