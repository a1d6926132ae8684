use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::models::{normalize_phone, Booking, BookingStatus};

const DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";

const BOOKING_COLUMNS: &str = "id, customer_name, customer_phone, customer_email, service, \
     category, price, date, time, notes, status, created_at, cancelled_at";

fn parse_booking_row(row: &Row) -> rusqlite::Result<Booking> {
    let status_str: String = row.get(10)?;
    let created_at_str: String = row.get(11)?;
    let cancelled_at_str: Option<String> = row.get(12)?;

    Ok(Booking {
        id: row.get(0)?,
        customer_name: row.get(1)?,
        customer_phone: row.get(2)?,
        customer_email: row.get(3)?,
        service: row.get(4)?,
        category: row.get(5)?,
        price: row.get(6)?,
        date: row.get(7)?,
        time: row.get(8)?,
        notes: row.get(9)?,
        status: BookingStatus::parse(&status_str).unwrap_or(BookingStatus::Confirmed),
        created_at: NaiveDateTime::parse_from_str(&created_at_str, DATE_FMT)
            .unwrap_or_else(|_| Utc::now().naive_utc()),
        cancelled_at: cancelled_at_str
            .and_then(|s| NaiveDateTime::parse_from_str(&s, DATE_FMT).ok()),
    })
}

pub fn insert_booking(conn: &Connection, booking: &Booking) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, customer_name, customer_phone, phone_digits, customer_email, \
         service, category, price, date, time, notes, status, created_at, cancelled_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            booking.id,
            booking.customer_name,
            booking.customer_phone,
            normalize_phone(&booking.customer_phone),
            booking.customer_email,
            booking.service,
            booking.category,
            booking.price,
            booking.date,
            booking.time,
            booking.notes,
            booking.status.as_str(),
            booking.created_at.format(DATE_FMT).to_string(),
            booking.cancelled_at.map(|t| t.format(DATE_FMT).to_string()),
        ],
    )?;
    Ok(())
}

/// All bookings in insertion order. Consumers reverse for recency display.
pub fn list_bookings(conn: &Connection) -> rusqlite::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY rowid ASC"
    ))?;

    let rows = stmt.query_map([], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

/// Customer-facing lookup: reference plus digit-normalized phone match.
pub fn find_by_id_and_phone(
    conn: &Connection,
    id: &str,
    phone: &str,
) -> rusqlite::Result<Option<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1 AND phone_digits = ?2"
    ))?;

    match stmt.query_row(params![id, normalize_phone(phone)], parse_booking_row) {
        Ok(booking) => Ok(Some(booking)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn find_by_id(conn: &Connection, id: &str) -> rusqlite::Result<Option<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id], parse_booking_row) {
        Ok(booking) => Ok(Some(booking)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Unconditional status overwrite (admin paths and customer cancellation).
/// `cancelled_at` is kept from the first cancellation, set when entering
/// the cancelled state, and cleared when an admin moves the record out of it.
pub fn update_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
) -> rusqlite::Result<Option<Booking>> {
    let now = Utc::now().naive_utc().format(DATE_FMT).to_string();
    let count = conn.execute(
        "UPDATE bookings
         SET status = ?1,
             cancelled_at = CASE WHEN ?1 = 'cancelled' THEN COALESCE(cancelled_at, ?2) ELSE NULL END
         WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;

    if count == 0 {
        return Ok(None);
    }
    find_by_id(conn, id)
}

/// Hard delete. Returns whether a record was removed.
pub fn delete_booking(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StatusCounts {
    pub confirmed: i64,
    pub cancelled: i64,
    pub completed: i64,
}

pub fn status_counts(conn: &Connection) -> rusqlite::Result<StatusCounts> {
    let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM bookings GROUP BY status")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut counts = StatusCounts::default();
    for row in rows {
        let (status, n) = row?;
        match status.as_str() {
            "confirmed" => counts.confirmed = n,
            "cancelled" => counts.cancelled = n,
            "completed" => counts.completed = n,
            _ => {}
        }
    }
    Ok(counts)
}
