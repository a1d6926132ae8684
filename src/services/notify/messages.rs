//! Human-readable notification texts for booking events.

use chrono::{Duration, Utc};

use crate::models::{normalize_phone, Booking};

const THANK_YOU_POOL: [&str; 6] = [
    "Thank you so much for booking with The Beauty Bar UG! 🎀 We're thrilled to have you and can't wait to give you the glow-up you deserve. See you soon, beautiful!",
    "Yay! Your booking is confirmed! 💅 Thank you for choosing The Beauty Bar UG. Get ready to look and feel absolutely stunning. We'll be in touch shortly!",
    "Thank you for trusting us with your beauty needs! ✨ The Beauty Bar UG team is excited to pamper you. Your best look yet is coming!",
    "Booking received! 🌟 Thank you for choosing The Beauty Bar UG. We promise to make you feel like royalty. Can't wait to see you!",
    "You're officially booked! 💖 Thank you for picking The Beauty Bar UG. Get ready for an amazing transformation. See you soon, gorgeous!",
    "Thank you, queen! 👑 Your appointment at The Beauty Bar UG is confirmed. We're preparing to make you shine even brighter!",
];

/// The fields a notification needs about a booking. Built from a stored
/// [`Booking`] or directly from the notify side-channel payload.
#[derive(Debug, Clone)]
pub struct BookingDigest {
    pub reference: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service: String,
    pub category: String,
    pub price: i64,
    pub date: String,
    pub time: String,
    pub notes: Option<String>,
}

impl From<&Booking> for BookingDigest {
    fn from(b: &Booking) -> Self {
        Self {
            reference: b.id.clone(),
            customer_name: b.customer_name.clone(),
            customer_phone: b.customer_phone.clone(),
            customer_email: b.customer_email.clone(),
            service: b.service.clone(),
            category: b.category.clone(),
            price: b.price,
            date: b.date.clone(),
            time: b.time.clone(),
            notes: b.notes.clone(),
        }
    }
}

pub fn thank_you(customer_name: &str, service: &str) -> String {
    let idx = Utc::now().timestamp_subsec_nanos() as usize % THANK_YOU_POOL.len();
    format!(
        "Hey {customer_name}! {}\n\n📅 Service: {service}\n\n💕 The Beauty Bar UG Team",
        THANK_YOU_POOL[idx]
    )
}

pub fn owner_created_summary(d: &BookingDigest) -> String {
    let mut msg = format!(
        "🎀 NEW BOOKING - THE BEAUTY BAR UG 🎀\n\n\
         📋 Booking ID: {}\n\n\
         👤 CUSTOMER:\n   Name: {}\n   Phone: {}\n",
        d.reference, d.customer_name, d.customer_phone
    );
    if let Some(email) = &d.customer_email {
        msg.push_str(&format!("   Email: {email}\n"));
    }
    msg.push_str(&format!(
        "\n💅 SERVICE:\n   {}\n   Category: {}\n   Price: UGX {}\n\n\
         📅 APPOINTMENT:\n   Date: {}\n   Time: {}\n",
        d.service,
        d.category,
        format_ugx(d.price),
        d.date,
        d.time
    ));
    if let Some(notes) = &d.notes {
        msg.push_str(&format!("\n📝 Notes: {notes}\n"));
    }
    msg.push_str(&format!("\n⏰ Booked: {}", kampala_timestamp()));
    msg
}

pub fn customer_confirmation(d: &BookingDigest, owner_phone: &str, cancel_url: &str) -> String {
    format!(
        "{}\n\n━━━━━━━━━━━━━━━━━━━━━━━\n\n\
         📋 Your Booking Details:\n\
         • Reference: {}\n\
         • Service: {}\n\
         • Date: {}\n\
         • Time: {}\n\
         • Price: UGX {}\n\n\
         ━━━━━━━━━━━━━━━━━━━━━━━\n\n\
         ⚠️ Need to cancel?\n\
         Contact us on WhatsApp: {}\n\
         Or use this link: {}\n\n\
         📍 The Beauty Bar UG",
        thank_you(&d.customer_name, &d.service),
        d.reference,
        d.service,
        d.date,
        d.time,
        format_ugx(d.price),
        owner_phone,
        cancel_url,
    )
}

pub fn owner_cancelled_summary(b: &Booking) -> String {
    format!(
        "❌ BOOKING CANCELLED\n\n\
         📋 Booking ID: {}\n\
         👤 Customer: {}\n\
         📱 Phone: {}\n\
         💅 Service: {}\n\
         📅 Was scheduled: {} at {}\n\n\
         ⏰ Cancelled at: {}",
        b.id, b.customer_name, b.customer_phone, b.service, b.date, b.time,
        kampala_timestamp(),
    )
}

pub fn cancel_info(owner_phone: &str, reference: &str) -> String {
    format!("To cancel, contact WhatsApp: {owner_phone} with reference {reference}")
}

/// Pre-filled WhatsApp deep link. Needs no credential, so it is always
/// computable even when every delivery channel is down or unconfigured.
pub fn whatsapp_link(phone: &str, text: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        normalize_phone(phone),
        urlencoding::encode(text)
    )
}

/// Whole UGX with thousands separators, e.g. 370000 -> "370,000".
pub fn format_ugx(price: i64) -> String {
    let digits = price.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Wall-clock time in Kampala (UTC+3, no DST).
fn kampala_timestamp() -> String {
    (Utc::now() + Duration::hours(3))
        .format("%d/%m/%Y %H:%M:%S EAT")
        .to_string()
}
