pub mod booking;

pub use booking::{normalize_phone, Booking, BookingStatus, NewBooking};
