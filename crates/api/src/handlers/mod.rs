pub mod products;
pub mod public;
pub mod purchase_requests;
pub mod reminders;
pub mod staff;
