pub mod product;
pub mod purchase_request;
pub mod staff;
