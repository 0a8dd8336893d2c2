pub mod availability;
pub mod availability_bulk;
pub mod booking;
pub mod clock;
pub mod config;
pub mod identity;
pub mod macros;
pub mod notification;
pub mod permission;
pub mod slot_resolution;
pub mod uuid_service;
