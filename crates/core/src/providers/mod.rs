pub mod registry;
pub mod traits;

// API provider implementations
pub mod frankfurter;
pub mod open_er_api;
