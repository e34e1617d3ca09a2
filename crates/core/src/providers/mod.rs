pub mod traits;

// API provider implementations
pub mod threads_api;
