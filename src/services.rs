pub mod auth;
pub mod dashboard_service;
pub mod inventory_service;
pub mod settings_service;
