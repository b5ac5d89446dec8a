pub mod audit_service;
pub mod config_service;
pub mod registry_service;
pub mod session_service;
pub mod vault_service;
