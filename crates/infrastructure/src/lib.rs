//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_access_control_store;
mod postgres_authorization_repository;
mod postgres_identity_directory;
mod postgres_security_admin_repository;

pub use in_memory_access_control_store::InMemoryAccessControlStore;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_identity_directory::PostgresIdentityDirectory;
pub use postgres_security_admin_repository::PostgresSecurityAdminRepository;
