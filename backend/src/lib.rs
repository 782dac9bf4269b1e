//! Helpdesk backend library modules.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the ticketing
//! rules and ports, [`inbound`] adapts HTTP requests onto them and
//! [`outbound`] implements the ports against PostgreSQL, the filesystem and
//! memory.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
