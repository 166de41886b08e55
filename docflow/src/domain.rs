//! Domain layer of the workflow engine.
//!
//! [`models`] carries the request, query and error types, [`ports`] the
//! traits the services are generic over, and [`services`] the use case
//! implementations themselves. Nothing in here touches a concrete store.

pub mod models;
pub mod ports;
pub mod services;
