//! Target adapter implementations for the Ory stack
//!
//! This crate provides implementations of the `TargetAdapter` trait for:
//!
//! - Ory Hydra (OAuth2 token grant + introspection)
//! - Ory Kratos (identity registration + lookup)
//! - Ory Keto (relation tuple write + permission check)
//!
//! Each adapter owns its wire details end to end: endpoint paths, typed
//! request/response bodies, and the generation of fresh write inputs per
//! call. The engine never sees any of it.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod http;
pub mod hydra;
pub mod keto;
pub mod kratos;

pub use hydra::HydraAdapter;
pub use keto::KetoAdapter;
pub use kratos::KratosAdapter;
