//! Ingress gateway control plane.
//!
//! Watches `Ingress` resources, translates them into gateway configuration
//! through the caches, distributes versioned snapshots to the gateway fleet
//! over xDS, and reports an ingress ready only once the prober has confirmed
//! every gateway pod serves its routes.
//!
//! The library surface exists for the binary in `main.rs` and for tests; the
//! heavy lifting lives in the member crates.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod apis;
mod reconciler;
mod status;

pub use self::{
    apis::{ApiIndex, SharedApiIndex},
    reconciler::Reconciler,
    status::{ReadyCallback, StatusWriter},
};
