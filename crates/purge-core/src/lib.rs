//! purge-core
//!
//! Removes one installed product version from a multi-product catalog
//! without breaking the others: every artifact the version references is
//! deleted only if no other installed version references it too.
//!
//! # Modules
//! - **domain**: product keys, artifact references, catalog, outcomes, errors
//! - **ports**: async traits for the external systems (catalog store, registry,
//!   object store, package repository, image index, credentials)
//! - **app**: exclusivity resolver, per-kind removers, orchestrator, `ProductPurge`
//! - **impls**: in-memory fakes, file catalog store, Nexus client, `cray` adapter

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
