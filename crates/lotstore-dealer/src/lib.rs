//! LotStore Dealer — dealership entity stores over lotstore-core.
//!
//! Persists three related entity streams (vehicle models, inventory,
//! sales) as fixed-slot record files with flat key/offset indexes, and
//! exposes the cross-file joins and aggregations built on top.
//!
//! The external boundary is [`DealerService`]: eight operations over one
//! configured root directory. Everything else (argument parsing, process
//! wiring, transports) belongs to the surrounding application.

pub mod config;
pub mod query;
pub mod records;
pub mod service;
pub mod store;

// Re-export key types for convenience
pub use config::Config;
pub use records::{Car, CarFullInfo, CarStatus, Model, ModelSaleStats, Record, Sale};
pub use service::DealerService;
pub use store::EntityStore;
