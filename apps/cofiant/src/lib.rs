//! # Cofiant - Faceted Biography Search
//!
//! The application layer over `cofiant-core`: the network executor, the
//! single-flight search controller, the HTTP API and the CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     apps/cofiant (THE BINARY)                   │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐    │
//! │  │   CLI       │    │   HTTP API  │    │  Facet Loader    │    │
//! │  │  (clap)     │    │   (axum)    │    │  (JSON / bundle) │    │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘    │
//! │         │                  │                    │              │
//! │         ▼                  ▼                    │              │
//! │  ┌─────────────────────────────────┐            │              │
//! │  │ SearchController → Executor     │            │              │
//! │  │ (tokio single-flight, reqwest)  │            │              │
//! │  └──────────────┬──────────────────┘            │              │
//! │                 ▼                               ▼              │
//! │                    ┌─────────────────┐                         │
//! │                    │  cofiant-core   │                         │
//! │                    │  (THE LOGIC)    │                         │
//! │                    └─────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod executor;
pub mod loader;
