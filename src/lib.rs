// ABOUTME: Main library entry point for the Fratelli confectionery backend
// ABOUTME: Tracks raw-material stock, recipes, production capability, and consumption history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

#![deny(unsafe_code)]

//! # Fratelli Server
//!
//! Inventory-and-recipe management backend for a confectionery business.
//! It tracks raw-material stock, defines recipes as bills-of-materials over
//! that stock, computes how many batches of each recipe current stock
//! allows, and records consumption history when recipes are prepared.
//!
//! ## Architecture
//!
//! - **Units**: normalization of supported units to canonical grams
//! - **Stock Ledger**: exclusive owner of ingredient quantities; every
//!   mutation is atomic and never drives stock negative
//! - **Recipe Catalog**: recipe definitions validated against the ledger
//! - **Capability Calculator**: pure min-over-lines batch projection
//! - **Preparation Transaction**: all-or-nothing stock consumption with an
//!   append-only history trail
//! - **Routes**: thin axum handlers translating typed errors into the JSON
//!   error envelope
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fratelli_server::config::ServerConfig;
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Fratelli server configured: {}", config.summary());
//!     Ok(())
//! }
//! ```

/// Capability calculator: producible batches per recipe
pub mod capability;

/// Environment-based configuration management
pub mod config;

/// Database handle, schema migrations, and domain managers
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Logging configuration and structured logging setup
pub mod logging;

/// Request-id middleware for correlation
pub mod middleware;

/// Core domain types
pub mod models;

/// Preparation transaction: atomic stock consumption
pub mod preparation;

/// HTTP routes
pub mod routes;

/// Unit normalization to canonical grams
pub mod units;
