//! Harbor Market Core - Shared domain library.
//!
//! This crate provides the storefront domain used across all Harbor Market
//! components:
//! - `storefront` - Public-facing JSON API
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients. Database encoding for the newtypes is available behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, statuses and shipping totals
//! - [`pricing`] - Pricing tiers and unit-price resolution
//! - [`cart`] - The session cart and its mutation rules
//! - [`rating`] - Review ratings and per-product aggregates
//! - [`catalog`] - Product records, filters and sort orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod pricing;
pub mod rating;
pub mod types;

pub use cart::{Cart, CartLine, MAX_LINE_QUANTITY, ProductSnapshot};
pub use catalog::{CatalogQuery, Product, SortOrder};
pub use pricing::{PriceOptions, PricingTier, TierError};
pub use rating::{Rating, RatingError, RatingSummary};
pub use types::*;
