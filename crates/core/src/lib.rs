//! Core library for pokecat
//!
//! This crate implements the **Functional Core** of the pokecat application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The pokecat project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`pokecat_core`** (this crate): Pure transformation functions with zero I/O
//! - **`pokecat`**: HTTP access, caching, concurrency and terminal output (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Deterministic**: Behavior is predictable and reproducible
//! - **Testable**: Can be tested with simple fixture data, no mocking required
//!
//! # Module Organization
//!
//! - [`pokemon`]: API records, catalog entities and url-to-id parsing
//! - [`query`]: Query state, retrieval mode selection and page-window slicing
//! - [`assemble`]: Merging an id source and per-id detail outcomes into one page
//! - [`generation`]: Request-generation tokens that reject superseded results
//! - [`colors`]: Type color table used to style category badges
//! - [`error`]: The failure kinds shared by every layer
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use pokecat_core::assemble::{assemble, IdSource, QueryStatus};
//! use pokecat_core::query::QueryState;
//!
//! let state = QueryState::new(1, Some("char"), None);
//! let source = QueryStatus::Ready(IdSource::new(vec![4, 5, 6], 3));
//!
//! // Details may arrive in any order; rows come back in id-source order.
//! let details = vec![(4, QueryStatus::Pending), (5, QueryStatus::Pending), (6, QueryStatus::Pending)];
//! let page = assemble(&state, &source, &details);
//!
//! assert!(page.is_loading);
//! assert_eq!(page.total_count, 3);
//! ```

pub mod assemble;
pub mod colors;
pub mod error;
pub mod generation;
pub mod pokemon;
pub mod query;

pub use error::CatalogError;
