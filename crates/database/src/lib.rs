//! # Bookstore Database Crate
//!
//! This crate is the storage layer for the bookstore: the PostgreSQL schema, the
//! bulk inserts the fixture loader needs, and the publisher sales join.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The loader and the query engine only see the
//!   [`Inventory`] trait and the entity structs from `core-types`.
//! - **Explicit handle:** Nothing is global. A command opens one connection with
//!   [`connect`], wraps it in a [`DbRepository`], passes it down, and closes it on exit.
//! - **Two backends:** [`DbRepository`] talks to PostgreSQL; [`MemoryStore`] keeps
//!   id-indexed tables in process and enforces the same foreign keys.
//!
//! ## Public API
//!
//! - `connect`: opens the database connection.
//! - `run_migrations`: creates the bookstore tables if they are missing.
//! - `Inventory`: clear, bulk insert, row counts and the publisher sales join.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use memory::MemoryStore;
pub use repository::DbRepository;
pub use store::Inventory;
