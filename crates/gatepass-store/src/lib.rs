//! # gatepass-store
//!
//! Local persistent storage for the gate-pass kiosk, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection`, runs versioned migrations and seeds the operator
//! accounts on open. Every record type implements [`Collection`], giving the
//! uniform `put` / `get` / `get_all` contract, and the per-table modules add
//! the indexed queries the kiosk needs.

pub mod blacklist;
pub mod collection;
pub mod database;
pub mod logs;
pub mod migrations;
pub mod models;
pub mod phones;
pub mod settings;
pub mod users;
pub mod visitors;

mod error;

pub use collection::{Collection, Removable};
pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
