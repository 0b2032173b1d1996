//! Kanban board back-end.
//!
//! ## Overview
//!
//! Columns hold ordered cards. Every column and card carries a zero-based
//! `position` that stays dense within its scope (the board for columns, the
//! owning column for cards). All position changes run inside one SQLite
//! transaction, so a failed operation leaves the board exactly as it was.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │  Client  │ ───────> │  server.rs  (axum Router, ServerConfig)          │
//! │          │ <─────── │    ├─ api.rs      (REST handlers, AppState)      │
//! └──────────┘          │    └─ graphql.rs  (Query/Mutation roots)         │
//!                       │         │                                        │
//!                       │         │ DbHandle::call()  (spawn_blocking)     │
//!                       │         v                                        │
//!                       │  reindex.rs  (append, compact, move, bulk)       │
//!                       │         │                                        │
//!                       │         │ BoardStore::transaction(|tx| ..)       │
//!                       │         v                                        │
//!                       │  store.rs    (BoardStore, BoardTx, SQLite)       │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module    | Responsibility                                              |
//! |-----------|-------------------------------------------------------------|
//! | `models`  | Shared types: `Board`, `Column`, `Card`, request payloads   |

pub mod api;
pub mod graphql;
pub mod models;
pub mod reindex;
pub mod server;
pub mod store;

pub use models::{Board, Card, Column};
pub use server::{ServerConfig, start_server};
pub use store::{BoardStore, DbHandle};
