//! Access to the operational database through its GraphQL engine (Hasura).
//!
//! Every failure talking to the engine collapses into [`QueryExecutionError`];
//! the underlying cause is logged here and never handed to the caller.

pub mod client;
pub mod queries;

pub use client::{vector_literal, GraphqlClient, QueryExecutionError, ADMIN_SECRET_HEADER};
