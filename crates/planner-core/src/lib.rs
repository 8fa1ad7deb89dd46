//! Core types and trait definitions for the event planner dashboard.
//!
//! No HTTP here. The remote store, the auth service and the workflow backend
//! are reached only through the traits in [`store`] and [`action`]; concrete
//! clients live in `planner-supabase` and the `planner` binary.

// Trait impls are written as `async fn`; the traits spell out `Send`.
#![allow(async_fn_in_trait)]

pub mod action;
pub mod artifact;
pub mod concept;
pub mod dashboard;
pub mod error;
pub mod event;
pub mod input;
pub mod session;
pub mod store;
pub mod view;

pub use error::{Error, Result};
