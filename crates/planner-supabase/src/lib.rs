//! Supabase backend for the event planner.
//!
//! [`SupabaseClient`] implements both [`planner_core::store::PlannerStore`]
//! (PostgREST under `/rest/v1`) and [`planner_core::store::AuthProvider`]
//! (GoTrue under `/auth/v1`) over a single shared [`reqwest::Client`].

mod auth;
mod cache;
mod client;
mod encode;
mod store;

pub mod error;

pub use cache::FileSessionCache;
pub use client::{SupabaseClient, SupabaseConfig};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
