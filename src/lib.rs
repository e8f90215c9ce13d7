//! Plaza: campus plaza backend.
//!
//! The interesting parts live in three layers: [`cache`] (generic keyed
//! TTL cache), [`auth`] (token verification fronted by the auth state
//! cache), and [`application::stats`] (heterogeneous batch aggregation
//! of like/comment/view counters). [`client`] is the presentation-tier
//! stats cache with request coalescing. Everything else is the ambient
//! service shell around them.

pub mod application;
pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod domain;
pub mod infra;
