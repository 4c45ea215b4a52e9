//! Core types and engine for Stride's social layer: who follows whom, who may
//! see what, and how raw notification events are grouped for display.
//!
//! This crate is deliberately free of HTTP and database dependencies. Every
//! operation takes the viewer's id explicitly; there is no ambient session.

pub mod account;
pub mod accounts;
pub mod aggregate;
pub mod error;
pub mod feed;
pub mod follow;
pub mod graph;
pub mod inbox;
pub mod notification;
pub mod post;
pub mod posts;
pub mod signal;
pub mod store;
pub mod visibility;

pub use error::{Error, Result};
