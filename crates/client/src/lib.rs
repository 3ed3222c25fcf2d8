//! Annotation client core.
//!
//! The client is a single state machine ([`controller::reduce`]) fed by
//! [`action::Action`]s. Side effects are returned as [`action::Effect`]s and
//! executed by [`runtime::Runtime`] against the REST backend through
//! [`api::ApiClient`]. Presentational components are plain view models
//! computed from the state in [`view`].

pub mod action;
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod keyboard;
pub mod playback;
pub mod runtime;
pub mod state;
pub mod view;
