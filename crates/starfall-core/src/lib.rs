//! Core types and content tables for the Starfall combat simulation.
//!
//! This crate defines the vocabulary shared by the behavior dispatcher, the
//! simulation engine and any front end: components, commands, snapshots,
//! events, constants, and the validated content registry.

mod builtin;
pub mod commands;
pub mod components;
pub mod constants;
pub mod content;
pub mod enums;
pub mod error;
pub mod events;
pub mod registry;
pub mod state;
pub mod types;
