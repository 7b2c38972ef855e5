//! Core types and the contact view engine for the phonebook directory.
//!
//! This crate is deliberately free of HTTP, terminal and filesystem
//! dependencies. The engine in [`view`] is a pure function over an immutable
//! [`contact::Snapshot`]; everything that fetches, persists or renders lives in
//! `phonebook-cli`.

pub mod admin;
pub mod collate;
pub mod contact;
pub mod emergency;
pub mod error;
pub mod favorites;
pub mod pagination;
pub mod view;

pub use error::{Error, Result};
