//! Domain types shared across the Agora workspace.
//!
//! This crate contains only pure types and predicates with no framework
//! dependencies. Import in `usecase/` and `domain/` layers; never in
//! `infra/` or `handlers/`.

pub mod access;
pub mod actor;
pub mod pagination;
pub mod role;
pub mod visibility;
