//! Infrastructure layer: wire DTOs and concrete backends.

pub mod dto;
pub mod repository;
