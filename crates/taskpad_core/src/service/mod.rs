//! Core use-case services.
//!
//! # Responsibility
//! - Compose validation, store operations and persistence into user intents.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod task_service;
