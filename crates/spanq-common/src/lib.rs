//! Shared building blocks for the spanq workspace: byte spans, script tokens,
//! lexer errors and the type model used on both sides of the host boundary.

pub mod error;
pub mod span;
pub mod token;
pub mod ty;
