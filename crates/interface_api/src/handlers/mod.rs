//! Request handlers

pub mod drafts;
pub mod health;
