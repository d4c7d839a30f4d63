//! Request and response bodies

pub mod drafts;
