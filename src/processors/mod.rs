//! Document processors

pub mod batch;
pub mod lexer;
pub mod selective;
