//! Document error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("File name cannot be empty")]
    EmptyName,
}
