//! Utility functions shared by the reader and the command-line front end.

mod url_validator;

pub use url_validator::{validate_url, UrlValidationError};
