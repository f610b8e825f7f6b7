//! Utility functions for common operations.
//!
//! - **URL validation**: Normalizing the item service base URL
//! - **Text processing**: Unicode-aware column fitting for terminal output

mod text;
mod url_validator;

pub use text::{display_width, fit_column, strip_control_chars};
pub use url_validator::{validate_base_url, UrlValidationError};
