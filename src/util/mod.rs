//! Small helpers shared by the client and the CLI.
//!
//! - **URL validation**: checks and normalizes the configured API base URL
//! - **Text processing**: Unicode-aware width/truncation and stripping of
//!   terminal escape sequences from server-supplied strings

mod text;
mod url_validator;

pub use text::{display_width, sanitize_for_terminal, truncate_to_width};
pub use url_validator::{validate_base_url, UrlValidationError};
