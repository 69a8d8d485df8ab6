//! Input validation applied before any submission.
//!
//! The only business rule owned by the core: the answer needs at least one
//! non-whitespace character. Address format and contract existence are left
//! to the write gateway.

use crate::mint::errors::ValidationError;
use crate::mint::types::MintInput;

pub fn validate(input: &MintInput) -> Result<(), ValidationError> {
    if input.text.trim().is_empty() {
        return Err(ValidationError::Blank);
    }
    Ok(())
}
