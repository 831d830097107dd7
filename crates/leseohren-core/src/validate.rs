//! Shared field checks for command validation.

use crate::error::{RegistryError, RegistryResult};

pub(crate) fn non_blank(field: &str, value: &str) -> RegistryResult<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::validation(format!("{field} must not be blank")));
    }
    Ok(())
}

pub(crate) fn email(value: Option<&str>) -> RegistryResult<()> {
    match value {
        Some(v) if !v.trim().is_empty() && !v.contains('@') => Err(RegistryError::validation(
            format!("email '{v}' is not a valid address"),
        )),
        _ => Ok(()),
    }
}
