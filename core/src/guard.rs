//! Cheap local checks run before a request is built.

use chrono::{DateTime, Utc};

use crate::error::{ApiError, Result};

pub(crate) fn not_empty(value: &str, parameter: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid(parameter, "must not be empty"));
    }
    Ok(())
}

pub(crate) fn in_range<T>(value: T, min: T, max: T, parameter: &'static str) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(ApiError::invalid(
            parameter,
            format!("{value} is out of range (must be between {min} and {max})"),
        ));
    }
    Ok(())
}

pub(crate) fn length_between(
    value: &str,
    min: usize,
    max: usize,
    parameter: &'static str,
) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ApiError::invalid(
            parameter,
            format!("length {len} is out of range (must be between {min} and {max})"),
        ));
    }
    Ok(())
}

pub(crate) fn positive(value: i64, parameter: &'static str) -> Result<()> {
    if value <= 0 {
        return Err(ApiError::invalid(parameter, format!("{value} must be positive")));
    }
    Ok(())
}

pub(crate) fn future(value: DateTime<Utc>, parameter: &'static str) -> Result<()> {
    if value <= Utc::now() {
        return Err(ApiError::invalid(
            parameter,
            format!("{value} must be in the future"),
        ));
    }
    Ok(())
}
