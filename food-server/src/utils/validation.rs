//! Input validation helpers
//!
//! Text limits and the HH:MM format shared by opening hours and time groups.

use shared::models::WeeklySchedule;

use crate::utils::{AppError, ErrorCode};

/// Entity names: restaurant, product, time group
pub const MAX_NAME_LEN: usize = 200;

/// Notes and reasons (order note, refund reason)
pub const MAX_NOTE_LEN: usize = 500;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    match value {
        Some(v) => validate_text_len(v, field, max_len),
        None => Ok(()),
    }
}

/// Validate that a possibly empty string is within the length limit.
pub fn validate_text_len(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Zero-padded 24h "HH:MM"
///
/// Lexical comparison of two valid values equals chronological comparison,
/// which the window checks rely on.
pub fn is_valid_hhmm(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let minute = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    hour < 24 && minute < 60
}

pub fn validate_hhmm(value: &str, field: &str) -> Result<(), AppError> {
    if is_valid_hhmm(value) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "{field} must be HH:MM (got '{value}')"
        ))
        .with_detail("field", field))
    }
}

/// Every configured day must carry either no times or two valid HH:MM values
pub fn validate_schedule(schedule: &WeeklySchedule) -> Result<(), AppError> {
    for (day, hours) in schedule.days() {
        let day = shared::models::weekday_name(day);
        for (field, value) in [("open_time", &hours.open_time), ("close_time", &hours.close_time)] {
            if !value.is_empty() && !is_valid_hhmm(value) {
                return Err(AppError::with_message(
                    ErrorCode::RestaurantScheduleInvalid,
                    format!("{day}.{field} must be HH:MM (got '{value}')"),
                )
                .with_detail("day", day)
                .with_detail("field", field));
            }
        }
    }
    Ok(())
}
