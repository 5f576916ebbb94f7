//! Input validation for learner-supplied values.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
static REMINDER_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[01]\d|2[0-3]):[0-5]\d$").unwrap());

/// Longest accepted learning goal, in characters.
pub const MAX_GOAL_LENGTH: usize = 200;

/// Shortest and longest plan, in days.
pub const MIN_DURATION_DAYS: u32 = 1;
pub const MAX_DURATION_DAYS: u32 = 90;

pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

/// Phone numbers are accepted with any punctuation as long as they carry
/// 10 to 15 digits.
pub fn validate_phone_number(phone: &str) -> bool {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    (10..=15).contains(&digits)
}

/// A goal needs at least two words and 3..=200 characters.
pub fn validate_learning_goal(goal: &str) -> bool {
    let goal = goal.trim();
    let len = goal.chars().count();
    len >= 3 && len <= MAX_GOAL_LENGTH && goal.split_whitespace().count() >= 2
}

pub fn validate_duration(days: u32) -> bool {
    (MIN_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&days)
}

/// 24-hour `HH:MM`.
pub fn validate_reminder_time(time: &str) -> bool {
    REMINDER_TIME.is_match(time.trim())
}
