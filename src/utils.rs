//! # Utility Functions Module
//!
//! This module provides utility functions that reduce boilerplate when
//! building command lines for external tools.

/// Converts an iterable of string-like items to `Vec<String>`.
///
/// # Example
/// ```rust
/// use png_batch_optimizer::utils::to_string_vec;
///
/// let quality = format!("--quality={}", "60-80");
/// let args = to_string_vec([quality.as_str(), "--force"]);
/// assert_eq!(args, vec!["--quality=60-80".to_string(), "--force".to_string()]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}
