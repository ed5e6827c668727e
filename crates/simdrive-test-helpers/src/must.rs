//! Unwrap helpers with good error messages.
//!
//! These helpers replace `unwrap()` and `expect()` in test code, providing
//! better error messages with `#[track_caller]` for accurate panic locations.
//!
//! # When to use
//!
//! - Use `must` when you have a `Result` that should succeed in tests
//! - Use `must_some` when you have an `Option` that should be `Some`
//! - Use `must_parse` when parsing strings that should parse successfully

use std::fmt::Debug;
use std::str::FromStr;

/// Unwrap a `Result`, panicking with context on error.
///
/// This helper provides better error messages than `unwrap()` by including
/// the error value in the panic message.
///
/// # Example
///
/// ```rust
/// use simdrive_test_helpers::must;
///
/// let gear: Result<i32, &str> = Ok(3);
/// assert_eq!(must(gear), 3);
/// ```
///
/// # Panics
///
/// Panics if the result is `Err`, with a message including the error value.
#[track_caller]
pub fn must<T, E: Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("must: unexpected Err: {e:?}"),
    }
}

/// Unwrap an `Option`, panicking with a custom message if `None`.
///
/// # Example
///
/// ```rust
/// use simdrive_test_helpers::must_some;
///
/// let label = Some("R");
/// assert_eq!(must_some(label, "reverse gear label"), "R");
/// ```
///
/// # Panics
///
/// Panics if the option is `None`, with the provided message.
#[track_caller]
pub fn must_some<T>(option: Option<T>, msg: &str) -> T {
    match option {
        Some(v) => v,
        None => panic!("must_some: {msg}"),
    }
}

/// Parse a string into a type, panicking on failure.
///
/// # Example
///
/// ```rust
/// use simdrive_test_helpers::must_parse;
///
/// let limit: f32 = must_parse("120.0");
/// assert!(limit > 119.0);
/// ```
///
/// # Panics
///
/// Panics if parsing fails.
#[track_caller]
pub fn must_parse<T: FromStr>(s: &str) -> T
where
    T::Err: Debug,
{
    s.parse()
        .unwrap_or_else(|e| panic!("must_parse: failed to parse {s:?}: {e:?}"))
}

/// Unwrap a `Result` with a custom context message.
///
/// # Example
///
/// ```rust
/// use simdrive_test_helpers::must_with;
///
/// let score: Result<u32, &str> = Ok(985);
/// assert_eq!(must_with(score, "score after one collision"), 985);
/// ```
///
/// # Panics
///
/// Panics if the result is `Err`, with the context and error value.
#[track_caller]
pub fn must_with<T, E: Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("must_with: {context}: {e:?}"),
    }
}

/// Unwrap an `Option` or provide a default value.
///
/// Unlike `must_some`, this returns a default instead of panicking.
/// Useful when you want to provide a fallback in tests.
///
/// # Example
///
/// ```rust
/// use simdrive_test_helpers::must_some_or;
///
/// let dot: Option<f32> = None;
/// assert!(must_some_or(dot, 1.0) > 0.0);
/// ```
pub fn must_some_or<T>(option: Option<T>, default: T) -> T {
    option.unwrap_or(default)
}

/// Unwrap a `Result` or compute a default from the error.
///
/// # Example
///
/// ```rust
/// use simdrive_test_helpers::must_or_else;
///
/// let penalty: Result<u32, &str> = Err("cooling down");
/// assert_eq!(must_or_else(penalty, |_| 0), 0);
/// ```
pub fn must_or_else<T, E, F>(result: Result<T, E>, f: F) -> T
where
    F: FnOnce(E) -> T,
{
    result.unwrap_or_else(f)
}
