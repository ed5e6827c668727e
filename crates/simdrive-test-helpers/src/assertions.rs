//! Assertions for float-heavy control and scoring tests.

/// Assert that two floats differ by at most `tolerance`.
///
/// ```rust
/// use simdrive_test_helpers::assert_approx_eq;
///
/// assert_approx_eq!(0.1_f32 + 0.2, 0.3, 1e-6);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $tolerance, "values differ")
    };
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {{
        let (left, right, tolerance) = ($left, $right, $tolerance);
        let diff = (left - right).abs();
        if !(diff <= tolerance) {
            panic!(
                concat!(
                    "assertion failed: `(left ≈ right)`\n",
                    "  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > `{:?}`: {}",
                ),
                left, right, diff, tolerance, format_args!($($arg)+)
            );
        }
    }};
}

/// Assert that a value lies inside a range.
///
/// ```rust
/// use simdrive_test_helpers::assert_in_range;
///
/// assert_in_range!(0.4_f32, 0.0..=1.0);
/// ```
#[macro_export]
macro_rules! assert_in_range {
    ($value:expr, $range:expr $(,)?) => {
        $crate::assert_in_range!($value, $range, "out of range")
    };
    ($value:expr, $range:expr, $($arg:tt)+) => {{
        let (value, range) = ($value, $range);
        if !range.contains(&value) {
            panic!(
                "assertion failed: value {:?} is not in range {:?}: {}",
                value, range, format_args!($($arg)+)
            );
        }
    }};
}
