//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use simdrive_test_helpers::prelude::*;
//! ```

pub use crate::must::{must, must_or_else, must_parse, must_some, must_some_or, must_with};
pub use crate::{assert_approx_eq, assert_in_range};

#[cfg(feature = "mock")]
pub use crate::mock::{FakeAudio, FakeDisplay, FakeInput, ScriptedBackend};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
