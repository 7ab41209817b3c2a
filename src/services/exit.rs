//! # Exit codes produced by services.
//!
//! [`Exit`] wraps a process-style `i32` exit code. Downstream results are
//! combined with a reducer (default: bitwise OR, see [`Exit::bitor`]), so two
//! failing branches with codes `1` and `2` combine into `3`.
//!
//! Falsy results map to `0`: `()`, `false` and `None` all convert to
//! [`Exit::SUCCESS`] and take part in reduction like any other value.

use std::fmt;
use std::ops::BitOr;

/// Exit code of a service or of a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Exit(i32);

impl Exit {
    /// Exit code `0`.
    pub const SUCCESS: Exit = Exit(0);

    /// Creates an exit value from a raw code.
    #[inline]
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// Returns the raw code.
    #[inline]
    pub const fn code(self) -> i32 {
        self.0
    }

    /// True if the code is `0`.
    #[inline]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Exit {
    type Output = Exit;

    fn bitor(self, rhs: Exit) -> Exit {
        Exit(self.0 | rhs.0)
    }
}

impl From<i32> for Exit {
    fn from(code: i32) -> Self {
        Exit(code)
    }
}

impl From<()> for Exit {
    fn from(_: ()) -> Self {
        Exit::SUCCESS
    }
}

impl From<bool> for Exit {
    fn from(v: bool) -> Self {
        Exit(i32::from(v))
    }
}

impl From<Option<i32>> for Exit {
    fn from(v: Option<i32>) -> Self {
        Exit(v.unwrap_or(0))
    }
}

impl From<Exit> for i32 {
    fn from(e: Exit) -> Self {
        e.0
    }
}

impl fmt::Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
