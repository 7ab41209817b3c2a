//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [graph-built] root=signals sources=["config"]
//! [planned] starters=["config"]
//! [starting] service=redis registry=["config"]
//! [provided] service=redis dependents=["http"]
//! [stopping] service=redis downstream=0
//! [stopped] service=redis code=0
//! [failed] service=mongo err="error: refused"
//! [run-completed] code=0
//! ```

use async_trait::async_trait;

use crate::events::Event;
use crate::subscribers::{Subscribe, format_event};

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", format_event(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
