//! Slot-balance checker
//!
//! Records the backend depth when a converter invocation starts and verifies
//! `entry - consumed + produced` when it ends. Produced slots only count on
//! success; a failing invocation must still have consumed its inputs.

use super::Backend;
use crate::error::{BridgeError, BridgeResult};

pub(crate) struct BalanceCheck<'b, B: Backend> {
    backend: &'b B,
    entry: Option<usize>,
    consumed: usize,
    what: &'static str,
}

impl<'b, B: Backend> BalanceCheck<'b, B> {
    pub(crate) fn begin(backend: &'b B, enabled: bool, consumed: usize, what: &'static str) -> Self {
        Self {
            backend,
            entry: enabled.then(|| backend.depth()),
            consumed,
            what,
        }
    }

    /// Verify the depth delta; an imbalance replaces `result` with an
    /// internal consistency fault.
    pub(crate) fn finish<T>(
        self,
        result: BridgeResult<T>,
        produced: impl FnOnce(&T) -> usize,
    ) -> BridgeResult<T> {
        let Some(entry) = self.entry else {
            return result;
        };
        let produced = result.as_ref().map_or(0, produced);
        let actual = self.backend.depth();
        let expected = (entry + produced).checked_sub(self.consumed);
        if expected == Some(actual) {
            return result;
        }

        tracing::warn!(
            what = self.what,
            entry,
            consumed = self.consumed,
            produced,
            actual,
            "engine slot balance violated"
        );
        Err(BridgeError::InternalConsistency(format!(
            "{}: engine depth {} after call, expected {} (entry {}, consumed {}, produced {})",
            self.what,
            actual,
            expected.map_or_else(|| "<underflow>".to_string(), |e| e.to_string()),
            entry,
            self.consumed,
            produced
        )))
    }
}
