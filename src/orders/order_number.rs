use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// Hands out `ORD-<YYYYMMDDHHMMSS>-<NNNN>` order numbers.
///
/// The timestamp is UTC at second precision. Numbers generated within the same
/// second share the timestamp and get a strictly increasing 4-digit sequence that
/// restarts at `0000` when the second changes. More than 10,000 numbers in a single
/// second would wrap the sequence field and may collide.
#[derive(Debug, Default)]
pub struct OrderNumberGenerator {
    state: Mutex<SequenceState>,
}

#[derive(Debug, Default)]
struct SequenceState {
    last_second: i64,
    counter: u32,
}

impl OrderNumberGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next order number for the current wall-clock time.
    pub fn next(&self) -> String {
        self.next_at(Utc::now())
    }

    pub fn next_at(&self, now: DateTime<Utc>) -> String {
        let sequence = {
            // A poisoned lock still holds two plain integers, keep going with them.
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let second = now.timestamp();
            if second != state.last_second {
                state.last_second = second;
                state.counter = 0;
            } else {
                state.counter += 1;
            }
            state.counter
        };

        format!(
            "ORD-{}-{:04}",
            now.format("%Y%m%d%H%M%S"),
            sequence % 10_000
        )
    }
}
