use std::{fmt, sync::Arc};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::{Segment, Tag};

/// Records when each segment or tag id was last seen.
///
/// A `Timings` value is a handle: clones share the same underlying map, which is how two
/// independently configured [`Logger`](crate::Logger)s can observe each other's diffs. Entries
/// are never evicted, so the map grows with the number of distinct ids ever logged.
#[derive(Clone, Default)]
pub struct Timings {
    seen: Arc<Mutex<FxHashMap<String, i64>>>,
}

impl Timings {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// The time at which `id` was last seen, if ever
    pub fn last_seen(&self, id: &str) -> Option<i64> {
        self.seen.lock().get(id).copied()
    }

    /// The number of distinct ids recorded so far
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }

    /// Returns true if `self` and `other` are handles to the same store
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.seen, &other.seen)
    }

    /// Fill in the `diff` of every segment and tag of a message emitted at `time`.
    ///
    /// For each id, the previously recorded time is read before it is replaced with `time`.
    /// An id that was never seen before gets a diff of `0`. The whole message is annotated
    /// under a single lock, so concurrent messages cannot interleave their updates.
    pub fn annotate(&self, time: i64, namespace: &mut [Segment], tags: &mut [Tag]) {
        let mut seen = self.seen.lock();
        for segment in namespace {
            segment.diff = touch(&mut seen, &segment.id, time);
        }
        for tag in tags {
            tag.diff = touch(&mut seen, &tag.id, time);
        }
    }
}

fn touch(seen: &mut FxHashMap<String, i64>, id: &str, time: i64) -> i64 {
    match seen.get_mut(id) {
        Some(previous) => {
            let diff = time - *previous;
            *previous = time;
            diff
        }
        None => {
            seen.insert(id.to_owned(), time);
            0
        }
    }
}

impl fmt::Debug for Timings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timings").field("len", &self.len()).finish()
    }
}
