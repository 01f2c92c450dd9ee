use crate::model::ItemId;

/// First value handed out by a fresh allocator; renders as `"a00"` in base-36.
const DEFAULT_SEED: u64 = 10 * 36 * 36;

/// Minimum rendered width of an allocated id.
const MIN_WIDTH: usize = 3;

/// Produces short, sortable item ids that are extremely unlikely to collide
/// with externally authored ones.
///
/// The counter is process-session state: `next_id` never repeats a value
/// within one allocator's lifetime, and that is the only guarantee. Ids are
/// not random and not globally unique across documents; collisions with
/// pasted/imported content are resolved by the postfixer, which asks this
/// allocator for replacements.
///
/// Seedable so tests get deterministic ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    counter: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { counter: seed }
    }

    /// Hand out the next id. Monotonically increasing, never reused.
    pub fn next_id(&mut self) -> ItemId {
        let value = self.counter;
        self.counter += 1;
        ItemId::new(to_base36(value))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a counter value as lowercase base-36, left-padded with zeros to the
/// minimum width. Values past the fixed width simply grow a digit; sort order
/// within one width stays lexicographic.
fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
        if value == 0 {
            break;
        }
    }
    while out.len() < MIN_WIDTH {
        out.push(b'0');
    }
    out.reverse();
    // Only ASCII digits are pushed above.
    String::from_utf8(out).unwrap_or_default()
}
