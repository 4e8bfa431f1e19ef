use proptest::prelude::*;

use autofulfill_core::notification::MessageCategory;

/// Strategy for message categories
pub fn category_strategy() -> impl Strategy<Value = MessageCategory> {
    prop_oneof![
        Just(MessageCategory::Success),
        Just(MessageCategory::Error),
        Just(MessageCategory::Warning),
        Just(MessageCategory::Info),
        Just(MessageCategory::Progress),
        Just(MessageCategory::Stats),
        Just(MessageCategory::Other),
    ]
}

/// Strategy for short status messages drawn from a small pool so that
/// repeats are common
pub fn message_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("No citizen assigned for request".to_string()),
        Just("No items found for request".to_string()),
        Just("Processed 1 colonies for autofulfill".to_string()),
        "[a-z ]{1,12}",
    ]
}

/// Offsets in milliseconds between consecutive send attempts
pub fn gap_strategy() -> impl Strategy<Value = u64> {
    0u64..12_000
}
