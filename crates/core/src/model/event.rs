use serde::{Deserialize, Serialize};

use crate::model::ItemId;

/// A single answered item, emitted by a game exactly once per item.
///
/// Games hold a sender handle and emit these directly rather than going
/// through a global event bus, so the contract is explicit and checked at
/// compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAnswered {
    /// Identifier used to deduplicate repeat answers. Games that cannot
    /// attribute an answer to a stable item may omit it.
    pub item_id: Option<ItemId>,
    pub was_correct: bool,
}

impl ItemAnswered {
    /// A correct answer for the given item.
    #[must_use]
    pub fn correct(item_id: ItemId) -> Self {
        Self {
            item_id: Some(item_id),
            was_correct: true,
        }
    }

    /// An incorrect answer for the given item.
    #[must_use]
    pub fn incorrect(item_id: ItemId) -> Self {
        Self {
            item_id: Some(item_id),
            was_correct: false,
        }
    }

    /// A correct answer with no item attribution.
    #[must_use]
    pub fn correct_unattributed() -> Self {
        Self {
            item_id: None,
            was_correct: true,
        }
    }
}
