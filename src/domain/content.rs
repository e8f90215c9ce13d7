//! Content-kind metadata for statistics aggregation.
//!
//! The mapping from a [`ContentKind`] to its backing relation, its target
//! column in the interaction tables, and its applicable statistic set is a
//! fixed table resolved at compile time, never discovered at runtime.

pub use plaza_api_types::{ContentKind, ContentRef};

/// One aggregate statistic over an interaction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Likes,
    Comments,
    Views,
}

impl Statistic {
    /// Interaction table holding one row per event of this statistic.
    pub fn table(self) -> &'static str {
        match self {
            Self::Likes => "likes",
            Self::Comments => "comments",
            Self::Views => "view_records",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Likes => "likes",
            Self::Comments => "comments",
            Self::Views => "views",
        }
    }
}

/// Static per-kind schema facts used by the aggregator.
#[derive(Debug, Clone, Copy)]
pub struct KindSpec {
    pub kind: ContentKind,
    /// Relation holding the content rows themselves.
    pub content_table: &'static str,
    /// Column naming this kind's id in `likes`/`comments`/`view_records`.
    pub target_column: &'static str,
    /// Marketplace items and tasks carry no comment thread.
    pub supports_comments: bool,
}

const CONFESSION: KindSpec = KindSpec {
    kind: ContentKind::Confession,
    content_table: "confessions",
    target_column: "confession_id",
    supports_comments: true,
};

const POST: KindSpec = KindSpec {
    kind: ContentKind::Post,
    content_table: "posts",
    target_column: "post_id",
    supports_comments: true,
};

const MARKET_ITEM: KindSpec = KindSpec {
    kind: ContentKind::MarketItem,
    content_table: "market_items",
    target_column: "market_item_id",
    supports_comments: false,
};

const TASK: KindSpec = KindSpec {
    kind: ContentKind::Task,
    content_table: "tasks",
    target_column: "task_id",
    supports_comments: false,
};

impl KindSpec {
    pub const fn of(kind: ContentKind) -> &'static KindSpec {
        match kind {
            ContentKind::Confession => &CONFESSION,
            ContentKind::Post => &POST,
            ContentKind::MarketItem => &MARKET_ITEM,
            ContentKind::Task => &TASK,
        }
    }

    /// Statistics applicable to this kind. Kinds without a statistic are
    /// skipped by the aggregator and default to zero in the result.
    pub fn statistics(&self) -> &'static [Statistic] {
        if self.supports_comments {
            &[Statistic::Likes, Statistic::Comments, Statistic::Views]
        } else {
            &[Statistic::Likes, Statistic::Views]
        }
    }
}
