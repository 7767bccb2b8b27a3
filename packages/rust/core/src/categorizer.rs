//! Keyword-based topical bucketing.
//!
//! Matching is plain case-sensitive substring search over the item's title and
//! summary. Keyword sets are checked in [`CATEGORY_KEYWORDS`] order and the
//! first hit wins; items with no hit go to [`DEFAULT_BUCKET`].

use tracing::debug;

use trendcast_shared::{CategorizedItems, CategoryBucket, NewsItem};

/// Ordered `(bucket, keywords)` pairs. Earlier entries take priority.
pub const CATEGORY_KEYWORDS: [(CategoryBucket, &[&str]); 3] = [
    (
        CategoryBucket::TechAi,
        &[
            "AI", "人工智能", "机器学习", "大模型", "科技", "创业", "投资", "开源", "程序员", "算法",
        ],
    ),
    (
        CategoryBucket::GamingEntertainment,
        &[
            "游戏", "电竞", "Steam", "直播", "娱乐", "DOTA", "LOL", "王者", "原神", "米哈游",
        ],
    ),
    (
        CategoryBucket::HardwareDevices,
        &[
            "芯片", "GPU", "CPU", "手机", "iPhone", "华为", "小米", "硬件", "数码", "平板",
        ],
    ),
];

/// Bucket for items that match no keyword.
pub const DEFAULT_BUCKET: CategoryBucket = CategoryBucket::TechAi;

/// Bucket for a single item.
pub fn classify(item: &NewsItem) -> CategoryBucket {
    let text = format!("{} {}", item.display_title(), item.summary_or_content());

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map_or(DEFAULT_BUCKET, |(bucket, _)| *bucket)
}

/// Partition items into buckets, keeping input order inside each bucket.
pub fn categorize(items: impl IntoIterator<Item = NewsItem>) -> CategorizedItems {
    let mut categorized = CategorizedItems::new();

    for item in items {
        let bucket = classify(&item);
        categorized.push(bucket, item);
    }

    debug!(
        tech = categorized.get(CategoryBucket::TechAi).len(),
        gaming = categorized.get(CategoryBucket::GamingEntertainment).len(),
        hardware = categorized.get(CategoryBucket::HardwareDevices).len(),
        "categorized news items"
    );

    categorized
}
