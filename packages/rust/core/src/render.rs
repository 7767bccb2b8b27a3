//! Multi-format rendering of categorized news.
//!
//! Three text blocks can be produced from one [`CategorizedItems`]:
//!
//! - a **basic listing**, always produced;
//! - a **narration script** for a video host, toggled by `generate_script`;
//! - a timed **storyboard**, toggled by `generate_storyboard`.
//!
//! Blocks are combined in that fixed order, each after the first preceded by
//! [`SEPARATOR`]. Buckets are always visited in [`CategoryBucket::ALL`] order
//! and empty buckets are skipped everywhere.

use tracing::{debug, instrument};

use trendcast_shared::{CategorizedItems, CategoryBucket, EnrichmentConfig, NewsItem};

/// Full-width rule placed between sections and between script buckets.
pub const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Returned instead of a document when there is nothing to render.
pub const NO_CONTENT: &str = "暂无新闻内容";

/// Storyboard timing, in seconds.
pub const OPENING_SECS: u32 = 5;
pub const CLOSING_SECS: u32 = 5;
pub const SECS_PER_ITEM: u32 = 8;
pub const MAX_BUCKET_SECS: u32 = 30;

const SCRIPT_GREETING: &str =
    "大家好，欢迎收看今日科技热点播报。我是您的AI主播，为您带来最新的科技资讯。";
const SCRIPT_SIGN_OFF: &str = "以上就是今日的科技热点播报，感谢您的收看，我们明天同一时间再见！";

/// Which optional blocks to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub generate_script: bool,
    pub generate_storyboard: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            generate_script: true,
            generate_storyboard: true,
        }
    }
}

impl From<&EnrichmentConfig> for RenderOptions {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            generate_script: config.generate_script,
            generate_storyboard: config.generate_storyboard,
        }
    }
}

/// The rendered blocks before they are joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub basic: String,
    pub script: Option<String>,
    pub storyboard: Option<String>,
}

impl RenderedDocument {
    /// Join the present blocks: basic, then script, then storyboard.
    pub fn combine(&self) -> String {
        let mut out = String::with_capacity(
            self.basic.len()
                + self.script.as_ref().map_or(0, String::len)
                + self.storyboard.as_ref().map_or(0, String::len)
                + 2 * SEPARATOR.len()
                + 8,
        );

        out.push_str(&self.basic);
        out.push('\n');

        if let Some(script) = &self.script {
            out.push_str(SEPARATOR);
            out.push_str("\n\n");
            out.push_str(script);
            out.push('\n');
        }

        if let Some(storyboard) = &self.storyboard {
            out.push_str(SEPARATOR);
            out.push_str("\n\n");
            out.push_str(storyboard);
        }

        out
    }
}

/// Render the requested blocks. `None` when there are no items at all.
pub fn render_document(
    categorized: &CategorizedItems,
    options: &RenderOptions,
) -> Option<RenderedDocument> {
    if categorized.is_empty() {
        return None;
    }

    Some(RenderedDocument {
        basic: basic_listing(categorized),
        script: options
            .generate_script
            .then(|| narration_script(categorized)),
        storyboard: options
            .generate_storyboard
            .then(|| storyboard(categorized)),
    })
}

/// Render and join into a single document, or [`NO_CONTENT`].
#[instrument(skip_all, fields(items = categorized.total()))]
pub fn render(categorized: &CategorizedItems, options: &RenderOptions) -> String {
    match render_document(categorized, options) {
        Some(document) => {
            let text = document.combine();
            debug!(chars = text.chars().count(), "document rendered");
            text
        }
        None => {
            debug!("nothing to render");
            NO_CONTENT.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Basic listing
// ---------------------------------------------------------------------------

/// Enumerated listing, numbering restarting at 1 in each bucket.
pub fn basic_listing(categorized: &CategorizedItems) -> String {
    let mut out = String::from("📺 今日科技热点播报\n\n");

    for (bucket, items) in categorized.non_empty() {
        out.push_str(&format!("🔸 {}\n", bucket.label()));

        for (i, item) in items.iter().enumerate() {
            push_listing_entry(&mut out, i + 1, item);
        }

        out.push('\n');
    }

    out
}

fn push_listing_entry(out: &mut String, number: usize, item: &NewsItem) {
    out.push_str(&format!("{number}. {}\n", item.display_title()));

    if let Some(summary) = item.summary() {
        out.push_str(&format!("   {summary}\n"));
    }
    if let Some(tag) = item.tag() {
        out.push_str(&format!("   标签: {tag}\n"));
    }
    if !item.url.is_empty() {
        out.push_str(&format!("   链接: {}\n", item.url));
    }

    out.push('\n');
}

// ---------------------------------------------------------------------------
// Narration script
// ---------------------------------------------------------------------------

fn bucket_intro(bucket: CategoryBucket) -> &'static str {
    match bucket {
        CategoryBucket::TechAi => "首先，让我们关注人工智能和科技创新领域的最新动态。",
        CategoryBucket::GamingEntertainment => "接下来，我们来看看游戏娱乐行业的热门资讯。",
        CategoryBucket::HardwareDevices => "最后，让我们了解一下硬件数码市场的最新消息。",
    }
}

/// Host narration with a fixed greeting and sign-off.
pub fn narration_script(categorized: &CategorizedItems) -> String {
    let mut out = String::from("🎬 视频播报稿\n\n");
    out.push_str(SCRIPT_GREETING);
    out.push_str("\n\n");

    for (bucket, items) in categorized.non_empty() {
        out.push_str(&format!("【{}】\n{}\n\n", bucket.label(), bucket_intro(bucket)));

        for (i, item) in items.iter().enumerate() {
            out.push_str(&format!("第{}条新闻：{}\n", i + 1, item.display_title()));
            if let Some(summary) = item.summary() {
                out.push_str(summary);
                out.push('\n');
            }
            out.push('\n');
        }

        out.push_str(SEPARATOR);
        out.push_str("\n\n");
    }

    out.push_str(SCRIPT_SIGN_OFF);
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Storyboard
// ---------------------------------------------------------------------------

/// What a storyboard shot shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotKind {
    Opening,
    Bucket {
        bucket: CategoryBucket,
        item_count: usize,
    },
    Closing,
}

/// One timed shot. Numbers are consecutive starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shot {
    pub number: usize,
    pub kind: ShotKind,
    pub start_secs: u32,
    pub end_secs: u32,
}

impl Shot {
    pub fn duration(&self) -> u32 {
        self.end_secs - self.start_secs
    }
}

/// Seconds allotted to a bucket with `item_count` items.
pub fn bucket_duration(item_count: usize) -> u32 {
    let count = u32::try_from(item_count).unwrap_or(u32::MAX);
    count.saturating_mul(SECS_PER_ITEM).min(MAX_BUCKET_SECS)
}

/// Lay out shots: opening, one per non-empty bucket, closing.
pub fn plan_storyboard(categorized: &CategorizedItems) -> Vec<Shot> {
    let mut shots = Vec::with_capacity(CategoryBucket::ALL.len() + 2);
    let mut clock = 0;

    let mut push = |kind: ShotKind, duration: u32| {
        let number = shots.len() + 1;
        shots.push(Shot {
            number,
            kind,
            start_secs: clock,
            end_secs: clock + duration,
        });
        clock += duration;
    };

    push(ShotKind::Opening, OPENING_SECS);
    for (bucket, items) in categorized.non_empty() {
        push(
            ShotKind::Bucket {
                bucket,
                item_count: items.len(),
            },
            bucket_duration(items.len()),
        );
    }
    push(ShotKind::Closing, CLOSING_SECS);

    shots
}

/// `m:ss`.
pub fn format_timestamp(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn bucket_visual(bucket: CategoryBucket) -> &'static str {
    match bucket {
        CategoryBucket::TechAi => "AI芯片、机器人、代码界面等科技元素",
        CategoryBucket::GamingEntertainment => "游戏画面、手柄、电竞场景等娱乐元素",
        CategoryBucket::HardwareDevices => "手机、电脑、芯片等硬件产品",
    }
}

fn push_shot(out: &mut String, shot: &Shot) {
    let span = format!(
        "{}-{}",
        format_timestamp(shot.start_secs),
        format_timestamp(shot.end_secs)
    );

    match shot.kind {
        ShotKind::Opening => {
            out.push_str(&format!("【镜头{}】开场 ({span})\n", shot.number));
            out.push_str("画面：主播正面特写，背景为科技感十足的虚拟演播室\n");
            out.push_str("文案：大家好，欢迎收看今日科技热点播报\n");
            out.push_str("转场：淡入淡出\n\n");
        }
        ShotKind::Bucket { bucket, item_count } => {
            out.push_str(&format!("【镜头{}】{} ({span})\n", shot.number, bucket.label()));
            out.push_str(&format!("画面：{}\n", bucket_visual(bucket)));
            out.push_str(&format!("内容：播报{item_count}条{}新闻\n", bucket.label()));
            out.push_str("转场：滑动切换\n\n");
        }
        ShotKind::Closing => {
            out.push_str(&format!("【镜头{}】结尾 ({span})\n", shot.number));
            out.push_str("画面：主播挥手告别，显示订阅提醒\n");
            out.push_str("文案：感谢收看，明天同一时间再见\n");
            out.push_str("转场：淡出\n\n");
        }
    }
}

/// Shot-by-shot storyboard with a total-duration footer.
pub fn storyboard(categorized: &CategorizedItems) -> String {
    let shots = plan_storyboard(categorized);
    let total = shots.last().map_or(0, |shot| shot.end_secs);

    let mut out = String::from("🎥 分镜脚本\n\n");
    for shot in &shots {
        push_shot(&mut out, shot);
    }
    out.push_str(&format!("总时长：约{}分{:02}秒\n", total / 60, total % 60));
    out
}
