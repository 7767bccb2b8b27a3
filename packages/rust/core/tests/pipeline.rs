//! End-to-end: JSON report input through filtering, enrichment,
//! categorization, rendering and per-platform formatting.

use std::sync::atomic::{AtomicUsize, Ordering};

use trendcast_core::{
    AiStage, AssembleOptions, ContentEnricher, EnrichmentLimits, RenderOptions, SEPARATOR,
    SilentEnrichmentProgress, assemble, parse_frequency_words,
};
use trendcast_provider::EnrichmentClient;
use trendcast_shared::{CategoryBucket, ReportInput, ReportPayload, Result, TrendcastError};

const INPUT: &str = r#"{
  "stats": [
    {
      "word": "大模型",
      "count": 2,
      "percentage": 50.0,
      "titles": [
        {"title": "国产大模型开源", "source_name": "知乎", "time_display": "08:00", "count": 3,
         "ranks": [1, 2], "rank_threshold": 3, "url": "https://zhihu.example/1"},
        {"title": "某厂发布新一代手机芯片", "source_name": "微博", "count": 1, "ranks": [4],
         "rank_threshold": 3, "mobileUrl": "https://m.weibo.example/2"}
      ]
    },
    {"word": "无效", "count": 0, "titles": []}
  ],
  "new_titles": [
    {"source_id": "bilibili", "titles": [
      {"title": "原神新版本前瞻", "url": "https://bilibili.example/3", "ranks": [2]},
      {"title": "震惊！标题党", "url": "https://bilibili.example/4"}
    ]}
  ],
  "id_to_name": {"bilibili": "哔哩哔哩"},
  "failed_ids": ["douyin"]
}"#;

const WORDS: &str = "\
原神
米哈游

[GLOBAL_FILTER]
震惊
";

/// Client that fails for one title and counts calls.
struct StubClient {
    calls: AtomicUsize,
}

impl StubClient {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl EnrichmentClient for StubClient {
    fn name(&self) -> &str {
        "stub"
    }

    fn generate_title(&self, _content: &str, title: &str, max_length: usize) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{title}{}", "!".repeat(max_length)))
    }

    fn generate_summary(&self, _content: &str, title: &str, _max: usize) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if title.contains("芯片") {
            return Err(TrendcastError::Provider("quota exceeded".into()));
        }
        Ok(format!("{title}：要点速览"))
    }

    fn generate_tag(&self, _content: &str, _title: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("热榜".into())
    }
}

fn run(ai: Option<&AiStage>) -> ReportPayload {
    let input: ReportInput = serde_json::from_str(INPUT).expect("valid input");
    let words = parse_frequency_words(WORDS);
    assemble(
        &input,
        &AssembleOptions::default(),
        Some(&words),
        ai,
        &SilentEnrichmentProgress,
    )
}

#[test]
fn full_pipeline_with_partial_failures() {
    let ai = AiStage {
        enricher: ContentEnricher::new(
            Box::new(StubClient::new()),
            EnrichmentLimits {
                title_length: 12,
                summary_length: 150,
            },
        ),
        video_format: true,
        render: RenderOptions::default(),
    };

    let payload = run(Some(&ai));

    // Zero-count stat dropped, global filter removed the clickbait title.
    assert_eq!(payload.stats.len(), 1);
    assert_eq!(payload.total_new_count, 1);
    assert_eq!(payload.new_titles[0].source_name, "哔哩哔哩");
    assert_eq!(payload.failed_ids, vec!["douyin".to_string()]);

    let report = payload.ai.as_ref().expect("ai stage ran");
    let cats = &report.ai_categories;
    assert_eq!(cats.total(), 3);

    let tech = cats.get(CategoryBucket::TechAi);
    assert_eq!(tech.len(), 1);
    let enriched = tech[0].enrichment.as_ref().expect("enriched");
    assert_eq!(enriched.original_title, "国产大模型开源");
    assert_eq!(enriched.ai_title.chars().count(), 12);
    assert!(enriched.ai_title.ends_with("..."));

    // The failed item is passed through untouched and still categorized.
    let hardware = cats.get(CategoryBucket::HardwareDevices);
    assert_eq!(hardware.len(), 1);
    assert_eq!(hardware[0].title, "某厂发布新一代手机芯片");
    assert!(hardware[0].enrichment.is_none());

    let gaming = cats.get(CategoryBucket::GamingEntertainment);
    assert_eq!(gaming[0].keyword, "新增热点");

    let content = payload.ai_content().expect("rendered");
    assert!(content.starts_with("📺 今日科技热点播报"));
    assert_eq!(content.matches(&format!("{SEPARATOR}\n\n")).count(), 5);
    assert!(content.contains("总时长：约0分34秒"));
}

#[test]
fn payload_json_shape() {
    let plain = serde_json::to_value(run(None)).expect("serialize");
    assert!(plain.get("ai_processed").is_none());
    assert_eq!(plain["total_new_count"], 1);
    assert_eq!(plain["stats"][0]["titles"][1]["mobile_url"], "https://m.weibo.example/2");
    assert_eq!(plain["new_titles"][0]["titles"][0]["is_new"], true);

    let ai = AiStage {
        enricher: ContentEnricher::new(Box::new(StubClient::new()), EnrichmentLimits::default()),
        video_format: true,
        render: RenderOptions::default(),
    };
    let enriched = serde_json::to_value(run(Some(&ai))).expect("serialize");
    assert_eq!(enriched["ai_processed"], true);
    assert!(enriched["ai_content"].is_string());
    assert!(enriched["ai_categories"]["科技AI类"].is_array());
    assert_eq!(enriched["ai_categories"]["科技AI类"][0]["ai_tag"], "热榜");

    let no_video = AiStage {
        enricher: ContentEnricher::new(Box::new(StubClient::new()), EnrichmentLimits::default()),
        video_format: false,
        render: RenderOptions::default(),
    };
    let skipped = serde_json::to_value(run(Some(&no_video))).expect("serialize");
    assert!(skipped.get("ai_processed").is_none());
    assert!(skipped.get("ai_content").is_none());
    assert!(skipped.get("ai_categories").is_none());
    assert_eq!(skipped, plain);
}
