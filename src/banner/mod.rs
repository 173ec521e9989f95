use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 배너 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link: String,
    /// 노출 순서 (중복 허용)
    pub order: i64,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// 배너 등록 폼
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBanner {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// 활성 배너만 노출 순서대로
pub fn visible_banners(mut banners: Vec<Banner>) -> Vec<Banner> {
    banners.retain(|b| b.active);
    banners.sort_by_key(|b| b.order);
    banners
}
