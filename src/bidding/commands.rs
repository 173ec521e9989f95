/// 입찰 관련 커맨드 처리
/// 1. 입찰 금액 파싱
/// 2. 입찰 (검증 후 저장)
// region:    --- Imports
use super::model::{NewBid, Product};
use crate::auction::status::{is_auction_ended, is_expired};
use crate::database::{AuctionRepository, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidCommand {
    pub product_id: String,
    pub bidder_name: String,
    #[serde(default)]
    pub bidder_email: String,
    pub amount: i64,
}

/// 사용자에게 보여주는 입찰 거부 사유 (상태 변경 없음)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BidRejection {
    #[error("로그인이 필요합니다.")]
    LoginRequired,

    #[error("입찰자명을 입력해주세요.")]
    EmptyBidder,

    #[error("올바른 입찰 금액을 입력해주세요.")]
    InvalidAmount,

    #[error("상품을 찾을 수 없습니다.")]
    NotFound,

    #[error("이미 종료된 경매입니다.")]
    AlreadyEnded,

    #[error("유통기한이 만료된 상품입니다.")]
    Expired,

    #[error("최저가({}원) 이상으로 입찰해주세요.", won(.min_price))]
    BelowMinimum { min_price: i64 },
}

impl BidRejection {
    pub fn code(&self) -> &'static str {
        match self {
            BidRejection::LoginRequired => "LOGIN_REQUIRED",
            BidRejection::EmptyBidder => "EMPTY_BIDDER",
            BidRejection::InvalidAmount => "INVALID_AMOUNT",
            BidRejection::NotFound => "NOT_FOUND",
            BidRejection::AlreadyEnded => "ALREADY_ENDED",
            BidRejection::Expired => "EXPIRED",
            BidRejection::BelowMinimum { .. } => "LOW_BID",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            BidRejection::BelowMinimum { min_price } => serde_json::json!({
                "error": self.to_string(),
                "code": self.code(),
                "min_price": min_price,
            }),
            _ => serde_json::json!({"error": self.to_string(), "code": self.code()}),
        }
    }
}

#[derive(Debug, Error)]
pub enum BidError {
    #[error(transparent)]
    Rejected(#[from] BidRejection),

    #[error("저장소 오류: {0}")]
    Store(#[from] StoreError),
}

/// 천 단위 구분 금액 표기 (10000 -> "10,000")
pub fn format_won(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn won(amount: &i64) -> String {
    format_won(*amount)
}

/// 1. 입찰 금액 파싱
/// 양의 정수가 아니면 0을 돌려주어 검증 단계에서 거부되게 한다
pub fn parse_amount(raw: &serde_json::Value) -> i64 {
    match raw {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| fits_i64(*f)).map(|f| f as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// i64로 손실 없이 옮길 수 있는 정수 값인지 (2^63 이상은 범위 밖)
fn fits_i64(f: f64) -> bool {
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

/// 2. 입찰
/// 검증 순서: 입찰자명 -> 금액 -> 상품 존재 -> 경매 종료 -> 유통기한 -> 최저가
/// 최소 인상폭이나 동일 금액 처리 규칙은 없다.
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    repo: &dyn AuctionRepository,
    now: DateTime<Utc>,
) -> Result<Product, BidError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

    let bidder_name = cmd.bidder_name.trim();
    if bidder_name.is_empty() {
        return Err(BidRejection::EmptyBidder.into());
    }

    if cmd.amount <= 0 {
        return Err(BidRejection::InvalidAmount.into());
    }

    let product = repo
        .get_product(&cmd.product_id)
        .await?
        .ok_or(BidRejection::NotFound)?;

    // 경매 종료 여부는 종료일만 보고 판단한다
    if is_auction_ended(product.auction_end_date, now) {
        warn!(
            "{:<12} --> 종료된 경매 입찰 시도 product: {}",
            "Command", product.id
        );
        return Err(BidRejection::AlreadyEnded.into());
    }

    if is_expired(product.expiry_date, now) {
        return Err(BidRejection::Expired.into());
    }

    if cmd.amount < product.min_price {
        return Err(BidRejection::BelowMinimum {
            min_price: product.min_price,
        }
        .into());
    }

    let bid = NewBid {
        bidder_name: bidder_name.to_string(),
        bidder_email: cmd.bidder_email,
        amount: cmd.amount,
    };

    // 검증과 저장 사이에 상품이 삭제된 경우
    let updated = repo
        .create_bid(&cmd.product_id, bid)
        .await?
        .ok_or(BidRejection::NotFound)?;

    info!(
        "{:<12} --> 입찰 성공 product: {}, amount: {}",
        "Command", cmd.product_id, cmd.amount
    );
    Ok(updated)
}

// endregion: --- Commands
