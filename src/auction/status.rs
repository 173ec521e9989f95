/// 경매 상태 판별
/// 유통기한, 경매 종료일, 경매 시작일 세 시각을 현재 시각과 비교해 상태를 결정한다.
/// 매 호출마다 다시 계산하며 결과를 저장하지 않는다.
// region:    --- Imports
use crate::bidding::model::Product;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Auction Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Scheduled,
    Active,
    Ended,
    Expired,
}

impl AuctionStatus {
    /// 상태 판별 (먼저 일치하는 조건이 우선)
    /// 1. 유통기한 만료 2. 경매 종료 3. 경매 예정 4. 진행중
    pub fn classify(product: &Product, now: DateTime<Utc>) -> Self {
        Self::from_dates(
            product.expiry_date,
            product.auction_start_date,
            product.auction_end_date,
            now,
        )
    }

    pub fn from_dates(
        expiry_date: DateTime<Utc>,
        auction_start_date: DateTime<Utc>,
        auction_end_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        if expiry_date < now {
            AuctionStatus::Expired
        } else if auction_end_date < now {
            AuctionStatus::Ended
        } else if auction_start_date > now {
            AuctionStatus::Scheduled
        } else {
            AuctionStatus::Active
        }
    }

    /// 화면 표시용 문구
    pub fn label(&self) -> &'static str {
        match self {
            AuctionStatus::Expired => "유통기한 만료",
            AuctionStatus::Ended => "종료됨",
            AuctionStatus::Scheduled => "예정",
            AuctionStatus::Active => "진행중",
        }
    }

    /// 화면 표시용 스타일 클래스
    pub fn css_class(&self) -> &'static str {
        match self {
            AuctionStatus::Expired => "status-expired",
            AuctionStatus::Ended => "status-ended",
            AuctionStatus::Scheduled => "status-scheduled",
            AuctionStatus::Active => "status-active",
        }
    }

    /// 입찰 버튼 활성화 여부
    pub fn accepts_bids(&self) -> bool {
        !matches!(self, AuctionStatus::Ended | AuctionStatus::Expired)
    }
}

/// 경매 종료 여부 (유통기한과 무관하게 종료일만 본다)
pub fn is_auction_ended(auction_end_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    auction_end_date < now
}

/// 유통기한 만료 여부
pub fn is_expired(expiry_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expiry_date < now
}

// endregion: --- Auction Status
