use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 단위 기본값
pub const DEFAULT_UNIT: &str = "개";
/// 유통기한 기본값 (등록 시각 기준 일수)
pub const DEFAULT_EXPIRY_DAYS: i64 = 7;
/// 경매 기간 기본값 (등록 시각 기준 일수)
pub const DEFAULT_AUCTION_DAYS: i64 = 3;

// 상품(경매 목록) 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub unit: String,
    pub min_price: i64,
    pub supplier_name: String,
    pub supplier_email: String,
    pub expiry_date: DateTime<Utc>,
    pub auction_start_date: DateTime<Utc>,
    pub auction_end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub bids: Vec<Bid>,
}

impl Product {
    /// 최고 입찰가
    pub fn highest_bid(&self) -> Option<i64> {
        self.bids.iter().map(|b| b.amount).max()
    }

    /// 금액 내림차순 입찰 목록 (동일 금액은 입력 순서 유지)
    pub fn ranked_bids(&self) -> Vec<Bid> {
        let mut bids = self.bids.clone();
        rank_bids(&mut bids);
        bids
    }
}

/// 금액 내림차순 정렬. 안정 정렬이라 동일 금액은 기존 순서를 유지한다.
pub fn rank_bids(bids: &mut [Bid]) {
    bids.sort_by(|a, b| b.amount.cmp(&a.amount));
}

// 입찰 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: String,
    pub bidder_name: String,
    pub bidder_email: String,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
}

// 상품 등록 폼
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub quantity: i64,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub min_price: i64,
    pub supplier_name: String,
    #[serde(default)]
    pub supplier_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auction_start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auction_end_date: Option<DateTime<Utc>>,
}

impl NewProduct {
    /// 비어 있는 날짜를 채운다
    /// 시작일: 등록 시각, 유통기한: +7일, 경매 종료일: +3일
    pub fn with_defaults(mut self, now: DateTime<Utc>) -> Self {
        self.auction_start_date.get_or_insert(now);
        self.expiry_date
            .get_or_insert(now + Duration::days(DEFAULT_EXPIRY_DAYS));
        self.auction_end_date
            .get_or_insert(now + Duration::days(DEFAULT_AUCTION_DAYS));
        self
    }

    /// 시작일이 종료일보다 늦은지 여부 (검증하지 않고 경고만 남긴다)
    pub fn has_inverted_window(&self) -> bool {
        match (self.auction_start_date, self.auction_end_date) {
            (Some(start), Some(end)) => start > end,
            _ => false,
        }
    }

    /// 새 상품 레코드 (입찰 없음, 빈 날짜는 기본값)
    pub fn into_product(self, id: String, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            unit: self.unit,
            min_price: self.min_price,
            supplier_name: self.supplier_name,
            supplier_email: self.supplier_email,
            expiry_date: self
                .expiry_date
                .unwrap_or_else(|| now + Duration::days(DEFAULT_EXPIRY_DAYS)),
            auction_start_date: self.auction_start_date.unwrap_or(now),
            auction_end_date: self
                .auction_end_date
                .unwrap_or_else(|| now + Duration::days(DEFAULT_AUCTION_DAYS)),
            created_at: now,
            bids: Vec::new(),
        }
    }
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

// 입찰 폼
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBid {
    pub bidder_name: String,
    #[serde(default)]
    pub bidder_email: String,
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(id: &str, amount: i64) -> Bid {
        Bid {
            id: id.to_string(),
            bidder_name: format!("bidder-{}", id),
            bidder_email: String::new(),
            amount,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn ranking_keeps_insertion_order_for_ties() {
        let mut bids = vec![bid("a", 100), bid("b", 300), bid("c", 100), bid("d", 300)];
        rank_bids(&mut bids);
        let ids: Vec<_> = bids.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn explicit_dates_are_kept() {
        let now = Utc::now();
        let end = now + Duration::days(1);
        let fields = NewProduct {
            name: "사과".to_string(),
            description: String::new(),
            quantity: 10,
            unit: default_unit(),
            min_price: 10000,
            supplier_name: "과수원".to_string(),
            supplier_email: String::new(),
            expiry_date: Some(end),
            auction_start_date: None,
            auction_end_date: Some(end),
        };
        assert_eq!(fields.clone().with_defaults(now).auction_start_date, Some(now));

        let explicit = end + Duration::hours(1);
        let fields = NewProduct {
            auction_start_date: Some(explicit),
            ..fields
        };
        assert!(fields.has_inverted_window());
        let filled = fields.with_defaults(now);
        assert_eq!(filled.auction_start_date, Some(explicit));
        assert_eq!(filled.auction_end_date, Some(end));
    }

    #[test]
    fn missing_dates_get_defaults() {
        let now = Utc::now();
        let fields: NewProduct = serde_json::from_value(serde_json::json!({
            "name": "감자",
            "quantity": 3,
            "unit": "kg",
            "minPrice": 5000,
            "supplierName": "농장"
        }))
        .unwrap();
        assert!(!fields.has_inverted_window());

        let product = fields.into_product("p-1".to_string(), now);
        assert_eq!(product.auction_start_date, now);
        assert_eq!(product.expiry_date, now + Duration::days(7));
        assert_eq!(product.auction_end_date, now + Duration::days(3));
        assert_eq!(product.created_at, now);
        assert!(product.bids.is_empty());
        assert_eq!(product.unit, "kg");
    }
}
