//! 원격 API(snake_case)와 로컬 스냅샷(camelCase)의 필드 이름 차이를 흡수해
//! 하나의 정규 엔티티로 변환한다. 이 모듈 밖으로는 정규 엔티티만 나간다.

// region:    --- Imports
use super::StoreError;
use crate::admin::Admin;
use crate::banner::Banner;
use crate::bidding::model::{Bid, Product, DEFAULT_UNIT};
use crate::member::{Member, MemberType};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Deserialize;

// endregion: --- Imports

// region:    --- Scalars
/// 문자열 또는 숫자 식별자
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Ident {
    Text(String),
    Number(i64),
}

impl Ident {
    pub(crate) fn into_string(self) -> String {
        match self {
            Ident::Text(s) => s,
            Ident::Number(n) => n.to_string(),
        }
    }
}

/// 숫자 또는 숫자 문자열
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Numeric {
    fn to_i64(&self) -> Option<i64> {
        match self {
            Numeric::Int(n) => Some(*n),
            Numeric::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Numeric::Float(_) => None,
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// bool 또는 0/1
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Int(n) => *n != 0,
        }
    }
}

fn number_or_zero(value: Option<Numeric>) -> i64 {
    value.and_then(|n| n.to_i64()).unwrap_or(0)
}

/// 시간대 없는 시각 형식 (로컬 시각으로 해석)
const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// RFC 3339, 시간대 없는 ISO 시각, 날짜만 있는 값을 모두 허용한다.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return local_to_utc(naive, raw);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return local_to_utc(date.and_time(NaiveTime::MIN), raw);
    }
    Err(StoreError::Timestamp(raw.to_string()))
}

fn local_to_utc(naive: NaiveDateTime, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| StoreError::Timestamp(raw.to_string()))
}

fn required_timestamp(value: Option<String>, field: &str) -> Result<DateTime<Utc>, StoreError> {
    match value {
        Some(raw) => parse_timestamp(&raw),
        None => Err(StoreError::Timestamp(format!("{} 누락", field))),
    }
}

fn optional_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>, StoreError> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_timestamp(&raw))
        .transpose()
}

// endregion: --- Scalars

// region:    --- Normalize Trait
/// 저장소 레코드 -> 정규 엔티티
pub(crate) trait Normalize {
    type Output;
    fn normalize(self) -> Result<Self::Output, StoreError>;
}

pub(crate) fn normalize_all<R: Normalize>(records: Vec<R>) -> Result<Vec<R::Output>, StoreError> {
    records.into_iter().map(Normalize::normalize).collect()
}

// endregion: --- Normalize Trait

// region:    --- Records
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductRecord {
    id: Ident,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    quantity: Option<Numeric>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default, alias = "min_price")]
    min_price: Option<Numeric>,
    #[serde(default, alias = "supplier_name")]
    supplier_name: Option<String>,
    #[serde(default, alias = "supplier_email")]
    supplier_email: Option<String>,
    #[serde(default, alias = "expiry_date")]
    expiry_date: Option<String>,
    #[serde(default, alias = "auction_start_date")]
    auction_start_date: Option<String>,
    #[serde(default, alias = "auction_end_date")]
    auction_end_date: Option<String>,
    #[serde(default, alias = "created_at")]
    created_at: Option<String>,
    #[serde(default)]
    bids: Option<Vec<BidRecord>>,
}

impl ProductRecord {
    /// 레코드에 입찰 목록이 포함되어 있는지 (원격 상품 행에는 없다)
    pub(crate) fn has_bids(&self) -> bool {
        self.bids.is_some()
    }
}

impl Normalize for ProductRecord {
    type Output = Product;

    fn normalize(self) -> Result<Product, StoreError> {
        let created_at = optional_timestamp(self.created_at)?;
        // 시작일이 없으면 등록 시각을 시작일로 본다
        let auction_start_date = match optional_timestamp(self.auction_start_date)? {
            Some(start) => start,
            None => created_at.unwrap_or_else(Utc::now),
        };
        let bids = match self.bids {
            Some(bids) => normalize_all(bids)?,
            None => Vec::new(),
        };

        Ok(Product {
            id: self.id.into_string(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            quantity: number_or_zero(self.quantity),
            unit: self
                .unit
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            min_price: number_or_zero(self.min_price),
            supplier_name: self.supplier_name.unwrap_or_default(),
            supplier_email: self.supplier_email.unwrap_or_default(),
            expiry_date: required_timestamp(self.expiry_date, "expiryDate")?,
            auction_start_date,
            auction_end_date: required_timestamp(self.auction_end_date, "auctionEndDate")?,
            created_at: created_at.unwrap_or(auction_start_date),
            bids,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BidRecord {
    id: Ident,
    #[serde(default, alias = "bidder_name")]
    bidder_name: Option<String>,
    #[serde(default, alias = "bidder_email")]
    bidder_email: Option<String>,
    #[serde(default)]
    amount: Option<Numeric>,
    #[serde(default)]
    timestamp: Option<String>,
}

impl Normalize for BidRecord {
    type Output = Bid;

    fn normalize(self) -> Result<Bid, StoreError> {
        Ok(Bid {
            id: self.id.into_string(),
            bidder_name: self.bidder_name.unwrap_or_default(),
            bidder_email: self.bidder_email.unwrap_or_default(),
            amount: number_or_zero(self.amount),
            timestamp: required_timestamp(self.timestamp, "timestamp")?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MemberRecord {
    id: Ident,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default, rename = "type")]
    member_type: Option<String>,
    #[serde(default, alias = "created_at")]
    created_at: Option<String>,
    #[serde(default, alias = "updated_at")]
    updated_at: Option<String>,
}

impl Normalize for MemberRecord {
    type Output = Member;

    fn normalize(self) -> Result<Member, StoreError> {
        Ok(Member {
            id: self.id.into_string(),
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            member_type: self
                .member_type
                .as_deref()
                .map(MemberType::parse)
                .unwrap_or_default(),
            created_at: optional_timestamp(self.created_at)?.unwrap_or_else(Utc::now),
            updated_at: optional_timestamp(self.updated_at)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BannerRecord {
    id: Ident,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "image_url")]
    image_url: Option<String>,
    #[serde(default, alias = "link_url")]
    link: Option<String>,
    #[serde(default, alias = "order_index")]
    order: Option<Numeric>,
    #[serde(default)]
    active: Option<Flag>,
    #[serde(default, alias = "created_at")]
    created_at: Option<String>,
}

impl Normalize for BannerRecord {
    type Output = Banner;

    fn normalize(self) -> Result<Banner, StoreError> {
        Ok(Banner {
            id: self.id.into_string(),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            image_url: self.image_url.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            order: number_or_zero(self.order),
            active: self.active.map(|f| f.is_set()).unwrap_or(true),
            created_at: optional_timestamp(self.created_at)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdminRecord {
    id: Ident,
    #[serde(default)]
    name: Option<String>,
}

impl Normalize for AdminRecord {
    type Output = Admin;

    fn normalize(self) -> Result<Admin, StoreError> {
        Ok(Admin {
            id: self.id.into_string(),
            name: self.name.unwrap_or_default(),
        })
    }
}

/// 생성 API 응답 ({"id": ..., "message": ...})
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedRecord {
    pub(crate) id: Ident,
}

// endregion: --- Records

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snake_and_camel_rows_normalize_to_same_product() {
        let remote = json!({
            "id": 1700000000000_i64,
            "name": "유기농 사과",
            "description": null,
            "quantity": 20,
            "unit": "박스",
            "min_price": 10000,
            "supplier_name": "사과농장",
            "supplier_email": "farm@example.com",
            "expiry_date": "2030-01-10T00:00:00Z",
            "auction_start_date": "2030-01-01T00:00:00Z",
            "auction_end_date": "2030-01-05T00:00:00Z",
            "created_at": "2029-12-31T00:00:00Z"
        });
        let local = json!({
            "id": "1700000000000",
            "name": "유기농 사과",
            "quantity": "20",
            "unit": "박스",
            "minPrice": 10000,
            "supplierName": "사과농장",
            "supplierEmail": "farm@example.com",
            "expiryDate": "2030-01-10T00:00:00Z",
            "auctionStartDate": "2030-01-01T00:00:00Z",
            "auctionEndDate": "2030-01-05T00:00:00Z",
            "createdAt": "2029-12-31T00:00:00Z",
            "bids": []
        });

        let remote: ProductRecord = serde_json::from_value(remote).unwrap();
        let local: ProductRecord = serde_json::from_value(local).unwrap();
        assert!(!remote.has_bids());
        assert!(local.has_bids());
        assert_eq!(remote.normalize().unwrap(), local.normalize().unwrap());
    }

    #[test]
    fn missing_start_falls_back_to_creation_time() {
        let record: ProductRecord = serde_json::from_value(json!({
            "id": "p1",
            "name": "배",
            "minPrice": 5000,
            "expiryDate": "2030-01-10T00:00:00Z",
            "auctionEndDate": "2030-01-05T00:00:00Z",
            "createdAt": "2029-12-31T09:30:00Z"
        }))
        .unwrap();
        let product = record.normalize().unwrap();
        assert_eq!(product.auction_start_date, product.created_at);
        assert_eq!(product.unit, DEFAULT_UNIT);
    }

    #[test]
    fn missing_end_date_is_an_error() {
        let record: ProductRecord = serde_json::from_value(json!({
            "id": "p1",
            "expiryDate": "2030-01-10T00:00:00Z"
        }))
        .unwrap();
        assert!(matches!(record.normalize(), Err(StoreError::Timestamp(_))));
    }

    #[test]
    fn banner_flags_and_aliases() {
        let remote: BannerRecord = serde_json::from_value(json!({
            "id": 3,
            "title": "봄 세일",
            "image_url": "/img/spring.png",
            "link_url": "/spring",
            "order_index": 2,
            "active": 0
        }))
        .unwrap();
        let banner = remote.normalize().unwrap();
        assert_eq!(banner.id, "3");
        assert_eq!(banner.link, "/spring");
        assert_eq!(banner.order, 2);
        assert!(!banner.active);

        let local: BannerRecord =
            serde_json::from_value(json!({"id": "4", "title": "여름"})).unwrap();
        assert!(local.normalize().unwrap().active);
    }

    #[test]
    fn member_type_and_timestamps() {
        let record: MemberRecord = serde_json::from_value(json!({
            "id": "m1",
            "name": "홍길동",
            "email": "hong@example.com",
            "type": "supplier",
            "created_at": "2024-05-01T10:00:00.123456",
            "updated_at": ""
        }))
        .unwrap();
        let member = record.normalize().unwrap();
        assert_eq!(member.member_type, MemberType::Supplier);
        assert!(member.updated_at.is_none());
    }

    #[test]
    fn timestamp_formats() {
        assert!(parse_timestamp("2024-05-01T10:00:00Z").is_ok());
        assert!(parse_timestamp("2024-05-01T10:00:00.500+09:00").is_ok());
        assert!(parse_timestamp("2024-05-01T10:00").is_ok());
        assert!(parse_timestamp("2024-05-01 10:00:00").is_ok());
        assert!(parse_timestamp("2024-05-01").is_ok());
        assert!(parse_timestamp("어제").is_err());
    }
}
