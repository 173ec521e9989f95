// region:    --- Imports
use crate::auction::{AuctionStatus, TimeRemaining};
use crate::banner::{visible_banners, Banner};
use crate::bidding::commands::format_won;
use crate::bidding::model::{rank_bids, Bid, Product};
use crate::database::{AuctionRepository, StoreError};
use crate::member::Member;
use crate::view::AuctionTab;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

// endregion: --- Imports

// region:    --- View Models
/// 상점 상품 카드
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub supplier_name: String,
    pub quantity: i64,
    pub unit: String,
    pub min_price: i64,
    pub min_price_label: String,
    pub expiry_date: DateTime<Utc>,
    pub auction_end_date: DateTime<Utc>,
    pub status: AuctionStatus,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub time_remaining: TimeRemaining,
    pub countdown: String,
    pub bid_count: usize,
    pub highest_bid: Option<i64>,
    pub can_bid: bool,
}

impl ProductCard {
    pub fn from_product(product: &Product, now: DateTime<Utc>) -> Self {
        let status = AuctionStatus::classify(product, now);
        let time_remaining = TimeRemaining::until(product.auction_end_date, now);
        ProductCard {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            supplier_name: product.supplier_name.clone(),
            quantity: product.quantity,
            unit: product.unit.clone(),
            min_price: product.min_price,
            min_price_label: format!("{}원", format_won(product.min_price)),
            expiry_date: product.expiry_date,
            auction_end_date: product.auction_end_date,
            status,
            status_label: status.label(),
            status_class: status.css_class(),
            time_remaining,
            countdown: time_remaining.format(),
            bid_count: product.bids.len(),
            highest_bid: product.highest_bid(),
            can_bid: status.accepts_bids(),
        }
    }
}

/// 관리자 경매 목록 행
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionRow {
    pub id: String,
    pub name: String,
    pub supplier_name: String,
    pub expiry_date: DateTime<Utc>,
    pub auction_start_date: DateTime<Utc>,
    pub auction_end_date: DateTime<Utc>,
    pub min_price: i64,
    pub bid_count: usize,
    pub highest_bid_label: String,
    pub status: AuctionStatus,
    pub status_label: &'static str,
    pub status_class: &'static str,
}

impl AuctionRow {
    pub fn from_product(product: &Product, now: DateTime<Utc>) -> Self {
        let status = AuctionStatus::classify(product, now);
        AuctionRow {
            id: product.id.clone(),
            name: product.name.clone(),
            supplier_name: product.supplier_name.clone(),
            expiry_date: product.expiry_date,
            auction_start_date: product.auction_start_date,
            auction_end_date: product.auction_end_date,
            min_price: product.min_price,
            bid_count: product.bids.len(),
            highest_bid_label: product
                .highest_bid()
                .map(|amount| format!("{}원", format_won(amount)))
                .unwrap_or_else(|| "-".to_string()),
            status,
            status_label: status.label(),
            status_class: status.css_class(),
        }
    }
}

/// 관리자 대시보드 통계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_auctions: usize,
    pub active_auctions: usize,
    /// 종료 + 유통기한 만료
    pub ended_auctions: usize,
    pub scheduled_auctions: usize,
    pub total_members: usize,
    pub total_bids: usize,
}

/// 상품 상세 (카드 + 입찰 순위)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub card: ProductCard,
    pub supplier_email: String,
    pub auction_start_date: DateTime<Utc>,
    pub bids: Vec<Bid>,
}

/// 상품별 입찰 내역 (금액 내림차순)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidHistory {
    pub product_id: String,
    pub product_name: String,
    pub bids: Vec<Bid>,
}

// endregion: --- View Models

// region:    --- Query Handlers

/// 최신 등록순 정렬
fn newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// 모든 상품 조회 (최신순)
pub async fn get_products(repo: &dyn AuctionRepository) -> Result<Vec<Product>, StoreError> {
    info!("{:<12} --> 모든 상품 조회", "Query");
    let mut products = repo.list_products().await?;
    newest_first(&mut products);
    Ok(products)
}

/// 상품 조회
pub async fn get_product(
    repo: &dyn AuctionRepository,
    product_id: &str,
) -> Result<Option<Product>, StoreError> {
    info!("{:<12} --> 상품 조회 id: {}", "Query", product_id);
    repo.get_product(product_id).await
}

/// 상품 상세 조회
pub async fn get_product_detail(
    repo: &dyn AuctionRepository,
    product_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<ProductDetail>, StoreError> {
    Ok(get_product(repo, product_id).await?.map(|product| ProductDetail {
        card: ProductCard::from_product(&product, now),
        supplier_email: product.supplier_email.clone(),
        auction_start_date: product.auction_start_date,
        bids: product.ranked_bids(),
    }))
}

/// 상점 상품 카드 조회 (매 호출마다 저장소에서 다시 읽는다)
pub async fn get_storefront_cards(
    repo: &dyn AuctionRepository,
    now: DateTime<Utc>,
) -> Result<Vec<ProductCard>, StoreError> {
    let products = get_products(repo).await?;
    Ok(products
        .iter()
        .map(|p| ProductCard::from_product(p, now))
        .collect())
}

/// 상품 입찰 조회 (금액 내림차순)
pub async fn get_ranked_bids(
    repo: &dyn AuctionRepository,
    product_id: &str,
) -> Result<Vec<Bid>, StoreError> {
    info!("{:<12} --> 상품 입찰 조회 id: {}", "Query", product_id);
    let mut bids = repo.list_bids_for_product(product_id).await?;
    rank_bids(&mut bids);
    Ok(bids)
}

/// 입찰 내역 조회 (관리자)
pub async fn get_bid_history(
    repo: &dyn AuctionRepository,
    product_id: &str,
) -> Result<Option<BidHistory>, StoreError> {
    let Some(product) = get_product(repo, product_id).await? else {
        return Ok(None);
    };
    Ok(Some(BidHistory {
        bids: product.ranked_bids(),
        product_id: product.id,
        product_name: product.name,
    }))
}

/// 경매 목록 조회 (탭 필터)
pub async fn get_auction_rows(
    repo: &dyn AuctionRepository,
    tab: AuctionTab,
    now: DateTime<Utc>,
) -> Result<Vec<AuctionRow>, StoreError> {
    info!("{:<12} --> 경매 목록 조회 tab: {:?}", "Query", tab);
    let products = get_products(repo).await?;
    Ok(products
        .iter()
        .filter(|p| tab.includes(AuctionStatus::classify(p, now)))
        .map(|p| AuctionRow::from_product(p, now))
        .collect())
}

/// 대시보드 통계 조회
pub async fn get_dashboard_stats(
    repo: &dyn AuctionRepository,
    now: DateTime<Utc>,
) -> Result<DashboardStats, StoreError> {
    info!("{:<12} --> 대시보드 통계 조회", "Query");
    let products = repo.list_products().await?;
    let members = repo.list_members().await?;

    let mut stats = DashboardStats {
        total_auctions: products.len(),
        total_members: members.len(),
        ..DashboardStats::default()
    };
    for product in &products {
        match AuctionStatus::classify(product, now) {
            AuctionStatus::Active => stats.active_auctions += 1,
            AuctionStatus::Ended | AuctionStatus::Expired => stats.ended_auctions += 1,
            AuctionStatus::Scheduled => stats.scheduled_auctions += 1,
        }
        stats.total_bids += product.bids.len();
    }
    Ok(stats)
}

/// 모든 회원 조회 (최신 가입순)
pub async fn get_members(repo: &dyn AuctionRepository) -> Result<Vec<Member>, StoreError> {
    info!("{:<12} --> 모든 회원 조회", "Query");
    let mut members = repo.list_members().await?;
    members.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(members)
}

/// 모든 배너 조회 (노출 순서)
pub async fn get_banners(repo: &dyn AuctionRepository) -> Result<Vec<Banner>, StoreError> {
    info!("{:<12} --> 모든 배너 조회", "Query");
    let mut banners = repo.list_banners().await?;
    banners.sort_by_key(|b| b.order);
    Ok(banners)
}

/// 활성 배너 조회
pub async fn get_active_banners(repo: &dyn AuctionRepository) -> Result<Vec<Banner>, StoreError> {
    Ok(visible_banners(repo.list_banners().await?))
}

// endregion: --- Query Handlers
