/// 데이터 접근 계층
/// 원격 REST API를 먼저 호출하고, 실패하면 로컬 저장소 스냅샷으로 폴백한다.
/// 두 저장소는 동기화하지 않으며 서로 달라질 수 있다.
// region:    --- Imports
use crate::admin::Admin;
use crate::banner::{Banner, NewBanner};
use crate::bidding::model::{Bid, NewBid, NewProduct, Product};
use crate::member::{Member, NewMember};
use async_trait::async_trait;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Modules
pub mod failover;
pub mod ids;
pub mod local;
pub mod normalize;
pub mod remote;
pub mod storage;

pub use failover::FailoverRepository;
pub use local::LocalRepository;
pub use remote::RemoteRepository;
pub use storage::{LocalStorage, MemoryStorage, SqliteStorage};

// endregion: --- Modules

// region:    --- Storage Keys
/// 로컬 저장소 키
pub mod keys {
    pub const PRODUCTS: &str = "products";
    pub const MEMBERS: &str = "members";
    pub const BANNERS: &str = "banners";
    pub const CURRENT_USER: &str = "currentUser";
    pub const ADMIN_USER: &str = "adminUser";
    pub const ADMIN_ACCOUNTS: &str = "adminAccounts";
}

// endregion: --- Storage Keys

// region:    --- Store Error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("원격 API 호출 실패: {0}")]
    Http(#[from] reqwest::Error),

    #[error("원격 API 오류 응답: {0}")]
    Status(u16),

    #[error("잘못된 API 주소: {0}")]
    InvalidUrl(String),

    #[error("로컬 저장소 오류: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("직렬화 오류: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("잘못된 시각 값: {0}")]
    Timestamp(String),
}

// endregion: --- Store Error

// region:    --- Repository Trait
/// 경매 데이터 저장소 트레이트
/// 없는 엔티티와 일시적 실패를 구분하지 않는다. 호출부는 None/빈 목록을 "없음"으로 처리한다.
#[async_trait]
pub trait AuctionRepository: Send + Sync {
    // 상품
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    async fn get_product(&self, id: &str) -> Result<Option<Product>, StoreError>;
    async fn create_product(&self, fields: NewProduct) -> Result<String, StoreError>;
    async fn delete_product(&self, id: &str) -> Result<bool, StoreError>;

    // 입찰
    async fn list_bids_for_product(&self, product_id: &str) -> Result<Vec<Bid>, StoreError>;
    async fn create_bid(
        &self,
        product_id: &str,
        fields: NewBid,
    ) -> Result<Option<Product>, StoreError>;

    // 회원
    async fn list_members(&self) -> Result<Vec<Member>, StoreError>;
    async fn create_member(&self, fields: NewMember) -> Result<String, StoreError>;
    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, StoreError>;
    async fn delete_member(&self, id: &str) -> Result<bool, StoreError>;

    // 배너
    async fn list_banners(&self) -> Result<Vec<Banner>, StoreError>;
    async fn create_banner(&self, fields: NewBanner) -> Result<String, StoreError>;
    async fn delete_banner(&self, id: &str) -> Result<bool, StoreError>;

    // 관리자
    async fn authenticate_admin(
        &self,
        id: &str,
        password: &str,
    ) -> Result<Option<Admin>, StoreError>;
}

// endregion: --- Repository Trait
