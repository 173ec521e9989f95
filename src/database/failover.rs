/// 자동 폴백 저장소
/// 1차 저장소(원격)를 호출하고 어떤 오류든 발생하면 같은 작업을 2차 저장소(로컬)로 수행한다.
/// 재시도, 백오프, 동기화는 하지 않는다.
// region:    --- Imports
use super::{AuctionRepository, StoreError};
use crate::admin::Admin;
use crate::banner::{Banner, NewBanner};
use crate::bidding::model::{Bid, NewBid, NewProduct, Product};
use crate::member::{Member, NewMember};
use async_trait::async_trait;
use tracing::warn;

// endregion: --- Imports

// region:    --- Failover Repository
pub struct FailoverRepository<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FailoverRepository<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

/// 1차 저장소 호출, 실패 시 같은 인자로 2차 저장소 호출
macro_rules! failover {
    ($self:ident, $method:ident ( $($arg:ident),* )) => {{
        match $self.primary.$method($($arg.clone()),*).await {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(
                    "{:<12} --> 원격 호출 실패, 로컬 저장소로 폴백합니다. op: {}, error: {}",
                    "Failover",
                    stringify!($method),
                    e
                );
                $self.fallback.$method($($arg),*).await
            }
        }
    }};
}

#[async_trait]
impl<P, F> AuctionRepository for FailoverRepository<P, F>
where
    P: AuctionRepository,
    F: AuctionRepository,
{
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        failover!(self, list_products())
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        failover!(self, get_product(id))
    }

    async fn create_product(&self, fields: NewProduct) -> Result<String, StoreError> {
        failover!(self, create_product(fields))
    }

    async fn delete_product(&self, id: &str) -> Result<bool, StoreError> {
        failover!(self, delete_product(id))
    }

    async fn list_bids_for_product(&self, product_id: &str) -> Result<Vec<Bid>, StoreError> {
        failover!(self, list_bids_for_product(product_id))
    }

    async fn create_bid(
        &self,
        product_id: &str,
        fields: NewBid,
    ) -> Result<Option<Product>, StoreError> {
        match self.primary.create_bid(product_id, fields.clone()).await {
            Ok(Some(product)) => Ok(Some(product)),
            // 1차 저장소에 입찰은 기록됨. 다시 기록하지 않고 조회만 폴백한다
            Ok(None) => self.fallback.get_product(product_id).await,
            Err(e) => {
                warn!(
                    "{:<12} --> 원격 호출 실패, 로컬 저장소로 폴백합니다. op: create_bid, error: {}",
                    "Failover", e
                );
                self.fallback.create_bid(product_id, fields).await
            }
        }
    }

    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        failover!(self, list_members())
    }

    async fn create_member(&self, fields: NewMember) -> Result<String, StoreError> {
        failover!(self, create_member(fields))
    }

    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, StoreError> {
        failover!(self, find_member_by_email(email))
    }

    async fn delete_member(&self, id: &str) -> Result<bool, StoreError> {
        failover!(self, delete_member(id))
    }

    async fn list_banners(&self) -> Result<Vec<Banner>, StoreError> {
        failover!(self, list_banners())
    }

    async fn create_banner(&self, fields: NewBanner) -> Result<String, StoreError> {
        failover!(self, create_banner(fields))
    }

    async fn delete_banner(&self, id: &str) -> Result<bool, StoreError> {
        failover!(self, delete_banner(id))
    }

    async fn authenticate_admin(
        &self,
        id: &str,
        password: &str,
    ) -> Result<Option<Admin>, StoreError> {
        failover!(self, authenticate_admin(id, password))
    }
}

// endregion: --- Failover Repository
