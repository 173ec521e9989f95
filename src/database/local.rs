/// 로컬 저장소 스냅샷 기반 저장소 (폴백 저장소)
/// 엔티티 종류별 키에 JSON 배열을 통째로 읽고 쓴다.
// region:    --- Imports
use super::ids::next_id;
use super::keys;
use super::normalize::{normalize_all, BannerRecord, MemberRecord, Normalize, ProductRecord};
use super::storage::LocalStorage;
use super::{AuctionRepository, StoreError};
use crate::admin::{Admin, AdminAccount};
use crate::banner::{Banner, NewBanner};
use crate::bidding::model::{Bid, NewBid, NewProduct, Product};
use crate::member::{Member, NewMember};
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Local Repository
#[derive(Clone)]
pub struct LocalRepository {
    storage: Arc<dyn LocalStorage>,
    // 스냅샷 읽기-수정-쓰기 구간 보호
    write_lock: Arc<Mutex<()>>,
}

impl LocalRepository {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            storage,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// 관리자 계정이 하나도 없으면 기본 계정을 등록한다
    pub async fn seed_admin(&self, account: AdminAccount) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let accounts: Vec<AdminAccount> = self.load_raw(keys::ADMIN_ACCOUNTS).await?;
        if !accounts.is_empty() {
            return Ok(false);
        }
        info!("{:<12} --> 기본 관리자 계정 등록: {}", "Local", account.id);
        self.save(keys::ADMIN_ACCOUNTS, &[account]).await?;
        Ok(true)
    }

    /// 키에 저장된 JSON 배열 읽기 (없으면 빈 목록)
    async fn load_raw<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        match self.storage.get_item(key).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    /// 레코드 배열을 읽어 정규 엔티티로 변환
    async fn load<R>(&self, key: &str) -> Result<Vec<R::Output>, StoreError>
    where
        R: Normalize + DeserializeOwned,
    {
        normalize_all(self.load_raw::<R>(key).await?)
    }

    async fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(items)?;
        self.storage.set_item(key, &raw).await
    }

    async fn products(&self) -> Result<Vec<Product>, StoreError> {
        self.load::<ProductRecord>(keys::PRODUCTS).await
    }

    async fn members(&self) -> Result<Vec<Member>, StoreError> {
        self.load::<MemberRecord>(keys::MEMBERS).await
    }

    async fn banners(&self) -> Result<Vec<Banner>, StoreError> {
        self.load::<BannerRecord>(keys::BANNERS).await
    }
}

#[async_trait]
impl AuctionRepository for LocalRepository {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.products().await
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        Ok(self.products().await?.into_iter().find(|p| p.id == id))
    }

    async fn create_product(&self, fields: NewProduct) -> Result<String, StoreError> {
        let _guard = self.write_lock.lock().await;
        let now = Utc::now();
        let product = fields.into_product(next_id(), now);
        let id = product.id.clone();

        let mut products = self.products().await?;
        products.push(product);
        self.save(keys::PRODUCTS, &products).await?;
        info!("{:<12} --> 상품 저장 id: {}", "Local", id);
        Ok(id)
    }

    async fn delete_product(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.products().await?;
        let before = products.len();
        // 입찰은 상품에 포함되어 있으므로 함께 삭제된다
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Ok(false);
        }
        self.save(keys::PRODUCTS, &products).await?;
        info!("{:<12} --> 상품 삭제 id: {}", "Local", id);
        Ok(true)
    }

    async fn list_bids_for_product(&self, product_id: &str) -> Result<Vec<Bid>, StoreError> {
        Ok(self
            .get_product(product_id)
            .await?
            .map(|p| p.bids)
            .unwrap_or_default())
    }

    async fn create_bid(
        &self,
        product_id: &str,
        fields: NewBid,
    ) -> Result<Option<Product>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.products().await?;
        let Some(product) = products.iter_mut().find(|p| p.id == product_id) else {
            warn!("{:<12} --> 입찰 대상 상품 없음 id: {}", "Local", product_id);
            return Ok(None);
        };

        product.bids.push(Bid {
            id: next_id(),
            bidder_name: fields.bidder_name,
            bidder_email: fields.bidder_email,
            amount: fields.amount,
            timestamp: Utc::now(),
        });
        let updated = product.clone();

        self.save(keys::PRODUCTS, &products).await?;
        info!(
            "{:<12} --> 입찰 저장 product: {}, amount: {}",
            "Local", product_id, fields.amount
        );
        Ok(Some(updated))
    }

    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        self.members().await
    }

    async fn create_member(&self, fields: NewMember) -> Result<String, StoreError> {
        let _guard = self.write_lock.lock().await;
        let member = Member {
            id: next_id(),
            name: fields.name,
            email: fields.email,
            company: fields.company,
            phone: fields.phone,
            member_type: fields.member_type,
            created_at: Utc::now(),
            updated_at: None,
        };
        let id = member.id.clone();

        let mut members = self.members().await?;
        members.push(member);
        self.save(keys::MEMBERS, &members).await?;
        Ok(id)
    }

    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, StoreError> {
        Ok(self.members().await?.into_iter().find(|m| m.email == email))
    }

    async fn delete_member(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut members = self.members().await?;
        let before = members.len();
        members.retain(|m| m.id != id);
        if members.len() == before {
            return Ok(false);
        }
        self.save(keys::MEMBERS, &members).await?;
        Ok(true)
    }

    async fn list_banners(&self) -> Result<Vec<Banner>, StoreError> {
        self.banners().await
    }

    async fn create_banner(&self, fields: NewBanner) -> Result<String, StoreError> {
        let _guard = self.write_lock.lock().await;
        let banner = Banner {
            id: next_id(),
            title: fields.title,
            description: fields.description,
            image_url: fields.image_url,
            link: fields.link,
            order: fields.order,
            active: fields.active,
            created_at: Some(Utc::now()),
        };
        let id = banner.id.clone();

        let mut banners = self.banners().await?;
        banners.push(banner);
        self.save(keys::BANNERS, &banners).await?;
        Ok(id)
    }

    async fn delete_banner(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut banners = self.banners().await?;
        let before = banners.len();
        banners.retain(|b| b.id != id);
        if banners.len() == before {
            return Ok(false);
        }
        self.save(keys::BANNERS, &banners).await?;
        Ok(true)
    }

    async fn authenticate_admin(
        &self,
        id: &str,
        password: &str,
    ) -> Result<Option<Admin>, StoreError> {
        let accounts: Vec<AdminAccount> = self.load_raw(keys::ADMIN_ACCOUNTS).await?;
        Ok(accounts
            .iter()
            .find(|a| a.matches(id, password))
            .map(AdminAccount::to_admin))
    }
}

// endregion: --- Local Repository
