/// 원격 REST API 저장소
/// 전송 오류와 성공이 아닌 응답은 모두 오류로 돌려준다. 재시도나 타임아웃은 두지 않는다.
// region:    --- Imports
use super::normalize::{
    normalize_all, AdminRecord, BannerRecord, BidRecord, CreatedRecord, MemberRecord, Normalize,
    ProductRecord,
};
use super::{AuctionRepository, StoreError};
use crate::admin::Admin;
use crate::banner::{Banner, NewBanner};
use crate::bidding::model::{Bid, NewBid, NewProduct, Product};
use crate::member::{Member, NewMember};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

// endregion: --- Imports

// region:    --- Request Bodies
/// 입찰 등록 요청 본문
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BidBody<'a> {
    product_id: &'a str,
    bidder_name: &'a str,
    bidder_email: &'a str,
    amount: i64,
}

/// 관리자 로그인 요청 본문
#[derive(Debug, Serialize)]
struct AdminLoginBody<'a> {
    id: &'a str,
    password: &'a str,
}

// endregion: --- Request Bodies

// region:    --- Remote Repository
#[derive(Clone)]
pub struct RemoteRepository {
    client: Client,
    base_url: Url,
}

impl RemoteRepository {
    /// 예: http://localhost:5000/api
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let base_url =
            Url::parse(base_url).map_err(|e| StoreError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// 경로 조각을 이어 붙인 URL (조각은 인코딩된다)
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(StoreError::Status(status.as_u16()))
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, StoreError> {
        let url = self.endpoint(segments)?;
        debug!("{:<12} --> GET {}", "Remote", url);
        let response = self.client.get(url).send().await?;
        Ok(Self::check(response)?.json::<T>().await?)
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        debug!("{:<12} --> {} {}", "Remote", method, url);
        let response = self.client.request(method, url).json(body).send().await?;
        Ok(Self::check(response)?.json::<T>().await?)
    }

    async fn delete(&self, segments: &[&str]) -> Result<bool, StoreError> {
        let url = self.endpoint(segments)?;
        debug!("{:<12} --> DELETE {}", "Remote", url);
        let response = self.client.delete(url).send().await?;
        Self::check(response)?;
        Ok(true)
    }

    /// 원격 상품 행에는 입찰 목록이 없으므로 따로 조회해 채운다
    async fn assemble(&self, record: ProductRecord) -> Result<Product, StoreError> {
        let embedded = record.has_bids();
        let mut product = record.normalize()?;
        if !embedded {
            product.bids = self.list_bids_for_product(&product.id).await?;
        }
        Ok(product)
    }
}

#[async_trait]
impl AuctionRepository for RemoteRepository {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let records: Vec<ProductRecord> = self.fetch(&["products"]).await?;
        let mut products = Vec::with_capacity(records.len());
        for record in records {
            products.push(self.assemble(record).await?);
        }
        Ok(products)
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let record: ProductRecord = self.fetch(&["products", id]).await?;
        Ok(Some(self.assemble(record).await?))
    }

    async fn create_product(&self, fields: NewProduct) -> Result<String, StoreError> {
        let fields = fields.with_defaults(Utc::now());
        let created: CreatedRecord = self
            .send_json(Method::POST, &["products"], &fields)
            .await?;
        let id = created.id.into_string();
        info!("{:<12} --> 상품 등록 id: {}", "Remote", id);
        Ok(id)
    }

    async fn delete_product(&self, id: &str) -> Result<bool, StoreError> {
        self.delete(&["products", id]).await
    }

    async fn list_bids_for_product(&self, product_id: &str) -> Result<Vec<Bid>, StoreError> {
        let records: Vec<BidRecord> = self.fetch(&["products", product_id, "bids"]).await?;
        normalize_all(records)
    }

    async fn create_bid(
        &self,
        product_id: &str,
        fields: NewBid,
    ) -> Result<Option<Product>, StoreError> {
        let body = BidBody {
            product_id,
            bidder_name: &fields.bidder_name,
            bidder_email: &fields.bidder_email,
            amount: fields.amount,
        };
        let created: CreatedRecord = self.send_json(Method::POST, &["bids"], &body).await?;
        info!(
            "{:<12} --> 입찰 등록 id: {}, product: {}",
            "Remote",
            created.id.into_string(),
            product_id
        );

        // 입찰은 이미 저장되었으므로 재조회 실패를 입찰 실패로 돌려주지 않는다
        match self.get_product(product_id).await {
            Ok(product) => Ok(product),
            Err(e) => {
                warn!(
                    "{:<12} --> 입찰 후 상품 재조회 실패 id: {}, error: {}",
                    "Remote", product_id, e
                );
                Ok(None)
            }
        }
    }

    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        let records: Vec<MemberRecord> = self.fetch(&["members"]).await?;
        normalize_all(records)
    }

    async fn create_member(&self, fields: NewMember) -> Result<String, StoreError> {
        let created: CreatedRecord = self
            .send_json(Method::POST, &["members"], &fields)
            .await?;
        Ok(created.id.into_string())
    }

    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, StoreError> {
        let record: MemberRecord = self.fetch(&["members", email]).await?;
        Ok(Some(record.normalize()?))
    }

    async fn delete_member(&self, id: &str) -> Result<bool, StoreError> {
        self.delete(&["members", id]).await
    }

    async fn list_banners(&self) -> Result<Vec<Banner>, StoreError> {
        let records: Vec<BannerRecord> = self.fetch(&["banners"]).await?;
        normalize_all(records)
    }

    async fn create_banner(&self, fields: NewBanner) -> Result<String, StoreError> {
        let created: CreatedRecord = self
            .send_json(Method::POST, &["banners"], &fields)
            .await?;
        Ok(created.id.into_string())
    }

    async fn delete_banner(&self, id: &str) -> Result<bool, StoreError> {
        self.delete(&["banners", id]).await
    }

    async fn authenticate_admin(
        &self,
        id: &str,
        password: &str,
    ) -> Result<Option<Admin>, StoreError> {
        let body = AdminLoginBody { id, password };
        let record: AdminRecord = self
            .send_json(Method::POST, &["admin", "login"], &body)
            .await?;
        Ok(Some(record.normalize()?))
    }
}

// endregion: --- Remote Repository

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_encoded_segments() {
        let repo = RemoteRepository::new("http://localhost:5000/api/").unwrap();
        let url = repo.endpoint(&["members", "kim lee@example.com"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/members/kim%20lee@example.com"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            RemoteRepository::new("not a url"),
            Err(StoreError::InvalidUrl(_))
        ));
    }
}
