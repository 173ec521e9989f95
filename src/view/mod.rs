/// 화면 상태
/// 로그인 세션과 선택된 탭을 요청마다 명시적인 값으로 만들어 렌더링에 넘긴다.
// region:    --- Imports
use crate::admin::Admin;
use crate::auction::AuctionStatus;
use crate::banner::Banner;
use crate::bidding::model::Product;
use crate::database::{AuctionRepository, StoreError};
use crate::member::Member;
use crate::query::handlers::{self, AuctionRow, DashboardStats, ProductCard};
use crate::session::CurrentUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Tabs
/// 관리자 메인 탭
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MainTab {
    #[default]
    Auctions,
    Members,
    Products,
    Banners,
}

/// 경매 목록 하위 탭
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionTab {
    #[default]
    All,
    Active,
    Ended,
    Scheduled,
}

impl AuctionTab {
    pub fn includes(&self, status: AuctionStatus) -> bool {
        match self {
            AuctionTab::All => true,
            AuctionTab::Active => status == AuctionStatus::Active,
            AuctionTab::Ended => matches!(status, AuctionStatus::Ended | AuctionStatus::Expired),
            AuctionTab::Scheduled => status == AuctionStatus::Scheduled,
        }
    }
}

// endregion: --- Tabs

// region:    --- Storefront View
#[derive(Debug, Clone, Default)]
pub struct StorefrontView {
    pub current_user: Option<CurrentUser>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontPage {
    pub current_user: Option<CurrentUser>,
    pub banners: Vec<Banner>,
    pub products: Vec<ProductCard>,
}

impl StorefrontView {
    pub async fn render(
        &self,
        repo: &dyn AuctionRepository,
        now: DateTime<Utc>,
    ) -> Result<StorefrontPage, StoreError> {
        Ok(StorefrontPage {
            current_user: self.current_user.clone(),
            banners: handlers::get_active_banners(repo).await?,
            products: handlers::get_storefront_cards(repo, now).await?,
        })
    }
}

// endregion: --- Storefront View

// region:    --- Admin View
#[derive(Debug, Clone)]
pub struct AdminView {
    pub admin: Admin,
    pub main_tab: MainTab,
    pub auction_tab: AuctionTab,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum AdminContent {
    Auctions(Vec<AuctionRow>),
    Members(Vec<Member>),
    Products(Vec<Product>),
    Banners(Vec<Banner>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPanel {
    pub admin: Admin,
    pub main_tab: MainTab,
    pub auction_tab: AuctionTab,
    pub stats: DashboardStats,
    pub content: AdminContent,
}

impl AdminView {
    pub fn new(admin: Admin) -> Self {
        Self {
            admin,
            main_tab: MainTab::default(),
            auction_tab: AuctionTab::default(),
        }
    }

    pub fn with_tabs(mut self, main_tab: MainTab, auction_tab: AuctionTab) -> Self {
        self.main_tab = main_tab;
        self.auction_tab = auction_tab;
        self
    }

    /// 통계와 선택된 메인 탭 내용 렌더링
    pub async fn render(
        &self,
        repo: &dyn AuctionRepository,
        now: DateTime<Utc>,
    ) -> Result<AdminPanel, StoreError> {
        let stats = handlers::get_dashboard_stats(repo, now).await?;
        let content = match self.main_tab {
            MainTab::Auctions => {
                AdminContent::Auctions(handlers::get_auction_rows(repo, self.auction_tab, now).await?)
            }
            MainTab::Members => AdminContent::Members(handlers::get_members(repo).await?),
            MainTab::Products => AdminContent::Products(handlers::get_products(repo).await?),
            MainTab::Banners => AdminContent::Banners(handlers::get_banners(repo).await?),
        };
        Ok(AdminPanel {
            admin: self.admin.clone(),
            main_tab: self.main_tab,
            auction_tab: self.auction_tab,
            stats,
            content,
        })
    }
}

// endregion: --- Admin View

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_partition_statuses() {
        let statuses = [
            AuctionStatus::Scheduled,
            AuctionStatus::Active,
            AuctionStatus::Ended,
            AuctionStatus::Expired,
        ];
        for status in statuses {
            let hits = [AuctionTab::Active, AuctionTab::Ended, AuctionTab::Scheduled]
                .iter()
                .filter(|tab| tab.includes(status))
                .count();
            assert_eq!(hits, 1, "{:?}", status);
            assert!(AuctionTab::All.includes(status));
        }
    }
}
