// region:    --- Imports
use crate::admin::{Admin, AdminCredentials};
use crate::banner::NewBanner;
use crate::bidding::commands::{
    handle_place_bid, parse_amount, BidError, BidRejection, PlaceBidCommand,
};
use crate::bidding::model::NewProduct;
use crate::config::AppConfig;
use crate::database::{AuctionRepository, StoreError};
use crate::member::NewMember;
use crate::query;
use crate::scheduler::RenderTicker;
use crate::session::{SessionStore, SessionToken};
use crate::view::{AdminView, AuctionTab, MainTab, StorefrontView};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};

// endregion: --- Imports

// region:    --- App State
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn AuctionRepository>,
    pub sessions: SessionStore,
    pub config: Arc<AppConfig>,
}

/// 라우터 설정
pub fn routes(state: AppState) -> Router {
    Router::new()
        // 상점
        .route("/storefront", get(handle_get_storefront))
        .route("/products", get(handle_get_products))
        .route("/products/stream", get(handle_product_stream))
        .route("/products/:id", get(handle_get_product))
        .route(
            "/products/:id/bids",
            get(handle_get_product_bids).post(handle_bid),
        )
        .route("/banners", get(handle_get_banners))
        .route("/members", post(handle_sign_up))
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/links", get(handle_get_links))
        // 관리자
        .route("/admin/login", post(handle_admin_login))
        .route("/admin/logout", post(handle_admin_logout))
        .route("/admin/dashboard", get(handle_admin_dashboard))
        .route("/admin/stats", get(handle_admin_stats))
        .route("/admin/auctions", get(handle_admin_auctions))
        .route(
            "/admin/products",
            get(handle_admin_products).post(handle_admin_create_product),
        )
        .route("/admin/products/:id", delete(handle_admin_delete_product))
        .route("/admin/products/:id/bids", get(handle_admin_product_bids))
        .route(
            "/admin/members",
            get(handle_admin_members).post(handle_admin_create_member),
        )
        .route("/admin/members/:id", delete(handle_admin_delete_member))
        .route(
            "/admin/banners",
            get(handle_admin_banners).post(handle_admin_create_banner),
        )
        .route("/admin/banners/:id", delete(handle_admin_delete_banner))
        .with_state(state)
}

// endregion: --- App State

// region:    --- Responses
fn error_response(status: StatusCode, message: &str, code: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message, "code": code })),
    )
        .into_response()
}

/// 저장소 실패 (원격과 로컬 모두 실패한 경우)
fn store_failure(e: StoreError) -> Response {
    error!("{:<12} --> 저장소 처리 실패: {}", "Handler", e);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &e.to_string(),
        "STORE_ERROR",
    )
}

fn created(id: String, message: &str) -> Response {
    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id, "message": message })),
    )
        .into_response()
}

fn message(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": message })),
    )
        .into_response()
}

fn not_found(message: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, message, "NOT_FOUND")
}

fn bad_request(message: &str, code: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, message, code)
}

/// JSON 본문 해석. 형식 오류는 400 INVALID_BODY
fn json_body<T: DeserializeOwned>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            info!("{:<12} --> 요청 본문 해석 실패: {}", "Handler", rejection.body_text());
            Err(bad_request(
                "요청 형식이 올바르지 않습니다.",
                "INVALID_BODY",
            ))
        }
    }
}

// endregion: --- Responses

// region:    --- Storefront Handlers

/// 상점 화면 (로그인 회원 + 배너 + 상품 카드)
pub async fn handle_get_storefront(
    State(state): State<AppState>,
    token: SessionToken,
) -> impl IntoResponse {
    let current_user = match state.sessions.current_user(token.as_deref()).await {
        Ok(user) => user,
        Err(e) => return store_failure(e),
    };
    let view = StorefrontView { current_user };
    match view.render(&*state.repo, Utc::now()).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => store_failure(e),
    }
}

/// 상품 카드 목록
pub async fn handle_get_products(State(state): State<AppState>) -> impl IntoResponse {
    match query::handlers::get_storefront_cards(&*state.repo, Utc::now()).await {
        Ok(cards) => (StatusCode::OK, Json(cards)).into_response(),
        Err(e) => store_failure(e),
    }
}

/// 카운트다운 재렌더링 스트림 (SSE)
/// 연결이 끊기면 스트림과 함께 타이머도 정리된다
pub async fn handle_product_stream(State(state): State<AppState>) -> impl IntoResponse {
    info!("{:<12} --> 상품 스트림 연결", "Handler");
    let repo = Arc::clone(&state.repo);
    let frames = RenderTicker::stream(state.config.render_interval(), move || {
        let repo = Arc::clone(&repo);
        async move {
            match query::handlers::get_storefront_cards(&*repo, Utc::now()).await {
                Ok(cards) => Event::default().event("products").json_data(&cards).ok(),
                Err(e) => {
                    warn!("{:<12} --> 상품 스트림 렌더링 실패: {}", "Handler", e);
                    None
                }
            }
        }
    });

    Sse::new(frames.map(Ok::<Event, Infallible>)).keep_alive(KeepAlive::default())
}

/// 상품 상세
pub async fn handle_get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match query::handlers::get_product_detail(&*state.repo, &id, Utc::now()).await {
        Ok(Some(detail)) => (StatusCode::OK, Json(detail)).into_response(),
        Ok(None) => not_found("상품을 찾을 수 없습니다."),
        Err(e) => store_failure(e),
    }
}

/// 상품 입찰 목록 (금액 내림차순)
pub async fn handle_get_product_bids(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match query::handlers::get_ranked_bids(&*state.repo, &id).await {
        Ok(bids) => (StatusCode::OK, Json(bids)).into_response(),
        Err(e) => store_failure(e),
    }
}

/// 입찰 폼. 입찰자명이 없으면 로그인 회원 이름을 쓴다
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidForm {
    #[serde(default)]
    pub bidder_name: Option<String>,
    #[serde(default)]
    pub amount: serde_json::Value,
}

/// 입찰 요청 처리
pub async fn handle_bid(
    State(state): State<AppState>,
    Path(id): Path<String>,
    token: SessionToken,
    payload: Result<Json<BidForm>, JsonRejection>,
) -> impl IntoResponse {
    let form = match json_body(payload) {
        Ok(form) => form,
        Err(response) => return response,
    };
    let user = match state.sessions.current_user(token.as_deref()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            let rejection = BidRejection::LoginRequired;
            return (StatusCode::BAD_REQUEST, Json(rejection.to_json())).into_response();
        }
        Err(e) => return store_failure(e),
    };

    let cmd = PlaceBidCommand {
        product_id: id,
        bidder_name: form.bidder_name.unwrap_or_else(|| user.display_name()),
        bidder_email: user.email,
        amount: parse_amount(&form.amount),
    };

    match handle_place_bid(cmd, &*state.repo, Utc::now()).await {
        Ok(product) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "입찰이 완료되었습니다!",
                "product": product,
            })),
        )
            .into_response(),
        Err(BidError::Rejected(rejection)) => {
            info!("{:<12} --> 입찰 거부: {}", "Handler", rejection);
            (StatusCode::BAD_REQUEST, Json(rejection.to_json())).into_response()
        }
        Err(BidError::Store(e)) => store_failure(e),
    }
}

/// 활성 배너
pub async fn handle_get_banners(State(state): State<AppState>) -> impl IntoResponse {
    match query::handlers::get_active_banners(&*state.repo).await {
        Ok(banners) => (StatusCode::OK, Json(banners)).into_response(),
        Err(e) => store_failure(e),
    }
}

/// 회원 가입 / 회원 추가 공통 처리
async fn create_member(state: &AppState, form: NewMember) -> Response {
    if form.name.trim().is_empty() || form.email.trim().is_empty() {
        return bad_request("이름과 이메일을 입력해주세요.", "INVALID_MEMBER");
    }
    match state.repo.find_member_by_email(form.email.trim()).await {
        Ok(Some(_)) => {
            return error_response(
                StatusCode::CONFLICT,
                "이미 가입된 이메일입니다.",
                "DUPLICATE_EMAIL",
            )
        }
        Ok(None) => {}
        Err(e) => return store_failure(e),
    }
    match state.repo.create_member(form).await {
        Ok(id) => created(id, "회원이 추가되었습니다."),
        Err(e) => store_failure(e),
    }
}

pub async fn handle_sign_up(
    State(state): State<AppState>,
    payload: Result<Json<NewMember>, JsonRejection>,
) -> impl IntoResponse {
    let form = match json_body(payload) {
        Ok(form) => form,
        Err(response) => return response,
    };
    info!("{:<12} --> 회원 가입 요청 email: {}", "Handler", form.email);
    create_member(&state, form).await
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
}

/// 회원 로그인. 응답의 token을 이후 요청의 Bearer 토큰으로 쓴다
pub async fn handle_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginForm>, JsonRejection>,
) -> impl IntoResponse {
    let form = match json_body(payload) {
        Ok(form) => form,
        Err(response) => return response,
    };
    match state.sessions.sign_in_member(&*state.repo, &form.email).await {
        Ok(Some(signed_in)) => (StatusCode::OK, Json(signed_in)).into_response(),
        Ok(None) => error_response(
            StatusCode::UNAUTHORIZED,
            "등록되지 않은 이메일입니다.",
            "UNKNOWN_MEMBER",
        ),
        Err(e) => store_failure(e),
    }
}

pub async fn handle_logout(
    State(state): State<AppState>,
    token: SessionToken,
) -> impl IntoResponse {
    match state.sessions.sign_out_member(token.as_deref()).await {
        Ok(()) => message("로그아웃되었습니다."),
        Err(e) => store_failure(e),
    }
}

/// 쇼핑몰 / 백오피스 / 프론트 링크
pub async fn handle_get_links(State(state): State<AppState>) -> impl IntoResponse {
    let config = &state.config;
    Json(serde_json::json!({
        "shoppingMallUrl": config.shopping_mall_url,
        "backofficeUrl": config.backoffice_url(""),
        "frontendUrl": config.frontend_url(""),
    }))
}

// endregion: --- Storefront Handlers

// region:    --- Admin Handlers

/// 관리자 세션 확인
async fn require_admin(state: &AppState, token: &SessionToken) -> Result<Admin, Response> {
    match state.sessions.admin_user(token.as_deref()).await {
        Ok(Some(admin)) => Ok(admin),
        Ok(None) => Err(error_response(
            StatusCode::UNAUTHORIZED,
            "관리자 로그인이 필요합니다.",
            "ADMIN_REQUIRED",
        )),
        Err(e) => Err(store_failure(e)),
    }
}

/// 삭제 확인 여부
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

fn confirm_required(prompt: &str) -> Response {
    error_response(StatusCode::PRECONDITION_REQUIRED, prompt, "CONFIRM_REQUIRED")
}

pub async fn handle_admin_login(
    State(state): State<AppState>,
    payload: Result<Json<AdminCredentials>, JsonRejection>,
) -> impl IntoResponse {
    let credentials = match json_body(payload) {
        Ok(credentials) => credentials,
        Err(response) => return response,
    };
    match state
        .sessions
        .sign_in_admin(&*state.repo, &credentials)
        .await
    {
        Ok(Some(signed_in)) => (StatusCode::OK, Json(signed_in)).into_response(),
        Ok(None) => error_response(
            StatusCode::UNAUTHORIZED,
            "아이디 또는 비밀번호가 올바르지 않습니다.",
            "INVALID_CREDENTIALS",
        ),
        Err(e) => store_failure(e),
    }
}

pub async fn handle_admin_logout(
    State(state): State<AppState>,
    token: SessionToken,
) -> impl IntoResponse {
    match state.sessions.sign_out_admin(token.as_deref()).await {
        Ok(()) => message("로그아웃되었습니다."),
        Err(e) => store_failure(e),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub main: MainTab,
    #[serde(default)]
    pub tab: AuctionTab,
}

/// 관리자 화면 (통계 + 선택된 탭)
pub async fn handle_admin_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
    token: SessionToken,
) -> impl IntoResponse {
    let admin = match require_admin(&state, &token).await {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    let view = AdminView::new(admin).with_tabs(query.main, query.tab);
    match view.render(&*state.repo, Utc::now()).await {
        Ok(panel) => (StatusCode::OK, Json(panel)).into_response(),
        Err(e) => store_failure(e),
    }
}

pub async fn handle_admin_stats(
    State(state): State<AppState>,
    token: SessionToken,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&state, &token).await {
        return response;
    }
    match query::handlers::get_dashboard_stats(&*state.repo, Utc::now()).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => store_failure(e),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AuctionsQuery {
    #[serde(default)]
    pub tab: AuctionTab,
}

pub async fn handle_admin_auctions(
    State(state): State<AppState>,
    Query(query): Query<AuctionsQuery>,
    token: SessionToken,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&state, &token).await {
        return response;
    }
    match query::handlers::get_auction_rows(&*state.repo, query.tab, Utc::now()).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => store_failure(e),
    }
}

pub async fn handle_admin_products(
    State(state): State<AppState>,
    token: SessionToken,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&state, &token).await {
        return response;
    }
    match query::handlers::get_products(&*state.repo).await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(e) => store_failure(e),
    }
}

/// 상품(경매) 등록
pub async fn handle_admin_create_product(
    State(state): State<AppState>,
    token: SessionToken,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&state, &token).await {
        return response;
    }
    let form = match json_body(payload) {
        Ok(form) => form,
        Err(response) => return response,
    };
    if form.name.trim().is_empty() || form.supplier_name.trim().is_empty() {
        return bad_request("상품명과 공급자명을 입력해주세요.", "INVALID_PRODUCT");
    }
    if form.quantity <= 0 || form.min_price <= 0 {
        return bad_request("수량과 최저가는 0보다 커야 합니다.", "INVALID_PRODUCT");
    }

    // 날짜가 비어 있으면 등록 시각 기준 기본값 (시작: 지금, 유통기한: +7일, 종료: +3일)
    let form = form.with_defaults(Utc::now());
    if form.has_inverted_window() {
        warn!(
            "{:<12} --> 경매 시작일이 종료일보다 늦습니다. name: {}",
            "Handler", form.name
        );
    }

    match state.repo.create_product(form).await {
        Ok(id) => {
            info!("{:<12} --> 상품 등록 id: {}", "Handler", id);
            created(id, "상품이 추가되었습니다.")
        }
        Err(e) => store_failure(e),
    }
}

pub async fn handle_admin_delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
    token: SessionToken,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&state, &token).await {
        return response;
    }
    if !query.confirm {
        return confirm_required("정말 이 상품을 삭제하시겠습니까?");
    }
    match state.repo.delete_product(&id).await {
        Ok(true) => message("상품이 삭제되었습니다."),
        Ok(false) => not_found("상품을 찾을 수 없습니다."),
        Err(e) => store_failure(e),
    }
}

/// 입찰 내역 (관리자 모달)
pub async fn handle_admin_product_bids(
    State(state): State<AppState>,
    Path(id): Path<String>,
    token: SessionToken,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&state, &token).await {
        return response;
    }
    match query::handlers::get_bid_history(&*state.repo, &id).await {
        Ok(Some(history)) => (StatusCode::OK, Json(history)).into_response(),
        Ok(None) => not_found("상품을 찾을 수 없습니다."),
        Err(e) => store_failure(e),
    }
}

pub async fn handle_admin_members(
    State(state): State<AppState>,
    token: SessionToken,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&state, &token).await {
        return response;
    }
    match query::handlers::get_members(&*state.repo).await {
        Ok(members) => (StatusCode::OK, Json(members)).into_response(),
        Err(e) => store_failure(e),
    }
}

pub async fn handle_admin_create_member(
    State(state): State<AppState>,
    token: SessionToken,
    payload: Result<Json<NewMember>, JsonRejection>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&state, &token).await {
        return response;
    }
    let form = match json_body(payload) {
        Ok(form) => form,
        Err(response) => return response,
    };
    create_member(&state, form).await
}

pub async fn handle_admin_delete_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
    token: SessionToken,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&state, &token).await {
        return response;
    }
    if !query.confirm {
        return confirm_required("정말 이 회원을 삭제하시겠습니까?");
    }
    match state.repo.delete_member(&id).await {
        Ok(true) => message("회원이 삭제되었습니다."),
        Ok(false) => not_found("회원을 찾을 수 없습니다."),
        Err(e) => store_failure(e),
    }
}

pub async fn handle_admin_banners(
    State(state): State<AppState>,
    token: SessionToken,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&state, &token).await {
        return response;
    }
    match query::handlers::get_banners(&*state.repo).await {
        Ok(banners) => (StatusCode::OK, Json(banners)).into_response(),
        Err(e) => store_failure(e),
    }
}

pub async fn handle_admin_create_banner(
    State(state): State<AppState>,
    token: SessionToken,
    payload: Result<Json<NewBanner>, JsonRejection>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&state, &token).await {
        return response;
    }
    let form = match json_body(payload) {
        Ok(form) => form,
        Err(response) => return response,
    };
    if form.title.trim().is_empty() {
        return bad_request("배너 제목을 입력해주세요.", "INVALID_BANNER");
    }
    match state.repo.create_banner(form).await {
        Ok(id) => created(id, "배너가 추가되었습니다."),
        Err(e) => store_failure(e),
    }
}

pub async fn handle_admin_delete_banner(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
    token: SessionToken,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&state, &token).await {
        return response;
    }
    if !query.confirm {
        return confirm_required("정말 이 배너를 삭제하시겠습니까?");
    }
    match state.repo.delete_banner(&id).await {
        Ok(true) => message("배너가 삭제되었습니다."),
        Ok(false) => not_found("배너를 찾을 수 없습니다."),
        Err(e) => store_failure(e),
    }
}

// endregion: --- Admin Handlers
