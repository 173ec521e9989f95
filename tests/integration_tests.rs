use auction_storefront::admin::AdminAccount;
use auction_storefront::banner::visible_banners;
use auction_storefront::bidding::commands::{
    handle_place_bid, BidError, BidRejection, PlaceBidCommand,
};
use auction_storefront::bidding::model::{NewBid, NewProduct, Product};
use auction_storefront::database::{
    keys, AuctionRepository, FailoverRepository, LocalRepository, LocalStorage, MemoryStorage,
    RemoteRepository,
};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

/// 트레이싱 초기화
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// 메모리 로컬 저장소
fn local_repo() -> (LocalRepository, Arc<dyn LocalStorage>) {
    let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
    (LocalRepository::new(Arc::clone(&storage)), storage)
}

/// 연결이 거부되는 원격 API 주소
async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api", addr)
}

/// 가짜 원격 API 서버 실행
async fn serve_remote(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

fn remote_product_row() -> Value {
    json!({
        "id": 7,
        "name": "유기농 사과",
        "description": "산지 직송",
        "quantity": 20,
        "unit": "박스",
        "min_price": 10000,
        "supplier_name": "행복농장",
        "supplier_email": "farm@example.com",
        "expiry_date": "2099-12-31T00:00:00Z",
        "auction_start_date": "2024-01-01T00:00:00Z",
        "auction_end_date": "2099-06-30T00:00:00Z",
        "created_at": "2024-01-01T00:00:00Z"
    })
}

fn remote_bid_rows() -> Value {
    json!([{
        "id": 1,
        "product_id": 7,
        "bidder_name": "김구매",
        "bidder_email": "buyer@example.com",
        "amount": 12000,
        "timestamp": "2024-02-01T09:30:00Z"
    }])
}

/// snake_case 행을 돌려주는 원격 API
fn remote_api() -> Router {
    Router::new()
        .route("/api/products", get(|| async { Json(json!([remote_product_row()])) }))
        .route("/api/products/:id", get(|| async { Json(remote_product_row()) }))
        .route("/api/products/:id/bids", get(|| async { Json(remote_bid_rows()) }))
        .route(
            "/api/banners",
            get(|| async {
                Json(json!([
                    {"id": 1, "title": "봄 세일", "image_url": "/a.png", "link_url": "/sale", "order_index": 2, "active": 1},
                    {"id": 2, "title": "종료 배너", "image_url": "/b.png", "link_url": "", "order_index": 1, "active": 0}
                ]))
            }),
        )
}

fn new_product(
    min_price: i64,
    expiry: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> NewProduct {
    NewProduct {
        name: "테스트 상품".to_string(),
        description: "입찰 테스트".to_string(),
        quantity: 10,
        unit: "개".to_string(),
        min_price,
        supplier_name: "테스트 공급자".to_string(),
        supplier_email: "supplier@example.com".to_string(),
        expiry_date: Some(expiry),
        auction_start_date: Some(start),
        auction_end_date: Some(end),
    }
}

fn bid(product_id: &str, name: &str, amount: i64) -> PlaceBidCommand {
    PlaceBidCommand {
        product_id: product_id.to_string(),
        bidder_name: name.to_string(),
        bidder_email: "buyer@example.com".to_string(),
        amount,
    }
}

fn rejection(result: Result<Product, BidError>) -> BidRejection {
    match result {
        Err(BidError::Rejected(rejection)) => rejection,
        other => panic!("입찰 거부가 아님: {:?}", other.map(|p| p.id)),
    }
}

/// 원격 API가 죽어 있으면 로컬 저장소에 기록된다
#[tokio::test]
async fn test_unreachable_remote_falls_back_to_local() {
    init_tracing();
    let (local, _) = local_repo();
    let remote = RemoteRepository::new(&unreachable_base_url().await).unwrap();
    let repo = FailoverRepository::new(remote, local.clone());

    let now = Utc::now();
    let id = repo
        .create_product(new_product(
            10000,
            now + Duration::days(30),
            now,
            now + Duration::days(1),
        ))
        .await
        .unwrap();
    assert!(!id.is_empty());

    let listed = repo.list_products().await.unwrap();
    assert!(listed.iter().any(|p| p.id == id));
    assert!(local.get_product(&id).await.unwrap().is_some());
}

/// 원격 snake_case 행이 정규 엔티티로 변환되고, 로컬 저장소는 건드리지 않는다
#[tokio::test]
async fn test_remote_rows_are_normalised() {
    init_tracing();
    let base_url = serve_remote(remote_api()).await;
    let (local, _) = local_repo();
    let repo = FailoverRepository::new(RemoteRepository::new(&base_url).unwrap(), local.clone());

    let products = repo.list_products().await.unwrap();
    assert_eq!(products.len(), 1);
    let product = &products[0];
    assert_eq!(product.id, "7");
    assert_eq!(product.min_price, 10000);
    assert_eq!(product.supplier_name, "행복농장");
    assert_eq!(product.auction_end_date, ts("2099-06-30T00:00:00Z"));
    assert_eq!(product.bids.len(), 1);
    assert_eq!(product.bids[0].bidder_name, "김구매");
    assert_eq!(product.highest_bid(), Some(12000));

    let banners = visible_banners(repo.list_banners().await.unwrap());
    assert_eq!(banners.len(), 1);
    assert_eq!(banners[0].link, "/sale");
    assert_eq!(banners[0].order, 2);

    assert!(local.list_products().await.unwrap().is_empty());
}

/// 같은 상품의 원격 행과 로컬 스냅샷은 같은 정규 엔티티가 된다
#[tokio::test]
async fn test_snake_and_camel_rows_normalise_equal() {
    init_tracing();
    let base_url = serve_remote(remote_api()).await;
    let remote = RemoteRepository::new(&base_url).unwrap();
    let (local, storage) = local_repo();

    let snapshot = json!([{
        "id": "7",
        "name": "유기농 사과",
        "description": "산지 직송",
        "quantity": "20",
        "unit": "박스",
        "minPrice": 10000,
        "supplierName": "행복농장",
        "supplierEmail": "farm@example.com",
        "expiryDate": "2099-12-31T00:00:00Z",
        "auctionStartDate": "2024-01-01T00:00:00Z",
        "auctionEndDate": "2099-06-30T00:00:00Z",
        "createdAt": "2024-01-01T00:00:00Z",
        "bids": [{
            "id": "1",
            "bidderName": "김구매",
            "bidderEmail": "buyer@example.com",
            "amount": 12000,
            "timestamp": "2024-02-01T09:30:00Z"
        }]
    }]);
    storage
        .set_item(keys::PRODUCTS, &snapshot.to_string())
        .await
        .unwrap();

    let from_remote = remote.get_product("7").await.unwrap().unwrap();
    let from_local = local.get_product("7").await.unwrap().unwrap();
    assert_eq!(from_remote, from_local);
}

/// 입찰 규칙: 최저가 경계, 빈 입찰자명, 종료, 유통기한 만료
#[tokio::test]
async fn test_bid_acceptance_rule() {
    init_tracing();
    let (local, _) = local_repo();
    let now = Utc::now();

    let open = local
        .create_product(new_product(
            10000,
            now + Duration::days(30),
            now - Duration::hours(1),
            now + Duration::days(1),
        ))
        .await
        .unwrap();

    let low = rejection(handle_place_bid(bid(&open, "김구매", 9999), &local, now).await);
    assert_eq!(low, BidRejection::BelowMinimum { min_price: 10000 });

    let blank = rejection(handle_place_bid(bid(&open, "   ", 50000), &local, now).await);
    assert_eq!(blank, BidRejection::EmptyBidder);

    let zero = rejection(handle_place_bid(bid(&open, "김구매", 0), &local, now).await);
    assert_eq!(zero, BidRejection::InvalidAmount);

    // 거부된 입찰은 기록되지 않는다
    assert!(local.list_bids_for_product(&open).await.unwrap().is_empty());

    let accepted = handle_place_bid(bid(&open, "김구매", 10000), &local, now)
        .await
        .unwrap();
    assert_eq!(accepted.bids.len(), 1);
    assert_eq!(accepted.bids[0].amount, 10000);

    // 동일 금액도 허용된다
    let tied = handle_place_bid(bid(&open, "이구매", 10000), &local, now)
        .await
        .unwrap();
    assert_eq!(tied.bids.len(), 2);
    assert_eq!(tied.ranked_bids()[0].bidder_name, "김구매");

    let ended = local
        .create_product(new_product(
            10000,
            now + Duration::days(30),
            now - Duration::days(2),
            now - Duration::seconds(1),
        ))
        .await
        .unwrap();
    let result = rejection(handle_place_bid(bid(&ended, "김구매", 20000), &local, now).await);
    assert_eq!(result, BidRejection::AlreadyEnded);

    let expired = local
        .create_product(new_product(
            10000,
            now - Duration::days(1),
            now - Duration::days(2),
            now + Duration::days(1),
        ))
        .await
        .unwrap();
    let result = rejection(handle_place_bid(bid(&expired, "김구매", 20000), &local, now).await);
    assert_eq!(result, BidRejection::Expired);

    let missing = rejection(handle_place_bid(bid("no-such-id", "김구매", 20000), &local, now).await);
    assert_eq!(missing, BidRejection::NotFound);
}

/// 예정된 경매도 입찰을 받는다
#[tokio::test]
async fn test_scheduled_auction_accepts_bids() {
    init_tracing();
    let (local, _) = local_repo();
    let now = Utc::now();
    let scheduled = local
        .create_product(new_product(
            5000,
            now + Duration::days(30),
            now + Duration::days(1),
            now + Duration::days(2),
        ))
        .await
        .unwrap();

    let product = handle_place_bid(bid(&scheduled, "김구매", 5000), &local, now)
        .await
        .unwrap();
    assert_eq!(product.highest_bid(), Some(5000));
}

/// 상품 삭제 시 입찰도 함께 사라진다
#[tokio::test]
async fn test_delete_product_removes_bids() {
    init_tracing();
    let (local, _) = local_repo();
    let now = Utc::now();
    let id = local
        .create_product(new_product(
            1000,
            now + Duration::days(30),
            now,
            now + Duration::days(1),
        ))
        .await
        .unwrap();
    local
        .create_bid(
            &id,
            NewBid {
                bidder_name: "김구매".to_string(),
                bidder_email: String::new(),
                amount: 2000,
            },
        )
        .await
        .unwrap();

    assert!(local.delete_product(&id).await.unwrap());
    assert!(local.get_product(&id).await.unwrap().is_none());
    assert!(local.list_bids_for_product(&id).await.unwrap().is_empty());
    assert!(!local.delete_product(&id).await.unwrap());
}

/// 원격 입찰 등록 후 재조회가 실패하면 다시 등록하지 않고 로컬에서 조회만 한다
#[tokio::test]
async fn test_bid_refetch_failure_reads_fallback_without_reposting() {
    init_tracing();
    let app = Router::new()
        .route(
            "/api/bids",
            post(|| async { Json(json!({"id": 99, "message": "입찰 완료"})) }),
        )
        .route(
            "/api/products/:id",
            get(|Path(_id): Path<String>| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
    let base_url = serve_remote(app).await;

    let (local, _) = local_repo();
    let now = Utc::now();
    let id = local
        .create_product(new_product(
            1000,
            now + Duration::days(30),
            now,
            now + Duration::days(1),
        ))
        .await
        .unwrap();

    let repo = FailoverRepository::new(RemoteRepository::new(&base_url).unwrap(), local.clone());
    let product = repo
        .create_bid(
            &id,
            NewBid {
                bidder_name: "김구매".to_string(),
                bidder_email: String::new(),
                amount: 2000,
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(product.id, id);
    assert!(product.bids.is_empty());
}

/// 원격 인증이 실패하면 로컬 관리자 계정으로 인증한다
#[tokio::test]
async fn test_admin_authentication_falls_back_to_seeded_account() {
    init_tracing();
    let (local, _) = local_repo();
    let seeded = local
        .seed_admin(AdminAccount {
            id: "admin".to_string(),
            password: "admin123".to_string(),
            name: "관리자".to_string(),
        })
        .await
        .unwrap();
    assert!(seeded);

    let remote = RemoteRepository::new(&unreachable_base_url().await).unwrap();
    let repo = FailoverRepository::new(remote, local.clone());

    let admin = repo.authenticate_admin("admin", "admin123").await.unwrap();
    assert_eq!(admin.map(|a| a.name), Some("관리자".to_string()));
    assert!(repo
        .authenticate_admin("admin", "wrong")
        .await
        .unwrap()
        .is_none());

    // 이미 계정이 있으면 다시 등록하지 않는다
    let reseeded = local
        .seed_admin(AdminAccount {
            id: "other".to_string(),
            password: "pw".to_string(),
            name: String::new(),
        })
        .await
        .unwrap();
    assert!(!reseeded);
}
