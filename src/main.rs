// region:    --- Imports
use auction_storefront::config::AppConfig;
use auction_storefront::database::{
    AuctionRepository, FailoverRepository, LocalRepository, LocalStorage, MemoryStorage, RemoteRepository,
    SqliteStorage,
};
use auction_storefront::handlers::{self, AppState};
use auction_storefront::session::SessionStore;
use axum::extract::DefaultBodyLimit;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 인자/환경 변수 해석 (.env 포함), 실패하면 사용법을 출력하고 종료
    let config = match AppConfig::import() {
        Ok(config) => config,
        Err(e) => e.exit(),
    };
    info!("{:<12} --> 원격 API: {}", "Main", config.api_base_url);

    // 로컬 저장소 (SQLite 주소가 없거나 비어 있으면 메모리)
    let storage_url = config
        .local_storage_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());
    let storage: Arc<dyn LocalStorage> = match storage_url {
        Some(url) => match SqliteStorage::connect(url).await {
            Ok(storage) => {
                info!("{:<12} --> SQLite 로컬 저장소 연결: {}", "Main", url);
                Arc::new(storage)
            }
            Err(e) => {
                error!("{:<12} --> 로컬 저장소 연결 실패: {:?}", "Main", e);
                return Err(e.into());
            }
        },
        None => {
            info!("{:<12} --> 메모리 로컬 저장소 사용", "Main");
            Arc::new(MemoryStorage::new())
        }
    };

    // 기본 관리자 계정
    let local = LocalRepository::new(Arc::clone(&storage));
    let default_admin = config.default_admin();
    let admin_id = default_admin.id.clone();
    if local.seed_admin(default_admin).await? {
        info!("{:<12} --> 기본 관리자 계정 생성: {}", "Main", admin_id);
    }

    // 원격 API 우선, 실패 시 로컬 저장소
    let remote = RemoteRepository::new(&config.api_base_url)?;
    let repo: Arc<dyn AuctionRepository> = Arc::new(FailoverRepository::new(remote, local));

    let listen_addr = config.listen_addr;
    let state = AppState {
        repo,
        sessions: SessionStore::new(storage),
        config: Arc::new(config),
    };

    // 프론트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = handlers::routes(state)
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 2));

    // 리스너 생성
    let listener = TcpListener::bind(listen_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
