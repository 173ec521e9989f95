/// 서비스 설정
/// 명령행 인자 또는 환경 변수(.env 포함)에서 읽으며, 없는 값은 기본값을 쓴다.
// region:    --- Imports
use crate::admin::AdminAccount;
use clap::Parser;
use std::net::SocketAddr;
use tokio::time::Duration;

// endregion: --- Imports

// region:    --- App Config
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct AppConfig {
    /// 원격 REST API 주소
    #[arg(long, env = "API_BASE_URL", default_value = "http://localhost:5000/api")]
    pub api_base_url: String,

    /// 로컬 저장소 SQLite 주소 (없으면 메모리 저장소)
    #[arg(long, env = "LOCAL_STORAGE_URL")]
    pub local_storage_url: Option<String>,

    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: SocketAddr,

    /// 백오피스/프론트 도메인이 비어 있을 때 쓰는 이 서비스의 주소
    #[arg(long, env = "PUBLIC_ORIGIN", default_value = "http://localhost:3000")]
    pub public_origin: String,

    /// 화면 갱신 주기 (ms)
    #[arg(
        long,
        env = "RENDER_INTERVAL_MS",
        default_value_t = 1000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub render_interval_ms: u64,

    #[arg(long, env = "DEFAULT_ADMIN_ID", default_value = "admin")]
    pub admin_id: String,

    #[arg(long, env = "DEFAULT_ADMIN_PASSWORD", default_value = "admin123")]
    pub admin_password: String,

    #[arg(long, env = "DEFAULT_ADMIN_NAME", default_value = "관리자")]
    pub admin_name: String,

    #[arg(long, env = "SHOPPING_MALL_URL", default_value = "https://afoursshop.vercel.app/")]
    pub shopping_mall_url: String,

    #[arg(long, env = "BACKOFFICE_DOMAIN")]
    pub backoffice_domain: Option<String>,

    #[arg(long, env = "FRONTEND_DOMAIN")]
    pub frontend_domain: Option<String>,
}

impl AppConfig {
    /// .env 파일을 먼저 읽고 인자/환경 변수를 해석한다
    pub fn import() -> Result<Self, clap::Error> {
        // .env 파일이 없어도 된다
        let _ = dotenvy::dotenv();
        Self::try_parse()
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms)
    }

    /// 시작 시 시드하는 기본 관리자 계정
    pub fn default_admin(&self) -> AdminAccount {
        AdminAccount {
            id: self.admin_id.clone(),
            password: self.admin_password.clone(),
            name: self.admin_name.clone(),
        }
    }

    /// 백오피스 주소 (기본 경로: backoffice-login.html)
    pub fn backoffice_url(&self, path: &str) -> String {
        self.resolve(self.backoffice_domain.as_deref(), path, "backoffice-login.html")
    }

    /// 프론트엔드 주소 (기본 경로: index.html)
    pub fn frontend_url(&self, path: &str) -> String {
        self.resolve(self.frontend_domain.as_deref(), path, "index.html")
    }

    fn resolve(&self, domain: Option<&str>, path: &str, default_path: &str) -> String {
        // 빈 도메인은 설정하지 않은 것으로 본다
        match domain.map(str::trim).filter(|d| !d.is_empty()) {
            Some(domain) => {
                let domain = domain.trim_end_matches('/');
                if path.is_empty() {
                    domain.to_string()
                } else if path.starts_with('/') {
                    format!("{}{}", domain, path)
                } else {
                    format!("{}/{}", domain, path)
                }
            }
            None => {
                let path = if path.is_empty() { default_path } else { path };
                format!(
                    "{}/{}",
                    self.public_origin.trim_end_matches('/'),
                    path.trim_start_matches('/')
                )
            }
        }
    }
}

// endregion: --- App Config

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(args: &[&str]) -> Result<AppConfig, clap::Error> {
        AppConfig::try_parse_from(std::iter::once("auction-storefront").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5000/api");
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.render_interval(), Duration::from_millis(1000));
        assert_eq!(config.default_admin().id, "admin");
        assert_eq!(config.default_admin().password, "admin123");
        assert_eq!(config.default_admin().name, "관리자");
        assert!(config.local_storage_url.is_none());
    }

    #[test]
    fn links_default_to_own_origin() {
        let config = config_with(&["--public-origin", "https://market.example/"]).unwrap();
        assert_eq!(
            config.backoffice_url(""),
            "https://market.example/backoffice-login.html"
        );
        assert_eq!(config.frontend_url("/index.html"), "https://market.example/index.html");
    }

    #[test]
    fn links_use_configured_domain() {
        let config = config_with(&[
            "--backoffice-domain",
            "https://admin.example/",
            "--frontend-domain",
            "https://www.example",
        ])
        .unwrap();
        assert_eq!(config.backoffice_url(""), "https://admin.example");
        assert_eq!(config.backoffice_url("admin.html"), "https://admin.example/admin.html");
        assert_eq!(config.frontend_url("/index.html"), "https://www.example/index.html");
    }

    #[test]
    fn blank_domain_falls_back_to_own_origin() {
        let config = config_with(&["--frontend-domain", " "]).unwrap();
        assert_eq!(config.frontend_url(""), "http://localhost:3000/index.html");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config_with(&["--listen-addr", "not-an-addr"]).is_err());
        assert!(config_with(&["--render-interval-ms", "0"]).is_err());
        assert!(config_with(&["--render-interval-ms", "abc"]).is_err());
        let config = config_with(&["--render-interval-ms", "250"]).unwrap();
        assert_eq!(config.render_interval(), Duration::from_millis(250));
    }
}
