//! Application configuration module / 애플리케이션 설정 모듈
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 최초 실행 시 기본 설정 파일 생성

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Global configuration instance / 전역 설정 인스턴스
static CONFIG: OnceCell<Arc<RwLock<AppConfig>>> = OnceCell::new();

/// Environment variable overriding the database URL / DB URL 환경 변수
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Application configuration / 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration / 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// Reference database configuration / 참조 DB 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Search configuration / 검색 설정
    #[serde(default)]
    pub search: SearchConfig,
    /// Device-local state configuration / 로컬 상태 설정
    #[serde(default)]
    pub device: DeviceConfig,
}

/// Server configuration / 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address / 서버 주소
    pub host: String,
    /// Server port / 서버 포트
    pub port: u16,
}

/// Database configuration / DB 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Data directory path / 데이터 디렉터리
    pub data_dir: String,
    /// Reference database file (relative to data_dir) / 참조 DB 파일
    pub db_file: String,
}

/// Search configuration / 검색 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Reading match cap / 음 검색 최대 결과 수
    pub limit: usize,
    /// Debounce before a query is sent / 입력 지연(ms)
    pub debounce_ms: u64,
}

/// Device-local state configuration / 로컬 상태 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Directory of the device state file (relative to data_dir) / 상태 파일 디렉터리
    pub state_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8190,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            db_file: "hanja.db".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: crate::search::DEFAULT_SEARCH_LIMIT,
            debounce_ms: 300,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            state_dir: "device".to_string(),
        }
    }
}

impl AppConfig {
    /// Database URL; `DATABASE_URL` wins over the file / DB URL
    pub fn get_database_url(&self) -> String {
        match std::env::var(DATABASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url,
            _ => {
                let db_path = Path::new(&self.database.data_dir).join(&self.database.db_file);
                format!("sqlite:{}?mode=rwc", db_path.to_string_lossy())
            }
        }
    }

    /// Get the full data directory path / 데이터 디렉터리 경로
    pub fn get_data_dir(&self) -> PathBuf {
        PathBuf::from(&self.database.data_dir)
    }

    /// Device state directory / 로컬 상태 디렉터리
    pub fn get_device_state_dir(&self) -> PathBuf {
        let data_dir = self.get_data_dir();
        if self.device.state_dir.is_empty() {
            data_dir
        } else {
            data_dir.join(&self.device.state_dir)
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    /// Get the server bind address / 바인드 주소
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get the config file path / 설정 파일 경로
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 설정 로드, 없으면 기본값 생성
pub fn load_config() -> Result<AppConfig, String> {
    load_config_from(&get_config_path())
}

pub fn load_config_from(config_path: &Path) -> Result<AppConfig, String> {
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config_to(&config, config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / 설정 저장
pub fn save_config(config: &AppConfig) -> Result<(), String> {
    save_config_to(config, &get_config_path())
}

fn save_config_to(config: &AppConfig, config_path: &Path) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

/// Initialize global configuration / 전역 설정 초기화
pub fn init_config() -> Result<Arc<RwLock<AppConfig>>, String> {
    let config = load_config()?;

    let config_arc = Arc::new(RwLock::new(config));

    CONFIG
        .set(config_arc.clone())
        .map_err(|_| "Config already initialized".to_string())?;

    Ok(config_arc)
}

/// Get global configuration instance / 전역 설정 인스턴스
pub fn get_config() -> Arc<RwLock<AppConfig>> {
    CONFIG
        .get_or_init(|| {
            let config = load_config().unwrap_or_default();
            Arc::new(RwLock::new(config))
        })
        .clone()
}

/// Get a read-only snapshot of current config / 현재 설정 스냅샷
pub fn config() -> AppConfig {
    get_config().read().clone()
}
