use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::domain::settings::{ProviderConfig, Settings};

const APP_DIR: &str = "redactum";
const SETTINGS_FILE: &str = "settings.json";

/// JSON ファイルで永続化する設定ストア。
/// メモリ上のコピーがプロセス内での正となり、I/O エラーはログに残して握りつぶす。
pub struct SettingsStore {
    path: PathBuf,
    current: RwLock<Settings>,
}

impl SettingsStore {
    /// `<config dir>/redactum/settings.json` を開く（config dir が無ければ `./.redactum/`）
    pub fn open_default() -> Self {
        Self::open(Self::default_path())
    }

    /// 指定パスを開き、初回ロードを行う
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = Self {
            path: path.into(),
            current: RwLock::new(Settings::default()),
        };
        store.load();
        store
    }

    pub fn default_path() -> PathBuf {
        match dirs::config_dir() {
            Some(dir) => dir.join(APP_DIR).join(SETTINGS_FILE),
            None => PathBuf::from(format!(".{APP_DIR}")).join(SETTINGS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ファイルから読み直す。失敗時はデフォルト設定になる。
    pub fn load(&self) -> Settings {
        let settings = match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str::<Settings>(&raw) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("設定ファイルの解析に失敗: {}: {e}", self.path.display());
                    Settings::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("設定ファイルがありません: {}", self.path.display());
                Settings::default()
            }
            Err(e) => {
                log::warn!("設定ファイルの読み込みに失敗: {}: {e}", self.path.display());
                Settings::default()
            }
        };

        *self.current.write() = settings.clone();
        settings
    }

    /// メモリ上の設定を更新してファイルへ書き出す
    pub fn save(&self, settings: Settings) {
        if let Err(e) = self.write_file(&settings) {
            log::error!("設定ファイルの保存に失敗: {}: {e}", self.path.display());
        }
        *self.current.write() = settings;
    }

    /// 現在の設定を変更して保存し、変更後の設定を返す
    pub fn update(&self, f: impl FnOnce(&mut Settings)) -> Settings {
        let mut settings = self.current();
        f(&mut settings);
        self.save(settings.clone());
        settings
    }

    pub fn current(&self) -> Settings {
        self.current.read().clone()
    }

    pub fn active_provider_config(&self) -> Option<ProviderConfig> {
        self.current.read().active_provider_config()
    }

    pub fn has_any_provider_configured(&self) -> bool {
        self.current.read().has_any_provider_configured()
    }

    fn write_file(&self, settings: &Settings) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings).map_err(io::Error::other)?;
        fs::write(&self.path, json)
    }
}
