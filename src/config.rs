//! Configuration management

use crate::filter::{FilterConfig, DEFAULT_ANSI_CODE_PAGE};
use crate::{AnsiError, Result};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Console size used when the config does not name one
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 25;

/// OEM code page assumed for the console (DOS Latin 1)
pub const DEFAULT_OEM_CODE_PAGE: u32 = 850;

/// Persistent settings: console geometry, code pages and diagnostics
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.ansi-console.cfg)
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        debug!("Loading config from {:?}", path);

        if !path.exists() {
            info!("Config file not found, creating default");
            Self::default_config()
                .write_to_file(&path)
                .map_err(|e| AnsiError::IniParse(format!("Failed to write config: {}", e)))?;
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let ini = Ini::load_from_file(path)
            .map_err(|e| AnsiError::IniParse(format!("Failed to load config: {}", e)))?;

        Ok(Self {
            ini,
            path: path.to_path_buf(),
        })
    }

    /// Defaults without touching the filesystem
    pub fn in_memory() -> Self {
        Self {
            ini: Self::default_config(),
            path: PathBuf::new(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| AnsiError::Config(format!("Failed to save config: {}", e)))
    }

    fn config_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".ansi-console.cfg"))
            .ok_or_else(|| AnsiError::Config("Cannot determine home directory".to_string()))
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("console"))
            .set("width", DEFAULT_WIDTH.to_string())
            .set("height", DEFAULT_HEIGHT.to_string());

        ini.with_section(Some("codepage"))
            .set("ansi", DEFAULT_ANSI_CODE_PAGE.to_string())
            .set("oem", DEFAULT_OEM_CODE_PAGE.to_string())
            .set("conversion", "true");

        ini.with_section(Some("debug")).set("enabled", "false");

        ini
    }

    /// Get a boolean value from config
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Console buffer size (cols, rows)
    pub fn console_size(&self) -> (u16, u16) {
        let dimension = |key: &str, default: u16| {
            u16::try_from(self.get_int("console", key, i64::from(default)))
                .ok()
                .filter(|&v| v > 0)
                .unwrap_or(default)
        };
        (
            dimension("width", DEFAULT_WIDTH),
            dimension("height", DEFAULT_HEIGHT),
        )
    }

    /// Code page application text is written in
    pub fn ansi_code_page(&self) -> u32 {
        self.code_page("ansi", DEFAULT_ANSI_CODE_PAGE)
    }

    /// Code page the console shows
    pub fn oem_code_page(&self) -> u32 {
        self.code_page("oem", DEFAULT_OEM_CODE_PAGE)
    }

    /// Should text be remapped between the two code pages?
    pub fn conversion(&self) -> bool {
        self.get_bool("codepage", "conversion", true)
    }

    /// Should unsupported escape sequences be reported?
    pub fn debug(&self) -> bool {
        self.get_bool("debug", "enabled", false)
    }

    /// Filter settings described by this config
    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig::default()
            .with_code_pages(self.ansi_code_page(), self.oem_code_page())
            .with_conversion(self.conversion())
            .with_debug(self.debug())
    }

    fn code_page(&self, key: &str, default: u32) -> u32 {
        u32::try_from(self.get_int("codepage", key, i64::from(default)))
            .ok()
            .filter(|&cp| cp > 0)
            .unwrap_or(default)
    }
}
