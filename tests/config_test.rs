//! Configuration loading tests
//!
//! Tests that configuration files load correctly and feed the filter

use ansi_console::config::Config;
use ansi_console::{AnsiFilter, MemoryConsole};
use std::fs;

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("ansi-console.cfg");
    fs::write(
        &path,
        "[console]\nwidth = 40\nheight = 10\n\n[codepage]\nansi = 1251\noem = 855\nconversion = false\n\n[debug]\nenabled = true\n",
    )
    .unwrap();

    let config = Config::load_from(&path).expect("Failed to load config");
    assert_eq!(config.console_size(), (40, 10));
    assert_eq!(config.ansi_code_page(), 1251);
    assert_eq!(config.oem_code_page(), 855);
    assert!(!config.conversion());
    assert!(config.debug());
    assert_eq!(config.path(), &path);
}

#[test]
fn test_missing_keys_use_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.cfg");
    fs::write(&path, "[console]\nwidth = 132\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.console_size(), (132, 25));
    assert_eq!(config.ansi_code_page(), 1252);
    assert_eq!(config.oem_code_page(), 850);
    assert!(config.conversion());
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::load_from(&dir.path().join("nope.cfg")).is_err());
}

#[test]
fn test_save_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.cfg");
    fs::write(&path, "[console]\nwidth = 80\n").unwrap();

    let mut config = Config::load_from(&path).unwrap();
    config.set("console", "height", "50");
    config.save().unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.console_size(), (80, 50));
}

#[test]
fn test_config_drives_filter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cp.cfg");
    fs::write(&path, "[codepage]\nansi = 1252\noem = 437\n").unwrap();
    let config = Config::load_from(&path).unwrap();

    let (cols, rows) = config.console_size();
    let console = MemoryConsole::new(cols, rows).with_code_page(config.oem_code_page());
    let mut filter = AnsiFilter::new(console, config.filter_config()).unwrap();

    // U+00E9 in Windows-1252 is 0x82 in code page 437
    filter.write_bytes(&[0xe9]).unwrap();
    assert_eq!(filter.console().cell(0, 0).unwrap().data, 0x82);
}
