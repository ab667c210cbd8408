use menukit::{ClientConfig, SdkError};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn explicit_file_overrides_defaults() {
    let mut f = NamedTempFile::new().unwrap();
    writeln!(f, "cursor_ttl_secs = 120\n[default_limits]\nitems = 25\nrules = 10").unwrap();
    let cfg = ClientConfig::load(Some(f.path())).unwrap();
    assert_eq!(cfg.cursor_ttl_secs, 120);
    assert_eq!(cfg.default_limit_for("items", 100), 25);
    assert_eq!(cfg.default_limit_for("menus", 500), 500);
}

#[test]
fn explicit_file_must_exist_and_parse() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ClientConfig::load(Some(&dir.path().join("absent.toml"))).is_err());

    let mut f = NamedTempFile::new().unwrap();
    writeln!(f, "cursor_ttl = 5").unwrap();
    assert!(matches!(ClientConfig::load(Some(f.path())), Err(SdkError::Config(_))));
}

#[test]
fn out_of_range_values_are_rejected() {
    for src in ["[default_limits]\nmenus = 0", "[default_limits]\nmenus = 5000", "[default_limits]\npizzas = 5", "cursor_ttl_secs = 0"] {
        assert!(matches!(ClientConfig::from_toml_str(src), Err(SdkError::Config(_))), "{src}");
    }
}
