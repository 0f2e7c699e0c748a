//! Integration tests for the feed registry and its configuration.

use feedview::config::Config;
use feedview::registry::{FeedRegistry, FeedSource, RegistryError};
use pretty_assertions::assert_eq;

#[test]
fn test_builtin_registry_is_valid() {
    let registry = FeedRegistry::new(FeedRegistry::default_sources()).unwrap();
    assert_eq!(registry.len(), 4);
    for feed in registry.iter() {
        assert!(!feed.name().is_empty());
        assert!(matches!(feed.url().scheme(), "http" | "https"));
    }
}

#[test]
fn test_default_config_uses_builtin_registry() {
    let registry = Config::default().registry().unwrap();
    let names: Vec<_> = registry.iter().map(|f| f.name().to_string()).collect();
    let builtin: Vec<_> = FeedRegistry::default_sources()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, builtin);
}

#[test]
fn test_registry_rejects_bad_entries() {
    assert!(matches!(
        FeedRegistry::new(Vec::<FeedSource>::new()),
        Err(RegistryError::Empty)
    ));
    assert!(matches!(
        FeedRegistry::new(vec![FeedSource::new("  ", "https://example.com/feed")]),
        Err(RegistryError::EmptyName { index: 0 })
    ));
    assert!(matches!(
        FeedRegistry::new(vec![
            FeedSource::new("Good", "https://example.com/feed"),
            FeedSource::new("Bad", "ftp://example.com/feed"),
        ]),
        Err(RegistryError::InvalidUrl { index: 1, .. })
    ));
}

#[test]
fn test_registry_preserves_order_and_lookup() {
    let registry = FeedRegistry::new(vec![
        FeedSource::new("Zeta", "https://zeta.example.com/rss"),
        FeedSource::new("Alpha", "https://alpha.example.com/rss"),
    ])
    .unwrap();

    assert_eq!(registry.get(0).map(|f| f.name()), Some("Zeta"));
    assert_eq!(registry.get(1).map(|f| f.name()), Some("Alpha"));
    assert!(registry.get(2).is_none());
}
