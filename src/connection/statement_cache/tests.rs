use super::StatementCache;

#[test]
fn take_removes() {
    let mut cache: StatementCache<u32> = StatementCache::new(4);
    cache.insert("SELECT 1", 1);
    cache.insert("SELECT 2", 2);
    assert_eq!(cache.take("SELECT 1"), Some(1));
    assert_eq!(cache.take("SELECT 1"), None);
    assert_eq!(cache.len(), 1);
}

#[test]
fn exact_text() {
    let mut cache: StatementCache<u32> = StatementCache::new(4);
    cache.insert("SELECT 1", 1);
    assert_eq!(cache.take("select 1"), None);
    assert_eq!(cache.take("SELECT 1 "), None);
    assert_eq!(cache.take("SELECT 1"), Some(1));
}

#[test]
fn evicts_least_recently_used() {
    let mut cache: StatementCache<u32> = StatementCache::new(3);
    cache.insert("a", 1);
    cache.insert("b", 2);
    cache.insert("c", 3);

    // Using "a" moves it to the front.
    let a = cache.take("a").unwrap();
    cache.insert("a", a);

    cache.insert("d", 4);
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.take("b"), None);
    assert_eq!(cache.take("a"), Some(1));
    assert_eq!(cache.take("c"), Some(3));
    assert_eq!(cache.take("d"), Some(4));
}

#[test]
fn zero_capacity() {
    let mut cache: StatementCache<u32> = StatementCache::new(0);
    cache.insert("a", 1);
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.take("a"), None);
}

#[test]
fn clear() {
    let mut cache: StatementCache<u32> = StatementCache::new(8);
    cache.insert("a", 1);
    cache.insert("b", 2);
    cache.clear();
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.take("a"), None);
}
