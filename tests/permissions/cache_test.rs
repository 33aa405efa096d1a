/*!
 * User Cache Tests
 * Single-flight loading and idle expiry through the manager
 */

use perms_core::{ManagerConfig, MemoryBackend, PermissionManager, StoredGroup, StoredUser};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use uuid::Uuid;

fn manager_with_user(idle: Duration) -> (PermissionManager, Arc<MemoryBackend>, Uuid) {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_group(StoredGroup::new("Default").grant("chat"));
    let id = Uuid::new_v4();
    backend.insert_user(StoredUser::new(id, "Steve").grant("fly").parent("Default"));

    let config = ManagerConfig::new().with_user_idle_timeout(idle);
    let manager = PermissionManager::with_config(backend.clone(), config);
    manager.load().unwrap();
    (manager, backend, id)
}

#[test]
fn test_concurrent_cold_misses_load_once() {
    let (manager, backend, id) = manager_with_user(Duration::from_secs(60));
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let manager = manager.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                manager.get_user(id).unwrap()
            })
        })
        .collect();

    let users: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(backend.user_loads(), 1);
    for user in &users[1..] {
        assert!(Arc::ptr_eq(&users[0], user));
    }
    assert_eq!(manager.cache_stats().loads, 1);
}

#[test]
fn test_idle_user_is_reloaded() {
    let (manager, backend, id) = manager_with_user(Duration::from_millis(50));

    let first = manager.get_user(id).unwrap();
    thread::sleep(Duration::from_millis(150));
    let second = manager.get_user(id).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(backend.user_loads(), 2);
    assert_eq!(first.computed_permissions(), second.computed_permissions());
    assert_eq!(first.raw_permissions(), second.raw_permissions());
}

#[test]
fn test_accessed_user_stays_cached() {
    let (manager, backend, id) = manager_with_user(Duration::from_millis(300));

    let first = manager.get_user(id).unwrap();
    for _ in 0..4 {
        thread::sleep(Duration::from_millis(50));
        let again = manager.get_user(id).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }
    assert_eq!(backend.user_loads(), 1);
}

#[test]
fn test_cache_hit_skips_re_resolution() {
    let (manager, _backend, id) = manager_with_user(Duration::from_secs(60));

    let user = manager.get_user(id).unwrap();
    user.set_local_permission("chat", false).unwrap();

    let cached = manager.get_user(id).unwrap();
    assert!(Arc::ptr_eq(&user, &cached));
    assert!(cached.is_dirty());
    assert_eq!(cached.get_permission("chat"), Some(false));
}
