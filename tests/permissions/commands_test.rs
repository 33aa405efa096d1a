/*!
 * Object Command Tests
 * Parsed commands executed against a seeded manager
 */

use perms_core::commands::{CheckResult, CommandOutcome, Dispatcher, Page};
use perms_core::permissions::{PermissionChange, PermissionSource};
use perms_core::{
    Directive, ManagerConfig, MemoryBackend, PermissionError, PermissionManager, StoredGroup,
    StoredUser,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use uuid::Uuid;

fn setup() -> (Dispatcher, Uuid) {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_group(StoredGroup::new("Default").grant("chat"));
    backend.insert_group(StoredGroup::new("Staff").grant("kick").parent("Default"));
    backend.insert_group(StoredGroup::new("Admin").parent("Staff"));
    let id = Uuid::new_v4();
    backend.insert_user(StoredUser::new(id, "Steve").grant("fly").parent("Default"));

    let config = ManagerConfig::new().with_page_size(Some(2));
    let manager = PermissionManager::with_config(backend, config);
    manager.load().unwrap();
    (Dispatcher::new(manager), id)
}

fn split(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

#[test]
fn test_check_reports_source() {
    let (dispatcher, id) = setup();
    let user = dispatcher.manager().get_user(id).unwrap();

    let local = dispatcher.run(&*user, &split("check fly")).unwrap();
    assert_eq!(
        local,
        CommandOutcome::Checked(CheckResult {
            permission: "fly".into(),
            value: Some(true),
            source: Some(PermissionSource::Local),
        })
    );

    let inherited = dispatcher.run(&*user, &split("check chat")).unwrap();
    assert_eq!(
        inherited,
        CommandOutcome::Checked(CheckResult {
            permission: "chat".into(),
            value: Some(true),
            source: Some(PermissionSource::Inherited),
        })
    );

    let missing = dispatcher.run(&*user, &split("check ban")).unwrap();
    assert!(matches!(
        missing,
        CommandOutcome::Checked(CheckResult { value: None, .. })
    ));
}

#[test]
fn test_group_edit_reaches_descendants() {
    let (dispatcher, id) = setup();
    let manager = dispatcher.manager().clone();
    let default = manager.get_group("default").unwrap();
    let user = manager.get_user(id).unwrap();

    let outcome = dispatcher.run(&*default, &split("add -chat")).unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::PermissionSet {
            directive: Directive::deny("chat"),
            change: PermissionChange::Updated,
        }
    );

    let admin = manager.get_group("admin").unwrap();
    assert_eq!(admin.get_permission("chat"), Some(false));
    assert_eq!(user.get_permission("chat"), Some(false));
}

#[test]
fn test_remove_and_list() {
    let (dispatcher, id) = setup();
    let user = dispatcher.manager().get_user(id).unwrap();

    for raw in ["build", "-pvp", "trade"] {
        dispatcher.run(&*user, &["add", raw]).unwrap();
    }

    let first = dispatcher.run(&*user, &split("list")).unwrap();
    assert_eq!(
        first,
        CommandOutcome::Listed(Page {
            number: 1,
            start: 0,
            items: vec!["fly".into(), "build".into()],
            total: 4,
            has_more: true,
        })
    );

    let second = dispatcher.run(&*user, &split("list 2")).unwrap();
    assert!(matches!(second, CommandOutcome::Listed(Page { start: 2, has_more: false, .. })));

    assert_eq!(
        dispatcher.run(&*user, &split("list 3")).unwrap_err(),
        PermissionError::PageOutOfRange(3)
    );

    dispatcher.run(&*user, &split("remove -fly")).unwrap();
    assert_eq!(user.get_permission("fly"), None);
    assert!(matches!(
        dispatcher.run(&*user, &split("remove fly")),
        Err(PermissionError::NotPresent { .. })
    ));
}

#[test]
fn test_parent_commands() {
    let (dispatcher, id) = setup();
    let manager = dispatcher.manager().clone();
    let user = manager.get_user(id).unwrap();

    let added = dispatcher.run(&*user, &split("parent add staff")).unwrap();
    assert_eq!(
        added,
        CommandOutcome::ParentAdded {
            parent: "Staff".into()
        }
    );
    assert_eq!(user.get_permission("kick"), Some(true));

    assert!(matches!(
        dispatcher.run(&*user, &split("group add STAFF")),
        Err(PermissionError::AlreadyPresent { .. })
    ));
    assert_eq!(
        dispatcher.run(&*user, &split("parent add ghost")).unwrap_err(),
        PermissionError::UnknownGroup("ghost".into())
    );

    let listed = dispatcher.run(&*user, &split("parent list")).unwrap();
    assert_eq!(
        listed,
        CommandOutcome::Parents {
            parents: vec!["Default".into(), "Staff".into()]
        }
    );

    let replaced = dispatcher
        .run(&*user, &split("parent set admin default admin"))
        .unwrap();
    assert_eq!(
        replaced,
        CommandOutcome::ParentsReplaced {
            parents: vec!["Admin".into(), "Default".into()]
        }
    );

    dispatcher.run(&*user, &split("parent remove admin")).unwrap();
    assert_eq!(user.get_permission("kick"), None);
}

#[test]
fn test_group_cycle_is_rejected() {
    let (dispatcher, _id) = setup();
    let default = dispatcher.manager().get_group("default").unwrap();

    let err = dispatcher
        .run(&*default, &split("parent add admin"))
        .unwrap_err();
    assert!(matches!(err, PermissionError::CycleWouldForm { .. }));
    assert!(default.parents().is_empty());

    let err = dispatcher
        .run(&*default, &split("parent set staff"))
        .unwrap_err();
    assert!(err.is_graph_error());
}

#[test]
fn test_delete_is_unsupported() {
    let (dispatcher, _id) = setup();
    let staff = dispatcher.manager().get_group("staff").unwrap();

    assert!(matches!(
        dispatcher.run(&*staff, &split("delete")),
        Err(PermissionError::Unsupported(_))
    ));
    assert!(dispatcher.manager().get_group("staff").is_some());
}
