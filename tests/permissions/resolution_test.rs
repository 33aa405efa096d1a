/*!
 * Resolution Tests
 * Inheritance precedence across real group graphs
 */

use perms_core::permissions::{closure, Group, PermissionSource, User};
use perms_core::{Directive, PermissionError};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use uuid::Uuid;

fn group(name: &str, own: &[&str]) -> Arc<Group> {
    let directives: Vec<Directive> = own.iter().map(|raw| raw.parse().unwrap()).collect();
    Arc::new(Group::new(name, directives))
}

#[test]
fn test_user_overrides_inherited_deny() {
    let default = group("Default", &["chat", "-fly"]);
    let user = User::new(Uuid::new_v4(), "Steve", vec![Directive::grant("fly")]);
    user.add_parent(&default).unwrap();
    user.rebuild_permissions().unwrap();

    assert_eq!(
        user.effective_permission("fly"),
        Some((true, PermissionSource::Local))
    );
    assert_eq!(
        user.effective_permission("chat"),
        Some((true, PermissionSource::Inherited))
    );
    assert_eq!(user.get_permission("build"), None);
}

#[test]
fn test_parent_order_decides_conflicts() {
    let vip = group("vip", &["fly"]);
    let muted = group("muted", &["-fly"]);
    let user = User::new(Uuid::new_v4(), "Alex", Vec::new());

    user.set_parents(&[vip.clone(), muted.clone()]).unwrap();
    user.rebuild_permissions().unwrap();
    assert_eq!(user.get_permission("fly"), Some(true));

    user.set_parents(&[muted, vip]).unwrap();
    user.rebuild_permissions().unwrap();
    assert_eq!(user.get_permission("fly"), Some(false));
}

#[test]
fn test_diamond_has_three_distinct_ancestors() {
    let base = group("base", &["chat"]);
    let left = group("left", &["build"]);
    let right = group("right", &["-build"]);
    left.add_parent(&base).unwrap();
    right.add_parent(&base).unwrap();

    let top = group("top", &[]);
    top.set_parents(&[left, right]).unwrap();

    let names: Vec<String> = closure(&top)
        .iter()
        .map(|g| g.name().to_string())
        .collect();
    assert_eq!(names, vec!["left", "base", "right"]);

    top.rebuild_permissions().unwrap();
    assert_eq!(top.get_permission("chat"), Some(true));
    assert_eq!(top.get_permission("build"), Some(true));
}

#[test]
fn test_group_change_needs_descendant_rebuild() {
    let base = group("base", &[]);
    let child = group("child", &[]);
    child.add_parent(&base).unwrap();
    child.rebuild_permissions().unwrap();

    base.set_local_permission("fly", true).unwrap();
    // child's snapshot is untouched until it is rebuilt
    assert_eq!(child.get_permission("fly"), None);

    child.rebuild_permissions().unwrap();
    assert_eq!(child.get_permission("fly"), Some(true));
}

#[test]
fn test_rejected_edge_keeps_resolution() {
    let a = group("a", &["x"]);
    let b = group("b", &[]);
    b.add_parent(&a).unwrap();

    let err = a.add_parent(&b).unwrap_err();
    assert!(err.is_graph_error());
    assert!(matches!(err, PermissionError::CycleWouldForm { .. }));

    b.rebuild_permissions().unwrap();
    assert_eq!(b.get_permission("x"), Some(true));
    assert!(a.parents().is_empty());
}
