/*!
 * Acyclicity Property Tests
 * Random edge mutations never leave a group reachable from itself
 */

use perms_core::permissions::resolve::walk;
use perms_core::permissions::Group;
use proptest::prelude::*;
use std::sync::Arc;

const GROUPS: usize = 6;

#[derive(Debug, Clone)]
enum Op {
    Add(usize, usize),
    Remove(usize, usize),
    Set(usize, Vec<usize>),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..GROUPS, 0..GROUPS).prop_map(|(a, b)| Op::Add(a, b)),
        (0..GROUPS, 0..GROUPS).prop_map(|(a, b)| Op::Remove(a, b)),
        (0..GROUPS, prop::collection::vec(0..GROUPS, 0..4)).prop_map(|(a, bs)| Op::Set(a, bs)),
    ]
}

fn parent_ids(groups: &[Arc<Group>], index: usize) -> Vec<usize> {
    groups[index]
        .parents()
        .iter()
        .filter_map(|p| groups.iter().position(|g| Arc::ptr_eq(g, p)))
        .collect()
}

proptest! {
    #[test]
    fn prop_parent_graph_stays_acyclic(ops in prop::collection::vec(op(), 1..40)) {
        let groups: Vec<Arc<Group>> = (0..GROUPS)
            .map(|i| Arc::new(Group::new(format!("g{i}"), Vec::new())))
            .collect();

        for op in ops {
            let target = match &op {
                Op::Add(a, _) | Op::Remove(a, _) | Op::Set(a, _) => *a,
            };
            let before = parent_ids(&groups, target);

            let result = match &op {
                Op::Add(a, b) => groups[*a].add_parent(&groups[*b]),
                Op::Remove(a, b) => groups[*a].remove_parent(&groups[*b]),
                Op::Set(a, bs) => {
                    let parents: Vec<Arc<Group>> = bs.iter().map(|b| groups[*b].clone()).collect();
                    groups[*a].set_parents(&parents)
                }
            };

            if result.is_err() {
                prop_assert_eq!(parent_ids(&groups, target), before);
            }

            for group in &groups {
                let cycle = walk(group).cycle;
                prop_assert!(cycle.is_none(), "{} reaches {:?} after {:?}", group.name(), cycle, op);
                prop_assert!(group.rebuild_permissions().is_ok());
            }
        }
    }
}
