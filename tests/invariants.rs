//! Property-style checks over randomized sequences of operations,
//! plus the specific invariants and round-trip guarantees a
//! path-compressed trie must hold.

use std::net::Ipv4Addr;

use inetnum::addr::Prefix;
use rand::prelude::*;
use route_tree_store::Table;

fn v4(a: u8, b: u8, c: u8, d: u8, len: u8) -> Prefix {
    Prefix::new(Ipv4Addr::new(a, b, c, d).into(), len).unwrap()
}

/// Arena conservation: live nodes + free nodes is constant regardless
/// of how many inserts/deletes have run.
#[test]
fn arena_conservation_holds_across_random_ops() {
    let max_routes = 64;
    let mut table = Table::new(max_routes, 1);
    let expected_total = 2 * max_routes - 1;

    let mut rng = StdRng::seed_from_u64(42);
    let mut installed: Vec<Prefix> = Vec::new();

    for _ in 0..500 {
        let total_nodes = table.stats_v4().total_nodes;
        let free = expected_total - total_nodes;
        assert_eq!(total_nodes + free, expected_total);

        if installed.is_empty() || rng.random_bool(0.6) {
            let octets: [u8; 4] = rng.random();
            let len = rng.random_range(1..=32);
            let prefix = v4(octets[0], octets[1], octets[2], octets[3], len);
            if table.insert(prefix, 1).is_ok() {
                installed.push(prefix);
            }
        } else {
            let idx = rng.random_range(0..installed.len());
            let prefix = installed.swap_remove(idx);
            table.delete(prefix).unwrap();
        }
    }
}

/// Route-count correctness: `total_routes` always equals the number of
/// distinct prefixes currently installed (last-write-wins on repeats).
#[test]
fn total_routes_matches_distinct_installed_prefixes() {
    let mut table = Table::new(64, 1);
    let mut installed = std::collections::HashSet::new();

    let prefixes = [
        v4(10, 0, 0, 0, 8),
        v4(10, 1, 0, 0, 16),
        v4(10, 0, 0, 0, 8), // duplicate: overwrite, not a new route
        v4(192, 168, 0, 0, 16),
    ];
    for p in prefixes {
        table.insert(p, 7).unwrap();
        installed.insert(p);
    }

    assert_eq!(table.stats_v4().total_routes, installed.len());

    table.delete(v4(10, 1, 0, 0, 16)).unwrap();
    installed.remove(&v4(10, 1, 0, 0, 16));
    assert_eq!(table.stats_v4().total_routes, installed.len());
}

/// Inserting `add(A, d, h)` and `add(A & mask(d), d, h)` must produce
/// identical lookup behavior: canonicalization of trailing bits is
/// idempotent regardless of what garbage they held beforehand.
#[test]
fn canonicalization_is_idempotent() {
    let dirty = Prefix::new(Ipv4Addr::new(10, 255, 255, 255).into(), 8).unwrap();
    let clean = Prefix::new(Ipv4Addr::new(10, 0, 0, 0).into(), 8).unwrap();

    let mut table_a = Table::new(16, 1);
    let mut table_b = Table::new(16, 1);
    table_a.insert(dirty, 1).unwrap();
    table_b.insert(clean, 1).unwrap();

    for probe in [
        Ipv4Addr::new(10, 1, 2, 3),
        Ipv4Addr::new(11, 0, 0, 0),
        Ipv4Addr::new(10, 255, 0, 1),
    ] {
        assert_eq!(table_a.lookup(probe.into()), table_b.lookup(probe.into()));
    }
    assert_eq!(table_a.stats_v4().total_nodes, table_b.stats_v4().total_nodes);
}

/// Insert/delete round-trip: installing a batch then deleting the same
/// batch (in a different order) must return the trie to empty.
#[test]
fn insert_then_delete_everything_empties_the_trie() {
    let mut table = Table::new(32, 1);
    let prefixes = [
        v4(10, 0, 0, 0, 8),
        v4(10, 1, 0, 0, 16),
        v4(10, 1, 2, 0, 24),
        v4(192, 168, 0, 0, 16),
        v4(192, 168, 1, 0, 24),
    ];

    for p in &prefixes {
        table.insert(*p, 1).unwrap();
    }
    assert_eq!(table.stats_v4().add_count, prefixes.len() as u64);

    for p in prefixes.iter().rev() {
        table.delete(*p).unwrap();
    }

    let stats = table.stats_v4();
    assert_eq!(stats.total_nodes, 0);
    assert_eq!(stats.total_routes, 0);
    assert_eq!(stats.del_count, prefixes.len() as u64);
    assert!(table.validate().0.is_empty());
}

/// Merge correctness: deleting a prefix that collapses a branch point
/// must leave lookup behavior identical to a trie built from scratch
/// with only the surviving prefixes.
#[test]
fn deleting_a_branch_point_matches_a_from_scratch_rebuild() {
    let mut built_then_pruned = Table::new(16, 1);
    built_then_pruned.insert(v4(10, 0, 0, 0, 8), 1).unwrap();
    built_then_pruned.insert(v4(10, 1, 0, 0, 16), 2).unwrap();
    built_then_pruned.insert(v4(10, 2, 0, 0, 16), 3).unwrap();
    built_then_pruned.delete(v4(10, 1, 0, 0, 16)).unwrap();
    built_then_pruned.delete(v4(10, 2, 0, 0, 16)).unwrap();

    let mut from_scratch = Table::new(16, 1);
    from_scratch.insert(v4(10, 0, 0, 0, 8), 1).unwrap();

    for probe in [
        Ipv4Addr::new(10, 1, 2, 3),
        Ipv4Addr::new(10, 2, 2, 3),
        Ipv4Addr::new(10, 9, 9, 9),
        Ipv4Addr::new(11, 0, 0, 0),
    ] {
        assert_eq!(
            built_then_pruned.lookup(probe.into()),
            from_scratch.lookup(probe.into())
        );
    }
    assert_eq!(
        built_then_pruned.stats_v4().total_nodes,
        from_scratch.stats_v4().total_nodes
    );
}

/// No live node should ever violate the compression invariant (an
/// internal node with no next-hop must have both children).
#[test]
fn validate_finds_nothing_after_random_churn() {
    let mut table = Table::new(64, 1);
    let mut rng = StdRng::seed_from_u64(7);
    let mut installed: Vec<Prefix> = Vec::new();

    for _ in 0..300 {
        if installed.is_empty() || rng.random_bool(0.65) {
            let octets: [u8; 4] = rng.random();
            let len = rng.random_range(1..=32);
            let prefix = v4(octets[0], octets[1], octets[2], octets[3], len);
            if table.insert(prefix, 1).is_ok() {
                installed.push(prefix);
            }
        } else {
            let idx = rng.random_range(0..installed.len());
            let prefix = installed.swap_remove(idx);
            table.delete(prefix).unwrap();
        }
        assert!(table.validate().0.is_empty());
    }
}
