use std::collections::HashMap;
use std::thread::scope;
use std::time::Instant;

use rand::Rng;
use syncmaps::{merge, DefaultMap, UniqueMap};

const THREADS: usize = 8;
const KEYS_PER_THREAD: u64 = 512;
const OPS_PER_THREAD: usize = 20_000;

#[test]
#[cfg_attr(miri, ignore)]
fn stress_disjoint_keys_never_lose_entries() {
    let _ = tracing_subscriber::fmt::try_init();
    let start = Instant::now();
    let map: DefaultMap<u64, u64> = DefaultMap::new();

    let models: Vec<(HashMap<u64, u64>, i32)> = scope(|scope| {
        let handles: Vec<_> = (0..THREADS as u64)
            .map(|t| {
                let map = map.clone();
                scope.spawn(move || {
                    let mut rng = rand::rng();
                    let mut model = HashMap::new();
                    // Overwrites count again, so track the counter apart
                    // from the model.
                    let mut counter = 0i32;
                    let base = t * KEYS_PER_THREAD;
                    for _ in 0..OPS_PER_THREAD {
                        let k = base + rng.random_range(0..KEYS_PER_THREAD);
                        match rng.random_range(0..4u8) {
                            0 | 1 => {
                                let v: u64 = rng.random();
                                map.set(k, v);
                                model.insert(k, v);
                                counter += 1;
                            }
                            2 => {
                                // Only delete resident keys, so the shared
                                // counter never drops below zero.
                                if model.remove(&k).is_some() {
                                    map.delete(&k);
                                    counter -= 1;
                                }
                            }
                            _ => {
                                assert_eq!(map.get_ok(&k), model.get(&k).copied());
                            }
                        }
                    }
                    (model, counter)
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut expect = 0;
    let mut counter = 0;
    for (model, c) in models.iter() {
        for (k, v) in model.iter() {
            assert_eq!(map.get_ok(k), Some(*v));
        }
        expect += model.len();
        counter += c;
    }
    assert_eq!(map.keys().len(), expect);
    assert_eq!(map.len(), counter);
    assert!(map.len() as usize >= expect);

    let end = Instant::now();
    print!("stress disjoint :{:?} ", end - start);
}

#[test]
#[cfg_attr(miri, ignore)]
fn stress_clear_while_setting() {
    let map: DefaultMap<u64, u64> = (0..1000).map(|i| (i, i)).collect();

    scope(|scope| {
        let map_ref = &map;
        let writers: Vec<_> = (0..4u64)
            .map(|t| {
                scope.spawn(move || {
                    for i in 0..5000 {
                        map_ref.set(1000 + t * 5000 + i, i);
                    }
                })
            })
            .collect();
        let clearer = scope.spawn(move || {
            for _ in 0..8 {
                map_ref.clear();
                assert!(map_ref.len() >= 0);
            }
        });

        for h in writers.into_iter() {
            h.join().unwrap();
        }
        clearer.join().unwrap();
    });

    assert!(map.len() >= 0);
    assert_eq!(map.len() as usize, map.keys().len());
}

#[test]
#[cfg_attr(miri, ignore)]
fn stress_set_if_reenters_map() {
    let map: DefaultMap<u64, u64> = DefaultMap::new();

    scope(|scope| {
        let handles: Vec<_> = (0..THREADS as u64)
            .map(|t| {
                let map = map.clone();
                scope.spawn(move || {
                    for i in 0..1000 {
                        let k = t * 1000 + i;
                        // The predicate reads a neighbour that may belong to
                        // another thread while that thread writes it.
                        assert!(map.set_if(k, k, |m| {
                            let _ = m.get_ok(&(k + 1));
                            !m.exists(&k)
                        }));
                        assert!(map.exists(&k));
                        assert!(map.delete_if(&k, |m| m.get(&k) == k));
                    }
                })
            })
            .collect();
        for h in handles.into_iter() {
            h.join().unwrap();
        }
    });

    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
}

#[test]
#[cfg_attr(miri, ignore)]
fn stress_uniquemap_and_merge() {
    let set: UniqueMap<u64> = UniqueMap::new();
    let maps: Vec<DefaultMap<u64, u64>> = (0..THREADS).map(|_| DefaultMap::new()).collect();

    scope(|scope| {
        for (t, m) in maps.iter().enumerate() {
            let set = set.clone();
            scope.spawn(move || {
                for i in 0..1000u64 {
                    set.set(i);
                    m.set(i, t as u64);
                }
            });
        }
    });

    // Every thread set the same keys.
    assert_eq!(set.keys().len(), 1000);
    assert_eq!(set.len() as usize, THREADS * 1000);

    let merged = merge(maps.iter());
    assert_eq!(merged.keys().len(), 1000);
    assert!(merged.values().iter().all(|v| *v == THREADS as u64 - 1));
}
