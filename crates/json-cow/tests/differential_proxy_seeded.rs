//! Seeded differential runs against a naive eager-copy oracle.
//!
//! The oracle duplicates the whole target up front and applies every
//! mutation eagerly; the proxy defers. After any script both must agree on
//! the logical view, and in full mode the original must be untouched.

use json_cow::{CopyMode, CowProxy, ProxyError, SharedValue};
use json_cow_util::{deep_equal, duplicate, Fuzzer};
use serde_json::{json, Value};

fn seeds() -> [u64; 10] {
    [
        0x5eed_c0de_u64,
        0x0000_0000_0000_0001_u64,
        0x0000_0000_0000_00ff_u64,
        0x0000_0000_00c0_ffee_u64,
        0x0123_4567_89ab_cdef_u64,
        0x1111_2222_3333_4444_u64,
        0x89ab_cdef_0123_4567_u64,
        0xfedc_ba98_7654_3210_u64,
        0x1357_9bdf_2468_ace0_u64,
        0xa5a5_5a5a_dead_beef_u64,
    ]
}

#[test]
fn full_mode_matches_the_eager_oracle() {
    for seed in seeds() {
        let fuzzer = Fuzzer::new(Some(seed));
        let graph = fuzzer.random_graph(3, 4);
        let doc = SharedValue::new(graph.clone());
        let snapshot = doc.snapshot();
        let proxy = CowProxy::new(doc.clone(), CopyMode::Full);
        let mut oracle = duplicate(&snapshot);

        for _ in 0..40 {
            match fuzzer.random_int(0, 3) {
                0 => write_top_level(&proxy, &mut oracle, &fuzzer, seed),
                1 => write_nested(&proxy, &mut oracle, &fuzzer, seed),
                2 => delete_top_level(&proxy, &mut oracle, &fuzzer, seed),
                _ => read_and_compare(&proxy, &oracle, &fuzzer, seed),
            }
        }

        assert!(
            deep_equal(&proxy.view().expect("view"), &oracle),
            "proxy view diverged from oracle (seed={seed})"
        );
        assert!(
            deep_equal(&doc.snapshot(), &snapshot),
            "full-mode proxy mutated the original (seed={seed})"
        );
    }
}

#[test]
fn partial_mode_matches_the_overlay_oracle() {
    for seed in seeds() {
        let fuzzer = Fuzzer::new(Some(seed));
        let graph = fuzzer.random_graph(2, 4);
        let doc = SharedValue::new(graph);
        let proxy = CowProxy::new(doc.clone(), CopyMode::Partial);
        let mut oracle = doc.snapshot();
        let mut touched: Vec<String> = Vec::new();

        for _ in 0..40 {
            let key = fuzzer.random_key();
            match fuzzer.random_int(0, 3) {
                0 => {
                    let value = fuzzer.random_scalar();
                    proxy.set(key.as_str(), value.clone()).expect("partial write");
                    oracle[&key] = value;
                    if !touched.contains(&key) {
                        touched.push(key);
                    }
                }
                1 => {
                    // Owner-side mutation: visible through the proxy unless
                    // the attribute has been overridden.
                    let value = fuzzer.random_scalar();
                    doc.update(|v| v[&key] = value.clone());
                    if !touched.contains(&key) {
                        oracle[&key] = value;
                    }
                }
                2 => {
                    let existed = oracle.get(&key).is_some();
                    match proxy.delete(key.as_str()) {
                        Ok(()) => {
                            assert!(existed, "delete succeeded on missing key (seed={seed})");
                            remove_key(&mut oracle, &key);
                            if !touched.contains(&key) {
                                touched.push(key);
                            }
                        }
                        Err(ProxyError::NoSuchAttribute(_)) => {
                            assert!(!existed, "delete failed on present key (seed={seed})")
                        }
                        Err(err) => panic!("unexpected delete failure (seed={seed}): {err}"),
                    }
                }
                _ => match proxy.get(key.as_str()) {
                    Ok(attr) => {
                        let got = attr.view().expect("attr view");
                        let want = oracle.get(&key).expect("oracle has read key");
                        assert!(deep_equal(&got, want), "read mismatch (seed={seed})");
                    }
                    Err(ProxyError::NoSuchAttribute(_)) => {
                        assert!(oracle.get(&key).is_none(), "spurious not-found (seed={seed})")
                    }
                    Err(err) => panic!("unexpected read failure (seed={seed}): {err}"),
                },
            }
        }

        assert!(
            deep_equal(&proxy.view().expect("view"), &oracle),
            "partial view diverged from oracle (seed={seed})"
        );
        assert!(!proxy.is_copied());
        assert_eq!(
            proxy.stats().duplications(),
            0,
            "partial mode must never duplicate (seed={seed})"
        );
    }
}

fn write_top_level(proxy: &CowProxy, oracle: &mut Value, fuzzer: &Fuzzer, seed: u64) {
    let key = fuzzer.random_key();
    let value = fuzzer.random_scalar();
    proxy
        .set(key.as_str(), value.clone())
        .unwrap_or_else(|err| panic!("top-level write failed (seed={seed}): {err}"));
    oracle[&key] = value;
}

fn write_nested(proxy: &CowProxy, oracle: &mut Value, fuzzer: &Fuzzer, seed: u64) {
    let object_keys: Vec<String> = oracle
        .as_object()
        .expect("oracle root is an object")
        .iter()
        .filter(|(_, v)| v.is_object())
        .map(|(k, _)| k.clone())
        .collect();
    let Some(key) = pick_owned(fuzzer, &object_keys) else {
        return;
    };
    let subkey = fuzzer.random_key();
    let value = fuzzer.random_scalar();
    let child = proxy
        .get(key.as_str())
        .unwrap_or_else(|err| panic!("nested read failed (seed={seed}): {err}"))
        .into_node()
        .expect("object attribute is wrapped");
    child
        .set(subkey.as_str(), value.clone())
        .unwrap_or_else(|err| panic!("nested write failed (seed={seed}): {err}"));
    oracle[&key][&subkey] = value;
}

fn delete_top_level(proxy: &CowProxy, oracle: &mut Value, fuzzer: &Fuzzer, seed: u64) {
    let key = fuzzer.random_key();
    let existed = oracle.get(&key).is_some();
    match proxy.delete(key.as_str()) {
        Ok(()) => {
            assert!(existed, "delete succeeded on missing key (seed={seed})");
            remove_key(oracle, &key);
        }
        Err(ProxyError::NoSuchAttribute(_)) => {
            assert!(!existed, "delete failed on present key (seed={seed})")
        }
        Err(err) => panic!("unexpected delete failure (seed={seed}): {err}"),
    }
}

fn read_and_compare(proxy: &CowProxy, oracle: &Value, fuzzer: &Fuzzer, seed: u64) {
    let key = fuzzer.random_key();
    match proxy.get(key.as_str()) {
        Ok(attr) => {
            let got = attr.view().expect("attr view");
            let want = oracle.get(&key).expect("oracle has read key");
            assert!(deep_equal(&got, want), "read mismatch (seed={seed})");
        }
        Err(ProxyError::NoSuchAttribute(_)) => {
            assert!(oracle.get(&key).is_none(), "spurious not-found (seed={seed})")
        }
        Err(err) => panic!("unexpected read failure (seed={seed}): {err}"),
    }
}

fn pick_owned(fuzzer: &Fuzzer, keys: &[String]) -> Option<String> {
    if keys.is_empty() {
        return None;
    }
    Some(fuzzer.pick(keys).clone())
}

fn remove_key(oracle: &mut Value, key: &str) {
    if let Some(map) = oracle.as_object_mut() {
        map.shift_remove(key);
    }
}

#[test]
fn oracle_sanity_check() {
    // The oracle itself must implement eager copy-on-construction.
    let original = json!({"a": {"x": 1}});
    let mut oracle = duplicate(&original);
    oracle["a"]["x"] = json!(2);
    assert_eq!(original["a"]["x"], json!(1));
}
