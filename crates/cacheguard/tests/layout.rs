use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::mem::{align_of, size_of};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use cacheguard::CacheGuard;
use cacheguard_gen::{ArchitectureId, RuleTable};

fn host_line_size() -> usize {
    let arch = ArchitectureId::new(std::env::consts::ARCH).unwrap();
    RuleTable::builtin().classify(&arch).size as usize
}

#[test]
fn alignment_matches_rule_table() {
    assert_eq!(align_of::<CacheGuard<u8>>(), host_line_size());
    assert_eq!(align_of::<CacheGuard<AtomicUsize>>(), host_line_size());
}

#[test]
fn size_rounds_up_to_whole_lines() {
    let line = host_line_size();
    assert_eq!(size_of::<CacheGuard<u8>>(), line);
    assert_eq!(size_of::<CacheGuard<[u8; 3]>>() % line, 0);
    let big = size_of::<CacheGuard<[u8; 300]>>();
    assert!(big >= 300 && big % line == 0);
}

#[test]
fn neighbours_do_not_share_a_line() {
    let line = host_line_size();
    let pair = [CacheGuard::new(AtomicUsize::new(0)), CacheGuard::new(AtomicUsize::new(0))];
    let a = &*pair[0] as *const AtomicUsize as usize;
    let b = &*pair[1] as *const AtomicUsize as usize;
    assert_eq!(a % line, 0);
    assert!(b - a >= line);
}

#[cfg(target_arch = "x86_64")]
#[test]
fn x86_64_uses_128_byte_lines() {
    assert_eq!(align_of::<CacheGuard<u8>>(), 128);
    assert!(size_of::<[CacheGuard<u8>; 2]>() >= 256);
}

#[cfg(target_arch = "aarch64")]
#[test]
fn aarch64_uses_128_byte_lines() {
    assert_eq!(align_of::<CacheGuard<u8>>(), 128);
}

#[test]
fn into_inner_returns_value() {
    let guard = CacheGuard::new(String::from("payload"));
    let value = guard.into_inner();
    assert_eq!(value, "payload");
}

#[test]
fn deref_and_deref_mut() {
    let mut guard = CacheGuard::from(vec![1, 2]);
    guard.push(3);
    assert_eq!(guard.len(), 3);
    assert_eq!(*guard, vec![1, 2, 3]);
}

#[test]
fn formatting_delegates() {
    let guard = CacheGuard::new(42);
    assert_eq!(guard.to_string(), "42");
    assert_eq!(format!("{guard:?}"), "CacheGuard { inner: 42 }");
}

#[test]
fn derived_traits_follow_inner() {
    let a = CacheGuard::new(7u32);
    let b = a;
    assert_eq!(a, b);
    assert_eq!(CacheGuard::<u32>::default().into_inner(), 0);

    let hash = |g: &CacheGuard<u32>| {
        let mut h = DefaultHasher::new();
        g.hash(&mut h);
        h.finish()
    };
    assert_eq!(hash(&a), hash(&b));
}

#[test]
fn const_construction() {
    static COUNTER: CacheGuard<AtomicUsize> = CacheGuard::new(AtomicUsize::new(0));
    COUNTER.fetch_add(2, Ordering::Relaxed);
    assert_eq!(COUNTER.load(Ordering::Relaxed), 2);
}

#[test]
fn shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CacheGuard<AtomicUsize>>();

    let counters: Arc<[CacheGuard<AtomicUsize>; 4]> =
        Arc::new(std::array::from_fn(|_| CacheGuard::new(AtomicUsize::new(0))));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let counters = Arc::clone(&counters);
            thread::spawn(move || {
                for _ in 0..1000 {
                    counters[i].fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert!(counters.iter().all(|c| c.load(Ordering::Relaxed) == 1000));
}
