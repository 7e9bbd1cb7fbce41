//! Smoke test for acsub
//!
//! Run with `RUST_LOG=acsub=debug` to see compile and replacement events.

use acsub::{AcError, Automaton, Config, GrowthPolicy, RuleSet, SharedAutomaton};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Running acsub smoke tests...\n");

    test_replace_all();
    test_replace_in_place();
    test_replace_with_context();
    test_search();
    test_overlaps();
    test_capacity();
    test_stats_and_reset();
    test_rule_sets();
    test_shared();

    println!("\n✅ All smoke tests passed!");
}

fn test_replace_all() {
    let mut ac = Automaton::new();
    ac.add_pattern(b"cat", b"dog").unwrap();
    ac.add_pattern(b"mouse", b"elephant").unwrap();
    ac.compile().unwrap();

    let out = ac.replace_all(b"The cat chased the mouse").unwrap();
    assert_eq!(out.bytes, b"The dog chased the elephant");
    assert_eq!(out.replacements, 2);
    println!("✓ Allocating replacement");
}

fn test_replace_in_place() {
    let mut ac = Automaton::new();
    ac.add_pattern(b"hello", b"hi").unwrap();
    ac.add_pattern(b"world", b"earth").unwrap();
    ac.compile().unwrap();

    let text = b"hello world";
    let mut buffer = [0u8; 32];
    buffer[..text.len()].copy_from_slice(text);

    let outcome = ac.replace_in_place(&mut buffer, text.len()).unwrap();
    assert_eq!(&buffer[..outcome.len], b"hi earth");
    assert_eq!(outcome.replacements, 2);
    println!("✓ In-place replacement");
}

fn test_replace_with_context() {
    let mut ac: Automaton<'_, &str> = Automaton::default();
    ac.add_pattern_with(b"{{USER}}", None, Some("user")).unwrap();
    ac.add_pattern_with(b"___CSP_NONCE___", None, Some("nonce"))
        .unwrap();
    ac.compile().unwrap();

    let page = b"<p>{{USER}}</p><script nonce=\"___CSP_NONCE___\">";
    for (user, nonce) in [("alice", "r4nd0m"), ("bob", "0th3r")] {
        let out = ac
            .replace_with(page, &(user, nonce), |_, tag, ctx| match tag {
                Some(&"user") => ctx.0,
                Some(&"nonce") => ctx.1,
                _ => "",
            })
            .unwrap();
        let expected = format!("<p>{user}</p><script nonce=\"{nonce}\">");
        assert_eq!(out.bytes, expected.as_bytes());
    }
    println!("✓ Callback replacement with per-call context");
}

fn test_search() {
    let mut ac = Automaton::new();
    for pattern in ["he", "she", "his", "hers"] {
        ac.add_pattern(pattern.as_bytes(), b"").unwrap();
    }
    ac.compile().unwrap();

    let found: Vec<_> = ac
        .search(b"ushers")
        .unwrap()
        .iter()
        .map(|m| (m.start, m.end, m.pattern.to_vec()))
        .collect();
    assert_eq!(
        found,
        vec![
            (1, 3, b"she".to_vec()),
            (2, 3, b"he".to_vec()),
            (2, 5, b"hers".to_vec()),
        ]
    );
    println!("✓ Search reports every occurrence");
}

fn test_overlaps() {
    let mut ac = Automaton::new();
    ac.add_pattern(b"abc", b"X").unwrap();
    ac.add_pattern(b"bcd", b"Y").unwrap();
    ac.compile().unwrap();

    let out = ac.replace_all(b"abcd").unwrap();
    assert_eq!(out.bytes, b"Xd");
    assert_eq!(out.replacements, 1);
    println!("✓ Earliest-starting match wins an overlap");
}

fn test_capacity() {
    let fixed = Config::new().node_capacity(4);
    let mut ac: Automaton = Automaton::with_config(fixed);
    assert_eq!(
        ac.add_pattern(b"abcdef", b"x"),
        Err(AcError::CapacityExhausted { capacity: 4 })
    );

    let growing = Config::new().node_capacity(4).growth(GrowthPolicy::Double);
    let mut ac: Automaton = Automaton::with_config(growing);
    ac.add_pattern(b"abcdef", b"x").unwrap();
    assert!(ac.capacity() >= 7);
    println!("✓ Fixed and doubling node capacity");
}

fn test_stats_and_reset() {
    let mut ac = Automaton::new();
    ac.add_pattern(b"abc", b"1").unwrap();
    ac.add_pattern(b"abd", b"2").unwrap();
    ac.compile().unwrap();

    let stats = ac.stats();
    assert_eq!(stats.node_count, 5);
    assert_eq!(stats.pattern_count, 2);

    ac.reset();
    assert_eq!(ac.stats().node_count, 1);
    assert!(!ac.is_compiled());
    println!("✓ Stats and reset");
}

fn test_rule_sets() {
    let mut server = RuleSet::new();
    server.insert("cat", "dog").unwrap();
    server.insert("red", "blue").unwrap();

    let mut location = RuleSet::new();
    location.insert("red", "green").unwrap();

    let merged = location.overlay(&server);
    let ac = merged.build(Config::default()).unwrap();
    let out = ac.replace_all(b"red cat").unwrap();
    assert_eq!(out.bytes, b"green dog");
    println!("✓ Rule set overlay and build");
}

fn test_shared() {
    let shared: SharedAutomaton = SharedAutomaton::default();
    shared
        .add_pattern(b"v1".to_vec(), Some(b"v2".to_vec()), None)
        .unwrap();
    assert_eq!(shared.replace_all(b"v1").unwrap().bytes, b"v1");

    shared.publish().unwrap();
    assert_eq!(shared.replace_all(b"v1").unwrap().bytes, b"v2");
    println!("✓ Shared automaton publish");
}
