use std::io;

use super::*;

fn node(start: usize, key: &str, value: &str) -> WalkedNode {
    WalkedNode {
        start,
        span_length: key.split(SEPARATOR).count(),
        key: key.into(),
        value: value.into(),
        score: -5.0,
    }
}

fn ni_hao() -> Vec<WalkedNode> {
    vec![node(0, "ㄋㄧˇ", "你"), node(1, "ㄏㄠˇ", "好")]
}

#[test]
fn test_context_key_trigram() {
    let walked = ni_hao();
    let key = context_key(&walked, 2).unwrap();
    assert_eq!(key.trigram, "((),(ㄋㄧˇ,你),ㄏㄠˇ)");
    assert_eq!(key.current, "ㄏㄠˇ");

    let key = context_key(&walked, 1).unwrap();
    assert_eq!(key.trigram, "((),(),ㄋㄧˇ)");
}

#[test]
fn test_context_key_three_nodes() {
    let walked = vec![
        node(0, "ㄨㄛˇ", "我"),
        node(1, "ㄕˋ", "是"),
        node(2, "ㄋㄧˇ-ㄏㄠˇ", "你好"),
    ];
    let key = context_key(&walked, 4).unwrap();
    assert_eq!(key.trigram, "((ㄨㄛˇ,我),(ㄕˋ,是),ㄋㄧˇ-ㄏㄠˇ)");
    // cursor inside the phrase still resolves to it
    assert_eq!(context_key(&walked, 3).unwrap().current, "ㄋㄧˇ-ㄏㄠˇ");
}

#[test]
fn test_context_key_skips_ending_punctuation() {
    let walked = vec![node(0, "ㄋㄧˇ", "你"), node(1, "_punctuation_.", "。")];
    assert!(context_key(&walked, 2).is_none());

    let walked = vec![
        node(0, "_punctuation_,", "，"),
        node(1, "ㄏㄠˇ", "好"),
    ];
    assert_eq!(context_key(&walked, 2).unwrap().trigram, "((),(),ㄏㄠˇ)");
}

#[test]
fn test_context_key_rejects_placeholder_readings() {
    let walked = vec![node(0, "_punctuation_\\", "、"), node(1, "ㄏㄠˇ", "好")];
    assert!(context_key(&walked, 2).is_none());
}

#[test]
fn test_context_key_mismatched_length_neighbour() {
    let walked = vec![
        WalkedNode {
            start: 0,
            span_length: 1,
            key: "ㄉㄚˋ".into(),
            value: "大大".into(),
            score: -5.0,
        },
        node(1, "ㄏㄠˇ", "好"),
    ];
    assert_eq!(context_key(&walked, 2).unwrap().trigram, "((),(),ㄏㄠˇ)");
    assert!(context_key(&[], 0).is_none());
}

#[test]
fn test_observe_then_suggest() {
    let mut uom = UserOverrideModel::new(10, 5400.0);
    let walked = ni_hao();
    assert!(uom.suggest(&walked, 2, 0.0).is_none());
    uom.observe(&walked, 2, "號", 0.0);
    let s = uom.suggest(&walked, 2, 0.0).unwrap();
    assert_eq!(s.value, "號");
    assert_eq!(s.key, "ㄏㄠˇ");
    assert!((s.score - 1.0).abs() < 1e-9);
    assert_eq!(uom.len(), 1);
}

#[test]
fn test_suggest_prefers_frequent_override() {
    let mut uom = UserOverrideModel::new(10, 5400.0);
    let walked = ni_hao();
    uom.observe(&walked, 2, "號", 0.0);
    uom.observe(&walked, 2, "號", 0.0);
    uom.observe(&walked, 2, "好", 0.0);
    let s = uom.suggest(&walked, 2, 0.0).unwrap();
    assert_eq!(s.value, "號");
    assert!((s.score - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_decay_halves_per_constant() {
    let mut uom = UserOverrideModel::new(10, 5400.0);
    let walked = ni_hao();
    uom.observe(&walked, 2, "號", 1000.0);
    let s = uom.suggest(&walked, 2, 1000.0 + 5400.0).unwrap();
    assert!((s.score - 0.5).abs() < 1e-9);
}

#[test]
fn test_decay_forgets_old_observation() {
    let mut uom = UserOverrideModel::new(10, 5400.0);
    let walked = ni_hao();
    uom.observe(&walked, 2, "號", 0.0);
    assert!(uom.suggest(&walked, 2, 5400.0 * 21.0).is_none());
}

#[test]
fn test_lru_eviction() {
    let mut uom = UserOverrideModel::new(2, 5400.0);
    let a = vec![node(0, "ㄋㄧˇ", "你")];
    let b = vec![node(0, "ㄏㄠˇ", "好")];
    let c = vec![node(0, "ㄇㄣ˙", "們")];
    uom.observe(&a, 1, "擬", 0.0);
    uom.observe(&b, 1, "號", 0.0);
    // touching `a` makes `b` the eviction victim
    uom.observe(&a, 1, "擬", 0.0);
    uom.observe(&c, 1, "們", 0.0);
    assert_eq!(uom.len(), 2);
    assert!(uom.suggest(&a, 1, 0.0).is_some());
    assert!(uom.suggest(&b, 1, 0.0).is_none());
    assert!(uom.suggest(&c, 1, 0.0).is_some());
}

#[test]
fn test_observe_without_context_is_ignored() {
    let mut uom = UserOverrideModel::new(10, 5400.0);
    let walked = vec![node(0, "_punctuation_.", "。")];
    uom.observe(&walked, 1, "。", 0.0);
    assert!(uom.is_empty());
}

#[test]
fn test_serialize_roundtrip() {
    let mut uom = UserOverrideModel::new(10, 5400.0);
    let walked = ni_hao();
    uom.observe(&walked, 2, "號", 100.0);
    uom.observe(&walked, 1, "擬", 100.0);
    let bytes = uom.to_bytes().unwrap();
    assert_eq!(&bytes[0..4], MAGIC);

    let mut restored = UserOverrideModel::new(10, 5400.0);
    restored.load_bytes(&bytes).unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored.suggest(&walked, 2, 100.0).unwrap().value, "號");
    assert_eq!(restored.suggest(&walked, 1, 100.0).unwrap().value, "擬");
}

#[test]
fn test_load_truncates_to_capacity() {
    let mut uom = UserOverrideModel::new(10, 5400.0);
    let a = vec![node(0, "ㄋㄧˇ", "你")];
    let b = vec![node(0, "ㄏㄠˇ", "好")];
    uom.observe(&a, 1, "擬", 0.0);
    uom.observe(&b, 1, "號", 0.0);
    let bytes = uom.to_bytes().unwrap();

    let mut small = UserOverrideModel::new(1, 5400.0);
    small.load_bytes(&bytes).unwrap();
    assert_eq!(small.len(), 1);
    // the most recent observation survives
    assert!(small.suggest(&b, 1, 0.0).is_some());
}

#[test]
fn test_corrupt_bytes_rejected() {
    let mut uom = UserOverrideModel::new(10, 5400.0);
    uom.observe(&ni_hao(), 2, "號", 0.0);
    let mut bytes = uom.to_bytes().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    let err = UserOverrideModel::new(10, 5400.0)
        .load_bytes(&bytes)
        .unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    let err = UserOverrideModel::from_bytes(b"XXXX\x01\0\0\0\0").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert!(UserOverrideModel::from_bytes(b"BP").is_err());
}

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("override.bpuo");

    let mut uom = UserOverrideModel::from_settings();
    uom.observe(&ni_hao(), 2, "號", now_epoch());
    uom.save(&path).unwrap();

    let restored = UserOverrideModel::open(&path).unwrap();
    assert_eq!(
        restored.suggest(&ni_hao(), 2, now_epoch()).unwrap().value,
        "號"
    );
}

#[test]
fn test_open_nonexistent() {
    let dir = tempfile::tempdir().unwrap();
    let uom = UserOverrideModel::open(&dir.path().join("missing.bpuo")).unwrap();
    assert!(uom.is_empty());
    assert_eq!(uom.capacity(), settings().user_override.capacity);
}
