use merklelog_canonical::{Digest, TenantId};
use merklelog_massifs::{
    DirMassifReader, LogOptions, MassifContext, MassifLogBuilder, MassifRange, MassifReader,
    MemoryMassifStore, ReaderConfig, SignedRootEnvelope, StorageError,
};
use merklelog_mmr::{inclusion_proof, mmr_index, verify_inclusion};
use p256::ecdsa::SigningKey;
use std::time::Duration;
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(30);

fn tenant() -> TenantId {
    TenantId::parse("tenant/6ea5cd00-c711-3649-6914-7b125928bbb4").unwrap()
}

fn key() -> SigningKey {
    SigningKey::from_slice(&[0x11; 32]).unwrap()
}

fn leaf(i: u64) -> [u8; 32] {
    let mut h = [0u8; 32];
    h[24..].copy_from_slice(&i.to_be_bytes());
    h
}

fn build(leaves: u64, height: u8) -> MassifLogBuilder {
    let mut log = MassifLogBuilder::new(LogOptions {
        massif_height: height,
        ..LogOptions::default()
    })
    .unwrap();
    for i in 0..leaves {
        log.append(leaf(i), 0x8f54_c1f0_640d_0000 + i).unwrap();
    }
    log
}

#[test]
fn directory_mirror_serves_published_log() {
    let log = build(20, 3);
    let store = MemoryMassifStore::new();
    log.publish(&store, &tenant(), &key(), "test", 1715113947353).unwrap();

    let temp_dir = TempDir::new().unwrap();
    store.export(temp_dir.path()).unwrap();

    let reader = ReaderConfig::Directory(temp_dir.path().to_path_buf())
        .open()
        .unwrap();
    for massif_index in 0..log.massif_count() {
        let blob = reader.get_massif(&tenant(), massif_index, TIMEOUT).unwrap();
        assert_eq!(blob, log.massif_blob(massif_index).unwrap());
    }
    assert!(matches!(
        reader.get_massif(&tenant(), log.massif_count(), TIMEOUT),
        Err(StorageError::NotFound { .. })
    ));
}

#[test]
fn stored_seal_verifies_against_recomputed_root() {
    let log = build(20, 3);
    let store = MemoryMassifStore::new();
    log.publish(&store, &tenant(), &key(), "test", 1715113947353).unwrap();

    let last = log.massif_count() - 1;
    let massif = MassifContext::from_bytes(&store.get_massif(&tenant(), last, TIMEOUT).unwrap()).unwrap();
    let seal = SignedRootEnvelope::decode(&store.get_seal(&tenant(), last, TIMEOUT).unwrap()).unwrap();

    let stored = seal.state().unwrap();
    assert_eq!(stored.root, None);
    assert_eq!(stored.mmr_size, log.size());

    let root = Digest::new(massif.root(stored.mmr_size).unwrap());
    let state = seal
        .with_root(root)
        .unwrap()
        .verify(key().verifying_key())
        .unwrap();
    assert_eq!(state.root, Some(root));
}

#[test]
fn leaves_prove_inclusion_from_their_own_massif() {
    let log = build(20, 3);
    let root = log.mmr().root().unwrap();
    let last = MassifContext::from_bytes(&log.massif_blob(log.massif_count() - 1).unwrap()).unwrap();

    // Only leaves in the last massif can reach the current peaks without
    // the massifs after them.
    for ordinal in 16..20 {
        let index = mmr_index(ordinal);
        let proof = inclusion_proof(log.size(), index, &last).unwrap();
        assert!(verify_inclusion(&proof, index, &leaf(ordinal), &root).unwrap());
    }

    let mut range = MassifRange::new(MassifContext::from_bytes(&log.massif_blob(0).unwrap()).unwrap());
    for massif_index in 1..log.massif_count() {
        range
            .push(MassifContext::from_bytes(&log.massif_blob(massif_index).unwrap()).unwrap())
            .unwrap();
    }
    for ordinal in 0..20 {
        let index = mmr_index(ordinal);
        let proof = inclusion_proof(log.size(), index, &range).unwrap();
        assert!(verify_inclusion(&proof, index, &leaf(ordinal), &root).unwrap());
    }
}

#[test]
fn slow_store_times_out() {
    let store = MemoryMassifStore::new().with_latency(Duration::from_secs(45));
    store.put_massif(&tenant(), 0, build(2, 3).massif_blob(0).unwrap());
    assert!(matches!(
        store.get_massif(&tenant(), 0, TIMEOUT),
        Err(StorageError::Timeout { .. })
    ));
    assert_eq!(store.get_massif(&tenant(), 0, Duration::from_secs(60)).unwrap().len(), 32 + 3 * 32);
}

#[test]
fn missing_directory_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let reader = DirMassifReader::new(temp_dir.path());
    assert!(matches!(
        reader.get_seal(&tenant(), 0, TIMEOUT),
        Err(StorageError::NotFound { .. })
    ));
}
