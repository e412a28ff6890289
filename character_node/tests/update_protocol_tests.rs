//! End-to-end checks of the list/get/update protocol against a mock oracle

use character_node::crypto::{address_of_secret, sign_personal_message};
use character_node::models::{UpdateEnvelope, UpdatePayload};
use character_node::ownership::StaticOwnershipOracle;
use character_node::storage::{CharacterStore, FileCharacterStore, MemoryCharacterStore};
use character_node::{CharacterError, CharacterService};
use ethers::signers::{LocalWallet, Signer};
use std::sync::Arc;
use std::time::Duration;

const OWNER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
const STRANGER_KEY: &str = "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

fn key(hex_key: &str) -> Vec<u8> {
    hex::decode(hex_key).unwrap()
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

struct Node {
    service: CharacterService,
    oracle: Arc<StaticOwnershipOracle>,
    owner: String,
}

/// Every default character owned by the OWNER_KEY account.
fn node_with(store: Arc<dyn CharacterStore>, ids: impl IntoIterator<Item = u64>) -> Node {
    let owner = address_of_secret(&key(OWNER_KEY)).unwrap();
    let oracle = Arc::new(StaticOwnershipOracle::with_owners(
        ids.into_iter().map(|id| (id, owner.clone())),
    ));
    let service = CharacterService::new(store, oracle.clone(), Duration::from_secs(2));
    Node {
        service,
        oracle,
        owner,
    }
}

async fn memory_node() -> Node {
    let store = Arc::new(MemoryCharacterStore::with_defaults().unwrap());
    let ids: Vec<u64> = store.load_all().await.unwrap().iter().map(|c| c.id).collect();
    node_with(store, ids)
}

fn envelope(payload: UpdatePayload, hex_key: &str) -> UpdateEnvelope {
    let message = payload.canonical().unwrap();
    UpdateEnvelope {
        signature: sign_personal_message(&key(hex_key), message.as_bytes()).unwrap(),
        payload,
        address: None,
    }
}

#[tokio::test]
async fn test_unknown_ids_are_not_errors() {
    let node = memory_node().await;
    node.oracle.set_unavailable(true);

    for token in ["999", "abc", "1.5", "-1", ""] {
        assert_eq!(node.service.get_character(token).await, Ok(None), "token {:?}", token);
    }
    assert_eq!(node.oracle.call_count(), 0);
}

#[tokio::test]
async fn test_get_coerces_numeric_text() {
    let node = memory_node().await;
    let character = node.service.get_character(" 2.0 ").await.unwrap().unwrap();
    assert_eq!(character.id, 2);
    assert_eq!(character.owner, node.owner);

    for (token, id) in [("0x1", 1), ("0b11", 3), ("0o4", 4)] {
        let character = node.service.get_character(token).await.unwrap().unwrap();
        assert_eq!(character.id, id, "token {:?}", token);
    }
}

#[tokio::test]
async fn test_owner_update_changes_only_details() {
    let node = memory_node().await;
    let before = node.service.get_character("1").await.unwrap().unwrap();

    let updated = node
        .service
        .update_character(&envelope(
            UpdatePayload::new(1, "A brand new bio", "Catch me if you can", now(), 120),
            OWNER_KEY,
        ))
        .await
        .unwrap();

    assert_eq!(updated.description, "A brand new bio");
    assert_eq!(updated.statement, "Catch me if you can");
    assert_eq!(updated.id, before.id);
    assert_eq!(updated.owner, before.owner);
    assert_eq!(updated.name, before.name);
    assert_eq!(updated.urls, before.urls);
}

#[tokio::test]
async fn test_signature_over_mutated_payload_is_invalid() {
    let node = memory_node().await;
    let payload = UpdatePayload::new(0, "signed text", "", now(), 120);
    let signed_bytes = payload.canonical().unwrap();

    let mut request = envelope(payload, OWNER_KEY);
    request.address = Some(node.owner.clone());
    // the verifier serializes exactly what the signer serialized
    assert_eq!(request.payload.canonical().unwrap(), signed_bytes);

    request.payload.params.description = Some("edited after signing".to_string());
    assert_ne!(request.payload.canonical().unwrap(), signed_bytes);

    assert!(matches!(
        node.service.update_character(&request).await,
        Err(CharacterError::SignatureInvalid(_))
    ));
}

#[tokio::test]
async fn test_whitespace_description_is_stored_verbatim() {
    let node = memory_node().await;
    let updated = node
        .service
        .update_character(&envelope(UpdatePayload::new(0, "   ", "", now(), 120), OWNER_KEY))
        .await
        .unwrap();
    assert_eq!(updated.description, "   ");
}

#[tokio::test]
async fn test_expired_by_one_second() {
    let node = memory_node().await;
    let issued = now() - 121;
    let request = envelope(UpdatePayload::new(0, "late", "", issued, 120), OWNER_KEY);

    assert!(matches!(
        node.service.update_character(&request).await,
        Err(CharacterError::Expired { .. })
    ));
}

#[tokio::test]
async fn test_owner_address_case_does_not_matter() {
    let store = Arc::new(MemoryCharacterStore::with_defaults().unwrap());
    let owner = address_of_secret(&key(OWNER_KEY)).unwrap();
    let oracle = Arc::new(StaticOwnershipOracle::with_owners([(0, owner.to_uppercase().replacen("0X", "0x", 1))]));
    let service = CharacterService::new(store, oracle, Duration::from_secs(2));

    let mut request = envelope(UpdatePayload::new(0, "case", "", now(), 120), OWNER_KEY);
    request.address = Some(owner.to_lowercase());
    let updated = service.update_character(&request).await.unwrap();
    assert_eq!(updated.description, "case");
}

#[tokio::test]
async fn test_valid_stranger_is_not_owner() {
    let node = memory_node().await;
    let request = envelope(UpdatePayload::new(0, "mine now", "", now(), 120), STRANGER_KEY);

    match node.service.update_character(&request).await {
        Err(CharacterError::NotOwner { signer, owner }) => {
            assert_eq!(signer, address_of_secret(&key(STRANGER_KEY)).unwrap());
            assert_eq!(owner, node.owner);
        }
        other => panic!("expected NotOwner, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_is_idempotent_with_stable_oracle() {
    let node = memory_node().await;
    let first = node.service.list_characters().await.unwrap();
    let second = node.service.list_characters().await.unwrap();

    let owners = |list: &[character_node::models::Character]| {
        list.iter().map(|c| c.owner.clone()).collect::<Vec<_>>()
    };
    assert_eq!(owners(&first), owners(&second));
    assert!(first.iter().all(|c| c.owner == node.owner));
}

#[tokio::test]
async fn test_list_fails_whole_when_oracle_down() {
    let node = memory_node().await;
    node.oracle.set_unavailable(true);
    assert!(matches!(
        node.service.list_characters().await,
        Err(CharacterError::OracleUnavailable(_))
    ));
}

#[tokio::test]
async fn test_list_reflects_transfer() {
    let node = memory_node().await;
    let buyer = address_of_secret(&key(STRANGER_KEY)).unwrap();
    node.oracle.set_owner(3, buyer.clone());

    let list = node.service.list_characters().await.unwrap();
    assert_eq!(list[3].owner, buyer);
    assert_eq!(list[2].owner, node.owner);
}

#[tokio::test]
async fn test_concrete_scenario_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("characters.db.json");
    let store = Arc::new(FileCharacterStore::new(&path));

    let mut zero = store.get(0).await.unwrap().unwrap();
    let owner = address_of_secret(&key(OWNER_KEY)).unwrap();
    zero.owner = owner.clone();
    zero.description = "old".to_string();
    store.save(&zero).await.unwrap();

    let node = node_with(store, [0]);
    let updated = node
        .service
        .update_character(&envelope(UpdatePayload::new(0, "new", "", now(), 120), OWNER_KEY))
        .await
        .unwrap();
    assert_eq!(updated.description, "new");
    assert_eq!(updated.statement, "");
    assert_eq!(updated.owner, owner);

    let fetched = node.service.get_character("0").await.unwrap().unwrap();
    assert_eq!(fetched, updated);

    let reopened = FileCharacterStore::new(&path);
    assert_eq!(reopened.get(0).await.unwrap().unwrap().description, "new");
}

#[tokio::test]
async fn test_wallet_signatures_are_accepted() {
    let node = memory_node().await;
    let wallet: LocalWallet = OWNER_KEY.parse().unwrap();
    assert!(node.owner.eq_ignore_ascii_case(&format!("{:?}", wallet.address())));

    let payload = UpdatePayload::new(4, "Signed in the browser", "hi", now(), 120);
    let signature = wallet
        .sign_message(payload.canonical().unwrap())
        .await
        .unwrap();
    let request = UpdateEnvelope {
        payload,
        signature: format!("0x{}", hex::encode(signature.to_vec())),
        address: Some(format!("{:?}", wallet.address())),
    };

    let updated = node.service.update_character(&request).await.unwrap();
    assert_eq!(updated.description, "Signed in the browser");
    assert_eq!(updated.statement, "hi");
}

#[tokio::test]
async fn test_concurrent_updates_on_different_ids_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("characters.db.json");
    let store = Arc::new(FileCharacterStore::new(&path));
    let ids: Vec<u64> = store.load_all().await.unwrap().iter().map(|c| c.id).collect();
    let node = Arc::new(node_with(store, ids.clone()));

    let tasks = ids.iter().map(|id| {
        let node = node.clone();
        let id = *id;
        tokio::spawn(async move {
            let request = envelope(
                UpdatePayload::new(id, &format!("bio {}", id), "", now(), 120),
                OWNER_KEY,
            );
            node.service.update_character(&request).await
        })
    });
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let reopened = FileCharacterStore::new(&path);
    for character in reopened.load_all().await.unwrap() {
        assert_eq!(character.description, format!("bio {}", character.id));
    }
}
