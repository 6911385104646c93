//! End-to-end flows against a real Postgres.
//!
//! Set `ZORIUM_TEST_DATABASE_URL` to run them; each test migrates its own
//! throwaway schema. Without the variable every test returns early.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use alloy::signers::SignerSync;
use alloy::signers::local::PrivateKeySigner;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tower::ServiceExt;
use uuid::Uuid;
use zorium_api::{AppState, auth::generate_token_pair, build_router};
use zorium_chain::{MockChainReader, OnChainCollection, OnChainToken};
use zorium_db::Database;

const SECRET: &str = "flow-test-secret";
const EARLY_BIRD_LIMIT: i64 = 2;
const TOKEN: &str = "0x00000000000000000000000000000000000000e1";
const TREASURY: &str = "0x00000000000000000000000000000000000000e2";
const ALLOCATION: &str = "0x00000000000000000000000000000000000000e3";

struct Harness {
    app: Router,
    chain: Arc<MockChainReader>,
    admin_pool: PgPool,
    schema: String,
}

impl Harness {
    async fn start() -> Option<Self> {
        let Ok(url) = std::env::var("ZORIUM_TEST_DATABASE_URL") else {
            eprintln!("ZORIUM_TEST_DATABASE_URL not set; skipping");
            return None;
        };

        let config = zorium_common::config::defaults()
            .and_then(|b| b.set_override("auth.jwt_secret", SECRET))
            .and_then(|b| b.set_override("chain.mock", true))
            .and_then(|b| b.set_override("chain.zrm_token_address", TOKEN))
            .and_then(|b| b.set_override("chain.treasury_address", TREASURY))
            .and_then(|b| b.set_override("chain.allocation_address", ALLOCATION))
            .and_then(|b| b.set_override("rewards.early_bird_limit", EARLY_BIRD_LIMIT))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("test config");
        zorium_common::config::init_with(config);

        let admin_pool = PgPool::connect(&url).await.expect("test database");
        let schema = format!("flow_{}", Uuid::now_v7().simple());
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin_pool)
            .await
            .expect("create schema");

        let options = PgConnectOptions::from_str(&url)
            .expect("database url")
            .options([("search_path", schema.as_str())]);
        let pg = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("schema pool");
        let db = Database { pg };
        db.migrate().await.expect("migrations");

        let chain = Arc::new(MockChainReader::with_sample_data());
        let app = build_router(AppState::new(db, chain.clone()));
        Some(Self {
            app,
            chain,
            admin_pool,
            schema,
        })
    }

    async fn finish(self) {
        let _ = sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin_pool)
            .await;
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut request = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(request.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// Register a password account; returns (user id, access token, body).
    async fn register(&self, username: &str) -> (Uuid, String, Value) {
        let (status, body) = self
            .post(
                "/api/v1/auth/register",
                None,
                json!({ "username": username, "password": "hunter2-hunter2" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register {username}: {body}");
        let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
        let token = body["access_token"].as_str().unwrap().to_string();
        (id, token, body)
    }

    /// Sign in with a fresh wallet; returns (signer, user id, access token).
    async fn wallet_account(&self) -> (PrivateKeySigner, Uuid, String) {
        let signer = PrivateKeySigner::random();
        let address = format!("{:#x}", signer.address());

        let (status, challenge) = self.get(&format!("/api/v1/auth/nonce/{address}")).await;
        assert_eq!(status, StatusCode::OK);
        let message = challenge["message"].as_str().unwrap();
        let signature = signer.sign_message_sync(message.as_bytes()).unwrap();

        let (status, body) = self
            .post(
                "/api/v1/auth/wallet",
                None,
                json!({
                    "address": address,
                    "signature": format!("0x{}", hex::encode(signature.as_bytes())),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "wallet sign-in: {body}");
        let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
        let token = body["access_token"].as_str().unwrap().to_string();
        (signer, id, token)
    }
}

fn admin_token(user_id: Uuid) -> String {
    generate_token_pair(user_id, "admin", "admin", SECRET, 600, 600)
        .unwrap()
        .access_token
}

#[tokio::test]
async fn early_bird_goes_to_the_first_accounts_only() {
    let Some(h) = Harness::start().await else { return };

    let (_, _, first) = h.register("early_one").await;
    let (_, _, second) = h.register("early_two").await;
    let (_, _, third) = h.register("too_late").await;

    assert_eq!(first["early_bird"]["position"], 1);
    assert_eq!(second["early_bird"]["position"], 2);
    assert!(third["early_bird"].is_null());

    h.finish().await;
}

#[tokio::test]
async fn sale_moves_ownership_and_duplicate_hash_conflicts() {
    let Some(h) = Harness::start().await else { return };

    let (seller_id, seller, _) = h.register("seller").await;
    let (buyer_id, buyer, _) = h.register("buyer").await;

    let (status, nft) = h
        .post(
            "/api/v1/nfts",
            Some(&seller),
            json!({
                "name": "Genesis #1",
                "image_url": "https://img.zorium.xyz/1.png",
                "price": "1.5",
                "is_listed": true,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{nft}");
    let nft_id = nft["id"].as_str().unwrap().to_string();
    assert_eq!(nft["is_listed"], true);

    let hash = format!("0x{}", "ab".repeat(32));
    let (status, sale) = h
        .post(
            "/api/v1/transactions",
            Some(&buyer),
            json!({ "nft_id": nft_id, "kind": "sale", "tx_hash": hash }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{sale}");
    assert_eq!(sale["from_user_id"], seller_id.to_string());
    assert_eq!(sale["to_user_id"], buyer_id.to_string());

    let (_, detail) = h.get(&format!("/api/v1/nfts/{nft_id}")).await;
    assert_eq!(detail["owner_id"], buyer_id.to_string());
    assert_eq!(detail["is_listed"], false);

    let (status, body) = h
        .post(
            "/api/v1/transactions",
            Some(&buyer),
            json!({
                "nft_id": nft_id,
                "kind": "transfer",
                "to_user_id": seller_id,
                "tx_hash": hash,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    h.finish().await;
}

#[tokio::test]
async fn verified_deposit_is_recorded_once() {
    let Some(h) = Harness::start().await else { return };
    let (admin_id, _, _) = h.register("treasurer").await;

    let sender = Address::with_last_byte(0x55);
    let hash = B256::with_last_byte(0x42);
    let amount = U256::from(250u64) * U256::from(10u64).pow(U256::from(18u64));
    h.chain.add_transfer(
        hash,
        TOKEN.parse().unwrap(),
        sender,
        TREASURY.parse().unwrap(),
        amount,
    );

    let request = json!({
        "tx_hash": format!("{hash:#x}"),
        "from_address": format!("{sender:#x}"),
        "amount": "250",
        "kind": "deposit",
    });
    let token = admin_token(admin_id);

    let (status, entry) = h
        .post("/api/v1/admin/zrm/verify-transaction", Some(&token), request.clone())
        .await;
    assert_eq!(status, StatusCode::OK, "{entry}");
    assert_eq!(entry["kind"], "deposit");

    let (status, body) = h
        .post("/api/v1/admin/zrm/verify-transaction", Some(&token), request)
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["error"], "ALREADY_EXISTS");

    h.finish().await;
}

#[tokio::test]
async fn wheel_enforces_cooldown_and_wallet_ownership() {
    let Some(h) = Harness::start().await else { return };

    let (signer, _, token) = h.wallet_account().await;
    let (_, stranger, _) = h.register("stranger").await;
    let spin_uri = format!("/api/v1/wheel/{:#x}/spin", signer.address());

    let (status, body) = h.post(&spin_uri, Some(&stranger), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let (status, body) = h.post(&spin_uri, Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = h.post(&spin_uri, Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert!(body["message"].as_str().unwrap().contains("cooldown"));

    h.finish().await;
}

#[tokio::test]
async fn only_the_contract_owner_can_register_a_collection() {
    let Some(h) = Harness::start().await else { return };

    let (signer, owner_id, owner) = h.wallet_account().await;
    let (_, squatter, _) = h.register("squatter").await;

    let contract = Address::with_last_byte(0xd1);
    h.chain.add_collection(OnChainCollection {
        address: contract,
        name: "Owned Drop".to_string(),
        symbol: Some("OWN".to_string()),
        owner: Some(signer.address()),
        contract_uri: None,
        tokens: (1u64..=3)
            .map(|id| OnChainToken {
                token_id: U256::from(id),
                uri: None,
                total_supply: U256::from(1u64),
            })
            .collect(),
    });
    let request = json!({ "contract_address": format!("{contract:#x}") });

    let (status, body) = h
        .post("/api/v1/collections", Some(&squatter), request.clone())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let (status, collection) = h
        .post("/api/v1/collections", Some(&owner), request.clone())
        .await;
    assert_eq!(status, StatusCode::OK, "{collection}");
    assert_eq!(collection["creator_id"], owner_id.to_string());
    assert_eq!(collection["token_count"], 3);
    assert_eq!(collection["is_verified"], false);
    let collection_id = collection["id"].as_str().unwrap().to_string();

    let (_, tokens) = h
        .get(&format!("/api/v1/collections/{collection_id}/tokens"))
        .await;
    assert_eq!(tokens["items"].as_array().unwrap().len(), 3);

    let (status, _) = h.post("/api/v1/collections", Some(&owner), request).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // A factory sync verifies the collection and keeps its creator.
    let (status, report) = h
        .post("/api/v1/admin/collections/sync", Some(&admin_token(owner_id)), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert!(report["failures"].as_array().unwrap().is_empty());

    let (_, synced) = h.get(&format!("/api/v1/collections/{collection_id}")).await;
    assert_eq!(synced["is_verified"], true);
    assert_eq!(synced["creator_id"], owner_id.to_string());

    h.finish().await;
}

#[tokio::test]
async fn sync_skips_unreadable_collections() {
    let Some(h) = Harness::start().await else { return };
    let (admin_id, _, _) = h.register("operator").await;

    h.chain.add_unreadable_collection(Address::with_last_byte(0xbb));

    let (status, report) = h
        .post("/api/v1/admin/collections/sync", Some(&admin_token(admin_id)), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert_eq!(report["collections_seen"], 2);
    assert_eq!(report["collections_upserted"], 1);
    assert_eq!(report["tokens_upserted"], 3);
    assert_eq!(report["failures"].as_array().unwrap().len(), 1);

    h.finish().await;
}
