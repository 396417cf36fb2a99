// =============================================================================
// Mint Flow Integration Tests
// =============================================================================
// Orchestrator -> HttpPinningClient -> pinning proxy -> fake Pinata, with a
// scripted wallet signing the mint.
// Covers:
// - Art1 scenario end to end, explorer link carries the transaction hash
// - An image of exactly the size ceiling is pinned whole
// - Upstream error text surfaced to the user
// - Metadata never pinned after an image failure, mint never sent after a
//   metadata failure
// - Wallet rejection leaves the form intact
// - Signing through a JSON-RPC provider
//
// Run with:
//   cargo test -p minter-integration-tests mint_flow_tests

use crate::utils::{
    spawn_fake_pinata, spawn_proxy, spawn_rpc_node, staged_files, FakePinata, Proxy,
    ScriptedWallet, Upstream, ACCOUNT, CONTRACT, TX_HASH,
};
use alloy_primitives::{Address, U256};
use anyhow::Result;
use axum::http::StatusCode;
use mint_client::{
    ClientConfig, HttpPinningClient, HttpProvider, InjectedDiscovery, MintError, MintEvent, MintOrchestrator,
    MintStep, NftContract, Selection, VendorFlags, WalletConnector, WalletError, WalletSession,
};
use minter_types::{ImageFile, MintForm, MAX_IMAGE_BYTES};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    pinata: FakePinata,
    proxy: Proxy,
    orchestrator: MintOrchestrator<HttpPinningClient>,
}

async fn harness(upstream: Upstream) -> Result<Harness> {
    let pinata = spawn_fake_pinata(upstream).await?;
    let proxy = spawn_proxy(&pinata.url, MAX_IMAGE_BYTES).await?;
    let contract = NftContract::new(CONTRACT.parse()?);
    let orchestrator = MintOrchestrator::new(HttpPinningClient::new(&proxy.url), contract);
    Ok(Harness {
        pinata,
        proxy,
        orchestrator,
    })
}

async fn connect(wallet: Arc<ScriptedWallet>) -> Result<WalletSession<Arc<ScriptedWallet>>> {
    let flags = VendorFlags {
        is_meta_mask: true,
        ..VendorFlags::default()
    };
    let connector = WalletConnector::new(InjectedDiscovery::single(flags, wallet))
        .with_chain_id(11155111)
        .with_poll_interval(Duration::from_millis(5));

    let Selection::Single(chosen) = connector.select()? else {
        anyhow::bail!("expected a single provider");
    };
    Ok(connector.connect(chosen).await?)
}

fn art1_form() -> Result<MintForm> {
    let mut form = MintForm::new();
    form.set_name("Art1");
    form.set_description("desc");
    form.set_attribute("Background", "Blue");
    form.select_image(ImageFile::new(
        "art1.png",
        "image/png",
        vec![0x89; 2 * 1024 * 1024],
    ))?;
    Ok(form)
}

// =============================================================================
// Success
// =============================================================================

#[tokio::test]
async fn test_art1_end_to_end() -> Result<()> {
    let mut h = harness(Upstream::Succeed).await?;
    let mut events = h.orchestrator.subscribe();
    let wallet = Arc::new(ScriptedWallet::default());
    let session = connect(wallet.clone()).await?;
    let mut form = art1_form()?;

    let receipt = h.orchestrator.submit(&mut form, Some(&session)).await?;

    assert_eq!(receipt.token_uri(), "ipfs://CID_META");
    assert_eq!(receipt.token_id, Some(U256::from(1u64)));
    assert_eq!(receipt.block_number, Some(90));
    assert_eq!(receipt.owner, ACCOUNT.parse::<Address>()?);
    let config = ClientConfig::default();
    assert_eq!(
        receipt.transaction_url(&config),
        format!("https://sepolia.etherscan.io/tx/{TX_HASH}")
    );
    assert_eq!(
        receipt.metadata_url(&config),
        "https://gateway.pinata.cloud/ipfs/CID_META"
    );

    // Image reached Pinata whole, then metadata pointing at it.
    let files = h.pinata.files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].size, 2 * 1024 * 1024);
    let pinned = h.pinata.json();
    assert_eq!(
        pinned[0]["pinataContent"],
        json!({
            "name": "Art1",
            "description": "desc",
            "image": "ipfs://CID_IMG",
            "attributes": [{"trait_type": "Background", "value": "Blue"}]
        })
    );

    let sent = wallet.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["from"], ACCOUNT);
    assert_eq!(sent[0]["to"], CONTRACT);

    assert!(form.is_empty());
    assert!(!h.orchestrator.is_in_progress());
    assert_eq!(staged_files(&h.proxy.upload_dir), 0);

    let mut last = None;
    while let Ok(event) = events.try_recv() {
        last = Some(event);
    }
    assert_eq!(last, Some(MintEvent::Confirmed(receipt)));
    Ok(())
}

#[tokio::test]
async fn test_image_at_size_ceiling_is_pinned() -> Result<()> {
    let h = harness(Upstream::Succeed).await?;
    let session = connect(Arc::new(ScriptedWallet::default())).await?;
    let mut form = art1_form()?;
    form.select_image(ImageFile::new(
        "ceiling.png",
        "image/png",
        vec![0x42; MAX_IMAGE_BYTES],
    ))?;

    let receipt = h.orchestrator.submit(&mut form, Some(&session)).await?;

    assert_eq!(receipt.tx_hash, TX_HASH);
    let files = h.pinata.files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].size, MAX_IMAGE_BYTES);
    assert_eq!(files[0].file_name, "ceiling.png");
    assert_eq!(staged_files(&h.proxy.upload_dir), 0);
    Ok(())
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_image_upstream_error_shown_and_metadata_skipped() -> Result<()> {
    let h = harness(Upstream::FailFile(
        StatusCode::UNAUTHORIZED,
        json!({"error": {"reason": "INVALID_CREDENTIALS", "details": "Invalid JWT"}}),
    ))
    .await?;
    let wallet = Arc::new(ScriptedWallet::default());
    let session = connect(wallet.clone()).await?;
    let mut form = art1_form()?;

    let err = h
        .orchestrator
        .submit(&mut form, Some(&session))
        .await
        .unwrap_err();

    assert_eq!(err.step(), MintStep::UploadImage);
    assert_eq!(err.to_string(), "Image upload failed: Invalid JWT");
    assert!(h.pinata.json().is_empty());
    assert!(wallet.sent().is_empty());
    assert_eq!(form.name, "Art1");
    assert!(form.image().is_some());
    assert!(!h.orchestrator.is_in_progress());
    Ok(())
}

#[tokio::test]
async fn test_metadata_failure_never_mints() -> Result<()> {
    let h = harness(Upstream::FailJson(
        StatusCode::BAD_REQUEST,
        json!({"error": "Invalid request format."}),
    ))
    .await?;
    let wallet = Arc::new(ScriptedWallet::default());
    let session = connect(wallet.clone()).await?;
    let mut form = art1_form()?;

    let err = h
        .orchestrator
        .submit(&mut form, Some(&session))
        .await
        .unwrap_err();

    assert!(matches!(err, MintError::MetadataUpload(_)));
    assert_eq!(err.to_string(), "Metadata upload failed: Invalid request format.");
    // The image stays pinned.
    assert_eq!(h.pinata.files().len(), 1);
    assert!(!wallet.calls().contains(&"eth_sendTransaction".to_string()));
    assert!(!form.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_rejected_signature_keeps_form_and_allows_retry() -> Result<()> {
    let h = harness(Upstream::Succeed).await?;
    let wallet = Arc::new(ScriptedWallet {
        reject_signature: true,
        ..ScriptedWallet::default()
    });
    let session = connect(wallet).await?;
    let mut form = art1_form()?;

    let err = h
        .orchestrator
        .submit(&mut form, Some(&session))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MintError::Transaction(WalletError::Rejected(_))
    ));
    assert_eq!(form.description, "desc");
    assert!(!h.orchestrator.is_in_progress());

    let healthy = connect(Arc::new(ScriptedWallet::default())).await?;
    let receipt = h.orchestrator.submit(&mut form, Some(&healthy)).await?;
    assert_eq!(receipt.tx_hash, TX_HASH);
    assert_eq!(h.pinata.files().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_no_wallet_found() -> Result<()> {
    let connector: WalletConnector<InjectedDiscovery<Arc<ScriptedWallet>>> =
        WalletConnector::new(InjectedDiscovery::empty());
    let err = connector.select().unwrap_err();
    assert_eq!(err, WalletError::NoWalletFound);
    assert_eq!(
        err.to_string(),
        "No wallet found. Please install a browser wallet extension."
    );
    Ok(())
}

#[tokio::test]
async fn test_mint_through_json_rpc_provider() -> Result<()> {
    let h = harness(Upstream::Succeed).await?;
    let node = Arc::new(ScriptedWallet::default());
    let url = spawn_rpc_node(node.clone()).await?;

    let provider = Arc::new(HttpProvider::new(url));
    let connector = WalletConnector::new(InjectedDiscovery::single(VendorFlags::default(), provider))
        .with_poll_interval(Duration::from_millis(5));
    let chosen = connector.pick("Browser Wallet")?;
    let session = connector.connect(chosen).await?;
    assert_eq!(session.wallet_name(), "Browser Wallet");

    let mut form = art1_form()?;
    let receipt = h.orchestrator.submit(&mut form, Some(&session)).await?;

    assert_eq!(receipt.tx_hash, TX_HASH);
    assert_eq!(node.sent().len(), 1);
    assert_eq!(
        node.calls(),
        vec![
            "eth_requestAccounts",
            "eth_chainId",
            "eth_getBalance",
            "eth_sendTransaction",
            "eth_getTransactionReceipt",
        ]
    );
    Ok(())
}
