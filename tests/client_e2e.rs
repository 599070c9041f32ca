//! tests/client_e2e.rs
//!
//! Live Terra network suite. Needs `PHRASE` of a funded testnet wallet:
//!
//! ```sh
//! PHRASE="..." cargo test --test client_e2e -- --ignored --test-threads=1
//! ```
//!
//! Every failure is printed with its error before the test fails.

use std::fmt::Debug;
use std::time::Duration;
use terra_client::core::amount::{asset_to_base, base_amount};
use terra_client::core::asset::{Asset, Chain, TERRA_DECIMAL};
use terra_client::core::config::{ClientConfig, Network};
use terra_client::core::domain::{FeeParams, TransferParams, TxHistoryParams, TxType};
use terra_client::{get_estimated_fee, ClientParams, EstimateFeeParams, TerraClient};

fn setup() -> TerraClient {
    TerraClient::new(ClientParams {
        phrase: std::env::var("PHRASE").ok(),
        network: Some(Network::Testnet),
        config: ClientConfig::default(),
    })
    .unwrap_or_else(|e| fail(e))
}

async fn teardown(mut client: TerraClient) {
    tokio::time::sleep(Duration::from_millis(200)).await;
    client.purge_client();
}

fn fail<E: Debug>(err: E) -> ! {
    eprintln!("{:?}", err);
    panic!("e2e step failed: {:?}", err)
}

fn check<T, E: Debug>(res: Result<T, E>) -> T {
    res.unwrap_or_else(|e| fail(e))
}

fn eut() -> Asset {
    Asset::new(Chain::Terra, "EUT")
}

#[tokio::test]
#[ignore]
async fn should_get_luna_transaction_details() {
    let mut client = setup();
    check(client.set_network(Network::Testnet));

    let hash = "5C2810ECB4C3F2A25FADD5A6806E7D5CFC37B59F4F72D69D8A25061E355437E0";
    let tx = check(client.get_transaction_data(hash).await);
    assert_eq!(tx.from[0].from, "terra1h6t6a8fkzcklgrdql4avpsyk7whak5umxmmek0");
    assert_eq!(tx.from[0].asset.as_ref().map(|a| a.symbol.as_str()), Some("LUNA"));
    assert_eq!(tx.from[0].amount.to_fixed(), "100000");
    assert_eq!(tx.to[0].to, "terra13zeuy5c6hrcwv2u7a73jket2ujhf5e5us4m956");
    assert_eq!(tx.tx_type, TxType::Transfer);
    assert_eq!(tx.hash, hash);
    teardown(client).await;
}

#[tokio::test]
#[ignore]
async fn should_get_krw_msg_send_with_multiple_msgs() {
    let mut client = setup();
    check(client.set_network(Network::Testnet));

    let tx = check(
        client
            .get_transaction_data("A8057659C5F189B91E3D85794479D80A78B5A4F6D4C5E6CAC01A3FADB274332F")
            .await,
    );
    assert_eq!(tx.asset, Asset::empty(Chain::Terra));
    assert_eq!(tx.from.len(), 2);
    assert_eq!(tx.to.len(), 2);
    assert_eq!(tx.from[0].from, "terra1saynp5x60tr03sy4awr2rzt3wgmqrqahuahccv");
    assert_eq!(tx.to[0].to, "terra1ltnkx0mv7lf2rca9f8w740ashu93ujughy4s7p");
    assert_eq!(tx.to[1].to, "terra1j6fey5tl70k9fvrv7mea7ahfr8u2yv7l23w5e6");
    assert_eq!(tx.from[1].amount.to_fixed(), "1000000");
    teardown(client).await;
}

#[tokio::test]
#[ignore]
async fn should_get_msg_multi_send_tx() {
    let mut client = setup();
    check(client.set_network(Network::Mainnet));

    let tx = check(
        client
            .get_transaction_data("C36E48ED757785BF0CF099C5B824B384B6C057D9FC4415E3EBDC02BA5496E65A")
            .await,
    );
    assert_eq!(tx.from.len(), 5);
    assert_eq!(tx.to.len(), 5);
    assert_eq!(tx.from[1].from, "terra1l6834ha5h5l5dxkr0vl82hjcucfht3gpwlflq6");
    assert_eq!(tx.from[1].amount.to_fixed(), "41948000000");
    assert_eq!(tx.to[4].to, "terra1nqnmgh6vkrcq8e4sscjxwnyu740g5xuxlk9edr");
    assert_eq!(tx.to[4].amount.to_fixed(), "25000000000");
    teardown(client).await;
}

#[tokio::test]
#[ignore]
async fn should_get_address_balances() {
    let client = setup();
    let balances = check(client.get_balance("terra1saynp5x60tr03sy4awr2rzt3wgmqrqahuahccv", None).await);
    println!("{}", check(serde_json::to_string(&balances)));
    teardown(client).await;
}

#[tokio::test]
#[ignore]
async fn should_search_for_txs() {
    let mut client = setup();
    check(client.set_network(Network::Mainnet));
    let page = check(
        client
            .get_transactions(TxHistoryParams::new("terra1sffpgwnyg69y93es86rdz8uvz4fdjtqcaxnjdp"))
            .await,
    );
    for tx in &page.txs {
        println!("{}", check(serde_json::to_string_pretty(tx)));
    }
    teardown(client).await;
}

#[tokio::test]
#[ignore]
async fn get_fees_testnet() {
    let client = setup();
    let sender = "terra1saynp5x60tr03sy4awr2rzt3wgmqrqahuahccv";
    let fees = check(
        client
            .get_fees(FeeParams {
                sender: sender.to_string(),
                recipient: sender.to_string(),
                amount: check(asset_to_base("0.001", TERRA_DECIMAL)),
                asset: Asset::ust(),
                fee_asset: Asset::luna(),
                memo: None,
            })
            .await,
    );
    println!("fast: {}", fees.fast);
    assert!(fees.gas_limit > 0);
    teardown(client).await;
}

#[tokio::test]
#[ignore]
async fn get_fees_with_memo_testnet() {
    let mut client = setup();
    check(client.set_network(Network::Testnet));
    let sender = "terra1saynp5x60tr03sy4awr2rzt3wgmqrqahuahccv";
    let fees = check(
        client
            .get_fees(FeeParams {
                sender: sender.to_string(),
                recipient: sender.to_string(),
                amount: check(asset_to_base("0.01", TERRA_DECIMAL)),
                asset: Asset::ust(),
                fee_asset: Asset::ust(),
                memo: Some("+:TERRA.UST".to_string()),
            })
            .await,
    );
    println!("{}", check(serde_json::to_string(&fees)));
    assert_eq!(fees.asset, Asset::ust());
    teardown(client).await;
}

async fn transfer_and_log(client: &TerraClient, params: TransferParams) {
    let hash = check(client.transfer(params).await);
    println!("tx {}", client.get_explorer_tx_url(&hash));
    assert!(!hash.is_empty());
}

#[tokio::test]
#[ignore]
async fn transfers_luna_fee_luna_by_default() {
    let client = setup();
    let recipient = check(client.get_address(1));
    let params = TransferParams::new(0, Asset::luna(), base_amount(1, TERRA_DECIMAL), &recipient)
        .with_memo("fee-luna");
    transfer_and_log(&client, params).await;
    teardown(client).await;
}

#[tokio::test]
#[ignore]
async fn transfers_luna_fee_ust() {
    let client = setup();
    let recipient = check(client.get_address(1));
    let params = TransferParams::new(0, Asset::luna(), base_amount(1, TERRA_DECIMAL), &recipient)
        .with_memo("fee-luna")
        .with_fee_asset(Asset::ust());
    transfer_and_log(&client, params).await;
    teardown(client).await;
}

#[tokio::test]
#[ignore]
async fn transfers_ust_fee_luna() {
    let client = setup();
    let recipient = check(client.get_address(1));
    let amount = check(asset_to_base("0.01", TERRA_DECIMAL));
    let params = TransferParams::new(0, Asset::ust(), amount, &recipient)
        .with_memo("fee-luna")
        .with_fee_asset(Asset::luna());
    transfer_and_log(&client, params).await;
    teardown(client).await;
}

/// Estimates the fee with the standalone helper, then transfers with it pinned.
async fn transfer_with_estimated_fee(
    client: &TerraClient,
    asset: Asset,
    fee_asset: Asset,
    amount: terra_client::core::amount::BaseAmount,
    memo: &str,
) {
    let sender = check(client.get_address(0));
    let recipient = check(client.get_address(1));
    let estimate = check(
        get_estimated_fee(EstimateFeeParams::new(
            &client.get_config(),
            FeeParams {
                sender,
                recipient: recipient.clone(),
                amount,
                asset: asset.clone(),
                fee_asset: fee_asset.clone(),
                memo: None,
            },
        ))
        .await,
    );
    let params = TransferParams::new(0, asset, amount, &recipient)
        .with_memo(memo)
        .with_fee_asset(fee_asset)
        .with_fee(estimate.amount, estimate.gas_limit);
    transfer_and_log(client, params).await;
}

#[tokio::test]
#[ignore]
async fn transfers_luna_with_estimated_fee_ust() {
    let client = setup();
    let amount = base_amount(1, TERRA_DECIMAL);
    transfer_with_estimated_fee(&client, Asset::luna(), Asset::ust(), amount, "est-fee-ust").await;
    teardown(client).await;
}

#[tokio::test]
#[ignore]
async fn transfers_ust_fee_ust_by_default() {
    let client = setup();
    let recipient = check(client.get_address(1));
    let amount = check(asset_to_base("0.01", TERRA_DECIMAL));
    let params = TransferParams::new(0, Asset::ust(), amount, &recipient).with_memo("fee-ust");
    transfer_and_log(&client, params).await;
    teardown(client).await;
}

#[tokio::test]
#[ignore]
async fn transfers_ust_with_estimated_fee() {
    let client = setup();
    let amount = check(asset_to_base("0.01", TERRA_DECIMAL));
    transfer_with_estimated_fee(&client, Asset::ust(), Asset::ust(), amount, "est-fee-luna").await;
    teardown(client).await;
}

#[tokio::test]
#[ignore]
async fn transfers_eut_fee_eut_by_default() {
    let client = setup();
    let recipient = check(client.get_address(1));
    let amount = check(asset_to_base("0.01", TERRA_DECIMAL));
    let params = TransferParams::new(0, eut(), amount, &recipient).with_memo("fee-luna");
    transfer_and_log(&client, params).await;
    teardown(client).await;
}

#[tokio::test]
#[ignore]
async fn transfers_eut_fee_luna() {
    let client = setup();
    let recipient = check(client.get_address(1));
    let amount = check(asset_to_base("0.01", TERRA_DECIMAL));
    let params = TransferParams::new(0, eut(), amount, &recipient)
        .with_memo("fee-luna")
        .with_fee_asset(Asset::luna());
    transfer_and_log(&client, params).await;
    teardown(client).await;
}

#[tokio::test]
#[ignore]
async fn transfers_eut_with_estimated_fee_luna() {
    let client = setup();
    let amount = check(asset_to_base("0.01", TERRA_DECIMAL));
    transfer_with_estimated_fee(&client, eut(), Asset::luna(), amount, "est-fee-luna").await;
    teardown(client).await;
}
