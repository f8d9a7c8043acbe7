#![cfg(test)]

use super::*;
use soroban_sdk::{testutils::Address as _, Env};

fn setup(env: &Env) -> (PriceFeedContractClient, Address) {
    let contract_id = env.register_contract(None, PriceFeedContract);
    let client = PriceFeedContractClient::new(env, &contract_id);
    let admin = Address::generate(env);
    client.initialize(&admin);
    (client, admin)
}

#[test]
fn test_submit_and_read_rounds() {
    let env = Env::default();
    env.mock_all_auths();
    let (client, _admin) = setup(&env);

    let round_id = client.submit_round(&2_000_000i128, &100u64);
    assert_eq!(round_id, 1);

    let data = client.latest_round();
    assert_eq!(data.price, 2_000_000);
    assert_eq!(data.timestamp, 100);
    assert_eq!(data.round_id, 1);

    let round_id = client.submit_round(&2_100_000i128, &200u64);
    assert_eq!(round_id, 2);
    assert_eq!(client.latest_round().price, 2_100_000);
}

#[test]
fn test_rejects_non_increasing_timestamp() {
    let env = Env::default();
    env.mock_all_auths();
    let (client, _admin) = setup(&env);

    client.submit_round(&1_000i128, &500u64);

    let res = client.try_submit_round(&1_100i128, &500u64);
    assert_eq!(res, Err(Ok(FeedError::RoundNotNewer)));

    let res = client.try_submit_round(&1_100i128, &400u64);
    assert_eq!(res, Err(Ok(FeedError::RoundNotNewer)));
}

#[test]
fn test_rejects_non_positive_price() {
    let env = Env::default();
    env.mock_all_auths();
    let (client, _admin) = setup(&env);

    let res = client.try_submit_round(&0i128, &100u64);
    assert_eq!(res, Err(Ok(FeedError::InvalidPrice)));

    let res = client.try_submit_round(&-5i128, &100u64);
    assert_eq!(res, Err(Ok(FeedError::InvalidPrice)));
}

#[test]
fn test_latest_round_before_any_submission() {
    let env = Env::default();
    env.mock_all_auths();
    let (client, _admin) = setup(&env);

    let res = client.try_latest_round();
    assert_eq!(res, Err(Ok(FeedError::NoRound)));
}

#[test]
fn test_double_initialize_fails() {
    let env = Env::default();
    env.mock_all_auths();
    let (client, _admin) = setup(&env);

    let other = Address::generate(&env);
    let res = client.try_initialize(&other);
    assert_eq!(res, Err(Ok(FeedError::AlreadyInitialized)));
}
