#![cfg(test)]

use super::*;
use soroban_sdk::{
    contract, contractimpl, symbol_short, testutils::Address as _, vec, Env, IntoVal, Val,
};

/// Stand-in coordinator: records the request arguments, hands back a fixed
/// request id, and can later push words into a consumer the way the real
/// coordinator does (cross-contract call, invoker auth).
#[contract]
pub struct StubCoordinator;

#[contractimpl]
impl StubCoordinator {
    pub fn request_random_words(
        env: Env,
        sender: Address,
        key_hash: BytesN<32>,
        sub_id: u64,
        min_confirmations: u32,
        callback_gas_limit: u64,
        num_words: u32,
    ) -> BytesN<32> {
        env.storage().instance().set(
            &symbol_short!("last_req"),
            &(
                sender,
                key_hash,
                sub_id,
                min_confirmations,
                callback_gas_limit,
                num_words,
            ),
        );
        BytesN::from_array(&env, &[7u8; 32])
    }

    pub fn last_req(env: Env) -> Option<(Address, BytesN<32>, u64, u32, u64, u32)> {
        env.storage().instance().get(&symbol_short!("last_req"))
    }

    pub fn deliver(env: Env, consumer: Address, request_id: BytesN<32>, words: Vec<BytesN<32>>) {
        let args: Vec<Val> = (request_id, words).into_val(&env);
        env.invoke_contract::<Val>(
            &consumer,
            &Symbol::new(&env, "raw_fulfill_random_words"),
            args,
        );
    }
}

struct Setup<'a> {
    env: Env,
    consumer: VrfConsumerClient<'a>,
    consumer_id: Address,
    coordinator: StubCoordinatorClient<'a>,
    owner: Address,
}

fn setup() -> Setup<'static> {
    let env = Env::default();
    env.mock_all_auths();

    let coordinator_id = env.register_contract(None, StubCoordinator);
    let coordinator = StubCoordinatorClient::new(&env, &coordinator_id);

    let consumer_id = env.register_contract(None, VrfConsumer);
    let consumer = VrfConsumerClient::new(&env, &consumer_id);

    let owner = Address::generate(&env);
    let key_hash = BytesN::from_array(&env, &[1u8; 32]);
    consumer.initialize(&owner, &coordinator_id, &key_hash, &42u64);

    Setup {
        env,
        consumer,
        consumer_id,
        coordinator,
        owner,
    }
}

#[test]
fn test_request_forwards_subscription_and_identity() {
    let s = setup();

    let request_id = s.consumer.request(&s.owner, &3u32, &100_000u64, &2u32);
    assert_eq!(request_id, BytesN::from_array(&s.env, &[7u8; 32]));
    assert_eq!(s.consumer.last_request(), Some(request_id));

    let (sender, key_hash, sub_id, min_confs, gas_limit, num_words) =
        s.coordinator.last_req().unwrap();
    assert_eq!(sender, s.consumer_id);
    assert_eq!(key_hash, BytesN::from_array(&s.env, &[1u8; 32]));
    assert_eq!(sub_id, 42);
    assert_eq!(min_confs, 3);
    assert_eq!(gas_limit, 100_000);
    assert_eq!(num_words, 2);
}

#[test]
fn test_request_gated_to_owner() {
    let s = setup();

    let stranger = Address::generate(&s.env);
    let res = s.consumer.try_request(&stranger, &3u32, &100_000u64, &1u32);
    assert_eq!(res, Err(Ok(ConsumerError::MustBeOwner)));
}

#[test]
fn test_coordinator_delivery_stores_words() {
    let s = setup();

    let request_id = s.consumer.request(&s.owner, &1u32, &50_000u64, &2u32);

    let words = vec![
        &s.env,
        BytesN::from_array(&s.env, &[9u8; 32]),
        BytesN::from_array(&s.env, &[8u8; 32]),
    ];
    s.coordinator.deliver(&s.consumer_id, &request_id, &words);

    assert_eq!(s.consumer.random_words(&request_id), words);
}

#[test]
fn test_direct_callback_rejected_without_coordinator_auth() {
    let s = setup();
    let request_id = s.consumer.request(&s.owner, &1u32, &50_000u64, &1u32);

    // Drop the auth mocks: a direct call no longer carries the
    // coordinator's authorization and must fail.
    s.env.set_auths(&[]);
    let words = vec![&s.env, BytesN::from_array(&s.env, &[9u8; 32])];
    let res = s
        .consumer
        .try_raw_fulfill_random_words(&request_id, &words);
    assert!(res.is_err());
}

#[test]
fn test_unknown_request_lookup_fails() {
    let s = setup();
    let missing = BytesN::from_array(&s.env, &[3u8; 32]);
    assert_eq!(
        s.consumer.try_random_words(&missing),
        Err(Ok(ConsumerError::UnknownRequest))
    );
}

#[test]
fn test_double_initialize_fails() {
    let s = setup();
    let res = s.consumer.try_initialize(
        &s.owner,
        &s.consumer_id,
        &BytesN::from_array(&s.env, &[1u8; 32]),
        &1u64,
    );
    assert_eq!(res, Err(Ok(ConsumerError::AlreadyInitialized)));
}
