use crate::types::{Config, DataKey, Subscription, VrfError};
use soroban_sdk::{Address, BytesN, Env};

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Owner)
}

pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&DataKey::Owner, owner);
}

pub fn get_owner(env: &Env) -> Result<Address, VrfError> {
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .ok_or(VrfError::NotInitialized)
}

pub fn set_payment_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::PaymentToken, token);
}

pub fn get_payment_token(env: &Env) -> Result<Address, VrfError> {
    env.storage()
        .instance()
        .get(&DataKey::PaymentToken)
        .ok_or(VrfError::NotInitialized)
}

pub fn set_price_feed(env: &Env, feed: &Address) {
    env.storage().instance().set(&DataKey::PriceFeed, feed);
}

pub fn get_price_feed(env: &Env) -> Result<Address, VrfError> {
    env.storage()
        .instance()
        .get(&DataKey::PriceFeed)
        .ok_or(VrfError::NotInitialized)
}

pub fn set_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn get_config(env: &Env) -> Result<Config, VrfError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(VrfError::NotInitialized)
}

/// Allocate the next subscription id. Ids start at 1 and are never reused,
/// which is what makes a cancelled id permanently invalid.
pub fn next_subscription_id(env: &Env) -> u64 {
    let count: u64 = env
        .storage()
        .instance()
        .get(&DataKey::SubCount)
        .unwrap_or(0);
    let id = count + 1;
    env.storage().instance().set(&DataKey::SubCount, &id);
    id
}

pub fn get_subscription(env: &Env, sub_id: u64) -> Option<Subscription> {
    env.storage()
        .persistent()
        .get(&DataKey::Subscription(sub_id))
}

pub fn set_subscription(env: &Env, sub_id: u64, sub: &Subscription) {
    env.storage()
        .persistent()
        .set(&DataKey::Subscription(sub_id), sub);
}

pub fn remove_subscription(env: &Env, sub_id: u64) {
    env.storage()
        .persistent()
        .remove(&DataKey::Subscription(sub_id));
}

pub fn get_nonce(env: &Env, sender: &Address) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::Nonce(sender.clone()))
        .unwrap_or(0)
}

pub fn set_nonce(env: &Env, sender: &Address, nonce: u64) {
    env.storage()
        .persistent()
        .set(&DataKey::Nonce(sender.clone()), &nonce);
}

pub fn has_proving_key(env: &Env, key_hash: &BytesN<32>) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::ProvingKey(key_hash.clone()))
}

pub fn get_proving_key(env: &Env, key_hash: &BytesN<32>) -> Option<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::ProvingKey(key_hash.clone()))
}

pub fn set_proving_key(env: &Env, key_hash: &BytesN<32>, oracle: &Address) {
    env.storage()
        .persistent()
        .set(&DataKey::ProvingKey(key_hash.clone()), oracle);
}

pub fn get_commitment(env: &Env, request_id: &BytesN<32>) -> Option<BytesN<32>> {
    env.storage()
        .persistent()
        .get(&DataKey::Commitment(request_id.clone()))
}

pub fn set_commitment(env: &Env, request_id: &BytesN<32>, commitment: &BytesN<32>) {
    env.storage()
        .persistent()
        .set(&DataKey::Commitment(request_id.clone()), commitment);
}

pub fn remove_commitment(env: &Env, request_id: &BytesN<32>) {
    env.storage()
        .persistent()
        .remove(&DataKey::Commitment(request_id.clone()));
}

pub fn get_oracle_balance(env: &Env, oracle: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::OracleBalance(oracle.clone()))
        .unwrap_or(0)
}

pub fn set_oracle_balance(env: &Env, oracle: &Address, amount: i128) {
    env.storage()
        .persistent()
        .set(&DataKey::OracleBalance(oracle.clone()), &amount);
}
