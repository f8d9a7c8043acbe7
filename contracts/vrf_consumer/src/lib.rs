#![no_std]

//! Reference VRF consumer.
//!
//! Requests random words from the coordinator against a pre-funded
//! subscription and receives them through `raw_fulfill_random_words`. The
//! callback is gated on the coordinator's invoker auth, so only the
//! coordinator's own cross-contract call can deliver words.

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, Address, BytesN, Env, IntoVal, Symbol,
    Vec,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ConsumerError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    MustBeOwner = 3,
    UnknownRequest = 4,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Owner,
    Coordinator,
    KeyHash,
    SubId,
    LastRequest,
    Words(BytesN<32>),
}

#[contract]
pub struct VrfConsumer;

#[contractimpl]
impl VrfConsumer {
    pub fn initialize(
        env: Env,
        owner: Address,
        coordinator: Address,
        key_hash: BytesN<32>,
        sub_id: u64,
    ) -> Result<(), ConsumerError> {
        if env.storage().instance().has(&DataKey::Owner) {
            return Err(ConsumerError::AlreadyInitialized);
        }
        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage()
            .instance()
            .set(&DataKey::Coordinator, &coordinator);
        env.storage().instance().set(&DataKey::KeyHash, &key_hash);
        env.storage().instance().set(&DataKey::SubId, &sub_id);
        Ok(())
    }

    /// Ask the coordinator for random words. This contract is the sender the
    /// coordinator checks against the subscription's consumer set.
    pub fn request(
        env: Env,
        caller: Address,
        min_confirmations: u32,
        callback_gas_limit: u64,
        num_words: u32,
    ) -> Result<BytesN<32>, ConsumerError> {
        caller.require_auth();
        let owner: Address = env
            .storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(ConsumerError::NotInitialized)?;
        if caller != owner {
            return Err(ConsumerError::MustBeOwner);
        }

        let coordinator: Address = env.storage().instance().get(&DataKey::Coordinator).unwrap();
        let key_hash: BytesN<32> = env.storage().instance().get(&DataKey::KeyHash).unwrap();
        let sub_id: u64 = env.storage().instance().get(&DataKey::SubId).unwrap();

        let args = (
            env.current_contract_address(),
            key_hash,
            sub_id,
            min_confirmations,
            callback_gas_limit,
            num_words,
        );
        let request_id: BytesN<32> = env.invoke_contract(
            &coordinator,
            &Symbol::new(&env, "request_random_words"),
            args.into_val(&env),
        );

        env.storage()
            .instance()
            .set(&DataKey::LastRequest, &request_id);
        Ok(request_id)
    }

    /// Fulfillment callback. Only the coordinator's own cross-contract call
    /// satisfies the invoker auth check.
    pub fn raw_fulfill_random_words(
        env: Env,
        request_id: BytesN<32>,
        random_words: Vec<BytesN<32>>,
    ) -> Result<(), ConsumerError> {
        let coordinator: Address = env
            .storage()
            .instance()
            .get(&DataKey::Coordinator)
            .ok_or(ConsumerError::NotInitialized)?;
        coordinator.require_auth();

        env.storage()
            .persistent()
            .set(&DataKey::Words(request_id), &random_words);
        Ok(())
    }

    pub fn last_request(env: Env) -> Option<BytesN<32>> {
        env.storage().instance().get(&DataKey::LastRequest)
    }

    pub fn random_words(env: Env, request_id: BytesN<32>) -> Result<Vec<BytesN<32>>, ConsumerError> {
        env.storage()
            .persistent()
            .get(&DataKey::Words(request_id))
            .ok_or(ConsumerError::UnknownRequest)
    }
}

mod test;
