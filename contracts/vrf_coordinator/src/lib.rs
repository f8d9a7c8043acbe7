#![no_std]

//! Subscription-funded VRF request/fulfillment coordinator.
//!
//! Consumer contracts draw on a prepaid subscription to request random words.
//! An off-chain oracle watches `rand_requested` events, signs the request's
//! pre-seed with its registered Ed25519 key and submits the proof back
//! through `fulfill_random_words`, which verifies the proof, delivers the
//! words to the consumer in an isolated sub-call and settles payment from the
//! subscription balance at the measured gas cost.

use soroban_sdk::{
    contract, contractimpl, token, xdr::ToXdr, Address, Bytes, BytesN, Env, IntoVal, Symbol, Val,
    Vec,
};

mod storage;
mod types;

pub use types::{Config, GasReport, PriceData, Proof, RequestCommitment, Subscription, VrfError};

/// Hard cap on words per request, independent of configuration.
pub const MAX_NUM_WORDS: u32 = 500;

/// Price feed rates are fixed-point with 7 decimal places.
pub const RATE_SCALE: i128 = 10_000_000;

#[contract]
pub struct VrfCoordinator;

#[contractimpl]
impl VrfCoordinator {
    pub fn initialize(
        env: Env,
        owner: Address,
        payment_token: Address,
        price_feed: Address,
        config: Config,
    ) -> Result<(), VrfError> {
        if storage::is_initialized(&env) {
            return Err(VrfError::AlreadyInitialized);
        }
        validate_config(&config)?;

        storage::set_owner(&env, &owner);
        storage::set_payment_token(&env, &payment_token);
        storage::set_price_feed(&env, &price_feed);
        storage::set_config(&env, &config);

        env.events().publish(
            (Symbol::new(&env, "initialized"),),
            (owner, payment_token, price_feed),
        );
        Ok(())
    }

    /// Replace the whole configuration. There is no field-level update, so
    /// concurrent requests can never observe a half-applied configuration.
    pub fn set_config(env: Env, caller: Address, config: Config) -> Result<(), VrfError> {
        caller.require_auth();
        if caller != storage::get_owner(&env)? {
            return Err(VrfError::MustBeOwner);
        }
        validate_config(&config)?;
        storage::set_config(&env, &config);

        env.events()
            .publish((Symbol::new(&env, "config_set"),), config);
        Ok(())
    }

    pub fn get_config(env: Env) -> Result<Config, VrfError> {
        storage::get_config(&env)
    }

    // ───────────── SUBSCRIPTIONS ─────────────

    pub fn create_subscription(
        env: Env,
        owner: Address,
        consumers: Vec<Address>,
    ) -> Result<u64, VrfError> {
        owner.require_auth();
        let config = storage::get_config(&env)?;
        if consumers.len() > config.max_consumers {
            return Err(VrfError::TooManyConsumers);
        }

        let sub_id = storage::next_subscription_id(&env);
        let sub = Subscription {
            owner: owner.clone(),
            balance: 0,
            consumers: consumers.clone(),
        };
        storage::set_subscription(&env, sub_id, &sub);

        env.events().publish(
            (Symbol::new(&env, "sub_created"), sub_id),
            (owner, consumers),
        );
        Ok(sub_id)
    }

    /// Add funds to a subscription. Deliberately not owner-gated: anyone may
    /// top up anyone's subscription.
    pub fn fund_subscription(
        env: Env,
        from: Address,
        sub_id: u64,
        amount: i128,
    ) -> Result<(), VrfError> {
        from.require_auth();
        if amount <= 0 {
            return Err(VrfError::InvalidAmount);
        }
        let mut sub =
            storage::get_subscription(&env, sub_id).ok_or(VrfError::InvalidSubscription)?;

        let token = storage::get_payment_token(&env)?;
        token::Client::new(&env, &token).transfer(&from, &env.current_contract_address(), &amount);

        let old_balance = sub.balance;
        sub.balance = old_balance
            .checked_add(amount)
            .ok_or(VrfError::InvalidAmount)?;
        storage::set_subscription(&env, sub_id, &sub);

        env.events().publish(
            (Symbol::new(&env, "sub_funded"), sub_id),
            (old_balance, sub.balance),
        );
        Ok(())
    }

    pub fn withdraw(
        env: Env,
        caller: Address,
        sub_id: u64,
        to: Address,
        amount: i128,
    ) -> Result<(), VrfError> {
        caller.require_auth();
        if amount <= 0 {
            return Err(VrfError::InvalidAmount);
        }
        let mut sub =
            storage::get_subscription(&env, sub_id).ok_or(VrfError::InvalidSubscription)?;
        if caller != sub.owner {
            return Err(VrfError::MustBeSubOwner);
        }
        if amount > sub.balance {
            return Err(VrfError::InsufficientBalance);
        }

        let old_balance = sub.balance;
        sub.balance = old_balance - amount;
        storage::set_subscription(&env, sub_id, &sub);

        let token = storage::get_payment_token(&env)?;
        token::Client::new(&env, &token).transfer(&env.current_contract_address(), &to, &amount);

        env.events().publish(
            (Symbol::new(&env, "sub_withdrawn"), sub_id),
            (old_balance, sub.balance),
        );
        Ok(())
    }

    /// Replace the consumer set wholesale. Membership is the only
    /// authorization state a request is checked against, so replacing the
    /// whole set leaves no incremental-update edge cases.
    pub fn update_consumers(
        env: Env,
        caller: Address,
        sub_id: u64,
        consumers: Vec<Address>,
    ) -> Result<(), VrfError> {
        caller.require_auth();
        let config = storage::get_config(&env)?;
        let mut sub =
            storage::get_subscription(&env, sub_id).ok_or(VrfError::InvalidSubscription)?;
        if caller != sub.owner {
            return Err(VrfError::MustBeSubOwner);
        }
        if consumers.len() > config.max_consumers {
            return Err(VrfError::TooManyConsumers);
        }

        sub.consumers = consumers;
        storage::set_subscription(&env, sub_id, &sub);
        Ok(())
    }

    /// Cancel a subscription, paying the residual balance to `to`. The id is
    /// never reused. Commitments already issued against the subscription
    /// stay stored; their fulfillment fails with `InvalidSubscription`.
    pub fn cancel_subscription(
        env: Env,
        caller: Address,
        sub_id: u64,
        to: Address,
    ) -> Result<(), VrfError> {
        caller.require_auth();
        let sub = storage::get_subscription(&env, sub_id).ok_or(VrfError::InvalidSubscription)?;
        if caller != sub.owner {
            return Err(VrfError::MustBeSubOwner);
        }

        let amount = sub.balance;
        storage::remove_subscription(&env, sub_id);

        if amount > 0 {
            let token = storage::get_payment_token(&env)?;
            token::Client::new(&env, &token).transfer(
                &env.current_contract_address(),
                &to,
                &amount,
            );
        }

        env.events().publish(
            (Symbol::new(&env, "sub_canceled"), sub_id),
            (to, amount),
        );
        Ok(())
    }

    pub fn get_subscription(env: Env, sub_id: u64) -> Result<Subscription, VrfError> {
        storage::get_subscription(&env, sub_id).ok_or(VrfError::InvalidSubscription)
    }

    // ───────────── PROVING KEYS ─────────────

    /// Register an oracle's proving key. The registry is append-only: a key
    /// hash can never be repointed, only superseded by a new registration.
    pub fn register_proving_key(
        env: Env,
        caller: Address,
        oracle: Address,
        public_key: BytesN<32>,
    ) -> Result<BytesN<32>, VrfError> {
        caller.require_auth();
        if caller != storage::get_owner(&env)? {
            return Err(VrfError::MustBeOwner);
        }

        let key_hash = hash_key(&env, &public_key);
        if storage::has_proving_key(&env, &key_hash) {
            return Err(VrfError::KeyHashAlreadyRegistered);
        }
        storage::set_proving_key(&env, &key_hash, &oracle);

        env.events().publish(
            (Symbol::new(&env, "key_registered"), key_hash.clone()),
            oracle,
        );
        Ok(key_hash)
    }

    /// Pure key-hash derivation, callable before registration.
    pub fn hash_of_key(env: Env, public_key: BytesN<32>) -> BytesN<32> {
        hash_key(&env, &public_key)
    }

    // ───────────── REQUEST ISSUER ─────────────

    /// Request `num_words` random words, billed to `sub_id` at fulfillment
    /// time. No balance is checked or reserved here: the true cost is only
    /// known after the callback runs.
    ///
    /// Admission checks run in a fixed order; the first failure reports.
    pub fn request_random_words(
        env: Env,
        sender: Address,
        key_hash: BytesN<32>,
        sub_id: u64,
        min_confirmations: u32,
        callback_gas_limit: u64,
        num_words: u32,
    ) -> Result<BytesN<32>, VrfError> {
        sender.require_auth();
        let config = storage::get_config(&env)?;

        if !storage::has_proving_key(&env, &key_hash) {
            return Err(VrfError::UnregisteredKeyHash);
        }
        let sub = storage::get_subscription(&env, sub_id).ok_or(VrfError::InvalidSubscription)?;
        if !sub.consumers.contains(&sender) {
            return Err(VrfError::InvalidConsumer);
        }
        if min_confirmations < config.min_request_confirmations {
            return Err(VrfError::RequestBlockConfsTooLow);
        }
        if num_words > MAX_NUM_WORDS {
            return Err(VrfError::NumWordsTooBig);
        }

        let nonce = storage::get_nonce(&env, &sender) + 1;
        storage::set_nonce(&env, &sender, nonce);

        let pre_seed = derive_pre_seed(&env, &key_hash, &sender, nonce);
        let request_id = derive_request_id(&env, &key_hash, &pre_seed);

        let rc = RequestCommitment {
            block_number: env.ledger().sequence(),
            sub_id,
            key_hash: key_hash.clone(),
            min_confirmations,
            callback_gas_limit,
            num_words,
            sender: sender.clone(),
        };
        let commitment = commitment_hash(&env, &request_id, &rc);
        storage::set_commitment(&env, &request_id, &commitment);

        env.events().publish(
            (Symbol::new(&env, "rand_requested"), key_hash, sub_id),
            (
                request_id.clone(),
                pre_seed,
                min_confirmations,
                callback_gas_limit,
                num_words,
                sender,
            ),
        );
        Ok(request_id)
    }

    // ───────────── FULFILLMENT SETTLER ─────────────

    /// Fulfill an outstanding request.
    ///
    /// The stored commitment is the mutual-exclusion primitive: it is looked
    /// up first (absent means already fulfilled or never requested) and
    /// deleted only once settlement has fully succeeded, so exactly one
    /// fulfillment per request id can ever settle. A failed proof or an
    /// underfunded subscription aborts the call with no state change, leaving
    /// the commitment intact for a retry.
    ///
    /// The consumer callback runs through `try_invoke_contract`: its failure
    /// is captured as `success = false` and never rolls back settlement. The
    /// oracle has already done the off-chain work and is paid either way.
    pub fn fulfill_random_words(
        env: Env,
        oracle: Address,
        proof: Proof,
        rc: RequestCommitment,
        gas: GasReport,
    ) -> Result<i128, VrfError> {
        oracle.require_auth();
        let config = storage::get_config(&env)?;

        let key_hash = hash_key(&env, &proof.public_key);
        let registered =
            storage::get_proving_key(&env, &key_hash).ok_or(VrfError::UnregisteredKeyHash)?;
        if registered != oracle {
            return Err(VrfError::MustBeRegisteredOracle);
        }

        let request_id = derive_request_id(&env, &key_hash, &proof.seed);
        let stored =
            storage::get_commitment(&env, &request_id).ok_or(VrfError::NoCorrespondingRequest)?;
        if stored != commitment_hash(&env, &request_id, &rc) {
            return Err(VrfError::IncorrectCommitment);
        }

        // Proof verification. Traps on an invalid signature, which unwinds
        // the whole call without touching storage; the commitment survives
        // for a later valid attempt.
        let seed_bytes = Bytes::from_array(&env, &proof.seed.to_array());
        env.crypto()
            .ed25519_verify(&proof.public_key, &seed_bytes, &proof.signature);

        let output_seed = hash_bytes(&env, &Bytes::from_array(&env, &proof.signature.to_array()));
        let words = expand_random_words(&env, &output_seed, rc.num_words);

        // A cancelled subscription fails settlement the same way an unknown
        // one does.
        let mut sub =
            storage::get_subscription(&env, rc.sub_id).ok_or(VrfError::InvalidSubscription)?;

        let success = deliver_callback(&env, &rc.sender, &request_id, &words);

        let rate = resolve_rate(&env, &config);
        let payment = calculate_payment(&gas, config.gas_after_payment_calculation, rate)?;
        if payment > sub.balance {
            return Err(VrfError::InsufficientBalance);
        }

        sub.balance -= payment;
        storage::set_subscription(&env, rc.sub_id, &sub);
        storage::remove_commitment(&env, &request_id);

        let withdrawable = storage::get_oracle_balance(&env, &oracle)
            .checked_add(payment)
            .ok_or(VrfError::PaymentTooLarge)?;
        storage::set_oracle_balance(&env, &oracle, withdrawable);

        env.events().publish(
            (Symbol::new(&env, "rand_fulfilled"), request_id),
            (output_seed, payment, success),
        );
        Ok(payment)
    }

    /// Withdraw earned fulfillment payments to `to`.
    pub fn oracle_withdraw(
        env: Env,
        oracle: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), VrfError> {
        oracle.require_auth();
        if amount <= 0 {
            return Err(VrfError::InvalidAmount);
        }
        let balance = storage::get_oracle_balance(&env, &oracle);
        if amount > balance {
            return Err(VrfError::InsufficientBalance);
        }
        storage::set_oracle_balance(&env, &oracle, balance - amount);

        let token = storage::get_payment_token(&env)?;
        token::Client::new(&env, &token).transfer(&env.current_contract_address(), &to, &amount);
        Ok(())
    }

    pub fn get_oracle_withdrawable(env: Env, oracle: Address) -> i128 {
        storage::get_oracle_balance(&env, &oracle)
    }
}

fn validate_config(config: &Config) -> Result<(), VrfError> {
    if config.fallback_price <= 0 || config.minimum_subscription_balance < 0 {
        return Err(VrfError::InvalidConfig);
    }
    Ok(())
}

fn hash_bytes(env: &Env, bytes: &Bytes) -> BytesN<32> {
    env.crypto().sha256(bytes).into()
}

fn hash_key(env: &Env, public_key: &BytesN<32>) -> BytesN<32> {
    hash_bytes(env, &Bytes::from_array(env, &public_key.to_array()))
}

/// `sha256(key_hash ‖ xdr(sender) ‖ be(nonce))` — the seed handed to the
/// oracle, binding the request to its key, sender and per-sender sequence.
fn derive_pre_seed(env: &Env, key_hash: &BytesN<32>, sender: &Address, nonce: u64) -> BytesN<32> {
    let mut data = Bytes::new(env);
    data.extend_from_array(&key_hash.to_array());
    data.append(&sender.clone().to_xdr(env));
    data.extend_from_array(&nonce.to_be_bytes());
    hash_bytes(env, &data)
}

fn derive_request_id(env: &Env, key_hash: &BytesN<32>, pre_seed: &BytesN<32>) -> BytesN<32> {
    let mut data = Bytes::new(env);
    data.extend_from_array(&key_hash.to_array());
    data.extend_from_array(&pre_seed.to_array());
    hash_bytes(env, &data)
}

fn commitment_hash(env: &Env, request_id: &BytesN<32>, rc: &RequestCommitment) -> BytesN<32> {
    let mut data = Bytes::new(env);
    data.extend_from_array(&request_id.to_array());
    data.extend_from_array(&rc.block_number.to_be_bytes());
    data.extend_from_array(&rc.sub_id.to_be_bytes());
    data.extend_from_array(&rc.key_hash.to_array());
    data.extend_from_array(&rc.min_confirmations.to_be_bytes());
    data.extend_from_array(&rc.callback_gas_limit.to_be_bytes());
    data.extend_from_array(&rc.num_words.to_be_bytes());
    data.append(&rc.sender.clone().to_xdr(env));
    hash_bytes(env, &data)
}

/// `word[i] = sha256(output_seed ‖ be(i))`.
fn expand_random_words(env: &Env, output_seed: &BytesN<32>, num_words: u32) -> Vec<BytesN<32>> {
    let mut words = Vec::new(env);
    for i in 0..num_words {
        let mut data = Bytes::new(env);
        data.extend_from_array(&output_seed.to_array());
        data.extend_from_array(&i.to_be_bytes());
        words.push_back(hash_bytes(env, &data));
    }
    words
}

/// Invoke the consumer's callback, converting any failure into `false`.
/// A revert, trap or resource exhaustion inside the consumer rolls back the
/// sub-call only; the coordinator's own pending writes are unaffected.
fn deliver_callback(
    env: &Env,
    sender: &Address,
    request_id: &BytesN<32>,
    words: &Vec<BytesN<32>>,
) -> bool {
    let func = Symbol::new(env, "raw_fulfill_random_words");
    let args: soroban_sdk::Vec<Val> = (request_id.clone(), words.clone()).into_val(env);
    env.try_invoke_contract::<Val, soroban_sdk::Error>(sender, &func, args)
        .is_ok()
}

/// Current payment-token-per-gas-unit exchange rate. The feed's latest round
/// is used unless it is older than the configured staleness window or
/// otherwise unusable, in which case the fallback price substitutes.
fn resolve_rate(env: &Env, config: &Config) -> i128 {
    let feed = match storage::get_price_feed(env) {
        Ok(feed) => feed,
        Err(_) => return config.fallback_price,
    };
    let func = Symbol::new(env, "latest_round");
    let round =
        env.try_invoke_contract::<PriceData, soroban_sdk::Error>(&feed, &func, Vec::new(env));
    match round {
        Ok(Ok(data)) => {
            let now = env.ledger().timestamp();
            // A window that overflows u64 can never be exceeded.
            let fresh = data
                .timestamp
                .checked_add(config.staleness_seconds)
                .map_or(true, |deadline| now <= deadline);
            if data.price > 0 && fresh {
                data.price
            } else {
                config.fallback_price
            }
        }
        _ => config.fallback_price,
    }
}

/// `payment = (gas_used + overhead) × gas_price × RATE_SCALE / rate`, all in
/// checked i128 arithmetic. `rate` is positive by construction.
fn calculate_payment(gas: &GasReport, overhead: u64, rate: i128) -> Result<i128, VrfError> {
    if gas.gas_price < 0 {
        return Err(VrfError::InvalidAmount);
    }
    let total_gas = gas
        .gas_used
        .checked_add(overhead)
        .ok_or(VrfError::PaymentTooLarge)?;
    let native_cost = (total_gas as i128)
        .checked_mul(gas.gas_price)
        .ok_or(VrfError::PaymentTooLarge)?;
    let scaled = native_cost
        .checked_mul(RATE_SCALE)
        .ok_or(VrfError::PaymentTooLarge)?;
    Ok(scaled / rate)
}
