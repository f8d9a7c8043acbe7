#![no_std]
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env, Symbol,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum FeedError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    InvalidPrice = 3,
    RoundNotNewer = 4,
    NoRound = 5,
}

/// A single price observation. Consumers of the feed decide for themselves
/// whether `timestamp` is fresh enough to trust.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriceData {
    pub price: i128,
    pub timestamp: u64,
    pub round_id: u64,
}

const ADMIN: Symbol = symbol_short!("admin");
const ROUND: Symbol = symbol_short!("round");

/// Minimal single-submitter price feed.
///
/// The feed only records rounds; it never judges staleness. The VRF
/// coordinator reads `latest_round` and applies its own staleness window and
/// fallback price at settlement time.
#[contract]
pub struct PriceFeedContract;

#[contractimpl]
impl PriceFeedContract {
    pub fn initialize(env: Env, admin: Address) -> Result<(), FeedError> {
        if env.storage().instance().has(&ADMIN) {
            return Err(FeedError::AlreadyInitialized);
        }
        env.storage().instance().set(&ADMIN, &admin);
        Ok(())
    }

    /// Record a new round. Timestamps must be strictly increasing.
    pub fn submit_round(env: Env, price: i128, timestamp: u64) -> Result<u64, FeedError> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(FeedError::NotInitialized)?;
        admin.require_auth();

        if price <= 0 {
            return Err(FeedError::InvalidPrice);
        }

        let mut round_id: u64 = 1;
        if let Some(last) = env.storage().instance().get::<Symbol, PriceData>(&ROUND) {
            if timestamp <= last.timestamp {
                return Err(FeedError::RoundNotNewer);
            }
            round_id = last.round_id + 1;
        }

        let data = PriceData {
            price,
            timestamp,
            round_id,
        };
        env.storage().instance().set(&ROUND, &data);

        env.events()
            .publish((Symbol::new(&env, "round"), round_id), (price, timestamp));

        Ok(round_id)
    }

    pub fn latest_round(env: Env) -> Result<PriceData, FeedError> {
        env.storage()
            .instance()
            .get(&ROUND)
            .ok_or(FeedError::NoRound)
    }
}

mod test;
