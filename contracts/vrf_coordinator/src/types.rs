use soroban_sdk::{contracterror, contracttype, Address, BytesN};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum VrfError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    MustBeOwner = 3,
    MustBeSubOwner = 4,
    TooManyConsumers = 5,
    InvalidSubscription = 6,
    InvalidConsumer = 7,
    UnregisteredKeyHash = 8,
    KeyHashAlreadyRegistered = 9,
    RequestBlockConfsTooLow = 10,
    NumWordsTooBig = 11,
    /// No commitment stored for the derived request id: the request was
    /// already fulfilled or never made.
    NoCorrespondingRequest = 12,
    /// The claimed commitment fields do not hash to the stored capsule.
    IncorrectCommitment = 13,
    MustBeRegisteredOracle = 14,
    InsufficientBalance = 15,
    PaymentTooLarge = 16,
    InvalidConfig = 17,
    InvalidAmount = 18,
}

/// Coordinator-wide parameters. Replaced wholesale by `set_config`; there is
/// no partial-update path.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Minimum block depth a request must age before fulfillment.
    pub min_request_confirmations: u32,
    /// Maximum size of a subscription's consumer set.
    pub max_consumers: u32,
    /// Max age of a price-feed round before the fallback price is used.
    pub staleness_seconds: u64,
    /// Fixed gas overhead added to the oracle's measured gas to cover
    /// post-callback bookkeeping.
    pub gas_after_payment_calculation: u64,
    /// Price substituted when the feed round is stale or unusable.
    pub fallback_price: i128,
    /// Advisory floor an off-chain oracle compares against before serving a
    /// subscription. Not enforced at admission; settlement rejects with
    /// `InsufficientBalance` regardless.
    pub minimum_subscription_balance: i128,
}

/// A prepaid account funding randomness requests from its consumer set.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subscription {
    pub owner: Address,
    pub balance: i128,
    pub consumers: soroban_sdk::Vec<Address>,
}

/// The fields committed to at request time. The coordinator stores only
/// their hash; the fulfilling oracle must supply them back verbatim.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestCommitment {
    pub block_number: u32,
    pub sub_id: u64,
    pub key_hash: BytesN<32>,
    pub min_confirmations: u32,
    pub callback_gas_limit: u64,
    pub num_words: u32,
    pub sender: Address,
}

/// Ed25519 randomness proof: the oracle signs the request's pre-seed with
/// the key whose hash the request was made against.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Proof {
    pub public_key: BytesN<32>,
    pub seed: BytesN<32>,
    pub signature: BytesN<64>,
}

/// The oracle's measured execution cost for a fulfillment. Payment is
/// computed from this report rather than quoted up front.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GasReport {
    pub gas_used: u64,
    pub gas_price: i128,
}

/// Mirror of the price feed contract's round type.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriceData {
    pub price: i128,
    pub timestamp: u64,
    pub round_id: u64,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Owner,
    PaymentToken,
    PriceFeed,
    Config,
    SubCount,
    Subscription(u64),
    Nonce(Address),
    ProvingKey(BytesN<32>),
    Commitment(BytesN<32>),
    OracleBalance(Address),
}
