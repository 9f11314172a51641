//! Chain identifiers, network short names and default endpoints.

/// Web3Q Galileo: the low-gas-limit network with large calldata chunks.
pub const GALILEO_CHAIN_ID: u64 = 3334;
pub const ETHEREUM_CHAIN_ID: u64 = 1;
pub const GOERLI_CHAIN_ID: u64 = 5;
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;
pub const OPTIMISTIC_CHAIN_ID: u64 = 10;
pub const ARBITRUM_CHAIN_ID: u64 = 42161;
pub const OPTIMISTIC_GOERLI_CHAIN_ID: u64 = 420;
pub const ARBITRUM_GOERLI_CHAIN_ID: u64 = 421_613;
pub const EVMOS_CHAIN_ID: u64 = 9001;
pub const EVMOS_TEST_CHAIN_ID: u64 = 9000;
pub const ARBITRUM_NOVA_CHAIN_ID: u64 = 42170;
pub const BINANCE_CHAIN_ID: u64 = 56;
pub const BINANCE_TEST_CHAIN_ID: u64 = 97;
pub const AVALANCHE_CHAIN_ID: u64 = 43114;
pub const AVALANCHE_TEST_CHAIN_ID: u64 = 43113;
pub const FANTOM_CHAIN_ID: u64 = 250;
pub const FANTOM_TEST_CHAIN_ID: u64 = 4002;
pub const HARMONY_CHAIN_ID: u64 = 1_666_600_000;
pub const HARMONY_TEST_CHAIN_ID: u64 = 1_666_700_000;
pub const POLYGON_CHAIN_ID: u64 = 137;
pub const POLYGON_MUMBAI_CHAIN_ID: u64 = 80001;
pub const POLYGON_ZKEVM_TEST_CHAIN_ID: u64 = 1402;
pub const QUARKCHAIN_CHAIN_ID: u64 = 100_001;
pub const QUARKCHAIN_DEVNET_CHAIN_ID: u64 = 110_001;
pub const QUARKCHAIN_L2_DEVNET_CHAIN_ID: u64 = 42069;
pub const QUARKCHAIN_L2_TESTNET_CHAIN_ID: u64 = 43069;

/// Chain used when neither flags, short name nor RPC determine one.
pub const DEFAULT_CHAIN_ID: u64 = ETHEREUM_CHAIN_ID;

/// Default number of files uploaded concurrently.
pub const DEFAULT_THREAD_POOL_SIZE_LOW: usize = 6;

/// Default concurrency on networks with short block times.
pub const DEFAULT_THREAD_POOL_SIZE_HIGH: usize = 15;

/// EIP-3770 short names.
const NETWORK_MAPPING: &[(&str, u64)] = &[
    ("w3q-g", GALILEO_CHAIN_ID),
    ("eth", ETHEREUM_CHAIN_ID),
    ("gor", GOERLI_CHAIN_ID),
    ("sep", SEPOLIA_CHAIN_ID),
    ("oeth", OPTIMISTIC_CHAIN_ID),
    ("arb1", ARBITRUM_CHAIN_ID),
    ("ogor", OPTIMISTIC_GOERLI_CHAIN_ID),
    ("arb-goerli", ARBITRUM_GOERLI_CHAIN_ID),
    ("evmos", EVMOS_CHAIN_ID),
    ("evmos-testnet", EVMOS_TEST_CHAIN_ID),
    ("arb-nova", ARBITRUM_NOVA_CHAIN_ID),
    ("bnb", BINANCE_CHAIN_ID),
    ("bnbt", BINANCE_TEST_CHAIN_ID),
    ("avax", AVALANCHE_CHAIN_ID),
    ("fuji", AVALANCHE_TEST_CHAIN_ID),
    ("ftm", FANTOM_CHAIN_ID),
    ("tftm", FANTOM_TEST_CHAIN_ID),
    ("hmy-s0", HARMONY_CHAIN_ID),
    ("hmy-b-s0", HARMONY_TEST_CHAIN_ID),
    ("matic", POLYGON_CHAIN_ID),
    ("maticmum", POLYGON_MUMBAI_CHAIN_ID),
    ("zkevmtest", POLYGON_ZKEVM_TEST_CHAIN_ID),
    ("qkc-s0", QUARKCHAIN_CHAIN_ID),
    ("qkc-d-s0", QUARKCHAIN_DEVNET_CHAIN_ID),
];

const PROVIDER_URLS: &[(u64, &str)] = &[
    (GALILEO_CHAIN_ID, "https://galileo.web3q.io:8545"),
    (ETHEREUM_CHAIN_ID, "https://ethereum.publicnode.com"),
    (GOERLI_CHAIN_ID, "https://rpc.ankr.com/eth_goerli"),
    (SEPOLIA_CHAIN_ID, "http://88.99.30.186:8545/"),
    (OPTIMISTIC_CHAIN_ID, "https://mainnet.optimism.io"),
    (ARBITRUM_CHAIN_ID, "https://arb1.arbitrum.io/rpc"),
    (OPTIMISTIC_GOERLI_CHAIN_ID, "https://goerli.optimism.io"),
    (ARBITRUM_GOERLI_CHAIN_ID, "https://goerli-rollup.arbitrum.io/rpc"),
    (EVMOS_CHAIN_ID, "https://evmos-evm.publicnode.com"),
    (EVMOS_TEST_CHAIN_ID, "https://eth.bd.evmos.dev:8545"),
    (ARBITRUM_NOVA_CHAIN_ID, "https://nova.arbitrum.io/rpc"),
    (BINANCE_CHAIN_ID, "https://bsc-dataseed2.binance.org"),
    (BINANCE_TEST_CHAIN_ID, "https://data-seed-prebsc-1-s1.binance.org:8545"),
    (AVALANCHE_CHAIN_ID, "https://api.avax.network/ext/bc/C/rpc"),
    (AVALANCHE_TEST_CHAIN_ID, "https://avalanchetestapi.terminet.io/ext/bc/C/rpc"),
    (FANTOM_CHAIN_ID, "https://rpcapi.fantom.network"),
    (FANTOM_TEST_CHAIN_ID, "https://rpc.testnet.fantom.network"),
    (HARMONY_CHAIN_ID, "https://a.api.s0.t.hmny.io"),
    (HARMONY_TEST_CHAIN_ID, "https://api.s0.b.hmny.io"),
    (POLYGON_CHAIN_ID, "https://polygon-rpc.com"),
    (POLYGON_MUMBAI_CHAIN_ID, "https://matic-mumbai.chainstacklabs.com"),
    (POLYGON_ZKEVM_TEST_CHAIN_ID, "https://rpc.public.zkevm-test.net"),
    (QUARKCHAIN_CHAIN_ID, "https://mainnet-s0-ethapi.quarkchain.io"),
    (QUARKCHAIN_DEVNET_CHAIN_ID, "https://devnet-s0-ethapi.quarkchain.io"),
    (QUARKCHAIN_L2_DEVNET_CHAIN_ID, "http://142.132.154.16:8545"),
    (QUARKCHAIN_L2_TESTNET_CHAIN_ID, "https://rpc.testnet.l2.quarkchain.io:8545"),
];

/// Resolves an EIP-3770 short name (`eth`, `sep`, `w3q-g`, ...) to a chain id.
pub fn chain_id_for_short_name(short_name: &str) -> Option<u64> {
    NETWORK_MAPPING
        .iter()
        .find(|(name, _)| *name == short_name)
        .map(|(_, id)| *id)
}

/// Returns the built-in public RPC endpoint for a chain, if any.
pub fn default_provider_url(chain_id: u64) -> Option<&'static str> {
    PROVIDER_URLS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, url)| *url)
}

/// Default file-level concurrency for a chain.
pub fn default_thread_pool_size(chain_id: u64) -> usize {
    if chain_id == QUARKCHAIN_L2_TESTNET_CHAIN_ID {
        DEFAULT_THREAD_POOL_SIZE_HIGH
    } else {
        DEFAULT_THREAD_POOL_SIZE_LOW
    }
}
