//! Chain access: the [`ChainReader`] interface, its JSON-RPC implementation and the HTTP
//! transport with endpoint failover underneath it.

mod client;
mod clients;
mod error;
mod transports;

pub use client::ChainReader;
pub use clients::EvmClient;
pub use error::BlockChainError;
pub use transports::{
	BlockchainTransport, EndpointManager, HttpTransportClient, RotatingTransport,
	TransientErrorRetryStrategy, TransportError, ROTATE_ON_ERROR_CODES,
};
