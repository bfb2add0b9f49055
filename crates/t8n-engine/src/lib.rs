//! # t8n-engine
//!
//! A chain engine that impersonates an execution client for conformance
//! testing. It never executes transactions: every block goes through an
//! external state-transition tool and the engine rebuilds the full block
//! from the tool's roots and receipts.
//!
//! - [`ChainStore`] - genesis plus candidate chains, fork choice by total difficulty
//! - [`HeaderAccumulator`] - header fields of the block being built
//! - [`Session`] - the RPC-shaped call surface: mining, raw import, queries
//!
//! ## Example
//!
//! ```ignore
//! use t8n_engine::{ChainParams, EngineConfig, Session};
//!
//! let config = EngineConfig::from_file("engine.toml".as_ref())?;
//! let mut session = Session::from_config(&config)?;
//! session.set_chain_params(ChainParams::from_file("genesis.json".as_ref())?)?;
//! session.mine_blocks(1)?;
//! assert_eq!(session.block_number()?, "0x01");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod accumulator;
mod config;
mod error;
mod fork;
mod import;
mod miner;
mod session;
mod store;

pub use accumulator::HeaderAccumulator;
pub use config::{ChainParams, EngineConfig, ForkParams, GenesisParams};
pub use error::{EngineError, EngineResult};
pub use session::{AccountRange, Session, StorageRange, StorageSlot};
pub use store::{Block, ChainId, ChainStore, MAX_BLOCK_REFERENCE};
