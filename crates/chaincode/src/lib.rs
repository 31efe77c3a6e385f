//! Passport Chaincode
//!
//! Record lifecycle and query logic for person/passport records. Runs inside
//! the peer against a per-transaction view of the world state.
//!
//! **Components:**
//! - `stub`: world state interface seen by the contract, with scoped cursors
//! - `contract`: the eight contract operations and string-argument dispatch
//! - `mock`: in-memory stub for tests and local experiments

pub mod contract;
pub mod mock;
pub mod stub;

pub use contract::PassportContract;
pub use mock::MockStub;
pub use stub::{
    ChaincodeStub, HistoryQueryIterator, KeyModification, KeyValue, QueryCursor,
    StateQueryIterator,
};
