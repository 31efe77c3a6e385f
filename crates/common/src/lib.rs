pub mod error;
pub mod person;
pub mod signing;
pub mod transaction;
pub mod wire;

pub use error::{Error, Result};
pub use person::{HistoryEntry, Person};
pub use transaction::{parse_bool, Function, PersonArgs};
pub use wire::{
    new_transaction_id, CommitStatus, Creator, Endorsement, Envelope, ErrorBody, ErrorDetail,
    KvRead, KvWrite, ProposalRequest, ProposalResponse, RangeQueryInfo, ReadWriteSet,
    SubmitResponse, TxValidationCode, Version,
};
