//! Typed passport operations over a [`Contract`]
//!
//! Arguments are encoded to their positional string form here and payloads
//! decoded to the operation's return shape, so nothing above this layer
//! handles untyped strings or bytes.

use passport_common::{Function, HistoryEntry, Person, PersonArgs};
use serde::de::DeserializeOwned;

use crate::error::GatewayError;
use crate::gateway::Contract;

pub struct PassportClient {
    contract: Contract,
}

impl PassportClient {
    pub fn new(contract: Contract) -> Self {
        Self { contract }
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub async fn init_ledger(&self) -> Result<(), GatewayError> {
        self.submit(Function::InitLedger, &[]).await
    }

    pub async fn create_person(&self, person: &Person) -> Result<(), GatewayError> {
        let args = PersonArgs(person.clone()).to_args();
        self.submit(Function::CreatePerson, &args).await
    }

    pub async fn read_person(&self, id: &str) -> Result<Person, GatewayError> {
        self.evaluate(Function::ReadPerson, &[id.to_string()]).await
    }

    /// Replace every field of the record with `person.id`
    pub async fn update_person(&self, person: &Person) -> Result<(), GatewayError> {
        let args = PersonArgs(person.clone()).to_args();
        self.submit(Function::UpdatePerson, &args).await
    }

    pub async fn delete_person(&self, id: &str) -> Result<(), GatewayError> {
        self.submit(Function::DeletePerson, &[id.to_string()]).await
    }

    pub async fn person_exists(&self, id: &str) -> Result<bool, GatewayError> {
        self.evaluate(Function::PersonExists, &[id.to_string()]).await
    }

    pub async fn get_all_persons(&self) -> Result<Vec<Person>, GatewayError> {
        self.evaluate_list(Function::GetAllPersons, &[]).await
    }

    pub async fn get_person_history(&self, id: &str) -> Result<Vec<HistoryEntry>, GatewayError> {
        self.evaluate_list(Function::GetPersonHistory, &[id.to_string()])
            .await
    }

    async fn submit(&self, function: Function, args: &[String]) -> Result<(), GatewayError> {
        self.contract
            .submit_transaction(function.as_str(), args)
            .await?;
        Ok(())
    }

    async fn evaluate<T: DeserializeOwned>(
        &self,
        function: Function,
        args: &[String],
    ) -> Result<T, GatewayError> {
        let payload = self
            .contract
            .evaluate_transaction(function.as_str(), args)
            .await?;
        Ok(serde_json::from_slice(&payload)?)
    }

    /// An empty payload is an empty list
    async fn evaluate_list<T: DeserializeOwned>(
        &self,
        function: Function,
        args: &[String],
    ) -> Result<Vec<T>, GatewayError> {
        let payload = self
            .contract
            .evaluate_transaction(function.as_str(), args)
            .await?;

        if payload.is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_slice(&payload)?)
    }
}
