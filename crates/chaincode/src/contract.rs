//! Person record contract
//!
//! Stateless business logic over a [`ChaincodeStub`]. Every precondition
//! failure aborts the transaction before any write, so a failed invocation
//! leaves the world state untouched.

use passport_common::{Error, Function, HistoryEntry, Person, PersonArgs, Result};
use tracing::debug;

use crate::stub::ChaincodeStub;

/// The passport contract
#[derive(Debug, Clone, Copy, Default)]
pub struct PassportContract;

impl PassportContract {
    pub fn new() -> Self {
        Self
    }

    /// Dispatch a named function with string arguments and serialize its result.
    ///
    /// Unit results produce an empty payload, `PersonExists` produces
    /// `true`/`false`, queries produce JSON.
    pub fn invoke(
        &self,
        stub: &mut dyn ChaincodeStub,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>> {
        let function: Function = function.parse()?;
        function.check_arity(args)?;

        debug!("Invoking {} in tx {}", function, stub.tx_id());

        match function {
            Function::InitLedger => {
                self.init_ledger(stub)?;
                Ok(Vec::new())
            }
            Function::CreatePerson => {
                self.create_person(stub, PersonArgs::from_args(args)?.into_person())?;
                Ok(Vec::new())
            }
            Function::ReadPerson => Ok(serde_json::to_vec(&self.read_person(stub, &args[0])?)?),
            Function::UpdatePerson => {
                self.update_person(stub, PersonArgs::from_args(args)?.into_person())?;
                Ok(Vec::new())
            }
            Function::DeletePerson => {
                self.delete_person(stub, &args[0])?;
                Ok(Vec::new())
            }
            Function::PersonExists => Ok(serde_json::to_vec(&self.person_exists(stub, &args[0])?)?),
            Function::GetAllPersons => Ok(serde_json::to_vec(&self.get_all_persons(stub)?)?),
            Function::GetPersonHistory => {
                Ok(serde_json::to_vec(&self.get_person_history(stub, &args[0])?)?)
            }
        }
    }

    /// Seed the two example records.
    ///
    /// Fails with `AlreadyExists` if any seed ID is present; nothing is written
    /// in that case.
    pub fn init_ledger(&self, stub: &mut dyn ChaincodeStub) -> Result<()> {
        let persons = Person::seed();

        for person in &persons {
            if self.person_exists(stub, &person.id)? {
                return Err(Error::AlreadyExists(person.id.clone()));
            }
        }

        for person in &persons {
            stub.put_state(&person.id, person.to_bytes()?)?;
        }

        debug!("Seeded {} persons", persons.len());
        Ok(())
    }

    pub fn create_person(&self, stub: &mut dyn ChaincodeStub, person: Person) -> Result<()> {
        if self.person_exists(stub, &person.id)? {
            return Err(Error::AlreadyExists(person.id));
        }

        stub.put_state(&person.id, person.to_bytes()?)
    }

    pub fn read_person(&self, stub: &mut dyn ChaincodeStub, id: &str) -> Result<Person> {
        match stub.get_state(id)? {
            Some(bytes) => Person::from_bytes(&bytes),
            None => Err(Error::NotFound(id.to_string())),
        }
    }

    /// Overwrite every field of an existing record
    pub fn update_person(&self, stub: &mut dyn ChaincodeStub, person: Person) -> Result<()> {
        if !self.person_exists(stub, &person.id)? {
            return Err(Error::NotFound(person.id));
        }

        stub.put_state(&person.id, person.to_bytes()?)
    }

    pub fn delete_person(&self, stub: &mut dyn ChaincodeStub, id: &str) -> Result<()> {
        if !self.person_exists(stub, id)? {
            return Err(Error::NotFound(id.to_string()));
        }

        stub.del_state(id)
    }

    pub fn person_exists(&self, stub: &mut dyn ChaincodeStub, id: &str) -> Result<bool> {
        Ok(stub.get_state(id)?.is_some())
    }

    /// Every record, in the platform's key iteration order
    pub fn get_all_persons(&self, stub: &mut dyn ChaincodeStub) -> Result<Vec<Person>> {
        let cursor = stub.get_state_by_range("", "")?;

        let mut persons = Vec::new();
        for kv in cursor {
            let kv = kv?;
            persons.push(Person::from_bytes(&kv.value)?);
        }

        Ok(persons)
    }

    /// Change log of a record, oldest first.
    ///
    /// Only reachable while the record currently exists.
    pub fn get_person_history(
        &self,
        stub: &mut dyn ChaincodeStub,
        id: &str,
    ) -> Result<Vec<HistoryEntry>> {
        if !self.person_exists(stub, id)? {
            return Err(Error::NotFound(id.to_string()));
        }

        let cursor = stub.get_history_for_key(id)?;

        let mut history = Vec::new();
        for modification in cursor {
            let modification = modification?;
            let data = if modification.is_delete {
                None
            } else {
                Some(Person::from_bytes(&modification.value)?)
            };

            history.push(HistoryEntry {
                tx: modification.tx_id,
                timestamp: modification.timestamp,
                data,
            });
        }

        Ok(history)
    }
}
