//! Contract function names and typed transaction arguments
//!
//! Arguments cross the peer boundary as ordered strings. Everything on either
//! side of that boundary works with the typed forms defined here.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Person, Result};

/// Contract operations, addressed by their stable string names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    InitLedger,
    CreatePerson,
    ReadPerson,
    UpdatePerson,
    DeletePerson,
    PersonExists,
    GetAllPersons,
    GetPersonHistory,
}

impl Function {
    pub const ALL: [Function; 8] = [
        Function::InitLedger,
        Function::CreatePerson,
        Function::ReadPerson,
        Function::UpdatePerson,
        Function::DeletePerson,
        Function::PersonExists,
        Function::GetAllPersons,
        Function::GetPersonHistory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Function::InitLedger => "InitLedger",
            Function::CreatePerson => "CreatePerson",
            Function::ReadPerson => "ReadPerson",
            Function::UpdatePerson => "UpdatePerson",
            Function::DeletePerson => "DeletePerson",
            Function::PersonExists => "PersonExists",
            Function::GetAllPersons => "GetAllPersons",
            Function::GetPersonHistory => "GetPersonHistory",
        }
    }

    /// Read-only functions are evaluated on a single peer; the rest are
    /// submitted for endorsement, ordering and commit.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Function::ReadPerson
                | Function::PersonExists
                | Function::GetAllPersons
                | Function::GetPersonHistory
        )
    }

    /// Number of positional string arguments the function takes
    pub fn arity(&self) -> usize {
        match self {
            Function::InitLedger | Function::GetAllPersons => 0,
            Function::CreatePerson | Function::UpdatePerson => PersonArgs::ARITY,
            Function::ReadPerson
            | Function::DeletePerson
            | Function::PersonExists
            | Function::GetPersonHistory => 1,
        }
    }

    /// Check the argument count before dispatch
    pub fn check_arity(&self, args: &[String]) -> Result<()> {
        if args.len() != self.arity() {
            return Err(Error::InvalidArgument(format!(
                "{} expects {} argument(s), got {}",
                self,
                self.arity(),
                args.len()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Function {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Function::ALL
            .iter()
            .find(|f| f.as_str() == s)
            .copied()
            .ok_or_else(|| Error::UnknownFunction(s.to_string()))
    }
}

/// Positional arguments of `CreatePerson` and `UpdatePerson`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonArgs(pub Person);

impl PersonArgs {
    pub const ARITY: usize = 8;

    /// Encode as `id, serial, name, surname, city, address, phone, married`
    pub fn to_args(&self) -> Vec<String> {
        let p = &self.0;
        vec![
            p.id.clone(),
            p.serial.clone(),
            p.name.clone(),
            p.surname.clone(),
            p.city.clone(),
            p.address.clone(),
            p.phone.clone(),
            p.married.to_string(),
        ]
    }

    pub fn from_args(args: &[String]) -> Result<Self> {
        let [id, serial, name, surname, city, address, phone, married] = args else {
            return Err(Error::InvalidArgument(format!(
                "expected {} person arguments, got {}",
                Self::ARITY,
                args.len()
            )));
        };

        Ok(Self(Person {
            id: id.clone(),
            serial: serial.clone(),
            name: name.clone(),
            surname: surname.clone(),
            city: city.clone(),
            address: address.clone(),
            phone: phone.clone(),
            married: parse_bool(married)?,
        }))
    }

    pub fn into_person(self) -> Person {
        self.0
    }
}

/// Parse the literal `"true"` / `"false"` encoding used on the wire
pub fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::InvalidArgument(format!(
            "expected \"true\" or \"false\", got {:?}",
            other
        ))),
    }
}
