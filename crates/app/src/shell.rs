//! Interactive menu over the passport client
//!
//! One operation runs at a time. A failed operation is reported and the
//! shell returns to the menu; nothing is retried.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

use passport_common::Person;
use passport_gateway::{GatewayError, PassportClient};
use thiserror::Error;
use tracing::warn;

use crate::prompt::Prompter;
use crate::render::{describe_error, pretty};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

const HELP: &str = "\
1 - create
2 - getAll
3 - getByID
4 - update
5 - getHistory
6 - delete
9 - exit";

pub struct Shell<'a, R, W> {
    client: &'a PassportClient,
    prompt: Prompter<R, W>,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(client: &'a PassportClient, input: R, output: W) -> Self {
        Self {
            client,
            prompt: Prompter::new(input, output),
        }
    }

    pub fn into_output(self) -> W {
        self.prompt.into_output()
    }

    /// Run the menu until `9` or end of input
    pub async fn run(&mut self) -> Result<(), ShellError> {
        self.say(HELP)?;

        loop {
            let cmd = match self.prompt.ask("\ncmd: ") {
                Ok(cmd) => cmd,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
                Err(e) => return Err(e.into()),
            };

            let result = match cmd.as_str() {
                "1" => self.create().await,
                "2" => self.list().await,
                "3" => self.read().await,
                "4" => self.update().await,
                "5" => self.history().await,
                "6" => self.delete().await,
                "9" => return Ok(()),
                _ => {
                    self.say("Unknown cmd! Try one more time")?;
                    self.say(HELP)?;
                    continue;
                }
            };

            match result {
                Ok(()) => {}
                Err(ShellError::Gateway(err)) => self.report(&err)?,
                Err(ShellError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Ok(())
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Print a gateway failure with its detail lines
    pub fn report(&mut self, err: &GatewayError) -> io::Result<()> {
        warn!("{} call failed: {}", err.kind(), err);
        self.say(describe_error(err))
    }

    pub async fn init(&mut self) -> Result<(), ShellError> {
        self.say("Submit Transaction: InitLedger, seeds the example records")?;
        self.client.init_ledger().await?;
        self.say("*** Transaction committed successfully")?;
        Ok(())
    }

    pub async fn list(&mut self) -> Result<(), ShellError> {
        self.say("Evaluate Transaction: GetAllPersons, returns every record on the ledger")?;
        let persons = self.client.get_all_persons().await?;

        if persons.is_empty() {
            self.say("database is empty!")?;
        } else {
            self.say(format!("*** Result:\n{}", pretty(&persons)?))?;
        }
        Ok(())
    }

    pub async fn show(&mut self, id: &str) -> Result<(), ShellError> {
        let person = self.client.read_person(id).await?;
        self.say(pretty(&person)?)?;
        Ok(())
    }

    pub async fn show_history(&mut self, id: &str) -> Result<(), ShellError> {
        self.say("Evaluate Transaction: GetPersonHistory, returns the change log of a record")?;
        let history = self.client.get_person_history(id).await?;
        self.say(format!("*** Result:\n{}", pretty(&history)?))?;
        Ok(())
    }

    pub async fn remove(&mut self, id: &str) -> Result<(), ShellError> {
        self.say("Committing to blockchain...")?;
        self.client.delete_person(id).await?;
        self.say("*** Transaction committed successfully")?;
        Ok(())
    }

    async fn create(&mut self) -> Result<(), ShellError> {
        self.say("Input Person Data to Create.")?;

        let id = loop {
            let id = self.prompt.required("Id: ")?;
            if !self.client.person_exists(&id).await? {
                break id;
            }
            self.say("Person with this ID already exists! Try another")?;
        };

        let person = Person {
            id,
            serial: self.prompt.required("Serial: ")?,
            name: self.prompt.required("Name: ")?,
            surname: self.prompt.required("Surname: ")?,
            city: self.prompt.required("City: ")?,
            address: self.prompt.required("Address: ")?,
            phone: self.prompt.required("Phone: ")?,
            married: self.prompt.required_bool("Married?: ")?,
        };

        self.say("Committing to blockchain...")?;
        self.client.create_person(&person).await?;
        self.say("*** Transaction committed successfully")?;
        Ok(())
    }

    async fn read(&mut self) -> Result<(), ShellError> {
        let id = self.prompt.required("Enter id: ")?;
        self.show(&id).await
    }

    async fn update(&mut self) -> Result<(), ShellError> {
        let id = self.prompt.required("Enter id: ")?;
        let current = self.client.read_person(&id).await?;

        self.say("Input Person Data to Update.")?;
        self.say("To keep current value leave blank input")?;

        let person = Person {
            serial: self.prompt.optional("serial", &current.serial)?,
            name: self.prompt.optional("name", &current.name)?,
            surname: self.prompt.optional("surname", &current.surname)?,
            city: self.prompt.optional("city", &current.city)?,
            address: self.prompt.optional("address", &current.address)?,
            phone: self.prompt.optional("phone", &current.phone)?,
            married: self.prompt.optional_bool("married?", current.married)?,
            id,
        };

        self.say("Committing to blockchain...")?;
        self.client.update_person(&person).await?;
        self.say("*** Transaction committed successfully")?;
        Ok(())
    }

    async fn history(&mut self) -> Result<(), ShellError> {
        let id = self.prompt.required("Enter id: ")?;
        self.show_history(&id).await
    }

    async fn delete(&mut self) -> Result<(), ShellError> {
        let id = self.prompt.required("Enter id: ")?;
        self.remove(&id).await
    }

    fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.prompt.output(), "{}", text)
    }
}
