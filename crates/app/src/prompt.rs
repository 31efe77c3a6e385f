//! Line-oriented input helpers

use std::io::{self, BufRead, Write};

/// Parse a yes/no answer. Accepts the usual spellings of true and false.
pub fn parse_married(input: &str) -> Option<bool> {
    match input {
        "1" | "t" | "T" | "true" | "TRUE" | "True" | "y" | "yes" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Prompts on `output` and reads trimmed lines from `input`
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print `label` and read one line. End of input is an error.
    pub fn ask(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            ));
        }

        Ok(line.trim().to_string())
    }

    /// Re-prompt until the answer is not blank
    pub fn required(&mut self, label: &str) -> io::Result<String> {
        loop {
            let value = self.ask(label)?;
            if !value.is_empty() {
                return Ok(value);
            }
            writeln!(self.output, "required field!")?;
        }
    }

    /// Show the current value; a blank answer keeps it
    pub fn optional(&mut self, label: &str, current: &str) -> io::Result<String> {
        let value = self.ask(&format!("{}: {}\nnew value: ", label, current))?;
        Ok(if value.is_empty() {
            current.to_string()
        } else {
            value
        })
    }

    pub fn required_bool(&mut self, label: &str) -> io::Result<bool> {
        loop {
            let value = self.required(label)?;
            match parse_married(&value) {
                Some(married) => return Ok(married),
                None => writeln!(self.output, "Invalid input! Try one more time")?,
            }
        }
    }

    pub fn optional_bool(&mut self, label: &str, current: bool) -> io::Result<bool> {
        loop {
            let value = self.ask(&format!("{}: {}\nnew value: ", label, current))?;
            if value.is_empty() {
                return Ok(current);
            }
            match parse_married(&value) {
                Some(married) => return Ok(married),
                None => writeln!(self.output, "Invalid input! Try one more time")?,
            }
        }
    }
}
