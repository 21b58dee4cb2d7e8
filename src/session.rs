//! Operator session
//!
//! Ties capture, acquisition and the record store together behind a line
//! oriented console: capture a frame, read the barcode, pick a record
//! operation, repeat until the operator declines.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::capture::{FrameSource, Trigger};
use crate::detector::BarcodeDetector;
use crate::error::{AppError, StoreError};
use crate::models::{ProductInfo, SharpenStrength};
use crate::pipeline::{Acquisition, ProgressSink};
use crate::store::ProductStore;

const NOT_FOUND: &str = "Product not found.";

/// Record operation chosen after a successful read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Add a record for the barcode
    Create,
    /// Replace name and description
    Update,
    /// Show the record
    Read,
    /// Remove the record
    Delete,
}

impl Mode {
    /// Parse the first non-blank character, case-insensitive
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim_start().chars().next()?.to_ascii_uppercase() {
            'C' => Some(Mode::Create),
            'U' => Some(Mode::Update),
            'R' => Some(Mode::Read),
            'D' => Some(Mode::Delete),
            _ => None,
        }
    }
}

/// Line-oriented operator console
pub struct Console<R, W> {
    input: R,
    output: W,
    delay: Duration,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Console over `input`/`output`, `delay` between animation dots
    pub fn new(input: R, output: W, delay: Duration) -> Self {
        Self {
            input,
            output,
            delay,
        }
    }

    /// Write a line to the operator
    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    /// Print `word` followed by `dots` dots, one per delay
    pub fn loading(&mut self, word: &str, dots: usize) -> io::Result<()> {
        write!(self.output, "{}", word)?;
        for _ in 0..dots {
            write!(self.output, ".")?;
            self.output.flush()?;
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }
        writeln!(self.output)
    }

    /// Prompt and read one line without its terminator; `None` at end of input
    pub fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    /// Ask for a record operation; `None` for unrecognised input
    pub fn ask_mode(&mut self) -> io::Result<Option<Mode>> {
        let line = self.prompt_line("Choose a mode (C: CREATE, U: UPDATE, R: READ, D: DELETE): ")?;
        Ok(line.as_deref().and_then(Mode::parse))
    }

    /// Ask for product name and description
    pub fn ask_product(&mut self) -> io::Result<(String, String)> {
        let name = self.prompt_line("Enter product name: ")?.unwrap_or_default();
        let description = self
            .prompt_line("Enter product description: ")?
            .unwrap_or_default();
        Ok((name, description))
    }

    /// Ask whether to read another barcode; end of input means no
    pub fn ask_another(&mut self) -> io::Result<bool> {
        let line = self.prompt_line("\nDo you want to read another barcode? (y/n):")?;
        Ok(matches!(
            line.as_deref().map(str::trim_start).and_then(|l| l.chars().next()),
            Some('y' | 'Y')
        ))
    }

    /// Print a record, or that none was found
    pub fn print_product(&mut self, product: Option<&ProductInfo>) -> io::Result<()> {
        match product {
            Some(p) => {
                writeln!(self.output, "Product Information:")?;
                writeln!(self.output, "Barcode Type: {}", p.barcode_type)?;
                writeln!(self.output, "Barcode Number: {}", p.barcode_number)?;
                writeln!(self.output, "Product Name: {}", p.product_name)?;
                writeln!(self.output, "Product Description: {}", p.product_description)
            }
            None => writeln!(self.output, "{}", NOT_FOUND),
        }
    }
}

impl<R: BufRead, W: Write> Trigger for Console<R, W> {
    fn wait(&mut self, prompt: &str) -> io::Result<()> {
        self.prompt_line(&format!("{}\n", prompt))?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> ProgressSink for Console<R, W> {
    fn retrying(&mut self, attempt: usize, strength: SharpenStrength) {
        log::debug!("retry {} at strength {}", attempt, strength.value());
        let shown = self
            .say("Image Sharpness is being edited")
            .and_then(|_| self.loading("Loading", 3));
        if let Err(err) = shown {
            log::warn!("progress output failed: {}", err);
        }
    }
}

/// Run one record operation for `barcode` and report the result.
///
/// Store failures are reported to the operator and do not end the session.
pub fn dispatch<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &mut ProductStore,
    mode: Mode,
    barcode: &str,
) -> io::Result<()> {
    let result: Result<String, StoreError> = match mode {
        Mode::Create => {
            let (name, description) = console.ask_product()?;
            store
                .create(&ProductInfo::ean13(barcode, name, description))
                .map(|_| "Product information created successfully.".to_string())
        }
        Mode::Update => {
            let (name, description) = console.ask_product()?;
            store
                .update(barcode, &name, &description)
                .map(|found| {
                    if found {
                        format!(
                            "Product information for barcode {} updated successfully.",
                            barcode
                        )
                    } else {
                        NOT_FOUND.to_string()
                    }
                })
        }
        Mode::Read => match store.read(barcode) {
            Ok(found) => return console.print_product(found.as_ref()),
            Err(err) => Err(err),
        },
        Mode::Delete => store.delete(barcode).map(|removed| match removed {
            0 => NOT_FOUND.to_string(),
            _ => format!(
                "Product information for barcode {} deleted successfully.",
                barcode
            ),
        }),
    };

    match result {
        Ok(message) => console.say(&message),
        Err(err) => {
            log::warn!("record operation failed: {}", err);
            console.say(&format!("Error: {}", err))
        }
    }
}

/// Interactive read-and-record loop
pub struct Session<S, D, R, W> {
    source: S,
    acquisition: Acquisition<D>,
    store: ProductStore,
    console: Console<R, W>,
    annotated_path: Option<PathBuf>,
}

impl<S, D, R, W> Session<S, D, R, W>
where
    S: FrameSource,
    D: BarcodeDetector,
    R: BufRead,
    W: Write,
{
    /// Assemble a session
    pub fn new(
        source: S,
        acquisition: Acquisition<D>,
        store: ProductStore,
        console: Console<R, W>,
    ) -> Self {
        Self {
            source,
            acquisition,
            store,
            console,
            annotated_path: None,
        }
    }

    /// Save the annotated image of every cycle to `path`
    pub fn with_annotated_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.annotated_path = Some(path.into());
        self
    }

    /// The record store
    pub fn store(&self) -> &ProductStore {
        &self.store
    }

    /// Run cycles until the operator stops.
    ///
    /// A capture failure ends the session with an error.
    pub fn run(&mut self) -> Result<(), AppError> {
        self.console.loading("Loading", 10)?;
        self.console.say("\nThe EAN13 reader is ready for use")?;

        loop {
            let frame = self.source.capture(&mut self.console)?;
            let report = self.acquisition.run(&frame, &mut self.console);

            if let Some(path) = &self.annotated_path {
                report
                    .processed
                    .save(path)
                    .map_err(|source| AppError::Output {
                        path: path.clone(),
                        source,
                    })?;
            }

            match report.barcode() {
                Some(barcode) => {
                    self.console.say("Barcode read successfully")?;
                    self.console.say(&format!("Barcode Number: {}", barcode))?;
                    match self.console.ask_mode()? {
                        Some(mode) => dispatch(&mut self.console, &mut self.store, mode, barcode)?,
                        None => self.console.say(
                            "Invalid mode. Please choose CREATE, UPDATE, READ, or DELETE.",
                        )?,
                    }
                }
                None => self.console.say("No barcode detected.")?,
            }

            if !self.console.ask_another()? {
                break;
            }
        }

        self.console.loading("Bye Bye", 5)?;
        Ok(())
    }
}
