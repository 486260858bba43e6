use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::error::CustomUserError;
use inquire::validator::Validation;
use inquire::{Confirm, InquireError, Select, Text};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::ui;

const SPINNER_TICK_MILLIS: u64 = 80;

/// Outcome of a prompt: the user's answer, or a cancellation (ESC or Ctrl-C)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompted<T> {
    Answer(T),
    Cancelled,
}

impl<T> Prompted<T> {
    /// Maps inquire's cancellation errors to [`Prompted::Cancelled`]
    ///
    /// # Errors
    /// Returns any other prompt failure (no TTY, IO errors)
    pub fn from_inquire(result: Result<T, InquireError>) -> Result<Self> {
        match result {
            Ok(answer) => Ok(Prompted::Answer(answer)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                Ok(Prompted::Cancelled)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[must_use]
    pub fn answer(self) -> Option<T> {
        match self {
            Prompted::Answer(answer) => Some(answer),
            Prompted::Cancelled => None,
        }
    }
}

/// One entry of a select prompt: what is shown and what is returned
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

impl fmt::Display for SelectOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Synchronous input check; `Err` holds the message shown under the prompt
pub type Validator = Rc<dyn Fn(&str) -> Result<(), String>>;

/// A free-text prompt
#[derive(Clone)]
pub struct TextPrompt {
    pub message: String,
    /// Returned when the input is left empty
    pub default: Option<String>,
    pub placeholder: Option<String>,
    pub validator: Option<Validator>,
}

impl TextPrompt {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            default: None,
            placeholder: None,
            validator: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn with_validator(
        mut self,
        validator: impl Fn(&str) -> Result<(), String> + 'static,
    ) -> Self {
        self.validator = Some(Rc::new(validator));
        self
    }
}

/// Progress indicator shown while a blocking operation runs
pub trait Spinner {
    fn stop(&mut self, message: &str);
    fn fail(&mut self, message: &str);
}

/// Trait for providing interactive prompts
/// This allows us to abstract away the terminal for testing
pub trait SelectionProvider {
    /// Presents a selection menu starting at `initial` and returns the chosen value
    ///
    /// # Errors
    /// Returns an error if the prompt cannot be shown
    fn select(
        &self,
        message: &str,
        options: Vec<SelectOption>,
        initial: usize,
    ) -> Result<Prompted<String>>;

    /// Reads a line of text, re-prompting while the validator rejects it
    ///
    /// # Errors
    /// Returns an error if the prompt cannot be shown
    fn text(&self, prompt: &TextPrompt) -> Result<Prompted<String>>;

    /// Asks a yes/no question
    ///
    /// # Errors
    /// Returns an error if the prompt cannot be shown
    fn confirm(&self, message: &str, default: bool) -> Result<Prompted<bool>>;

    /// Starts a spinner with the given message
    fn spinner(&self, message: &str) -> Box<dyn Spinner>;
}

/// Real implementation using inquire and indicatif for production use
pub struct RealSelectionProvider;

impl SelectionProvider for RealSelectionProvider {
    fn select(
        &self,
        message: &str,
        options: Vec<SelectOption>,
        initial: usize,
    ) -> Result<Prompted<String>> {
        let initial = initial.min(options.len().saturating_sub(1));
        let selection = Select::new(message, options)
            .with_starting_cursor(initial)
            .with_page_size(10)
            .with_vim_mode(true)
            .prompt();
        Ok(Prompted::from_inquire(selection)?
            .answer()
            .map_or(Prompted::Cancelled, |option| Prompted::Answer(option.value)))
    }

    fn text(&self, prompt: &TextPrompt) -> Result<Prompted<String>> {
        let mut text_prompt = Text::new(&prompt.message);

        if let Some(default) = &prompt.default {
            text_prompt = text_prompt.with_default(default);
        }
        if let Some(placeholder) = &prompt.placeholder {
            text_prompt = text_prompt.with_placeholder(placeholder);
        }
        if let Some(validator) = prompt.validator.clone() {
            text_prompt = text_prompt.with_validator(move |input: &str| {
                Ok::<_, CustomUserError>(match validator(input) {
                    Ok(()) => Validation::Valid,
                    Err(message) => Validation::Invalid(message.into()),
                })
            });
        }

        Prompted::from_inquire(text_prompt.prompt())
    }

    fn confirm(&self, message: &str, default: bool) -> Result<Prompted<bool>> {
        Prompted::from_inquire(Confirm::new(message).with_default(default).prompt())
    }

    fn spinner(&self, message: &str) -> Box<dyn Spinner> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MILLIS));
        Box::new(TerminalSpinner { bar })
    }
}

struct TerminalSpinner {
    bar: ProgressBar,
}

impl Spinner for TerminalSpinner {
    fn stop(&mut self, message: &str) {
        self.bar.finish_and_clear();
        ui::info(message);
    }

    fn fail(&mut self, message: &str) {
        self.bar.finish_and_clear();
        ui::error(message);
    }
}

/// A scripted answer for [`MockSelectionProvider`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockAnswer {
    Select(String),
    Text(String),
    Confirm(bool),
    Cancel,
}

/// Mock implementation for testing that replays scripted answers in order
#[derive(Default)]
pub struct MockSelectionProvider {
    answers: RefCell<VecDeque<MockAnswer>>,
    prompts: RefCell<Vec<String>>,
    validation_errors: RefCell<Vec<String>>,
    spinner_events: Rc<RefCell<Vec<String>>>,
}

impl MockSelectionProvider {
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = MockAnswer>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Messages of every prompt shown, in order
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    /// Messages produced by text validators for rejected answers
    #[must_use]
    pub fn validation_errors(&self) -> Vec<String> {
        self.validation_errors.borrow().clone()
    }

    /// `start:`, `stop:` and `fail:` events from spinners
    #[must_use]
    pub fn spinner_events(&self) -> Vec<String> {
        self.spinner_events.borrow().clone()
    }

    /// Answers not consumed by the flow
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next_answer(&self, message: &str) -> Result<MockAnswer> {
        self.prompts.borrow_mut().push(message.to_string());
        match self.answers.borrow_mut().pop_front() {
            Some(answer) => Ok(answer),
            None => anyhow::bail!("No scripted answer for prompt '{}'", message),
        }
    }
}

impl SelectionProvider for MockSelectionProvider {
    fn select(
        &self,
        message: &str,
        options: Vec<SelectOption>,
        _initial: usize,
    ) -> Result<Prompted<String>> {
        match self.next_answer(message)? {
            MockAnswer::Select(value) => {
                // Validate that the response is actually in the options
                if options.iter().any(|o| o.value == value) {
                    Ok(Prompted::Answer(value))
                } else {
                    anyhow::bail!("Mock response '{}' not found in options", value)
                }
            }
            MockAnswer::Cancel => Ok(Prompted::Cancelled),
            other => anyhow::bail!("Expected a select answer for '{}', got {:?}", message, other),
        }
    }

    fn text(&self, prompt: &TextPrompt) -> Result<Prompted<String>> {
        loop {
            let input = match self.next_answer(&prompt.message)? {
                MockAnswer::Text(input) => input,
                MockAnswer::Cancel => return Ok(Prompted::Cancelled),
                other => anyhow::bail!(
                    "Expected a text answer for '{}', got {:?}",
                    prompt.message,
                    other
                ),
            };
            let input = match (&prompt.default, input.is_empty()) {
                (Some(default), true) => default.clone(),
                _ => input,
            };

            match prompt.validator.as_ref().map(|validate| validate(&input)) {
                Some(Err(message)) => self.validation_errors.borrow_mut().push(message),
                _ => return Ok(Prompted::Answer(input)),
            }
        }
    }

    fn confirm(&self, message: &str, _default: bool) -> Result<Prompted<bool>> {
        match self.next_answer(message)? {
            MockAnswer::Confirm(answer) => Ok(Prompted::Answer(answer)),
            MockAnswer::Cancel => Ok(Prompted::Cancelled),
            other => anyhow::bail!("Expected a confirm answer for '{}', got {:?}", message, other),
        }
    }

    fn spinner(&self, message: &str) -> Box<dyn Spinner> {
        self.spinner_events.borrow_mut().push(format!("start: {message}"));
        Box::new(RecordingSpinner {
            events: Rc::clone(&self.spinner_events),
        })
    }
}

struct RecordingSpinner {
    events: Rc<RefCell<Vec<String>>>,
}

impl Spinner for RecordingSpinner {
    fn stop(&mut self, message: &str) {
        self.events.borrow_mut().push(format!("stop: {message}"));
    }

    fn fail(&mut self, message: &str) {
        self.events.borrow_mut().push(format!("fail: {message}"));
    }
}
