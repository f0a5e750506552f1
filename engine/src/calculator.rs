//! The calculator state machine.
//!
//! Two operand slots and at most one pending operator. Entering a second
//! operator while one is pending evaluates the first (left-to-right
//! chaining, no precedence). Every operation is a transition
//! `(CalculatorState, Input) -> (CalculatorState, Vec<Event>)`; see [`step`].

use crate::format::{format_result, number_to_string, parse_operand};
use crate::record::calculation_result;
use crate::{
    AngleMode, BinaryOperator, CalcError, Constant, Event, Input, MemoryAction, Paren,
    UnaryFunction,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of calculation lines kept in the in-engine log.
pub const RECENT_LOG_CAPACITY: usize = 10;

/// Text shown while a failed calculation is on screen.
pub const ERROR_TEXT: &str = "Error";

/// How long the error text stays before the calculator clears itself.
pub const DEFAULT_ERROR_DISPLAY_MS: u64 = 2000;

/// The complete calculator state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorState {
    current_operand: String,
    pending_operand: String,
    pending_operator: Option<BinaryOperator>,
    awaiting_fresh_input: bool,
    angle_mode: AngleMode,
    memory: f64,
    /// Most recent first.
    recent_log: VecDeque<String>,
    expression: String,
    /// Token of the error reset currently scheduled, if any.
    pending_reset: Option<u64>,
    reset_seq: u64,
    error_display_ms: u64,
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorState {
    /// Create a cleared calculator showing `"0"`.
    pub fn new() -> Self {
        Self {
            current_operand: "0".to_string(),
            pending_operand: String::new(),
            pending_operator: None,
            awaiting_fresh_input: false,
            angle_mode: AngleMode::default(),
            memory: 0.0,
            recent_log: VecDeque::with_capacity(RECENT_LOG_CAPACITY),
            expression: String::new(),
            pending_reset: None,
            reset_seq: 0,
            error_display_ms: DEFAULT_ERROR_DISPLAY_MS,
        }
    }

    pub fn with_angle_mode(mut self, mode: AngleMode) -> Self {
        self.angle_mode = mode;
        self
    }

    pub fn with_error_display_ms(mut self, ms: u64) -> Self {
        self.error_display_ms = ms;
        self
    }

    pub fn current_operand(&self) -> &str {
        &self.current_operand
    }

    pub fn pending_operand(&self) -> &str {
        &self.pending_operand
    }

    pub fn pending_operator(&self) -> Option<BinaryOperator> {
        self.pending_operator
    }

    pub fn awaiting_fresh_input(&self) -> bool {
        self.awaiting_fresh_input
    }

    pub fn angle_mode(&self) -> AngleMode {
        self.angle_mode
    }

    pub fn memory(&self) -> f64 {
        self.memory
    }

    /// Whether the memory indicator is lit.
    pub fn memory_active(&self) -> bool {
        self.memory != 0.0
    }

    /// Recorded calculation lines, most recent first.
    pub fn recent_log(&self) -> impl Iterator<Item = &str> {
        self.recent_log.iter().map(String::as_str)
    }

    /// The running-expression line shown above the display.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether the display is showing the error text.
    pub fn is_showing_error(&self) -> bool {
        self.pending_reset.is_some()
    }

    pub fn pending_reset(&self) -> Option<u64> {
        self.pending_reset
    }

    /// Apply one input and return the events it produced.
    ///
    /// Any user input while an error is showing cancels the scheduled reset
    /// and clears the calculator before the input itself is applied.
    pub fn apply(&mut self, input: Input, rng: &mut dyn RngCore) -> Vec<Event> {
        let mut events = Vec::new();

        if input.is_user_action() {
            if let Some(token) = self.pending_reset.take() {
                events.push(Event::ResetCancelled { token });
                self.clear(&mut events);
            }
        }

        match input {
            Input::Digit { digit } => self.input_digit(digit, &mut events),
            Input::DecimalPoint => self.input_decimal_point(&mut events),
            Input::Operator { operator } => self.input_operator(operator, &mut events),
            Input::Paren { paren } => self.input_paren(paren, &mut events),
            Input::Calculate => {
                self.calculate(&mut events);
            }
            Input::Function { function } => self.apply_function(function, rng, &mut events),
            Input::Constant { constant } => self.input_constant(constant, &mut events),
            Input::Memory { action } => self.memory_action(action, &mut events),
            Input::Clear => self.clear(&mut events),
            Input::Backspace => self.backspace(&mut events),
            Input::SetAngleMode { mode } => self.set_angle_mode(mode, &mut events),
            Input::ToggleAngleMode => self.set_angle_mode(self.angle_mode.toggled(), &mut events),
            Input::ReuseResult { calculation } => self.reuse_result(&calculation, &mut events),
            Input::ErrorTimeout { token } => self.expire_error(token, &mut events),
        }

        events
    }

    fn input_digit(&mut self, digit: u8, events: &mut Vec<Event>) {
        if digit > 9 {
            return;
        }
        let ch = char::from(b'0' + digit);

        if self.awaiting_fresh_input {
            self.current_operand = ch.to_string();
            self.awaiting_fresh_input = false;
        } else if self.current_operand == "0" {
            self.current_operand = ch.to_string();
        } else {
            self.current_operand.push(ch);
        }
        self.emit_display(events);
    }

    fn input_decimal_point(&mut self, events: &mut Vec<Event>) {
        if self.awaiting_fresh_input {
            self.current_operand = "0.".to_string();
            self.awaiting_fresh_input = false;
        } else if !self.current_operand.contains('.') {
            self.current_operand.push('.');
        }
        self.emit_display(events);
    }

    fn input_paren(&mut self, paren: Paren, events: &mut Vec<Event>) {
        match paren {
            Paren::Open if self.current_operand == "0" => {
                self.current_operand = "(".to_string();
            }
            _ => self.current_operand.push(paren.as_char()),
        }
        self.emit_display(events);
    }

    fn input_operator(&mut self, operator: BinaryOperator, events: &mut Vec<Event>) {
        let chaining = self.pending_operator.is_some()
            && !self.pending_operand.is_empty()
            && !self.awaiting_fresh_input;
        if chaining && !self.calculate(events) {
            return;
        }

        self.pending_operand = self.current_operand.clone();
        self.pending_operator = Some(operator);
        self.awaiting_fresh_input = true;
        let expression = format!("{} {} ", self.pending_operand, operator.symbol());
        self.set_expression(expression, events);
        self.emit_display(events);
    }

    /// Evaluate the pending operation. Returns `false` if it failed.
    fn calculate(&mut self, events: &mut Vec<Event>) -> bool {
        let Some(operator) = self.pending_operator else {
            return true;
        };
        if self.pending_operand.is_empty() {
            return true;
        }

        let lhs = parse_operand(&self.pending_operand);
        let rhs = parse_operand(&self.current_operand);
        let result = if lhs.is_nan() || rhs.is_nan() {
            Err(CalcError::InvalidResult)
        } else {
            operator.apply(lhs, rhs)
        };

        match result {
            Ok(value) => {
                let formatted = format_result(value);
                let line = format!(
                    "{} {} {} = {}",
                    self.pending_operand,
                    operator.symbol(),
                    self.current_operand,
                    formatted
                );
                self.record(&line, events);
                self.current_operand = formatted;
                self.pending_operand.clear();
                self.pending_operator = None;
                self.awaiting_fresh_input = true;
                self.set_expression(line, events);
                self.emit_display(events);
                true
            }
            Err(kind) => {
                self.fail(kind, events);
                false
            }
        }
    }

    fn apply_function(
        &mut self,
        function: UnaryFunction,
        rng: &mut dyn RngCore,
        events: &mut Vec<Event>,
    ) {
        let x = parse_operand(&self.current_operand);
        let result = if function.uses_operand() && x.is_nan() {
            Err(CalcError::InvalidResult)
        } else {
            function.apply(x, self.angle_mode, rng)
        };

        match result {
            Ok(value) => {
                let formatted = format_result(value);
                let line = format!("{}({}) = {}", function, number_to_string(x), formatted);
                self.current_operand = formatted;
                self.awaiting_fresh_input = true;
                self.record(&line, events);
                self.set_expression(line, events);
                self.emit_display(events);
            }
            Err(kind) => self.fail(kind, events),
        }
    }

    fn input_constant(&mut self, constant: Constant, events: &mut Vec<Event>) {
        self.current_operand = format_result(constant.value());
        self.awaiting_fresh_input = true;
        self.emit_display(events);
    }

    fn memory_action(&mut self, action: MemoryAction, events: &mut Vec<Event>) {
        match action {
            MemoryAction::Clear => self.memory = 0.0,
            MemoryAction::Recall => {
                self.current_operand = format_result(self.memory);
                self.awaiting_fresh_input = true;
                self.emit_display(events);
                return;
            }
            MemoryAction::Add | MemoryAction::Subtract => {
                let x = parse_operand(&self.current_operand);
                let updated = match action {
                    MemoryAction::Add => self.memory + x,
                    _ => self.memory - x,
                };
                // A non-numeric operand leaves the register untouched.
                if updated.is_finite() {
                    self.memory = updated;
                }
            }
        }
        events.push(Event::MemoryIndicator {
            active: self.memory_active(),
        });
    }

    fn clear(&mut self, events: &mut Vec<Event>) {
        self.current_operand = "0".to_string();
        self.pending_operand.clear();
        self.pending_operator = None;
        self.awaiting_fresh_input = false;
        self.set_expression(String::new(), events);
        self.emit_display(events);
    }

    fn backspace(&mut self, events: &mut Vec<Event>) {
        if self.current_operand.chars().count() > 1 {
            self.current_operand.pop();
        } else {
            self.current_operand = "0".to_string();
        }
        self.emit_display(events);
    }

    fn set_angle_mode(&mut self, mode: AngleMode, events: &mut Vec<Event>) {
        self.angle_mode = mode;
        events.push(Event::AngleModeChanged { mode });
    }

    fn reuse_result(&mut self, calculation: &str, events: &mut Vec<Event>) {
        let Some(result) = calculation_result(calculation) else {
            return;
        };
        self.current_operand = result.to_string();
        self.awaiting_fresh_input = true;
        self.emit_display(events);
    }

    fn expire_error(&mut self, token: u64, events: &mut Vec<Event>) {
        if self.pending_reset != Some(token) {
            return;
        }
        self.pending_reset = None;
        self.clear(events);
    }

    fn fail(&mut self, kind: CalcError, events: &mut Vec<Event>) {
        self.current_operand = ERROR_TEXT.to_string();
        self.awaiting_fresh_input = true;
        self.reset_seq += 1;
        let token = self.reset_seq;
        self.pending_reset = Some(token);

        events.push(Event::Failed { kind });
        self.emit_display(events);
        events.push(Event::ResetScheduled {
            token,
            after_ms: self.error_display_ms,
        });
    }

    fn record(&mut self, line: &str, events: &mut Vec<Event>) {
        self.recent_log.push_front(line.to_string());
        self.recent_log.truncate(RECENT_LOG_CAPACITY);
        events.push(Event::recorded(line));
    }

    fn set_expression(&mut self, text: String, events: &mut Vec<Event>) {
        events.push(Event::expression(text.clone()));
        self.expression = text;
    }

    fn emit_display(&self, events: &mut Vec<Event>) {
        events.push(Event::display(self.current_operand.clone()));
    }
}

/// Pure transition: consume a state and an input, return the next state
/// and the events it produced.
pub fn step(
    mut state: CalculatorState,
    input: Input,
    rng: &mut dyn RngCore,
) -> (CalculatorState, Vec<Event>) {
    let events = state.apply(input, rng);
    (state, events)
}

/// A calculator state paired with its random source.
#[derive(Debug, Clone)]
pub struct Calculator {
    state: CalculatorState,
    rng: StdRng,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    /// Create a calculator seeded from the operating system.
    pub fn new() -> Self {
        Self::from_parts(CalculatorState::new(), StdRng::from_entropy())
    }

    /// Create a calculator with a deterministic random source.
    pub fn seeded(seed: u64) -> Self {
        Self::from_parts(CalculatorState::new(), StdRng::seed_from_u64(seed))
    }

    pub fn from_parts(state: CalculatorState, rng: StdRng) -> Self {
        Self { state, rng }
    }

    pub fn with_angle_mode(mut self, mode: AngleMode) -> Self {
        self.state = self.state.with_angle_mode(mode);
        self
    }

    pub fn with_error_display_ms(mut self, ms: u64) -> Self {
        self.state = self.state.with_error_display_ms(ms);
        self
    }

    /// Apply one input.
    pub fn apply(&mut self, input: Input) -> Vec<Event> {
        self.state.apply(input, &mut self.rng)
    }

    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    /// The text on the main display.
    pub fn display(&self) -> &str {
        self.state.current_operand()
    }
}
