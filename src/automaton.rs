//! Table-driven byte automaton.
//!
//! The lexer core is a flat transition table: `state x input byte -> action
//! index`. Action index 0 consumes the byte and does nothing; `0xFF` marks
//! an unexpected byte and aborts with a lexical error; anything else calls
//! a registered action function. The engine knows nothing about any
//! particular grammar; [`crate::grammar`] installs the states and actions.
//!
//! [`Scanner`] holds the per-run mutable state: the current automaton
//! state, a monotone byte index, a line counter, the "stay" flag (used to
//! re-deliver the current byte once, giving maximal-munch token endings),
//! and a ring buffer of recent bytes used both for literal extraction and
//! for error excerpts.

use crate::error::{Error, Result};
use crate::io::ByteSource;

/// Maximum number of automaton states.
pub(crate) const MAX_STATES: usize = 32;
/// Maximum number of registered actions (indices 1..128; 0 is no-op).
pub(crate) const MAX_ACTIONS: usize = 128;
/// Size of the scanner's ring buffer of recent input bytes.
pub(crate) const BUFFER_SIZE: usize = 1024;
/// Upper bound on a single extracted literal.
pub(crate) const MAX_TOKEN_LENGTH: usize = 512;

const NO_ACTION: u8 = 0;
const TRAP: u8 = 0xff;

/// An action: mutates the grammar context and/or the scanner.
pub(crate) type Action<C> = fn(&mut C, &mut Scanner) -> Result<()>;

/// Handle to a registered automaton state.
#[derive(Debug, Clone, Copy)]
pub(crate) struct State {
    id: u8,
    name: &'static str,
}

impl State {
    pub(crate) fn name(self) -> &'static str {
        self.name
    }
}

/// An immutable, compiled automaton: the transition table plus the action
/// list. Shared freely once built; all run state lives in [`Scanner`] and
/// the grammar context `C`.
pub(crate) struct Program<C> {
    table: Vec<u8>,
    actions: Vec<Option<Action<C>>>,
    state_names: Vec<&'static str>,
}

impl<C> Program<C> {
    pub(crate) fn new() -> Self {
        Program {
            table: vec![TRAP; MAX_STATES * 256],
            // slot 0 is the built-in no-op
            actions: vec![None],
            state_names: Vec::new(),
        }
    }

    /// Registers a new state.
    pub(crate) fn add_state(&mut self, name: &'static str) -> State {
        assert!(self.state_names.len() < MAX_STATES, "too many states");
        let id = self.state_names.len() as u8;
        self.state_names.push(name);
        State { id, name }
    }

    fn register(&mut self, action: Option<Action<C>>) -> u8 {
        match action {
            None => NO_ACTION,
            Some(f) => {
                assert!(self.actions.len() < MAX_ACTIONS, "too many actions");
                self.actions.push(Some(f));
                (self.actions.len() - 1) as u8
            }
        }
    }

    fn set(&mut self, state: State, byte: u8, index: u8) {
        self.table[state.id as usize * 256 + byte as usize] = index;
    }

    /// Sets the transition for every byte in `bytes` (an ASCII set) to the
    /// given action (`None` = consume silently).
    pub(crate) fn transition(&mut self, state: State, bytes: &str, action: Option<Action<C>>) {
        let index = self.register(action);
        for b in bytes.bytes() {
            self.set(state, b, index);
        }
    }

    /// Sets the transition for a single (possibly non-ASCII) byte.
    pub(crate) fn transition_byte(&mut self, state: State, byte: u8, action: Option<Action<C>>) {
        let index = self.register(action);
        self.set(state, byte, index);
    }

    /// Sets the default action for all 256 bytes of a state. Per-byte
    /// overrides are applied on top, in registration order.
    pub(crate) fn fill_transition(&mut self, state: State, action: Action<C>) {
        let index = self.register(Some(action));
        for b in 0..=255u8 {
            self.set(state, b, index);
        }
    }

    /// Delivers one byte to the automaton in its current state.
    pub(crate) fn step(&self, scanner: &mut Scanner, ctx: &mut C, byte: u8) -> Result<()> {
        scanner.input_byte = byte;
        let index = self.table[scanner.state as usize * 256 + byte as usize];
        match index {
            NO_ACTION => Ok(()),
            TRAP => Err(scanner.lexical(format!(
                "unexpected character: {}",
                printable_byte(byte)
            ))),
            _ => match self.actions[index as usize] {
                Some(action) => action(ctx, scanner),
                None => Err(Error::internal("unregistered action index")),
            },
        }
    }

    /// Runs the automaton over an entire input. The caller is expected to
    /// flush any unfinished line afterwards with synthetic line feeds.
    pub(crate) fn run(
        &self,
        scanner: &mut Scanner,
        ctx: &mut C,
        input: &mut dyn ByteSource,
    ) -> Result<()> {
        scanner.line = 1;
        let mut byte = 0u8;
        while !input.at_end() || scanner.stay {
            if scanner.stay {
                scanner.stay = false;
            } else {
                scanner.index += 1;
                byte = input.read_byte()?;
                scanner.buffer[scanner.index % BUFFER_SIZE] = byte;
            }
            self.step(scanner, ctx, byte)?;
            // count the line feed only once it is fully handled, so errors
            // raised while handling it still report the line it ends
            if byte == b'\n' && !scanner.stay {
                scanner.line += 1;
            }
        }
        if !scanner.stay {
            scanner.index += 1;
        }
        Ok(())
    }
}

/// Mutable run state of the automaton.
pub(crate) struct Scanner {
    state: u8,
    state_name: &'static str,
    input_byte: u8,
    /// Monotone 1-based position of the current byte.
    index: usize,
    line: usize,
    stay: bool,
    buffer: Box<[u8; BUFFER_SIZE]>,
}

impl Scanner {
    pub(crate) fn new(initial: State) -> Self {
        Scanner {
            state: initial.id,
            state_name: initial.name(),
            input_byte: 0,
            index: 0,
            line: 1,
            stay: false,
            buffer: Box::new([0; BUFFER_SIZE]),
        }
    }

    /// Moves to another state.
    pub(crate) fn next_state(&mut self, state: State) {
        self.state = state.id;
        self.state_name = state.name();
    }

    /// Requests that the current byte be delivered again on the next step.
    /// At most one re-delivery per byte.
    pub(crate) fn stay(&mut self) -> Result<()> {
        if self.stay {
            return Err(Error::internal("stay requested twice for the same byte"));
        }
        self.stay = true;
        Ok(())
    }

    pub(crate) fn input_byte(&self) -> u8 {
        self.input_byte
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn line(&self) -> usize {
        self.line
    }

    pub(crate) fn byte_at(&self, index: usize) -> u8 {
        self.buffer[index % BUFFER_SIZE]
    }

    /// Copies `len` recent bytes starting at position `start` out of the
    /// ring buffer.
    pub(crate) fn bytes(&self, start: usize, len: usize) -> Result<Vec<u8>> {
        if len >= MAX_TOKEN_LENGTH {
            return Err(self.lexical("token is too long"));
        }
        Ok((0..len)
            .map(|i| self.buffer[(start + i) % BUFFER_SIZE])
            .collect())
    }

    /// Extracts recent input as text (lossy UTF-8).
    pub(crate) fn text(&self, start: usize, len: usize) -> Result<String> {
        let bytes = self.bytes(start, len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reconstructs the current line from the ring buffer, for error
    /// excerpts.
    pub(crate) fn current_line(&self) -> String {
        if self.index == 0 {
            return String::new();
        }
        let mut start = self.index - 1;
        while start > 0
            && self.index - start < BUFFER_SIZE
            && self.buffer[start % BUFFER_SIZE] != b'\n'
        {
            start -= 1;
        }
        let bytes: Vec<u8> = (start + 1..=self.index)
            .map(|i| self.buffer[i % BUFFER_SIZE])
            .filter(|b| *b != b'\n' && *b != b'\r' && *b != 0)
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// A lexical error carrying the scanner's current context.
    pub(crate) fn lexical(&self, msg: impl Into<String>) -> Error {
        Error::lexical(msg, self.state_name, self.line, self.current_line())
    }
}

fn printable_byte(byte: u8) -> String {
    if (0x20..0x7f).contains(&byte) {
        format!("'{}'", byte as char)
    } else {
        format!("0x{byte:02X}")
    }
}
