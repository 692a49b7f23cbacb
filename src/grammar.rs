//! The lexical grammar and the parse driver.
//!
//! This module programs the byte automaton with the format's states (BOM
//! detection, line start, inter-token space, names, numbers, quoted text
//! with escapes, `%` references), collects each line's tokens into a
//! [`TokenTree`], resolves the line's indentation depth, and hands the
//! completed line to the [`Assembler`].
//!
//! Token endings use maximal munch: a breaker byte ends the current
//! literal, is pushed back with `stay`, and is then handled by the space
//! state.

use crate::assemble::Assembler;
use crate::automaton::{Program, Scanner, State};
use crate::error::Result;
use crate::indent::IndentStack;
use crate::io::ByteSource;
use crate::token::{TokenId, TokenKind, TokenTree};
use crate::types::Registry;
use crate::Document;

const LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";
const DIGITS: &str = "1234567890";
const HEX_DIGITS: &str = "1234567890abcdefABCDEF";
/// Bytes that end a literal: whitespace, separators, and all brackets.
const BREAKERS: &str = " \t\n\r,:()[]{}";

/// Upper bound on the decoded bytes of one quoted literal.
const MAX_QUOTE_SIZE: usize = 4096;

const BOM_ERROR: &str = "malformed file start: UTF-8 or ASCII expected";

/// The lexer's states. Copied into the [`Tokenizer`] so actions can reach
/// them without captures.
#[derive(Clone, Copy)]
struct States {
    bom1: State,
    bom2: State,
    bom3: State,
    start: State,
    space: State,
    name: State,
    integer: State,
    decimal: State,
    minus: State,
    quote: State,
    escape: State,
    hex: State,
    reference: State,
}

impl States {
    fn new<'reg>(program: &mut Program<Tokenizer<'reg>>) -> States {
        States {
            bom1: program.add_state("bom"),
            bom2: program.add_state("bom"),
            bom3: program.add_state("bom"),
            start: program.add_state("line start"),
            space: program.add_state("space"),
            name: program.add_state("name"),
            integer: program.add_state("number"),
            decimal: program.add_state("number"),
            minus: program.add_state("minus"),
            quote: program.add_state("quote"),
            escape: program.add_state("escape character"),
            hex: program.add_state("hexadecimal character"),
            reference: program.add_state("reference"),
        }
    }
}

/// Per-parse lexer context: token collection cursors, the indentation
/// tracker, and the structural assembler.
struct Tokenizer<'reg> {
    states: States,
    /// Buffer position the current literal starts at; -1 when no literal
    /// can be in flight (just after a bracket).
    last_start: isize,
    /// Decoded bytes of the quoted literal in flight.
    quote: Vec<u8>,
    /// Depth of the line being collected.
    depth: usize,
    indent: IndentStack,
    tree: TokenTree,
    current_expr: TokenId,
    current_block: Option<TokenId>,
    current_token: Option<TokenId>,
    assembler: Assembler<'reg>,
}

/// Parses one complete input into a document.
pub(crate) fn parse(input: &mut dyn ByteSource, registry: &Registry) -> Result<Document> {
    let mut program: Program<Tokenizer> = Program::new();
    let states = States::new(&mut program);
    install(&mut program, states);

    let mut scanner = Scanner::new(states.bom1);
    let mut tokenizer = Tokenizer::new(states, registry);

    let outcome = (|| -> Result<()> {
        program.run(&mut scanner, &mut tokenizer, input)?;
        // flush the unfinished last line
        program.step(&mut scanner, &mut tokenizer, b'\n')?;
        program.step(&mut scanner, &mut tokenizer, b'\n')?;
        Ok(())
    })();
    outcome.map_err(|e| e.with_line_context(scanner.line(), &scanner.current_line()))?;

    let (root, records) = tokenizer
        .assembler
        .finish()
        .map_err(|e| e.with_line_context(scanner.line(), &scanner.current_line()))?;
    Ok(Document::new(root, records))
}

impl<'reg> Tokenizer<'reg> {
    fn new(states: States, registry: &'reg Registry) -> Self {
        Tokenizer {
            states,
            last_start: 0,
            quote: Vec::new(),
            depth: 0,
            indent: IndentStack::new(),
            tree: TokenTree::new(),
            current_expr: TokenTree::ROOT,
            current_block: None,
            current_token: None,
            assembler: Assembler::new(registry),
        }
    }

    /// Moves to `state` and starts a fresh literal at the current byte.
    fn next(&mut self, sc: &mut Scanner, state: State) {
        self.last_start = sc.index() as isize;
        sc.next_state(state);
    }

    /// Moves to `state` keeping the literal in flight (e.g. integer to
    /// decimal at the dot).
    fn next_cont(&mut self, sc: &mut Scanner, state: State) {
        sc.next_state(state);
    }

    fn token_text(&self, sc: &Scanner) -> Result<String> {
        if self.last_start < 0 || self.last_start as usize >= sc.index() {
            return Ok(String::new());
        }
        let start = self.last_start as usize;
        sc.text(start, sc.index() - start)
    }

    /// Appends a token carrying the literal collected since `last_start`.
    fn add_token(&mut self, sc: &Scanner, kind: TokenKind) -> Result<()> {
        let text = self.token_text(sc)?;
        self.push_token(sc, kind, text)
    }

    fn push_token(&mut self, sc: &Scanner, kind: TokenKind, text: String) -> Result<()> {
        let id = self
            .tree
            .append(self.current_expr, self.current_token, kind, text);
        self.current_token = Some(id);
        self.last_start = sc.index() as isize;
        Ok(())
    }

    // --- quoted text -----------------------------------------------------

    fn add_quote_byte(&mut self, sc: &Scanner, byte: u8) -> Result<()> {
        if self.quote.len() >= MAX_QUOTE_SIZE {
            return Err(sc.lexical("quoted text is too long"));
        }
        self.quote.push(byte);
        Ok(())
    }

    /// Ends the quoted literal: decode as UTF-8 (lossy) and emit a text
    /// token.
    fn add_quote(&mut self, sc: &Scanner) -> Result<()> {
        let text = String::from_utf8_lossy(&self.quote).into_owned();
        self.quote.clear();
        self.push_token(sc, TokenKind::Text, text)
    }

    /// Decodes the two hex digits following the `\x` at `last_start`.
    fn add_hex_byte(&mut self, sc: &Scanner) -> Result<()> {
        let start = self.last_start as usize;
        let high = hex_nibble(sc, sc.byte_at(start + 1))?;
        let low = hex_nibble(sc, sc.byte_at(start + 2))?;
        self.add_quote_byte(sc, (high << 4) | low)
    }

    // --- brackets --------------------------------------------------------

    fn add_block(&mut self, sc: &Scanner) -> Result<()> {
        let kind = match sc.input_byte() {
            b'(' => TokenKind::Parenthesis,
            b'[' => TokenKind::SquareBrackets,
            b'{' => TokenKind::CurlyBrackets,
            b => return Err(sc.lexical(format!("unexpected block character: {b:#04x}"))),
        };
        self.last_start = -1;
        let bracket = self
            .tree
            .append(self.current_expr, self.current_token, kind, String::new());
        let expr = self
            .tree
            .append(bracket, None, TokenKind::Block, String::new());
        self.current_block = Some(bracket);
        self.current_expr = expr;
        self.current_token = None;
        Ok(())
    }

    fn end_block(&mut self, sc: &Scanner) -> Result<()> {
        let bracket = self
            .current_block
            .ok_or_else(|| sc.lexical("unexpected closing bracket"))?;
        let expected = match self.tree.kind(bracket) {
            TokenKind::Parenthesis => b')',
            TokenKind::SquareBrackets => b']',
            TokenKind::CurlyBrackets => b'}',
            _ => return Err(crate::Error::internal("malformed block token")),
        };
        if sc.input_byte() != expected {
            return Err(sc.lexical(format!(
                "mismatched closing bracket: '{}' expected",
                expected as char
            )));
        }
        self.last_start = -1;
        self.current_token = Some(bracket);
        self.current_expr = self
            .tree
            .parent(bracket)
            .ok_or_else(|| crate::Error::internal("block token without parent"))?;
        // the enclosing bracket token, if the restored expression is nested
        self.current_block = self.tree.parent(self.current_expr);
        Ok(())
    }

    // --- line boundaries -------------------------------------------------

    /// Resolves the whitespace collected since the line began into the
    /// line's nesting depth.
    fn end_indentation(&mut self, sc: &mut Scanner) -> Result<()> {
        if self.last_start >= sc.index() as isize {
            self.indent.clear();
            self.depth = 0;
        } else {
            let start = self.last_start as usize;
            let ws = sc.bytes(start, sc.index() - start)?;
            self.depth = self
                .indent
                .resolve(&ws)
                .map_err(|e| e.with_line_context(sc.line(), &sc.current_line()))?;
        }
        Ok(())
    }

    /// Handles a line feed: dispatch the collected line, then reset for the
    /// next one.
    fn line_break(&mut self, sc: &mut Scanner) -> Result<()> {
        if self.current_block.is_some() {
            return Err(sc.lexical("missing closing bracket"));
        }
        if self.tree.has_children(TokenTree::ROOT) {
            self.assembler
                .handle_line(&self.tree, self.depth)
                .map_err(|e| e.with_line_context(sc.line(), &sc.current_line()))?;
        }
        self.reset_line();
        self.new_line(sc);
        Ok(())
    }

    fn new_line(&mut self, sc: &mut Scanner) {
        sc.next_state(self.states.start);
        self.last_start = sc.index() as isize + 1;
    }

    fn reset_line(&mut self) {
        self.tree.clear();
        self.current_expr = TokenTree::ROOT;
        self.current_block = None;
        self.current_token = None;
    }
}

fn hex_nibble(sc: &Scanner, byte: u8) -> Result<u8> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(sc.lexical("invalid hexadecimal character")),
    }
}

/// Installs every state transition. Registration order matters where byte
/// sets overlap: later registrations override earlier ones.
fn install<'reg>(p: &mut Program<Tokenizer<'reg>>, s: States) {
    // UTF-8 BOM detection: a complete BOM is skipped, a partial one is a
    // hard error, anything else is re-delivered to the line-start state.
    p.fill_transition(s.bom1, |t, sc| {
        sc.stay()?;
        let start = t.states.start;
        t.next(sc, start);
        Ok(())
    });
    p.transition_byte(
        s.bom1,
        0xef,
        Some(|t, sc| {
            let bom2 = t.states.bom2;
            t.next(sc, bom2);
            Ok(())
        }),
    );
    p.fill_transition(s.bom2, |_, sc| Err(sc.lexical(BOM_ERROR)));
    p.transition_byte(
        s.bom2,
        0xbb,
        Some(|t, sc| {
            let bom3 = t.states.bom3;
            t.next(sc, bom3);
            Ok(())
        }),
    );
    p.fill_transition(s.bom3, |_, sc| Err(sc.lexical(BOM_ERROR)));
    p.transition_byte(
        s.bom3,
        0xbf,
        Some(|t, sc| {
            let start = t.states.start;
            t.next(sc, start);
            t.last_start += 1;
            Ok(())
        }),
    );

    // line start: leading whitespace, then the first token decides the
    // line form
    p.transition(s.start, " \t", None);
    p.transition(
        s.start,
        "\n\r",
        Some(|t, sc| {
            t.new_line(sc);
            Ok(())
        }),
    );
    p.transition(
        s.start,
        LETTERS,
        Some(|t, sc| {
            t.end_indentation(sc)?;
            let name = t.states.name;
            t.next(sc, name);
            Ok(())
        }),
    );
    p.transition(
        s.start,
        DIGITS,
        Some(|t, sc| {
            t.end_indentation(sc)?;
            let integer = t.states.integer;
            t.next(sc, integer);
            Ok(())
        }),
    );
    p.transition(
        s.start,
        "-",
        Some(|t, sc| {
            t.end_indentation(sc)?;
            t.push_token(sc, TokenKind::ListItem, String::new())?;
            let space = t.states.space;
            t.next(sc, space);
            Ok(())
        }),
    );
    p.transition(
        s.start,
        "$",
        Some(|t, sc| {
            t.end_indentation(sc)?;
            t.push_token(sc, TokenKind::Directive, String::new())?;
            let space = t.states.space;
            t.next(sc, space);
            Ok(())
        }),
    );
    p.transition(
        s.start,
        "([{",
        Some(|t, sc| {
            t.end_indentation(sc)?;
            t.add_block(sc)?;
            let space = t.states.space;
            sc.next_state(space);
            Ok(())
        }),
    );
    // quoted keys
    p.transition(
        s.start,
        "\"",
        Some(|t, sc| {
            t.end_indentation(sc)?;
            t.quote.clear();
            let quote = t.states.quote;
            t.next(sc, quote);
            Ok(())
        }),
    );

    // between tokens
    p.transition(s.space, " \t", None);
    p.transition(s.space, "\n\r", Some(|t, sc| t.line_break(sc)));
    p.transition(
        s.space,
        "-",
        Some(|t, sc| {
            let minus = t.states.minus;
            t.next(sc, minus);
            Ok(())
        }),
    );
    p.transition(
        s.space,
        "%",
        Some(|t, sc| {
            let reference = t.states.reference;
            t.next(sc, reference);
            t.last_start += 1; // the marker is not part of the name
            Ok(())
        }),
    );
    p.transition(
        s.space,
        LETTERS,
        Some(|t, sc| {
            let name = t.states.name;
            t.next(sc, name);
            Ok(())
        }),
    );
    p.transition(
        s.space,
        DIGITS,
        Some(|t, sc| {
            let integer = t.states.integer;
            t.next(sc, integer);
            Ok(())
        }),
    );
    p.transition(
        s.space,
        ",",
        Some(|t, sc| t.push_token(sc, TokenKind::ExpressionBreak, String::new())),
    );
    p.transition(s.space, "([{", Some(|t, sc| t.add_block(sc)));
    p.transition(s.space, ")]}", Some(|t, sc| t.end_block(sc)));
    p.transition(
        s.space,
        "\"",
        Some(|t, sc| {
            t.quote.clear();
            let quote = t.states.quote;
            t.next(sc, quote);
            Ok(())
        }),
    );
    p.transition(
        s.space,
        ":",
        Some(|t, sc| t.push_token(sc, TokenKind::Assign, String::new())),
    );

    // bare names; dots allow qualified type names
    p.transition(s.name, LETTERS, None);
    p.transition(s.name, DIGITS, None);
    p.transition(s.name, ".", None);
    p.transition(
        s.name,
        BREAKERS,
        Some(|t, sc| {
            t.add_token(sc, TokenKind::Text)?;
            sc.stay()?;
            let space = t.states.space;
            t.next(sc, space);
            Ok(())
        }),
    );

    // numbers
    p.transition(s.integer, DIGITS, None);
    p.transition(
        s.integer,
        ".",
        Some(|t, sc| {
            let decimal = t.states.decimal;
            t.next_cont(sc, decimal);
            Ok(())
        }),
    );
    p.transition(
        s.integer,
        BREAKERS,
        Some(|t, sc| {
            t.add_token(sc, TokenKind::Integer)?;
            sc.stay()?;
            let space = t.states.space;
            t.next(sc, space);
            Ok(())
        }),
    );
    p.transition(
        s.minus,
        DIGITS,
        Some(|t, sc| {
            let integer = t.states.integer;
            t.next_cont(sc, integer);
            Ok(())
        }),
    );
    p.transition(
        s.minus,
        ".",
        Some(|t, sc| {
            let decimal = t.states.decimal;
            t.next_cont(sc, decimal);
            Ok(())
        }),
    );
    p.transition(s.decimal, DIGITS, None);
    p.transition(
        s.decimal,
        BREAKERS,
        Some(|t, sc| {
            t.add_token(sc, TokenKind::Decimal)?;
            sc.stay()?;
            let space = t.states.space;
            t.next(sc, space);
            Ok(())
        }),
    );

    // quoted text: raw bytes until the closing quote, escapes via '\'
    p.fill_transition(s.quote, |t, sc| {
        let byte = sc.input_byte();
        t.add_quote_byte(sc, byte)
    });
    p.transition(
        s.quote,
        "\n\r",
        Some(|_, sc| Err(sc.lexical("line break inside quoted text"))),
    );
    p.transition(
        s.quote,
        "\"",
        Some(|t, sc| {
            t.last_start += 1;
            t.add_quote(sc)?;
            let space = t.states.space;
            t.next(sc, space);
            Ok(())
        }),
    );
    p.transition(
        s.quote,
        "\\",
        Some(|t, sc| {
            let escape = t.states.escape;
            t.next(sc, escape);
            Ok(())
        }),
    );

    p.fill_transition(s.escape, |_, sc| {
        Err(sc.lexical("invalid escape character in quoted text"))
    });
    p.transition(s.escape, "'", Some(|t, sc| escape_byte(t, sc, 0x27)));
    p.transition(s.escape, "\"", Some(|t, sc| escape_byte(t, sc, 0x22)));
    p.transition(s.escape, "?", Some(|t, sc| escape_byte(t, sc, 0x3f)));
    p.transition(s.escape, "\\", Some(|t, sc| escape_byte(t, sc, 0x5c)));
    p.transition(s.escape, "a", Some(|t, sc| escape_byte(t, sc, 0x07)));
    p.transition(s.escape, "b", Some(|t, sc| escape_byte(t, sc, 0x08)));
    p.transition(s.escape, "f", Some(|t, sc| escape_byte(t, sc, 0x0c)));
    p.transition(s.escape, "n", Some(|t, sc| escape_byte(t, sc, 0x0a)));
    p.transition(s.escape, "r", Some(|t, sc| escape_byte(t, sc, 0x0d)));
    p.transition(s.escape, "t", Some(|t, sc| escape_byte(t, sc, 0x09)));
    p.transition(s.escape, "v", Some(|t, sc| escape_byte(t, sc, 0x0b)));
    p.transition(
        s.escape,
        "x",
        Some(|t, sc| {
            let hex = t.states.hex;
            t.next(sc, hex);
            Ok(())
        }),
    );

    p.fill_transition(s.hex, |_, sc| Err(sc.lexical("invalid hexadecimal byte")));
    p.transition(
        s.hex,
        HEX_DIGITS,
        Some(|t, sc| {
            if sc.index() as isize - t.last_start >= 2 {
                t.add_hex_byte(sc)?;
                let quote = t.states.quote;
                t.next(sc, quote);
            }
            Ok(())
        }),
    );

    // %references
    p.transition(s.reference, LETTERS, None);
    p.transition(
        s.reference,
        BREAKERS,
        Some(|t, sc| {
            t.add_token(sc, TokenKind::Reference)?;
            sc.stay()?;
            let space = t.states.space;
            t.next(sc, space);
            Ok(())
        }),
    );
}

/// One-byte escape: append the fixed byte and return to the quote state.
fn escape_byte(t: &mut Tokenizer<'_>, sc: &mut Scanner, byte: u8) -> Result<()> {
    t.add_quote_byte(sc, byte)?;
    let quote = t.states.quote;
    t.next(sc, quote);
    Ok(())
}
