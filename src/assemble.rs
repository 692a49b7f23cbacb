//! Structural assembly of parsed lines into the document tree.
//!
//! The lexer hands over one token tree per non-empty line together with the
//! line's nesting depth. The assembler keeps a stack of open containers
//! (the document root map at the bottom), a pending-key register for bare
//! keys whose container arrives on the following lines, and the record
//! definition currently being collected, if a `$struct` block is open.
//!
//! Containers are owned by their stack frame and attached to the parent
//! when the frame is popped, which is also when a record-typed list is
//! validated against its record (arity check, member type propagation).

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::token::{TokenId, TokenKind, TokenTree};
use crate::types::{make_generic, RecordType, Registry, TypeRef};
use crate::value::{List, Scalar, Value};
use crate::StrataMap;

const MAX_NAME_LENGTH: usize = 128;

/// Where a finished container goes when its frame is popped.
enum Slot {
    /// The document root; never attached anywhere.
    Root,
    /// Map entry under the parent.
    Key(String),
    /// Appended item of the parent list.
    Item,
}

struct Frame {
    value: Value,
    slot: Slot,
}

pub(crate) struct Assembler<'reg> {
    registry: &'reg Registry,
    /// Records declared by the input, in declaration order.
    records: IndexMap<String, Arc<RecordType>>,
    /// Open `$struct` definition.
    building: Option<RecordType>,
    stack: Vec<Frame>,
    pending_key: Option<String>,
    depth: usize,
}

impl<'reg> Assembler<'reg> {
    pub(crate) fn new(registry: &'reg Registry) -> Self {
        Assembler {
            registry,
            records: IndexMap::new(),
            building: None,
            stack: vec![Frame {
                value: Value::Map(StrataMap::new()),
                slot: Slot::Root,
            }],
            pending_key: None,
            depth: 0,
        }
    }

    /// Processes one completed line.
    pub(crate) fn handle_line(&mut self, tree: &TokenTree, depth: usize) -> Result<()> {
        if self.stack.is_empty() {
            return Err(Error::internal("container stack is empty"));
        }
        if !(depth < self.stack.len()
            || (depth == self.stack.len() && self.pending_key.is_some())
            || self.building.is_some())
        {
            return Err(Error::indentation("line is nested too deep"));
        }
        self.depth = depth;

        let Some(first) = tree.child(TokenTree::ROOT) else {
            return Ok(());
        };

        if self.building.is_some() {
            if depth == 0 {
                // the definition block ends; the line itself still counts
                self.finish_record();
            } else {
                if depth != 1 {
                    return Err(Error::indentation(
                        "record member must be indented exactly one level",
                    ));
                }
                return self.member_line(tree, first);
            }
        }

        if tree.kind(first) == TokenKind::Directive {
            return self.directive_line(tree, first, depth);
        }

        // close containers the indentation has left behind
        if depth < self.stack.len() {
            let delta = self.stack.len() - depth - 1;
            for _ in 0..delta {
                self.pop_frame()?;
            }
        }

        match tree.kind(first) {
            TokenKind::Text | TokenKind::Integer => self.key_line(tree, first),
            TokenKind::ListItem => self.item_line(tree, first),
            TokenKind::SquareBrackets => self.typed_key_line(tree, first),
            kind => Err(Error::grammar(format!(
                "unexpected token at start of line: {kind:?}"
            ))),
        }
    }

    /// Closes everything still open and returns the document root and the
    /// records declared by the input.
    pub(crate) fn finish(mut self) -> Result<(StrataMap, IndexMap<String, Arc<RecordType>>)> {
        if self.building.is_some() {
            self.finish_record();
        }
        while self.stack.len() > 1 {
            self.pop_frame()?;
        }
        let mut root = self
            .stack
            .pop()
            .ok_or_else(|| Error::internal("container stack is empty"))?;
        root.value.close()?;
        match root.value {
            Value::Map(map) => Ok((map, self.records)),
            _ => Err(Error::internal("document root is not a map")),
        }
    }

    // --- lines -----------------------------------------------------------

    /// `key`, or `key: value`.
    fn key_line(&mut self, tree: &TokenTree, first: TokenId) -> Result<()> {
        let key = tree.text(first).to_string();
        match tree.next(first) {
            None => {
                // bare key: its container arrives on the following lines
                if let Some(name) = self.pending_key.take() {
                    self.open_keyed_map(name)?;
                }
                self.pending_key = Some(key);
                Ok(())
            }
            Some(second) if tree.kind(second) == TokenKind::Assign => {
                let value_tok = tree.expect_next(second)?;
                let value = self.value_from(tree, value_tok)?;
                if tree.next(value_tok).is_some() {
                    return Err(Error::grammar("unexpected token after value"));
                }
                self.add_key_value(key, value)
            }
            Some(second) => Err(Error::grammar(format!(
                "unexpected token after key: {:?}",
                tree.kind(second)
            ))),
        }
    }

    /// `- value`, or `- key: value` opening a map item.
    fn item_line(&mut self, tree: &TokenTree, first: TokenId) -> Result<()> {
        let item = tree.expect_next(first)?;
        if tree.next(item).is_none() {
            let value = self.value_from(tree, item)?;
            return self.add_list_item(value);
        }
        // `- key: value` appends a fresh map item and keeps it open
        if !matches!(tree.kind(item), TokenKind::Text | TokenKind::Integer) {
            return Err(Error::grammar("key expected after list item marker"));
        }
        let key = tree.text(item).to_string();
        let second = tree.expect_next(item)?;
        if tree.kind(second) != TokenKind::Assign {
            return Err(Error::grammar("':' expected after list item key"));
        }
        let value_tok = tree.expect_next(second)?;
        let value = self.value_from(tree, value_tok)?;
        if tree.next(value_tok).is_some() {
            return Err(Error::grammar("unexpected token after value"));
        }
        let mut map = StrataMap::new();
        map.insert(key, value);
        self.open_list_item_map(map)
    }

    /// `[RecordName] key`: a record-typed list under `key`.
    fn typed_key_line(&mut self, tree: &TokenTree, first: TokenId) -> Result<()> {
        let block = tree.expect_child(first)?;
        let name_tok = tree.expect_child(block)?;
        if tree.kind(name_tok) != TokenKind::Text || tree.next(name_tok).is_some() {
            return Err(Error::grammar("record name expected in brackets"));
        }
        let record = self.lookup_record(tree.text(name_tok))?;
        let key_tok = tree.expect_next(first)?;
        if tree.kind(key_tok) != TokenKind::Text {
            return Err(Error::grammar("key expected after record name"));
        }
        if tree.next(key_tok).is_some() {
            return Err(Error::grammar("unexpected token after typed key"));
        }
        let key = tree.text(key_tok).to_string();
        self.open_keyed(key, Value::List(List::with_record(record)))
    }

    /// `$struct Name`.
    fn directive_line(&mut self, tree: &TokenTree, first: TokenId, depth: usize) -> Result<()> {
        if depth != 0 {
            return Err(Error::indentation(
                "record declaration must start at the first column",
            ));
        }
        while self.stack.len() > 1 {
            self.pop_frame()?;
        }
        let keyword = tree.expect_next(first)?;
        if tree.text(keyword) != "struct" {
            return Err(Error::grammar(format!(
                "unknown directive: ${}",
                tree.text(keyword)
            )));
        }
        let name_tok = tree.expect_next(keyword)?;
        let name = tree.text(name_tok);
        if !valid_name(name) {
            return Err(Error::grammar(format!("invalid record name: {name:?}")));
        }
        if tree.next(name_tok).is_some() {
            return Err(Error::grammar("unexpected token after record name"));
        }
        if self.records.contains_key(name) {
            return Err(Error::grammar(format!("record already declared: {name}")));
        }
        self.building = Some(RecordType::new(name));
        Ok(())
    }

    /// `TypeName memberName`, or `generic[ Params ] memberName`, inside an
    /// open `$struct` block.
    fn member_line(&mut self, tree: &TokenTree, first: TokenId) -> Result<()> {
        if tree.kind(first) != TokenKind::Text {
            return Err(Error::grammar("type name expected"));
        }
        let type_name = tree.text(first).to_string();
        let second = tree.expect_next(first)?;
        let (ty, name_tok) = match tree.kind(second) {
            TokenKind::Text => (self.lookup_type(&type_name)?, second),
            TokenKind::SquareBrackets => {
                let params = self.generic_params(tree, second)?;
                (make_generic(&type_name, params)?, tree.expect_next(second)?)
            }
            kind => {
                return Err(Error::grammar(format!(
                    "member name expected, found {kind:?}"
                )))
            }
        };
        if tree.kind(name_tok) != TokenKind::Text {
            return Err(Error::grammar("member name expected"));
        }
        if tree.next(name_tok).is_some() {
            return Err(Error::grammar("unexpected token after member name"));
        }
        let member_name = tree.text(name_tok);
        if !valid_name(member_name) {
            return Err(Error::grammar(format!(
                "invalid member name: {member_name:?}"
            )));
        }
        let building = self
            .building
            .as_mut()
            .ok_or_else(|| Error::internal("no open record definition"))?;
        building.push_member(member_name, ty);
        Ok(())
    }

    fn generic_params(&self, tree: &TokenTree, bracket: TokenId) -> Result<Vec<TypeRef>> {
        let block = tree.expect_child(bracket)?;
        let mut params = Vec::new();
        let mut cursor = tree.child(block);
        while let Some(tok) = cursor {
            if tree.kind(tok) != TokenKind::Text {
                return Err(Error::grammar("type name expected in brackets"));
            }
            params.push(self.lookup_type(tree.text(tok))?);
            cursor = tree.next(tok);
        }
        Ok(params)
    }

    fn finish_record(&mut self) {
        if let Some(record) = self.building.take() {
            self.records
                .insert(record.name().to_string(), Arc::new(record));
        }
    }

    // --- type lookup -----------------------------------------------------

    /// Records declared by the input shadow native registry records.
    fn lookup_record(&self, name: &str) -> Result<Arc<RecordType>> {
        self.records
            .get(name)
            .or_else(|| self.registry.record(name))
            .cloned()
            .ok_or_else(|| Error::grammar(format!("record not defined: {name}")))
    }

    fn lookup_type(&self, name: &str) -> Result<TypeRef> {
        if let Some(ty) = TypeRef::builtin(name) {
            return Ok(ty);
        }
        if let Some(rec) = self.records.get(name).or_else(|| self.registry.record(name)) {
            return Ok(TypeRef::Record(Arc::clone(rec)));
        }
        if self.registry.is_enum(name) {
            return Ok(TypeRef::Enum(name.to_string()));
        }
        Err(Error::grammar(format!("unknown type name: {name}")))
    }

    // --- values ----------------------------------------------------------

    /// Resolves a value token: scalar text, inline composite, or `%null`.
    fn value_from(&self, tree: &TokenTree, tok: TokenId) -> Result<Value> {
        match tree.kind(tok) {
            TokenKind::Text | TokenKind::Integer | TokenKind::Decimal => {
                Ok(Value::Scalar(Scalar::new(tree.text(tok))))
            }
            TokenKind::CurlyBrackets => self.inline_map(tree, tok),
            TokenKind::Parenthesis => self.inline_list(tree, tok),
            TokenKind::Reference => {
                if tree.text(tok) == "null" {
                    Ok(Value::Null)
                } else {
                    Err(Error::grammar(format!(
                        "unknown reference: %{}",
                        tree.text(tok)
                    )))
                }
            }
            kind => Err(Error::grammar(format!("value expected, found {kind:?}"))),
        }
    }

    /// `{key: value, ...}`.
    fn inline_map(&self, tree: &TokenTree, bracket: TokenId) -> Result<Value> {
        let block = tree.expect_child(bracket)?;
        let mut map = StrataMap::new();
        let mut cursor = tree.child(block);
        while let Some(key_tok) = cursor {
            if !matches!(tree.kind(key_tok), TokenKind::Text | TokenKind::Integer) {
                return Err(Error::grammar("key expected in inline map"));
            }
            let assign = tree.expect_next(key_tok)?;
            if tree.kind(assign) != TokenKind::Assign {
                return Err(Error::grammar("':' expected in inline map"));
            }
            let value_tok = tree.expect_next(assign)?;
            let value = self.value_from(tree, value_tok)?;
            map.insert(tree.text(key_tok).to_string(), value);
            cursor = match tree.next(value_tok) {
                None => None,
                Some(sep) => {
                    if tree.kind(sep) != TokenKind::ExpressionBreak {
                        return Err(Error::grammar("',' expected in inline map"));
                    }
                    Some(tree.expect_next(sep)?)
                }
            };
        }
        Ok(Value::Map(map))
    }

    /// `(value, ...)`.
    fn inline_list(&self, tree: &TokenTree, bracket: TokenId) -> Result<Value> {
        let block = tree.expect_child(bracket)?;
        let mut list = List::new();
        let mut cursor = tree.child(block);
        while let Some(tok) = cursor {
            list.push(self.value_from(tree, tok)?);
            cursor = match tree.next(tok) {
                None => None,
                Some(sep) => {
                    if tree.kind(sep) != TokenKind::ExpressionBreak {
                        return Err(Error::grammar("',' expected in inline list"));
                    }
                    Some(tree.expect_next(sep)?)
                }
            };
        }
        Ok(Value::List(list))
    }

    // --- container stack -------------------------------------------------

    fn top(&mut self) -> &mut Value {
        // the stack is never empty while parsing
        &mut self.stack.last_mut().expect("container stack").value
    }

    /// Pops the top frame, validates it against its type, and attaches it
    /// to its parent.
    fn pop_frame(&mut self) -> Result<()> {
        let mut frame = self
            .stack
            .pop()
            .ok_or_else(|| Error::internal("container stack is empty"))?;
        frame.value.close()?;
        match frame.slot {
            Slot::Root => Err(Error::internal("cannot close the document root")),
            Slot::Key(key) => match self.top() {
                Value::Map(map) => {
                    map.insert(key, frame.value);
                    Ok(())
                }
                _ => Err(Error::internal("keyed container must close into a map")),
            },
            Slot::Item => match self.top() {
                Value::List(list) => {
                    list.push(frame.value);
                    Ok(())
                }
                _ => Err(Error::internal("list item must close into a list")),
            },
        }
    }

    /// Materializes the pending bare key as a nested map and opens it.
    fn open_keyed_map(&mut self, key: String) -> Result<()> {
        if !matches!(self.top(), Value::Map(_)) {
            return Err(Error::grammar("cannot nest a named map inside a list"));
        }
        self.stack.push(Frame {
            value: Value::Map(StrataMap::new()),
            slot: Slot::Key(key),
        });
        Ok(())
    }

    /// Opens `value` as a new keyed container, materializing a pending key
    /// first if needed.
    fn open_keyed(&mut self, key: String, value: Value) -> Result<()> {
        if self.depth == 0 {
            if let Some(name) = &self.pending_key {
                return Err(Error::grammar(format!("unassigned name: {name}")));
            }
        } else if let Some(name) = self.pending_key.take() {
            self.open_keyed_map(name)?;
        }
        if !matches!(self.top(), Value::Map(_)) {
            return Err(Error::grammar("key/value pair inside a list"));
        }
        self.stack.push(Frame {
            value,
            slot: Slot::Key(key),
        });
        Ok(())
    }

    fn add_key_value(&mut self, key: String, value: Value) -> Result<()> {
        if self.depth == 0 {
            if let Some(name) = &self.pending_key {
                return Err(Error::grammar(format!("unassigned name: {name}")));
            }
        } else if let Some(name) = self.pending_key.take() {
            self.open_keyed_map(name)?;
        }
        match self.top() {
            Value::Map(map) => {
                map.insert(key, value);
                Ok(())
            }
            _ => Err(Error::grammar("key/value pair inside a list")),
        }
    }

    fn add_list_item(&mut self, value: Value) -> Result<()> {
        if let Some(name) = self.pending_key.take() {
            // the pending key names a list; open it now
            if !matches!(self.top(), Value::Map(_)) {
                return Err(Error::grammar("cannot nest a named list inside a list"));
            }
            self.stack.push(Frame {
                value: Value::List(List::new()),
                slot: Slot::Key(name),
            });
        }
        match self.top() {
            Value::List(list) => {
                list.push(value);
                Ok(())
            }
            _ => Err(Error::grammar("list item outside a list")),
        }
    }

    /// `- key: value`: appends a map item and keeps it open for deeper
    /// lines.
    fn open_list_item_map(&mut self, map: StrataMap) -> Result<()> {
        if let Some(name) = self.pending_key.take() {
            if !matches!(self.top(), Value::Map(_)) {
                return Err(Error::grammar("cannot nest a named list inside a list"));
            }
            self.stack.push(Frame {
                value: Value::List(List::new()),
                slot: Slot::Key(name),
            });
        }
        if !matches!(self.top(), Value::List(_)) {
            return Err(Error::grammar("list item outside a list"));
        }
        self.stack.push(Frame {
            value: Value::Map(map),
            slot: Slot::Item,
        });
        Ok(())
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name.len() < MAX_NAME_LENGTH
}
