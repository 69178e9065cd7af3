//! The built route table and per-request lookup.
//!
//! # Design Decisions
//! - Immutable after construction; reloads build a whole new table and the
//!   serving core swaps it atomically, so in-flight requests keep a
//!   consistent snapshot
//! - Entries are checked in insertion order and the first match wins.
//!   Insertion order is the filesystem traversal order at build time, so a
//!   parameter route visited before a literal sibling shadows it; the
//!   startup listing is the operator's window into the effective order
//! - Verb bindings per entry keep insertion order too; the `Allow` header on
//!   405 responses lists them in that order

use std::collections::HashMap;
use std::sync::Arc;

use crate::http::method::Verb;
use crate::routing::handler::Handler;
use crate::routing::pattern::CompiledPattern;

/// One path pattern with its verb bindings.
pub struct RouteEntry {
    pattern: CompiledPattern,
    bindings: Vec<(Verb, Arc<dyn Handler>)>,
}

impl RouteEntry {
    /// The pattern text, e.g. `/users/:id`.
    pub fn pattern(&self) -> &str {
        self.pattern.pattern()
    }

    /// The handler bound for a verb, if any.
    pub fn handler(&self, verb: Verb) -> Option<&Arc<dyn Handler>> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == verb)
            .map(|(_, handler)| handler)
    }

    /// Bound verbs in insertion order.
    pub fn verbs(&self) -> impl Iterator<Item = Verb> + '_ {
        self.bindings.iter().map(|(verb, _)| *verb)
    }

    /// `Allow` header value for this entry.
    pub fn allow_header(&self) -> String {
        self.verbs()
            .map(Verb::token)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn bind(&mut self, verb: Verb, handler: Arc<dyn Handler>) {
        // Union semantics: a rebind replaces the handler but keeps the
        // verb's original position.
        match self.bindings.iter_mut().find(|(bound, _)| *bound == verb) {
            Some((_, slot)) => *slot = handler,
            None => self.bindings.push((verb, handler)),
        }
    }
}

/// Result of matching a concrete path against the table.
pub struct RouteMatch<'t> {
    /// The entry whose pattern matched.
    pub entry: &'t RouteEntry,
    /// Extracted parameter values.
    pub params: HashMap<String, String>,
}

/// The path → verb → handler table derived from a routes directory.
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    generation: u64,
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("generation", &self.generation)
            .field(
                "patterns",
                &self.entries.iter().map(RouteEntry::pattern).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl RouteTable {
    pub fn new(generation: u64) -> Self {
        Self {
            entries: Vec::new(),
            generation,
        }
    }

    /// The build generation this table was derived with.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Binds a handler at a pattern/verb, creating the entry on first use.
    ///
    /// Keys are unique by construction: binding an existing pattern unions
    /// the verb maps instead of replacing the entry.
    pub fn bind(&mut self, pattern: &str, verb: Verb, handler: Arc<dyn Handler>) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.pattern() == pattern)
        {
            Some(entry) => entry.bind(verb, handler),
            None => {
                let mut entry = RouteEntry {
                    pattern: CompiledPattern::compile(pattern),
                    bindings: Vec::new(),
                };
                entry.bind(verb, handler);
                self.entries.push(entry);
            }
        }
    }

    /// Matches a path against the table in insertion order; first match wins.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.entries.iter().find_map(|entry| {
            entry
                .pattern
                .match_path(path)
                .map(|params| RouteMatch { entry, params })
        })
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::result::HttpResult;
    use crate::routing::handler::handler_fn;

    fn noop() -> Arc<dyn Handler> {
        handler_fn(|_req| async { Ok(HttpResult::no_content()) })
    }

    #[test]
    fn first_registered_pattern_wins() {
        let mut table = RouteTable::new(1);
        table.bind("/users/:id", Verb::Get, noop());
        table.bind("/users/active", Verb::Get, noop());

        let matched = table.match_path("/users/active").unwrap();
        assert_eq!(matched.entry.pattern(), "/users/:id");
        assert_eq!(matched.params.get("id").map(String::as_str), Some("active"));
    }

    #[test]
    fn binding_same_pattern_unions_verbs() {
        let mut table = RouteTable::new(1);
        table.bind("/things", Verb::Get, noop());
        table.bind("/things", Verb::Post, noop());

        assert_eq!(table.len(), 1);
        let entry = &table.entries()[0];
        assert!(entry.handler(Verb::Get).is_some());
        assert!(entry.handler(Verb::Post).is_some());
        assert!(entry.handler(Verb::Delete).is_none());
    }

    #[test]
    fn allow_header_lists_verbs_in_insertion_order() {
        let mut table = RouteTable::new(1);
        table.bind("/things", Verb::Post, noop());
        table.bind("/things", Verb::Get, noop());
        table.bind("/things", Verb::Delete, noop());

        assert_eq!(table.entries()[0].allow_header(), "post, get, delete");
    }

    #[test]
    fn rebinding_a_verb_keeps_its_position() {
        let mut table = RouteTable::new(1);
        table.bind("/things", Verb::Post, noop());
        table.bind("/things", Verb::Get, noop());
        table.bind("/things", Verb::Post, noop());

        assert_eq!(table.entries()[0].allow_header(), "post, get");
    }

    #[test]
    fn no_entry_matches_unknown_path() {
        let mut table = RouteTable::new(1);
        table.bind("/users", Verb::Get, noop());
        assert!(table.match_path("/missing").is_none());
    }
}
