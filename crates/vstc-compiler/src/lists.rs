//! Named token lists
//!
//! While a list scope is open every token the session builds is appended to
//! each list named by the scope. Scopes do not nest.

use crate::error::CompileError;
use crate::value::SchemeValue;
use std::rc::Rc;
use vstc_core::Token;

/// A named, ordered collection of tokens
#[derive(Debug, Clone, Default)]
pub struct CustomList {
    pub name: String,
    tokens: Vec<Rc<Token>>,
}

impl CustomList {
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().map(|t| t.as_ref())
    }

    pub(crate) fn shared(&self) -> &[Rc<Token>] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Registry of every list declared in a scheme
#[derive(Debug, Default)]
pub struct ListRegistry {
    lists: Vec<CustomList>,

    /// Indices of the lists of the open scope
    open: Option<Vec<usize>>,
}

impl ListRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a scope over `names`, creating lists that don't exist yet
    pub fn open(&mut self, names: &[SchemeValue]) -> Result<(), CompileError> {
        if self.open.is_some() {
            return Err(CompileError::NestedList);
        }
        if names.is_empty() {
            return Err(CompileError::UnnamedList);
        }

        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            match name {
                SchemeValue::Str(s) if !s.is_empty() => resolved.push(s.as_str()),
                other => {
                    return Err(CompileError::InvalidListName {
                        kind: other.kind().to_string(),
                    })
                }
            }
        }

        let mut indices = Vec::with_capacity(resolved.len());
        for name in resolved {
            let index = match self.position(name) {
                Some(index) => index,
                None => {
                    self.lists.push(CustomList {
                        name: name.to_string(),
                        tokens: Vec::new(),
                    });
                    self.lists.len() - 1
                }
            };
            if !indices.contains(&index) {
                indices.push(index);
            }
        }

        tracing::debug!(lists = ?names.iter().map(|n| n.to_string()).collect::<Vec<_>>(), "opened list scope");
        self.open = Some(indices);
        Ok(())
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Append a freshly built token to every open list
    pub fn record(&mut self, token: &Rc<Token>) {
        if let Some(indices) = &self.open {
            for &index in indices {
                if let Some(list) = self.lists.get_mut(index) {
                    list.tokens.push(Rc::clone(token));
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&CustomList> {
        self.position(name).and_then(|i| self.lists.get(i))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// List names, in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lists.iter().map(|l| l.name.as_str())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.lists.iter().position(|l| l.name == name)
    }
}
