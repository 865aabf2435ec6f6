//! The scope stack.
//!
//! Scopes as a slice of maps mutated through an aliased handle is the tempting shape
//! here (see the Design Notes' re-architecture request); this is an explicit
//! `Vec<Frame>` instead: `push`/`pop` are the only way frames come and go, lookups walk
//! top-to-root by plain iteration, and a declaration or assignment always goes through
//! `&mut self` on the owning stack — there is no separate `ScopeRef` handle that could
//! alias a frame out from under a pop. Ordered bindings use `indexmap::IndexMap`,
//! matching the "ordered map<string, Value>" requirement the same way
//! `value::ObjectData` does for object fields.

use indexmap::IndexMap;

use crate::error::Error;
use crate::span::Span;
use crate::unwind::EvalResult;
use crate::value::Value;

/// Default stack depth limit ("default >= 20"). Chosen generously above the
/// minimum so ordinary recursive Homescript functions (a factorial-style `fact`) don't
/// brush the limit while scenario 8's unbounded recursion still overflows promptly.
pub const DEFAULT_STACK_LIMIT: usize = 512;

#[derive(Debug)]
pub struct Frame {
    pub bindings: IndexMap<String, Value>,
    pub owner_function: Option<String>,
    pub defined_at: Span,
}

impl Frame {
    fn new(owner_function: Option<String>, defined_at: Span) -> Self {
        Self {
            bindings: IndexMap::new(),
            owner_function,
            defined_at,
        }
    }
}

pub struct ScopeStack {
    frames: Vec<Frame>,
    limit: usize,
}

impl ScopeStack {
    /// Builds the root frame from a fixed builtin set plus caller-supplied additions.
    /// Additions may not shadow builtins — construction fails if they would.
    pub fn new(
        builtins: IndexMap<String, Value>,
        scope_additions: IndexMap<String, Value>,
        limit: usize,
        root_span: Span,
    ) -> Result<Self, Error> {
        let mut bindings = builtins;
        for (name, value) in scope_additions {
            if bindings.contains_key(&name) {
                return Err(Error::syntax(
                    format!("scope addition `{}` shadows a builtin", name),
                    root_span,
                ));
            }
            bindings.insert(name, value);
        }
        let root = Frame {
            bindings,
            owner_function: None,
            defined_at: root_span,
        };
        Ok(Self {
            frames: vec![root],
            limit,
        })
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// `push(owner_function?, span) -> Result<(), StackOverflow>`.
    pub fn push(&mut self, owner_function: Option<String>, span: Span) -> EvalResult<()> {
        if self.frames.len() >= self.limit {
            return Err(Error::stack_overflow(span).into());
        }
        self.frames.push(Frame::new(owner_function, span));
        Ok(())
    }

    /// Popping the root frame is a programmer bug (panics).
    pub fn pop(&mut self) {
        if self.frames.len() <= 1 {
            panic!("attempted to pop the root scope frame");
        }
        self.frames.pop();
    }

    /// `let`: inserts into the top frame; fails with Syntax error if
    /// already bound there (shadowing across frames is allowed).
    pub fn declare(&mut self, name: String, value: Value, span: Span) -> Result<(), Error> {
        let top = self
            .frames
            .last_mut()
            .expect("scope stack is never empty");
        if top.bindings.contains_key(&name) {
            return Err(Error::syntax(
                format!("variable `{}` is already declared in this scope", name),
                span,
            ));
        }
        top.bindings.insert(name, value);
        Ok(())
    }

    /// Walks top-to-root and returns the first binding found.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|f| f.bindings.get(name))
    }

    /// Assignment walks top-to-root, updates the first frame containing
    /// `name`. Type/protection checks are the evaluator's responsibility (it needs
    /// the previous value to perform them); this just performs the write.
    pub fn assign(&mut self, name: &str, value: Value) -> Option<Value> {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.bindings.get_mut(name) {
                return Some(std::mem::replace(slot, value));
            }
        }
        None
    }

    pub fn current_owner_function(&self) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.owner_function.as_deref())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::span::Span;

    fn stack() -> ScopeStack {
        ScopeStack::new(IndexMap::new(), IndexMap::new(), 4, Span::dummy()).unwrap()
    }

    #[test]
    fn declare_and_lookup_walks_top_to_root() {
        let mut s = stack();
        s.declare("x".into(), Value::number(1.0, Span::dummy()), Span::dummy())
            .unwrap();
        s.push(None, Span::dummy()).unwrap();
        s.declare("y".into(), Value::number(2.0, Span::dummy()), Span::dummy())
            .unwrap();
        assert!(s.lookup("x").is_some());
        assert!(s.lookup("y").is_some());
        s.pop();
        assert!(s.lookup("y").is_none());
    }

    #[test]
    fn redeclaring_in_same_frame_is_an_error() {
        let mut s = stack();
        s.declare("x".into(), Value::number(1.0, Span::dummy()), Span::dummy())
            .unwrap();
        let err = s
            .declare("x".into(), Value::number(2.0, Span::dummy()), Span::dummy())
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn shadowing_across_frames_is_allowed() {
        let mut s = stack();
        s.declare("x".into(), Value::number(1.0, Span::dummy()), Span::dummy())
            .unwrap();
        s.push(None, Span::dummy()).unwrap();
        s.declare("x".into(), Value::number(2.0, Span::dummy()), Span::dummy())
            .unwrap();
        assert!(matches!(
            s.lookup("x").unwrap().data,
            crate::value::ValueData::Number(n) if n == 2.0
        ));
    }

    #[test]
    fn push_beyond_limit_overflows() {
        let mut s = stack();
        s.push(None, Span::dummy()).unwrap();
        s.push(None, Span::dummy()).unwrap();
        s.push(None, Span::dummy()).unwrap();
        let err = s.push(None, Span::dummy()).unwrap_err();
        match err {
            crate::unwind::Unwind::Error(e) => {
                assert_eq!(e.kind, crate::error::ErrorKind::StackOverflow)
            }
            _ => panic!("expected Error"),
        }
    }

    #[test]
    fn additions_colliding_with_builtins_fail_construction() {
        let mut builtins = IndexMap::new();
        builtins.insert("print".to_string(), Value::number(0.0, Span::dummy()));
        let mut additions = IndexMap::new();
        additions.insert("print".to_string(), Value::number(1.0, Span::dummy()));
        assert!(ScopeStack::new(builtins, additions, 4, Span::dummy()).is_err());
    }
}
