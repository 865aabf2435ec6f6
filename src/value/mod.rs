//! The value/type system.
//!
//! Shaped after a tagged `Value` enum (`Int/Ratio/Float/Bool/Str/List/Closure/...`) with
//! an `ExtensionValue`/`FromValue` pair for host-supplied values, reworked around this
//! crate's own variant set and the re-architecture requests in the Design Notes:
//! absence is `Option`, not a nullable pointer; identity for assignment is the scope
//! slot, not the Value's address (see `crate::scope`); `BuiltinVariable` resolves once
//! at the start of every operator (`resolve`, below) instead of via per-call dynamic
//! downcasts.
//!
//! Every `Value` carries the span it was created at and a `protected` flag.
//! Containers (`List`, `Object`) use `Rc<RefCell<_>>` so that `a.push(x)` mutates the
//! same backing store every binding of `a` sees — the reference-identity semantics
//! ordinary scripting languages give their container types, and the concrete shape
//! behind "Object fields and List elements hold references that alias the owned
//! Value." Scalars (`Number`, `Bool`, `String`, `Pair`) are plain value types: cloning a
//! `Value::Number` never aliases anything.

mod algebraic;
mod cast;
mod methods;
mod relational;

pub use methods::call_instance_method;
pub use relational::RelOp;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast;
use crate::error::Error;
use crate::executor::Executor;
use crate::span::Span;
use crate::unwind::EvalResult;

/// The coarse discriminant used for `type()`, homogeneity checks, and cast dispatch.
/// Deliberately coarser than the full payload (e.g. it does not distinguish Objects by
/// their `data_type` tag) — see `ValueKind` vs. `Value::type_name` below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Number,
    Bool,
    String,
    Pair,
    Object,
    List,
    Range,
    Function,
    BuiltinFunction,
    BuiltinVariable,
    Enum,
    EnumVariant,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Null => "null",
            ValueKind::Number => "num",
            ValueKind::Bool => "bool",
            ValueKind::String => "str",
            ValueKind::Pair => "pair",
            ValueKind::Object => "object",
            ValueKind::List => "list",
            ValueKind::Range => "range",
            ValueKind::Function => "function",
            ValueKind::BuiltinFunction => "function",
            ValueKind::BuiltinVariable => "variable",
            ValueKind::Enum => "enum",
            ValueKind::EnumVariant => "enum_variant",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug)]
pub struct ObjectData {
    pub data_type: Rc<str>,
    pub is_dynamic: bool,
    pub fields: IndexMap<String, Value>,
}

pub type ObjectRef = Rc<RefCell<ObjectData>>;

#[derive(Debug)]
pub struct ListData {
    /// `None` iff the list is empty (the witness is `unknown` iff
    /// empty).
    pub element_kind: Option<ValueKind>,
    pub items: Vec<Value>,
}

pub type ListRef = Rc<RefCell<ListData>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeData {
    pub start: i64,
    pub end: i64,
    pub current: i64,
}

impl RangeData {
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            current: start,
        }
    }

    pub fn is_descending(&self) -> bool {
        self.start > self.end
    }
}

#[derive(Debug)]
pub struct FunctionData {
    pub name: Option<Rc<str>>,
    pub params: Vec<(Rc<str>, Span)>,
    pub body: Rc<ast::Block>,
    pub span: Span,
}

/// `(Executor, Span, args) -> (Value, optional exit-code, optional Error)`.
/// Carries no closed-over state — every
/// registry-level builtin receives the Executor and its arguments fresh on each call;
/// instance methods like `list.push(x)` are handled separately (`methods.rs`), not
/// through this type, precisely so this invariant holds.
pub type BuiltinFn =
    fn(&mut dyn Executor, &Span, Vec<Value>) -> Result<BuiltinReturn, Error>;

#[derive(Debug, Clone)]
pub enum BuiltinReturn {
    Value(Value),
    /// The exit-code a `BuiltinFunction` may return, terminating the whole program.
    Exit(i32),
}

#[derive(Clone, Copy)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFunction({})", self.name)
    }
}

/// `(Executor, Span) -> (Value, optional Error)`; demand-evaluated and transparently
/// resolved on every operator use.
pub type BuiltinVariableFn = fn(&mut dyn Executor, &Span) -> Result<Value, Error>;

#[derive(Clone, Copy)]
pub struct BuiltinVariable {
    pub name: &'static str,
    pub func: BuiltinVariableFn,
}

impl fmt::Debug for BuiltinVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinVariable({})", self.name)
    }
}

#[derive(Debug)]
pub struct EnumData {
    pub name: Rc<str>,
    pub variants: Vec<Rc<str>>,
}

#[derive(Debug, Clone)]
pub enum ValueData {
    Null,
    Number(f64),
    Bool(bool),
    String(Rc<str>),
    Pair(Box<Value>, Box<Value>),
    Object(ObjectRef),
    List(ListRef),
    Range(RangeData),
    Function(Rc<FunctionData>),
    BuiltinFunction(BuiltinFunction),
    BuiltinVariable(BuiltinVariable),
    Enum(Rc<EnumData>),
    EnumVariant(Rc<EnumData>, Rc<str>),
}

#[derive(Debug, Clone)]
pub struct Value {
    pub span: Span,
    pub protected: bool,
    pub data: ValueData,
}

impl Value {
    pub fn new(data: ValueData, span: Span) -> Self {
        Self {
            span,
            protected: false,
            data,
        }
    }

    pub fn protected(data: ValueData, span: Span) -> Self {
        Self {
            span,
            protected: true,
            data,
        }
    }

    pub fn null(span: Span) -> Self {
        Self::new(ValueData::Null, span)
    }

    pub fn number(n: f64, span: Span) -> Self {
        Self::new(ValueData::Number(n), span)
    }

    pub fn boolean(b: bool, span: Span) -> Self {
        Self::new(ValueData::Bool(b), span)
    }

    pub fn string(s: impl Into<Rc<str>>, span: Span) -> Self {
        Self::new(ValueData::String(s.into()), span)
    }

    pub fn list(items: Vec<Value>, element_kind: Option<ValueKind>, span: Span) -> Self {
        Self::new(
            ValueData::List(Rc::new(RefCell::new(ListData {
                element_kind,
                items,
            }))),
            span,
        )
    }

    pub fn empty_list(span: Span) -> Self {
        Self::list(Vec::new(), None, span)
    }

    /// Builds a list from evaluated literal elements (`[1, 2, 3]`), enforcing the same
    /// element-homogeneity invariant `a.push(x)` enforces.
    pub fn list_literal(items: Vec<Value>, span: Span) -> Result<Value, Error> {
        let mut kind = None;
        for item in &items {
            match kind {
                None => kind = Some(item.kind()),
                Some(k) if k == item.kind() => {}
                Some(k) => {
                    return Err(Error::type_error(
                        format!("list<{}> rejects element of type {}", k, item.kind()),
                        span,
                    ))
                }
            }
        }
        Ok(Self::list(items, kind, span))
    }

    pub fn object(data_type: impl Into<Rc<str>>, is_dynamic: bool, fields: IndexMap<String, Value>, span: Span) -> Self {
        Self::new(
            ValueData::Object(Rc::new(RefCell::new(ObjectData {
                data_type: data_type.into(),
                is_dynamic,
                fields,
            }))),
            span,
        )
    }

    pub fn pair(key: Value, value: Value, span: Span) -> Self {
        Self::new(ValueData::Pair(Box::new(key), Box::new(value)), span)
    }

    pub fn range(start: i64, end: i64, span: Span) -> Self {
        Self::new(ValueData::Range(RangeData::new(start, end)), span)
    }

    pub fn function(data: FunctionData) -> Self {
        let span = data.span.clone();
        Self::new(ValueData::Function(Rc::new(data)), span)
    }

    pub fn builtin_function(name: &'static str, func: BuiltinFn) -> Self {
        Self::protected(
            ValueData::BuiltinFunction(BuiltinFunction { name, func }),
            Span::dummy(),
        )
    }

    pub fn builtin_variable(name: &'static str, func: BuiltinVariableFn) -> Self {
        Self::protected(
            ValueData::BuiltinVariable(BuiltinVariable { name, func }),
            Span::dummy(),
        )
    }

    pub fn kind(&self) -> ValueKind {
        match &self.data {
            ValueData::Null => ValueKind::Null,
            ValueData::Number(_) => ValueKind::Number,
            ValueData::Bool(_) => ValueKind::Bool,
            ValueData::String(_) => ValueKind::String,
            ValueData::Pair(..) => ValueKind::Pair,
            ValueData::Object(_) => ValueKind::Object,
            ValueData::List(_) => ValueKind::List,
            ValueData::Range(_) => ValueKind::Range,
            ValueData::Function(_) => ValueKind::Function,
            ValueData::BuiltinFunction(_) => ValueKind::BuiltinFunction,
            ValueData::BuiltinVariable(_) => ValueKind::BuiltinVariable,
            ValueData::Enum(_) => ValueKind::Enum,
            ValueData::EnumVariant(..) => ValueKind::EnumVariant,
        }
    }

    pub fn type_name(&self) -> String {
        self.kind().to_string()
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self.data,
            ValueData::Function(_) | ValueData::BuiltinFunction(_)
        )
    }

    /// The single resolve step the Design Notes ask for: a `BuiltinVariable` demand-
    /// evaluates to a concrete `Value` here; every other variant resolves to a clone of
    /// itself. Every Core/Relational/Algebraic operator calls this first.
    pub fn resolve(&self, executor: &mut dyn Executor) -> EvalResult<Value> {
        match &self.data {
            ValueData::BuiltinVariable(bv) => Ok((bv.func)(executor, &self.span)?),
            _ => Ok(self.clone()),
        }
    }

    /// Truthiness.
    pub fn is_truthy(&self, executor: &mut dyn Executor) -> EvalResult<bool> {
        let resolved = self.resolve(executor)?;
        Ok(match &resolved.data {
            ValueData::Null => false,
            ValueData::Number(n) => *n != 0.0,
            ValueData::Bool(b) => *b,
            ValueData::String(s) => !s.is_empty(),
            ValueData::Pair(k, v) => k.is_truthy(executor)? && v.is_truthy(executor)?,
            ValueData::Object(obj) => {
                let fields: Vec<Value> = obj.borrow().fields.values().cloned().collect();
                let mut truthy = true;
                for field in &fields {
                    truthy &= field.is_truthy(executor)?;
                }
                truthy
            }
            // Explicit choice: always false, distinct from "empty".
            ValueData::List(_) => false,
            ValueData::Range(r) => r.start == 0 && r.end == 0,
            ValueData::Function(_) | ValueData::BuiltinFunction(_) => true,
            ValueData::BuiltinVariable(_) => unreachable!("resolved above"),
            ValueData::Enum(_) | ValueData::EnumVariant(..) => true,
        })
    }

    /// Equality semantics: cross-type equality is a Type error except that Null
    /// compares equal only to Null.
    pub fn is_equal(&self, other: &Value, executor: &mut dyn Executor) -> EvalResult<bool> {
        let a = self.resolve(executor)?;
        let b = other.resolve(executor)?;

        if matches!(a.data, ValueData::Null) || matches!(b.data, ValueData::Null) {
            return Ok(matches!(a.data, ValueData::Null) && matches!(b.data, ValueData::Null));
        }

        if a.kind() != b.kind() {
            return Err(Error::type_error(
                format!(
                    "cannot compare {} and {} for equality",
                    a.kind(),
                    b.kind()
                ),
                a.span.merge(&b.span),
            )
            .into());
        }

        match (&a.data, &b.data) {
            (ValueData::Number(x), ValueData::Number(y)) => Ok(x == y),
            (ValueData::Bool(x), ValueData::Bool(y)) => Ok(x == y),
            (ValueData::String(x), ValueData::String(y)) => Ok(x == y),
            (ValueData::Pair(k1, v1), ValueData::Pair(k2, v2)) => {
                Ok(k1.is_equal(k2, executor)? && v1.is_equal(v2, executor)?)
            }
            (ValueData::List(x), ValueData::List(y)) => {
                let (xb, yb) = (x.borrow(), y.borrow());
                // Empty-list equality is permitted regardless of declared element type
                //: the witness is `unknown` for both, so there's nothing to
                // violate.
                if xb.items.len() != yb.items.len() {
                    return Ok(false);
                }
                for (xi, yi) in xb.items.iter().zip(yb.items.iter()) {
                    if !xi.is_equal(yi, executor)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (ValueData::Object(x), ValueData::Object(y)) => {
                let (xb, yb) = (x.borrow(), y.borrow());
                if xb.fields.len() != yb.fields.len() {
                    return Ok(false);
                }
                for (k, v) in xb.fields.iter() {
                    match yb.fields.get(k) {
                        Some(other_v) if v.is_equal(other_v, executor)? => {}
                        _ => return Ok(false),
                    }
                }
                Ok(true)
            }
            (ValueData::Range(x), ValueData::Range(y)) => Ok(x == y),
            (ValueData::Function(x), ValueData::Function(y)) => Ok(Rc::ptr_eq(x, y)),
            (ValueData::BuiltinFunction(x), ValueData::BuiltinFunction(y)) => {
                Ok(x.name == y.name)
            }
            (ValueData::Enum(x), ValueData::Enum(y)) => Ok(Rc::ptr_eq(x, y)),
            (ValueData::EnumVariant(x, xv), ValueData::EnumVariant(y, yv)) => {
                Ok(Rc::ptr_eq(x, y) && xv == yv)
            }
            _ => Err(Error::type_error(
                format!("cannot compare {} and {} for equality", a.kind(), b.kind()),
                a.span.merge(&b.span),
            )
            .into()),
        }
    }

    /// User-facing representation (Display, as opposed to Debug). Integer-valued Numbers print
    /// without a decimal point.
    pub fn display(&self, executor: &mut dyn Executor) -> EvalResult<String> {
        let v = self.resolve(executor)?;
        Ok(match &v.data {
            ValueData::Null => "null".to_string(),
            ValueData::Number(n) => display_number(*n),
            ValueData::Bool(b) => b.to_string(),
            ValueData::String(s) => s.to_string(),
            ValueData::Pair(k, v) => {
                format!("{} => {}", k.display(executor)?, v.display(executor)?)
            }
            ValueData::Object(obj) => {
                let obj = obj.borrow();
                let mut parts = Vec::new();
                for (k, fv) in obj.fields.iter() {
                    parts.push(format!("{}: {}", k, fv.display(executor)?));
                }
                format!("{{{}}}", parts.join("; "))
            }
            ValueData::List(list) => {
                let list = list.borrow();
                let mut parts = Vec::new();
                for item in list.items.iter() {
                    parts.push(item.display(executor)?);
                }
                format!("[{}]", parts.join(", "))
            }
            ValueData::Range(r) => format!("{}..{}", r.start, r.end),
            ValueData::Function(f) => match &f.name {
                Some(name) => format!("<function {}>", name),
                None => "<anonymous function>".to_string(),
            },
            ValueData::BuiltinFunction(bf) => format!("<builtin function {}>", bf.name),
            ValueData::BuiltinVariable(_) => unreachable!("resolved above"),
            ValueData::Enum(e) => format!("<enum {}>", e.name),
            ValueData::EnumVariant(e, variant) => format!("{}::{}", e.name, variant),
        })
    }

    /// Developer-facing representation: adds string length and field
    /// indentation relative to `display`.
    pub fn debug(&self, executor: &mut dyn Executor) -> EvalResult<String> {
        let v = self.resolve(executor)?;
        Ok(match &v.data {
            ValueData::String(s) => format!("{:?} (len={})", s.as_ref(), s.chars().count()),
            ValueData::Object(obj) => {
                let obj = obj.borrow();
                let mut parts = Vec::new();
                for (k, fv) in obj.fields.iter() {
                    parts.push(format!("  {}: {}", k, fv.debug(executor)?));
                }
                format!("{} {{\n{}\n}}", obj.data_type, parts.join(",\n"))
            }
            ValueData::List(list) => {
                let list = list.borrow();
                let mut parts = Vec::new();
                for item in list.items.iter() {
                    parts.push(format!("  {}", item.debug(executor)?));
                }
                format!("[\n{}\n] (len={})", parts.join(",\n"), list.items.len())
            }
            _ => v.display(executor)?,
        })
    }

    /// Member access looks up `name` in `fields()`. Containers additionally
    /// expose bound instance methods (`methods.rs`) through this map.
    pub fn fields(&self, executor: &mut dyn Executor) -> EvalResult<IndexMap<String, Value>> {
        let v = self.resolve(executor)?;
        Ok(match &v.data {
            ValueData::Object(obj) => obj.borrow().fields.clone(),
            ValueData::Pair(k, val) => {
                let mut m = IndexMap::new();
                m.insert("key".to_string(), (**k).clone());
                m.insert("value".to_string(), (**val).clone());
                m
            }
            ValueData::Range(r) => {
                let mut m = IndexMap::new();
                m.insert(
                    "start".to_string(),
                    Value::number(r.start as f64, v.span.clone()),
                );
                m.insert(
                    "end".to_string(),
                    Value::number(r.end as f64, v.span.clone()),
                );
                m.insert(
                    "current".to_string(),
                    Value::number(r.current as f64, v.span.clone()),
                );
                m
            }
            _ => IndexMap::new(),
        })
    }

    /// Index (`a[i]`): negative indices wrap, out-of-range is OutOfBounds.
    /// Strings index by code point, not byte.
    pub fn index(&self, index_value: &Value, executor: &mut dyn Executor) -> EvalResult<Value> {
        let v = self.resolve(executor)?;
        let idx_resolved = index_value.resolve(executor)?;
        let idx = match idx_resolved.data {
            ValueData::Number(n) if n.fract() == 0.0 => n as i64,
            _ => {
                return Err(Error::type_error(
                    "index must be an integer-valued number",
                    idx_resolved.span,
                )
                .into())
            }
        };

        match &v.data {
            ValueData::List(list) => {
                let list = list.borrow();
                let len = list.items.len() as i64;
                let real = if idx < 0 { idx + len } else { idx };
                if real < 0 || real >= len {
                    return Err(Error::out_of_bounds(
                        format!("index {} out of bounds for list of length {}", idx, len),
                        v.span,
                    )
                    .into());
                }
                Ok(list.items[real as usize].clone())
            }
            ValueData::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                let len = chars.len() as i64;
                let real = if idx < 0 { idx + len } else { idx };
                if real < 0 || real >= len {
                    return Err(Error::out_of_bounds(
                        format!("index {} out of bounds for string of length {}", idx, len),
                        v.span,
                    )
                    .into());
                }
                Ok(Value::string(chars[real as usize].to_string(), v.span.clone()))
            }
            _ => Err(Error::type_error(
                format!("{} is not indexable", v.kind()),
                v.span,
            )
            .into()),
        }
    }
}

/// Integer-valued numbers display without a decimal point.
pub fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
