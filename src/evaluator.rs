//! The tree-walking evaluator.
//!
//! Shaped after a recursive tree-walker over a `ScopeRef` with an `ExtensionValue` host
//! hook, generalized here to Homescript's infix AST (`crate::ast`), the collapsed
//! `Outcome` protocol (`crate::outcome`, Design Notes redesign flag), and the
//! host-callout `Executor` trait (`crate::executor`) in place of `ExtensionValue`.
//!
//! Every function here returns `EvalResult<Outcome>` rather than `EvalResult<Value>`,
//! because `return`/`break`/`continue` inside a sub-expression (e.g. a value nested
//! inside an `if` used as an expression) must be able to unwind through arbitrarily
//! deep operator nesting without ever being silently discarded. The `value!` macro
//! below is the single place that "unwraps a plain value or bubbles the Outcome" —
//! every operand evaluation goes through it.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::*;
use crate::builtins::time::SLEEP_NAME;
use crate::cancel::CancelToken;
use crate::diagnostic::Diagnostic;
use crate::error::{Error, ErrorKind};
use crate::executor::Executor;
use crate::outcome::Outcome;
use crate::scope::ScopeStack;
use crate::span::Span;
use crate::unwind::{EvalResult, Unwind};
use crate::value::{call_instance_method, BuiltinReturn, FunctionData, RelOp, Value, ValueData};

/// Evaluate `$self.eval_expr($expr)`, extracting a plain `Value` or propagating a
/// break/continue/return `Outcome` out of the *enclosing* function immediately.
macro_rules! value {
    ($self:ident, $expr:expr) => {
        match $self.eval_expr($expr)? {
            Outcome::Value(v) => v,
            other => return Ok(other),
        }
    };
}

pub struct Evaluator<'a> {
    scopes: ScopeStack,
    executor: &'a mut dyn Executor,
    cancel: CancelToken,
    in_loop: bool,
    in_function: bool,
    /// Collected only when `executor.is_analyzer()` is true: Type/Value errors that
    /// would otherwise abort the script are recorded here and evaluation continues with a
    /// placeholder value, so a single analysis pass surfaces as many downstream problems
    /// as possible instead of stopping at the first one.
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Evaluator<'a> {
    pub fn new(scopes: ScopeStack, executor: &'a mut dyn Executor, cancel: CancelToken) -> Self {
        Self {
            scopes,
            executor,
            cancel,
            in_loop: false,
            in_function: false,
            diagnostics: Vec::new(),
        }
    }

    pub fn into_cancel(self) -> CancelToken {
        self.cancel
    }

    /// Drains the diagnostics accumulated in analyzer mode. Empty in run mode, since
    /// the evaluator never populates it unless `executor.is_analyzer()` was true.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn poll_cancel(&mut self) -> EvalResult<()> {
        if let Some(code) = self.cancel.poll() {
            return Err(Unwind::Exit(code));
        }
        Ok(())
    }

    /// Pushes a fresh frame, runs `f`, and always pops afterward — including on early
    /// exit via `?`: frames are popped deterministically when the block exits,
    /// including on early exits via break/return/error.
    fn with_frame<T>(
        &mut self,
        owner: Option<String>,
        span: Span,
        f: impl FnOnce(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<T> {
        self.scopes.push(owner, span)?;
        let result = f(self);
        self.scopes.pop();
        result
    }

    /// Saves and restores `in_loop`/`in_function` around `f`, regardless of how `f`
    /// returns.
    fn with_flags<T>(
        &mut self,
        in_loop: Option<bool>,
        in_function: Option<bool>,
        f: impl FnOnce(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<T> {
        let saved_loop = self.in_loop;
        let saved_fn = self.in_function;
        if let Some(v) = in_loop {
            self.in_loop = v;
        }
        if let Some(v) = in_function {
            self.in_function = v;
        }
        let result = f(self);
        self.in_loop = saved_loop;
        self.in_function = saved_fn;
        result
    }

    // --- statements ----------------------------------------------------------------

    /// After a statement sets a non-Value outcome, subsequent statements in the
    /// same list are not executed. The list's own value is its last statement's value,
    /// or Null if it's empty.
    pub fn eval_stmt_list(&mut self, stmts: &[Stmt]) -> EvalResult<Outcome> {
        let mut last = Outcome::Value(Value::null(
            stmts.first().map(|s| s.span.clone()).unwrap_or_else(Span::dummy),
        ));
        for stmt in stmts {
            last = self.eval_stmt(stmt)?;
            if !last.is_value() {
                return Ok(last);
            }
        }
        Ok(last)
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> EvalResult<Outcome> {
        self.poll_cancel()?;
        match &stmt.node {
            StmtKind::Let { name, value } => {
                let v = value!(self, value);
                self.scopes.declare(name.clone(), v, stmt.span.clone())?;
                Ok(Outcome::Value(Value::null(stmt.span.clone())))
            }
            StmtKind::Import { name, alias, from } => {
                self.eval_import(name, alias.as_deref(), from, &stmt.span)
            }
            StmtKind::FnDef(lit) => {
                let fname = lit
                    .name
                    .clone()
                    .expect("parser only produces StmtKind::FnDef for named functions");
                let data = function_data_from_lit(lit, stmt.span.clone());
                self.scopes
                    .declare(fname, Value::function(data), stmt.span.clone())?;
                Ok(Outcome::Value(Value::null(stmt.span.clone())))
            }
            StmtKind::Break(expr) => {
                if !self.in_loop {
                    return Err(Error::syntax("`break` outside of a loop", stmt.span.clone()).into());
                }
                let v = match expr {
                    Some(e) => value!(self, e),
                    None => Value::null(stmt.span.clone()),
                };
                Ok(Outcome::Break(v))
            }
            StmtKind::Continue => {
                if !self.in_loop {
                    return Err(Error::syntax("`continue` outside of a loop", stmt.span.clone()).into());
                }
                Ok(Outcome::Continue)
            }
            StmtKind::Return(expr) => {
                if !self.in_function {
                    return Err(Error::syntax("`return` outside of a function", stmt.span.clone()).into());
                }
                let v = match expr {
                    Some(e) => value!(self, e),
                    None => Value::null(stmt.span.clone()),
                };
                Ok(Outcome::Return(v))
            }
            StmtKind::Expr(e) => self.eval_expr(e),
        }
    }

    /// Module resolution is a stub. Binds a zero-arg function whose
    /// body calls the hidden `__resolve_module` builtin with `from` baked in literally
    /// (see `builtins::import`).
    fn eval_import(
        &mut self,
        name: &str,
        alias: Option<&str>,
        from: &str,
        span: &Span,
    ) -> EvalResult<Outcome> {
        let body = Block {
            span: span.clone(),
            stmts: vec![Stmt::new(
                span.clone(),
                StmtKind::Return(Some(Expr::new(
                    span.clone(),
                    ExprKind::Call(
                        Box::new(Expr::new(
                            span.clone(),
                            ExprKind::Ident(crate::builtins::import::RESOLVE_NAME.to_string()),
                        )),
                        vec![Expr::new(span.clone(), ExprKind::Str(from.to_string()))],
                    ),
                ))),
            )],
        };
        let data = FunctionData {
            name: Some(Rc::from(name)),
            params: Vec::new(),
            body: Rc::new(body),
            span: span.clone(),
        };
        let local_name = alias.unwrap_or(name).to_string();
        self.scopes
            .declare(local_name, Value::function(data), span.clone())?;
        Ok(Outcome::Value(Value::null(span.clone())))
    }

    // --- expressions -----------------------------------------------------------------

    /// Dispatches to [`Self::eval_expr_inner`] and, in analyzer mode, recovers Type/Value
    /// errors into a diagnostic plus a Null placeholder instead of aborting. Every
    /// other error kind (Syntax, Reference, StackOverflow, OutOfBounds, Runtime, Throw)
    /// still propagates: those are fatal regardless of mode.
    fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Outcome> {
        if !self.executor.is_analyzer() {
            return self.eval_expr_inner(expr);
        }
        match self.eval_expr_inner(expr) {
            Err(Unwind::Error(e)) if matches!(e.kind, ErrorKind::Type | ErrorKind::Value) => {
                self.diagnostics.push(Diagnostic::from(&e));
                Ok(Outcome::Value(Value::null(expr.span.clone())))
            }
            other => other,
        }
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> EvalResult<Outcome> {
        let span = &expr.span;
        match &expr.node {
            ExprKind::Null => Ok(Outcome::Value(Value::null(span.clone()))),
            ExprKind::Number(n) => Ok(Outcome::Value(Value::number(*n, span.clone()))),
            ExprKind::Bool(b) => Ok(Outcome::Value(Value::boolean(*b, span.clone()))),
            ExprKind::Str(s) => Ok(Outcome::Value(Value::string(s.clone(), span.clone()))),
            ExprKind::Ident(name) => match self.scopes.lookup(name) {
                Some(v) => Ok(Outcome::Value(v.clone())),
                None => Err(Error::reference(format!("undefined variable `{}`", name), span.clone()).into()),
            },
            ExprKind::Pair(k, v) => {
                let key = value!(self, k);
                if !matches!(key.data, ValueData::String(_)) {
                    return Err(Error::type_error("pair key must be a string", key.span).into());
                }
                let val = value!(self, v);
                Ok(Outcome::Value(Value::pair(key, val, span.clone())))
            }
            ExprKind::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(value!(self, item));
                }
                Ok(Outcome::Value(Value::list_literal(values, span.clone())?))
            }
            ExprKind::Object(fields) => {
                let mut map = IndexMap::new();
                for (name, value_expr) in fields {
                    let v = value!(self, value_expr);
                    map.insert(name.clone(), v);
                }
                Ok(Outcome::Value(Value::object("object", true, map, span.clone())))
            }
            ExprKind::Range(lower, upper) => {
                let lo = self.eval_range_bound(lower)?;
                let hi = self.eval_range_bound(upper)?;
                Ok(Outcome::Value(Value::range(lo, hi, span.clone())))
            }
            ExprKind::Unary(op, operand) => {
                let v = value!(self, operand);
                Ok(Outcome::Value(self.eval_unary(*op, v, span)?))
            }
            ExprKind::Binary(op, l, r) => self.eval_binary(*op, l, r, span),
            ExprKind::Cast(e, target) => {
                let v = value!(self, e);
                Ok(Outcome::Value(v.cast(*target, self.executor)?))
            }
            ExprKind::Assign(lhs, op, rhs) => self.eval_assign(lhs, *op, rhs, span),
            ExprKind::Member(obj, name) => {
                let obj_val = value!(self, obj);
                let resolved = obj_val.resolve(self.executor)?;
                let fields = resolved.fields(self.executor)?;
                match fields.get(name) {
                    Some(v) => Ok(Outcome::Value(v.clone())),
                    None => Err(Error::type_error(
                        format!("{} has no field `{}`", resolved.kind(), name),
                        span.clone(),
                    )
                    .into()),
                }
            }
            ExprKind::Index(e, idx) => {
                let v = value!(self, e);
                let i = value!(self, idx);
                Ok(Outcome::Value(v.index(&i, self.executor)?))
            }
            ExprKind::Call(callee, args) => self.eval_call(callee, args, span),
            ExprKind::If(if_expr) => self.eval_if(if_expr),
            ExprKind::For { var, lower, upper, body } => self.eval_for(var, lower, upper, body, span),
            ExprKind::While { cond, body } => self.eval_while(cond, body),
            ExprKind::Loop { body } => self.eval_loop(body),
            ExprKind::Try {
                try_block,
                err_name,
                catch_block,
            } => self.eval_try(try_block, err_name, catch_block),
            ExprKind::Fn(lit) => {
                let data = function_data_from_lit(lit, span.clone());
                Ok(Outcome::Value(Value::function(data)))
            }
            ExprKind::Block(b) => self.with_frame(None, b.span.clone(), |me| me.eval_stmt_list(&b.stmts)),
        }
    }

    fn eval_range_bound(&mut self, expr: &Expr) -> EvalResult<i64> {
        let v = match self.eval_expr(expr)? {
            Outcome::Value(v) => v,
            _ => return Err(Error::syntax("break/return not allowed inside a range bound", expr.span.clone()).into()),
        };
        match v.data {
            ValueData::Number(n) if n.fract() == 0.0 => Ok(n as i64),
            _ => Err(Error::type_error("range bound must be an integer-valued number", v.span).into()),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, v: Value, span: &Span) -> EvalResult<Value> {
        let resolved = v.resolve(self.executor)?;
        match op {
            UnaryOp::Not => Ok(Value::boolean(!resolved.is_truthy(self.executor)?, span.clone())),
            UnaryOp::Plus => match resolved.data {
                ValueData::Number(n) => Ok(Value::number(n, span.clone())),
                _ => Err(Error::type_error(format!("cannot apply unary + to {}", resolved.kind()), span.clone()).into()),
            },
            UnaryOp::Neg => match resolved.data {
                ValueData::Number(n) => Ok(Value::number(-n, span.clone())),
                _ => Err(Error::type_error(format!("cannot apply unary - to {}", resolved.kind()), span.clone()).into()),
            },
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, l: &Expr, r: &Expr, span: &Span) -> EvalResult<Outcome> {
        match op {
            BinaryOp::Or => {
                let lv = value!(self, l);
                if lv.is_truthy(self.executor)? {
                    Ok(Outcome::Value(lv))
                } else {
                    Ok(Outcome::Value(value!(self, r)))
                }
            }
            BinaryOp::And => {
                let lv = value!(self, l);
                if !lv.is_truthy(self.executor)? {
                    Ok(Outcome::Value(lv))
                } else {
                    Ok(Outcome::Value(value!(self, r)))
                }
            }
            BinaryOp::Eq => {
                let lv = value!(self, l);
                let rv = value!(self, r);
                let eq = lv.is_equal(&rv, self.executor)?;
                Ok(Outcome::Value(Value::boolean(eq, span.clone())))
            }
            BinaryOp::Ne => {
                let lv = value!(self, l);
                let rv = value!(self, r);
                let eq = lv.is_equal(&rv, self.executor)?;
                Ok(Outcome::Value(Value::boolean(!eq, span.clone())))
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let lv = value!(self, l);
                let rv = value!(self, r);
                let rel_op = match op {
                    BinaryOp::Lt => RelOp::Lt,
                    BinaryOp::Le => RelOp::Le,
                    BinaryOp::Gt => RelOp::Gt,
                    _ => RelOp::Ge,
                };
                Ok(Outcome::Value(lv.relational(rel_op, &rv, self.executor)?))
            }
            BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::IntDiv
            | BinaryOp::Rem
            | BinaryOp::Pow => {
                let lv = value!(self, l);
                let rv = value!(self, r);
                Ok(Outcome::Value(lv.algebraic(op, &rv, self.executor)?))
            }
        }
    }

    // --- assignment --------------------------------------------------------------

    fn eval_assign(&mut self, lhs: &Expr, op: AssignOp, rhs: &Expr, span: &Span) -> EvalResult<Outcome> {
        match &lhs.node {
            ExprKind::Ident(name) => self.eval_assign_ident(name, op, rhs, span),
            ExprKind::Member(obj, field) => self.eval_assign_member(obj, field, op, rhs, span),
            ExprKind::Index(obj, idx) => self.eval_assign_index(obj, idx, op, rhs, span),
            _ => Err(Error::type_error("cannot assign to this expression", lhs.span.clone()).into()),
        }
    }

    /// Computes the value to store given the previous value (if any), the compound
    /// operator, and the already-evaluated right-hand side; also enforces the
    /// protection and type-stability rules. Takes a plain `Value` rather than an `Expr`
    /// so it can return a plain `Result` — the caller evaluates `rhs` itself (through
    /// the `value!` macro, which needs to bubble an `Outcome`, not a `Value`) before
    /// calling in.
    fn apply_assign(
        &mut self,
        previous: Option<&Value>,
        op: AssignOp,
        rhs_value: Value,
        span: &Span,
    ) -> Result<Value, Error> {
        if let Some(prev) = previous {
            if prev.protected {
                return Err(Error::type_error("cannot assign to a protected value", span.clone()));
            }
        }
        let new_value = match op.binary_op() {
            None => rhs_value,
            Some(bin_op) => {
                let base = previous.cloned().unwrap_or_else(|| Value::null(span.clone()));
                crate::builtins::args::no_exit(base.algebraic(bin_op, &rhs_value, self.executor))?
            }
        };
        if let Some(prev) = previous {
            if !matches!(prev.data, ValueData::Null) && prev.kind() != new_value.kind() {
                return Err(Error::type_error(
                    format!(
                        "cannot assign a {} to a variable previously holding a {}",
                        new_value.kind(),
                        prev.kind()
                    ),
                    span.clone(),
                ));
            }
        }
        Ok(new_value)
    }

    fn eval_assign_ident(&mut self, name: &str, op: AssignOp, rhs: &Expr, span: &Span) -> EvalResult<Outcome> {
        let previous = self
            .scopes
            .lookup(name)
            .cloned()
            .ok_or_else(|| Error::reference(format!("undefined variable `{}`", name), span.clone()))?;
        let rhs_value = value!(self, rhs);
        let new_value = self.apply_assign(Some(&previous), op, rhs_value, span)?;
        self.scopes.assign(name, new_value.clone());
        Ok(Outcome::Value(new_value))
    }

    fn eval_assign_member(
        &mut self,
        obj_expr: &Expr,
        field: &str,
        op: AssignOp,
        rhs: &Expr,
        span: &Span,
    ) -> EvalResult<Outcome> {
        let obj_val = value!(self, obj_expr);
        let resolved = obj_val.resolve(self.executor)?;
        let obj_ref = match &resolved.data {
            ValueData::Object(o) => o.clone(),
            _ => return Err(Error::type_error(format!("cannot assign a field on {}", resolved.kind()), span.clone()).into()),
        };
        if resolved.protected {
            return Err(Error::type_error("cannot assign to a protected value", span.clone()).into());
        }
        let (is_dynamic, previous) = {
            let borrowed = obj_ref.borrow();
            (borrowed.is_dynamic, borrowed.fields.get(field).cloned())
        };
        if previous.is_none() && !is_dynamic {
            return Err(Error::type_error(format!("object has no field `{}`", field), span.clone()).into());
        }
        let rhs_value = value!(self, rhs);
        let new_value = self.apply_assign(previous.as_ref(), op, rhs_value, span)?;
        obj_ref.borrow_mut().fields.insert(field.to_string(), new_value.clone());
        Ok(Outcome::Value(new_value))
    }

    fn eval_assign_index(
        &mut self,
        obj_expr: &Expr,
        idx_expr: &Expr,
        op: AssignOp,
        rhs: &Expr,
        span: &Span,
    ) -> EvalResult<Outcome> {
        let obj_val = value!(self, obj_expr);
        let resolved = obj_val.resolve(self.executor)?;
        let idx_val = value!(self, idx_expr);
        if resolved.protected {
            return Err(Error::type_error("cannot assign to a protected value", span.clone()).into());
        }
        let list_ref = match &resolved.data {
            ValueData::List(l) => l.clone(),
            _ => return Err(Error::type_error(format!("cannot assign into index of {}", resolved.kind()), span.clone()).into()),
        };
        let idx = match idx_val.resolve(self.executor)?.data {
            ValueData::Number(n) if n.fract() == 0.0 => n as i64,
            _ => return Err(Error::type_error("index must be an integer-valued number", idx_val.span).into()),
        };
        let len = list_ref.borrow().items.len() as i64;
        let real = if idx < 0 { idx + len } else { idx };
        if real < 0 || real >= len {
            return Err(Error::out_of_bounds(
                format!("index {} out of bounds for list of length {}", idx, len),
                span.clone(),
            )
            .into());
        }
        let previous = list_ref.borrow().items[real as usize].clone();
        let rhs_value = value!(self, rhs);
        let new_value = self.apply_assign(Some(&previous), op, rhs_value, span)?;
        list_ref.borrow_mut().items[real as usize] = new_value.clone();
        Ok(Outcome::Value(new_value))
    }

    // --- calls ---------------------------------------------------------------------

    fn eval_call(&mut self, callee: &Expr, arg_exprs: &[Expr], span: &Span) -> EvalResult<Outcome> {
        let mut args = Vec::with_capacity(arg_exprs.len());
        for a in arg_exprs {
            let v = value!(self, a);
            args.push(v.resolve(self.executor)?);
        }

        if let ExprKind::Member(obj_expr, name) = &callee.node {
            let obj_val = value!(self, obj_expr);
            let receiver = obj_val.resolve(self.executor)?;
            if let Some(result) = call_instance_method(&receiver, name, args.clone(), span)? {
                return Ok(Outcome::Value(result));
            }
            let fields = receiver.fields(self.executor)?;
            let field_val = fields.get(name).cloned().ok_or_else(|| {
                Error::type_error(format!("{} has no field `{}`", receiver.kind(), name), span.clone())
            })?;
            return self.invoke(field_val, args, span);
        }

        let callee_val = value!(self, callee);
        let resolved_callee = callee_val.resolve(self.executor)?;
        self.invoke(resolved_callee, args, span)
    }

    fn invoke(&mut self, callee: Value, args: Vec<Value>, call_span: &Span) -> EvalResult<Outcome> {
        match callee.data {
            ValueData::Function(fdata) => self.invoke_function(&fdata, args, call_span),
            ValueData::BuiltinFunction(bf) => {
                if bf.name == SLEEP_NAME {
                    return self.invoke_sleep(args, call_span);
                }
                match (bf.func)(self.executor, call_span, args)? {
                    BuiltinReturn::Value(v) => Ok(Outcome::Value(v)),
                    BuiltinReturn::Exit(code) => Err(Unwind::Exit(code)),
                }
            }
            other => Err(Error::type_error(
                format!("{} is not callable", Value::new(other, call_span.clone()).kind()),
                call_span.clone(),
            )
            .into()),
        }
    }

    fn invoke_sleep(&mut self, args: Vec<Value>, call_span: &Span) -> EvalResult<Outcome> {
        crate::builtins::args::exact_arity("time.sleep", &args, 1, call_span)?;
        let seconds = crate::builtins::args::as_number(&args, 0, call_span)?;
        if self.executor.is_analyzer() {
            return Ok(Outcome::Value(Value::null(call_span.clone())));
        }
        let duration = std::time::Duration::from_secs_f64(seconds.max(0.0));
        if let Some(code) = self.cancel.sleep(duration) {
            return Err(Unwind::Exit(code));
        }
        Ok(Outcome::Value(Value::null(call_span.clone())))
    }

    fn invoke_function(&mut self, fdata: &FunctionData, args: Vec<Value>, call_span: &Span) -> EvalResult<Outcome> {
        if args.len() != fdata.params.len() {
            return Err(Error::type_error(
                format!(
                    "function `{}` expects {} argument(s), got {}",
                    fdata.name.as_deref().unwrap_or("<anonymous>"),
                    fdata.params.len(),
                    args.len()
                ),
                call_span.clone(),
            )
            .into());
        }
        let owner = fdata.name.as_ref().map(|n| n.to_string());
        let body = fdata.body.clone();
        let params = fdata.params.clone();
        self.with_flags(Some(false), Some(true), |me| {
            me.with_frame(owner, fdata.span.clone(), |me| {
                for ((pname, pspan), arg) in params.iter().zip(args.into_iter()) {
                    me.scopes.declare(pname.to_string(), arg, pspan.clone())?;
                }
                let outcome = me.eval_stmt_list(&body.stmts)?;
                Ok(Outcome::Value(outcome.into_value(|| Value::null(call_span.clone()))))
            })
        })
    }

    // --- control-flow expressions --------------------------------------------------

    fn eval_if(&mut self, if_expr: &IfExpr) -> EvalResult<Outcome> {
        let cond = value!(self, &if_expr.cond);
        if cond.is_truthy(self.executor)? {
            self.with_frame(None, if_expr.then_branch.span.clone(), |me| {
                me.eval_stmt_list(&if_expr.then_branch.stmts)
            })
        } else {
            match &if_expr.else_branch {
                Some(ElseBranch::Block(b)) => self.with_frame(None, b.span.clone(), |me| me.eval_stmt_list(&b.stmts)),
                Some(ElseBranch::If(inner)) => self.eval_if(inner),
                None => Ok(Outcome::Value(Value::null(if_expr.cond.span.clone()))),
            }
        }
    }

    fn eval_for(&mut self, var: &str, lower: &Expr, upper: &Expr, body: &Block, span: &Span) -> EvalResult<Outcome> {
        let lo = self.eval_range_bound(lower)?;
        let hi = self.eval_range_bound(upper)?;
        let ascending = lo <= hi;
        self.with_flags(Some(true), None, |me| {
            let mut i = lo;
            loop {
                if ascending {
                    if i >= hi {
                        break;
                    }
                } else if i <= hi {
                    break;
                }
                me.poll_cancel()?;
                let iter_span = body.span.clone();
                let outcome = me.with_frame(None, iter_span.clone(), |me| {
                    me.scopes.declare(var.to_string(), Value::number(i as f64, iter_span.clone()), iter_span.clone())?;
                    me.eval_stmt_list(&body.stmts)
                })?;
                match outcome {
                    Outcome::Value(_) => {}
                    Outcome::Continue => {}
                    Outcome::Break(v) => return Ok(Outcome::Value(v)),
                    ret @ Outcome::Return(_) => return Ok(ret),
                }
                i += if ascending { 1 } else { -1 };
            }
            Ok(Outcome::Value(Value::null(span.clone())))
        })
    }

    fn eval_while(&mut self, cond: &Expr, body: &Block) -> EvalResult<Outcome> {
        self.with_flags(Some(true), None, |me| {
            loop {
                me.poll_cancel()?;
                let c = value!(me, cond);
                if !c.is_truthy(me.executor)? {
                    break;
                }
                let outcome = me.with_frame(None, body.span.clone(), |me| me.eval_stmt_list(&body.stmts))?;
                match outcome {
                    Outcome::Value(_) => {}
                    Outcome::Continue => {}
                    Outcome::Break(v) => return Ok(Outcome::Value(v)),
                    ret @ Outcome::Return(_) => return Ok(ret),
                }
            }
            Ok(Outcome::Value(Value::null(cond.span.clone())))
        })
    }

    fn eval_loop(&mut self, body: &Block) -> EvalResult<Outcome> {
        self.with_flags(Some(true), None, |me| {
            loop {
                me.poll_cancel()?;
                let outcome = me.with_frame(None, body.span.clone(), |me| me.eval_stmt_list(&body.stmts))?;
                match outcome {
                    Outcome::Value(_) => {}
                    Outcome::Continue => {}
                    Outcome::Break(v) => return Ok(Outcome::Value(v)),
                    ret @ Outcome::Return(_) => return Ok(ret),
                }
            }
        })
    }

    fn eval_try(&mut self, try_block: &Block, err_name: &str, catch_block: &Block) -> EvalResult<Outcome> {
        let result = self.with_frame(None, try_block.span.clone(), |me| me.eval_stmt_list(&try_block.stmts));
        match result {
            Ok(outcome) => Ok(outcome),
            Err(Unwind::Error(e)) if e.kind.is_catchable() => {
                let err_value = error_to_object(&e);
                self.with_frame(None, catch_block.span.clone(), |me| {
                    me.scopes.declare(err_name.to_string(), err_value, catch_block.span.clone())?;
                    me.eval_stmt_list(&catch_block.stmts)
                })
            }
            Err(other) => Err(other),
        }
    }
}

/// Top-level entry point. Runs an already-parsed module to completion, returning
/// its last value and an exit code — 0 unless `exit()` or a cancellation signal set one
/// explicitly, in which case evaluation stops at that point and whatever was computed so
/// far about it is discarded in favor of a fresh Null (exit does not produce a
/// value).
pub fn run(
    module: &Module,
    executor: &mut dyn Executor,
    scope_additions: IndexMap<String, Value>,
    stack_limit: usize,
    cancel: CancelToken,
) -> Result<(Value, i32), Error> {
    let builtins = crate::builtins::register();
    let scopes = ScopeStack::new(builtins, scope_additions, stack_limit, Span::dummy())?;
    let mut evaluator = Evaluator::new(scopes, executor, cancel);
    match evaluator.eval_stmt_list(&module.stmts) {
        Ok(outcome) => Ok((outcome.into_value(|| Value::null(Span::dummy())), 0)),
        Err(Unwind::Exit(code)) => Ok((Value::null(Span::dummy()), code)),
        Err(Unwind::Error(e)) => Err(e),
    }
}

/// Shared by named (`fn f() {}`) and anonymous (`fn() {}`) function literals.
fn function_data_from_lit(lit: &FunctionLit, span: Span) -> FunctionData {
    FunctionData {
        name: lit.name.clone().map(Rc::from),
        params: lit
            .params
            .iter()
            .map(|p| (Rc::from(p.node.as_str()), p.span.clone()))
            .collect(),
        body: Rc::new(lit.body.clone()),
        span,
    }
}

/// Builds the structured error object bound by a `catch` clause.
fn error_to_object(e: &Error) -> Value {
    let span = e.span.clone();
    let mut start_fields = IndexMap::new();
    start_fields.insert("line".to_string(), Value::number(span.start.line as f64, span.clone()));
    start_fields.insert("column".to_string(), Value::number(span.start.column as f64, span.clone()));
    start_fields.insert("index".to_string(), Value::number(span.start.byte_index as f64, span.clone()));
    let mut end_fields = IndexMap::new();
    end_fields.insert("line".to_string(), Value::number(span.end.line as f64, span.clone()));
    end_fields.insert("column".to_string(), Value::number(span.end.column as f64, span.clone()));
    end_fields.insert("index".to_string(), Value::number(span.end.byte_index as f64, span.clone()));

    let mut location_fields = IndexMap::new();
    location_fields.insert("start".to_string(), Value::object("location_point", false, start_fields, span.clone()));
    location_fields.insert("end".to_string(), Value::object("location_point", false, end_fields, span.clone()));

    let mut fields = IndexMap::new();
    fields.insert("kind".to_string(), Value::string(e.kind.to_string(), span.clone()));
    fields.insert("message".to_string(), Value::string(e.message.clone(), span.clone()));
    fields.insert(
        "location".to_string(),
        Value::object("location", false, location_fields, span.clone()),
    );
    Value::object("error", false, fields, span)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::parse;
    use crate::test_support::NullExecutor;

    fn run_ok(src: &str) -> Value {
        let (module, errors) = parse(src, "<test>");
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        let builtins = crate::builtins::register();
        let scopes = ScopeStack::new(builtins, IndexMap::new(), 64, Span::dummy()).unwrap();
        let mut ex = NullExecutor::default();
        let mut eval = Evaluator::new(scopes, &mut ex, CancelToken::inert());
        match eval.eval_stmt_list(&module.stmts) {
            Ok(outcome) => outcome.into_value(|| Value::null(Span::dummy())),
            Err(Unwind::Error(e)) => panic!("evaluation error: {:?}", e),
            Err(Unwind::Exit(code)) => panic!("unexpected exit({})", code),
        }
    }

    #[test]
    fn arithmetic_precedence() {
        let v = run_ok("1 + 2 * 3;");
        assert!(matches!(v.data, ValueData::Number(n) if n == 7.0));
    }

    #[test]
    fn for_loop_sums_range() {
        let v = run_ok(
            r#"
            let total = 0;
            for i in 0..5 {
                total = total + i;
            }
            total;
            "#,
        );
        assert!(matches!(v.data, ValueData::Number(n) if n == 10.0));
    }

    #[test]
    fn recursive_factorial() {
        let v = run_ok(
            r#"
            fn fact(n) {
                if n <= 1 {
                    return 1;
                }
                return n * fact(n - 1);
            }
            fact(5);
            "#,
        );
        assert!(matches!(v.data, ValueData::Number(n) if n == 120.0));
    }

    #[test]
    fn break_with_value_from_loop() {
        let v = run_ok(
            r#"
            let i = 0;
            let found = loop {
                if i == 3 {
                    break i;
                }
                i = i + 1;
            };
            found;
            "#,
        );
        assert!(matches!(v.data, ValueData::Number(n) if n == 3.0));
    }

    #[test]
    fn try_catch_binds_structured_error() {
        let v = run_ok(
            r#"
            let result = try {
                throw("boom");
            } catch e {
                e.message;
            };
            result;
            "#,
        );
        assert!(matches!(v.data, ValueData::String(ref s) if &**s == "boom"));
    }

    #[test]
    fn dynamic_object_field_created_on_assignment() {
        let v = run_ok(
            r#"
            let obj = try { throw("x"); } catch e { e; };
            obj.extra = 5;
            obj.extra;
            "#,
        );
        assert!(matches!(v.data, ValueData::Number(n) if n == 5.0));
    }

    #[test]
    fn break_outside_loop_is_syntax_error() {
        let (module, errors) = parse("break;", "<test>");
        assert!(errors.is_empty());
        let builtins = crate::builtins::register();
        let scopes = ScopeStack::new(builtins, IndexMap::new(), 64, Span::dummy()).unwrap();
        let mut ex = NullExecutor::default();
        let mut eval = Evaluator::new(scopes, &mut ex, CancelToken::inert());
        match eval.eval_stmt_list(&module.stmts) {
            Err(Unwind::Error(e)) => assert_eq!(e.kind, crate::error::ErrorKind::Syntax),
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn list_push_type_mismatch_is_type_error() {
        let (module, errors) = parse(r#"let a = [1, 2, 3]; a.push("x");"#, "<test>");
        assert!(errors.is_empty());
        let builtins = crate::builtins::register();
        let scopes = ScopeStack::new(builtins, IndexMap::new(), 64, Span::dummy()).unwrap();
        let mut ex = NullExecutor::default();
        let mut eval = Evaluator::new(scopes, &mut ex, CancelToken::inert());
        match eval.eval_stmt_list(&module.stmts) {
            Err(Unwind::Error(e)) => assert_eq!(e.kind, crate::error::ErrorKind::Type),
            other => panic!("expected a type error, got {:?}", other),
        }
    }

    #[test]
    fn unbounded_recursion_overflows_the_stack() {
        let (module, errors) = parse("fn f(n) { return f(n + 1); } f(0);", "<test>");
        assert!(errors.is_empty());
        let builtins = crate::builtins::register();
        let scopes = ScopeStack::new(builtins, IndexMap::new(), 32, Span::dummy()).unwrap();
        let mut ex = NullExecutor::default();
        let mut eval = Evaluator::new(scopes, &mut ex, CancelToken::inert());
        match eval.eval_stmt_list(&module.stmts) {
            Err(Unwind::Error(e)) => assert_eq!(e.kind, crate::error::ErrorKind::StackOverflow),
            other => panic!("expected a stack overflow, got {:?}", other),
        }
    }
}
