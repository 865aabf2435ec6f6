//! Relational operators: `<`, `<=`, `>`, `>=`. Only Number supports them;
//! `BuiltinVariable` forwards transparently via `Value::resolve`.

use crate::error::Error;
use crate::unwind::EvalResult;
use crate::value::{Value, ValueData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Value {
    pub fn relational(
        &self,
        op: RelOp,
        other: &Value,
        executor: &mut dyn crate::executor::Executor,
    ) -> EvalResult<Value> {
        let a = self.resolve(executor)?;
        let b = other.resolve(executor)?;
        let span = a.span.merge(&b.span);

        let (x, y) = match (&a.data, &b.data) {
            (ValueData::Number(x), ValueData::Number(y)) => (*x, *y),
            _ => {
                return Err(Error::type_error(
                    format!(
                        "cannot compare {} and {} relationally",
                        a.kind(),
                        b.kind()
                    ),
                    span,
                )
                .into())
            }
        };

        let result = match op {
            RelOp::Lt => x < y,
            RelOp::Le => x <= y,
            RelOp::Gt => x > y,
            RelOp::Ge => x >= y,
        };
        Ok(Value::boolean(result, span))
    }
}
