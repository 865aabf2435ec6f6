//! Algebraic operators: `+ - * / // % **`.
//!
//! Number supports all seven; String supports only `+` (concatenation, displaying the
//! RHS); Bool supports only `+` too, as the same concatenation fallback with the
//! boolean's own display on the left. Everything else is a Type error.
//!
//! `/` is plain IEEE-754 division, including by zero (`inf`/`nan`/`nan`). `//` is the
//! distinct truncating integer-division operator: it truncates the quotient toward
//! zero and treats a zero divisor as a Runtime error, per `DESIGN.md`. `%` by zero is
//! also a Runtime error; its sign follows `f64::rem` (the sign of the dividend).

use crate::ast::BinaryOp;
use crate::error::Error;
use crate::executor::Executor;
use crate::unwind::EvalResult;
use crate::value::{display_number, Value, ValueData};

impl Value {
    pub fn algebraic(
        &self,
        op: BinaryOp,
        other: &Value,
        executor: &mut dyn Executor,
    ) -> EvalResult<Value> {
        let a = self.resolve(executor)?;
        let b = other.resolve(executor)?;
        let span = a.span.merge(&b.span);

        if op == BinaryOp::Add {
            if let ValueData::String(_) | ValueData::Bool(_) = &a.data {
                let lhs_text = a.display(executor)?;
                let rhs_text = b.display(executor)?;
                return Ok(Value::string(format!("{}{}", lhs_text, rhs_text), span));
            }
        }

        let (x, y) = match (&a.data, &b.data) {
            (ValueData::Number(x), ValueData::Number(y)) => (*x, *y),
            _ => {
                return Err(Error::type_error(
                    format!(
                        "cannot apply {} to {} and {}",
                        op_symbol(op),
                        a.kind(),
                        b.kind()
                    ),
                    span,
                )
                .into())
            }
        };

        let result = match op {
            BinaryOp::Add => x + y,
            BinaryOp::Sub => x - y,
            BinaryOp::Mul => x * y,
            BinaryOp::Div => x / y,
            BinaryOp::IntDiv => {
                if y == 0.0 {
                    return Err(Error::runtime("integer division by zero", span).into());
                }
                (x / y).trunc()
            }
            BinaryOp::Rem => {
                if y == 0.0 {
                    return Err(Error::runtime("remainder by zero", span).into());
                }
                x % y
            }
            BinaryOp::Pow => x.powf(y),
            _ => unreachable!("non-algebraic operator passed to Value::algebraic"),
        };

        Ok(Value::number(result, span))
    }
}

fn op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::IntDiv => "//",
        BinaryOp::Rem => "%",
        BinaryOp::Pow => "**",
        _ => "?",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::span::Span;
    use crate::test_support::NullExecutor;

    #[test]
    fn integer_division_by_zero_is_runtime_error() {
        let mut ex = NullExecutor::default();
        let a = Value::number(4.0, Span::dummy());
        let b = Value::number(0.0, Span::dummy());
        let err = a.algebraic(BinaryOp::IntDiv, &b, &mut ex).unwrap_err();
        match err {
            crate::unwind::Unwind::Error(e) => assert_eq!(e.kind, crate::error::ErrorKind::Runtime),
            _ => panic!("expected Error"),
        }
    }

    #[test]
    fn float_division_by_zero_yields_infinity() {
        let mut ex = NullExecutor::default();
        let a = Value::number(4.5, Span::dummy());
        let b = Value::number(0.0, Span::dummy());
        let result = a.algebraic(BinaryOp::Div, &b, &mut ex).unwrap();
        match result.data {
            ValueData::Number(n) => assert!(n.is_infinite()),
            _ => panic!("expected Number"),
        }
    }

    #[test]
    fn integer_division_truncates_toward_zero() {
        let mut ex = NullExecutor::default();
        let a = Value::number(-7.0, Span::dummy());
        let b = Value::number(2.0, Span::dummy());
        let result = a.algebraic(BinaryOp::IntDiv, &b, &mut ex).unwrap();
        match result.data {
            ValueData::Number(n) => assert_eq!(n, -3.0),
            _ => panic!("expected Number"),
        }
    }

    #[test]
    fn string_concat_displays_rhs() {
        let mut ex = NullExecutor::default();
        let a = Value::string("x=", Span::dummy());
        let b = Value::number(3.0, Span::dummy());
        let result = a.algebraic(BinaryOp::Add, &b, &mut ex).unwrap();
        match result.data {
            ValueData::String(s) => assert_eq!(&*s, "x=3"),
            _ => panic!("expected String"),
        }
    }

    #[test]
    fn integer_valued_numbers_display_without_decimal() {
        assert_eq!(display_number(3.0), "3");
        assert_eq!(display_number(3.5), "3.5");
    }
}
