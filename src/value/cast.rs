//! Casting (`value as T`). Supported targets: Number, String, Bool.

use crate::ast::CastTarget;
use crate::error::Error;
use crate::executor::Executor;
use crate::unwind::EvalResult;
use crate::value::{Value, ValueData};

impl Value {
    pub fn cast(&self, target: CastTarget, executor: &mut dyn Executor) -> EvalResult<Value> {
        let v = self.resolve(executor)?;
        let span = v.span.clone();
        match target {
            CastTarget::Number => match &v.data {
                ValueData::Number(n) => Ok(Value::number(*n, span)),
                ValueData::Bool(b) => Ok(Value::number(if *b { 1.0 } else { 0.0 }, span)),
                ValueData::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(|n| Value::number(n, span.clone()))
                    .map_err(|_| {
                        Error::value(format!("cannot parse {:?} as a number", s), span).into()
                    }),
                _ => Err(Error::type_error(
                    format!("cannot cast {} to num", v.kind()),
                    span,
                )
                .into()),
            },
            CastTarget::String => Ok(Value::string(v.display(executor)?, span)),
            CastTarget::Bool => Ok(Value::boolean(v.is_truthy(executor)?, span)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::span::Span;
    use crate::test_support::NullExecutor;

    #[test]
    fn number_round_trips_through_string() {
        let mut ex = NullExecutor::default();
        let n = Value::number(42.0, Span::dummy());
        let s = n.cast(CastTarget::String, &mut ex).unwrap();
        let back = s.cast(CastTarget::Number, &mut ex).unwrap();
        assert!(matches!(back.data, ValueData::Number(x) if x == 42.0));
    }

    #[test]
    fn bool_round_trips_through_number() {
        let mut ex = NullExecutor::default();
        let b = Value::boolean(true, Span::dummy());
        let n = b.cast(CastTarget::Number, &mut ex).unwrap();
        let back = n.cast(CastTarget::Bool, &mut ex).unwrap();
        assert!(matches!(back.data, ValueData::Bool(true)));
    }

    #[test]
    fn unparseable_string_is_value_error() {
        let mut ex = NullExecutor::default();
        let s = Value::string("not a number", Span::dummy());
        let err = s.cast(CastTarget::Number, &mut ex).unwrap_err();
        match err {
            crate::unwind::Unwind::Error(e) => assert_eq!(e.kind, crate::error::ErrorKind::Value),
            _ => panic!("expected Error"),
        }
    }
}
