//! Functions available to every KDL source.
//!
//! Functions that need session state (`defined`, `file`) are registered by
//! the compile session itself.

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};

use crate::{Function, Scope, Value};

/// Register the built-in functions on `scope`, normally the root scope.
pub fn install(scope: &mut Scope<'_>) -> CompileResult<()> {
    scope.add_function("min", Function::native(None, min))?;
    scope.add_function("max", Function::native(None, max))?;
    scope.add_function("clamp", Function::native(Some(3), clamp))?;
    scope.add_function("abs", Function::native(Some(1), abs))?;
    scope.add_function("len", Function::native(Some(1), len))?;
    scope.add_function("upper", Function::native(Some(1), upper))?;
    scope.add_function("lower", Function::native(Some(1), lower))?;
    scope.add_function("id", Function::native(Some(1), id))?;
    Ok(())
}

fn integer(function: &str, value: &Value) -> CompileResult<i64> {
    value.as_integer().ok_or_else(|| {
        CompileError::semantic(
            ErrorCode::E2005,
            format!("`{function}` expects integer arguments, found {}", value.type_name()),
        )
    })
}

fn text<'v>(function: &str, value: &'v Value) -> CompileResult<&'v str> {
    value.as_str().ok_or_else(|| {
        CompileError::semantic(
            ErrorCode::E2005,
            format!("`{function}` expects a string argument, found {}", value.type_name()),
        )
    })
}

fn fold(function: &str, args: &[Value], pick: fn(i64, i64) -> i64) -> CompileResult<Value> {
    let mut values = args.iter();
    let first = values.next().ok_or_else(|| {
        CompileError::semantic(
            ErrorCode::E2005,
            format!("`{function}` expects at least one argument"),
        )
    })?;
    let mut result = integer(function, first)?;
    for value in values {
        result = pick(result, integer(function, value)?);
    }
    Ok(Value::Integer(result))
}

fn min(args: &[Value]) -> CompileResult<Value> {
    fold("min", args, i64::min)
}

fn max(args: &[Value]) -> CompileResult<Value> {
    fold("max", args, i64::max)
}

fn clamp(args: &[Value]) -> CompileResult<Value> {
    let [value, lower, upper] = args else {
        return Err(CompileError::semantic(ErrorCode::E2005, "`clamp` expects 3 arguments"));
    };
    let (value, lower, upper) = (
        integer("clamp", value)?,
        integer("clamp", lower)?,
        integer("clamp", upper)?,
    );
    if lower > upper {
        return Err(CompileError::semantic(
            ErrorCode::E2005,
            format!("`clamp` lower bound {lower} is greater than upper bound {upper}"),
        ));
    }
    Ok(Value::Integer(value.clamp(lower, upper)))
}

fn abs(args: &[Value]) -> CompileResult<Value> {
    let value = args.first().map_or(Ok(0), |v| integer("abs", v))?;
    value.checked_abs().map(Value::Integer).ok_or_else(|| {
        CompileError::semantic(ErrorCode::E2005, format!("`abs` overflows for {value}"))
    })
}

fn len(args: &[Value]) -> CompileResult<Value> {
    let length = match args.first() {
        Some(Value::Data(bytes)) => bytes.len(),
        Some(value) => text("len", value)?.chars().count(),
        None => 0,
    };
    i64::try_from(length).map(Value::Integer).map_err(|_| {
        CompileError::semantic(ErrorCode::E2005, "`len` result does not fit an integer")
    })
}

fn upper(args: &[Value]) -> CompileResult<Value> {
    match args.first() {
        Some(value) => Ok(Value::String(text("upper", value)?.to_uppercase())),
        None => Ok(Value::String(String::new())),
    }
}

fn lower(args: &[Value]) -> CompileResult<Value> {
    match args.first() {
        Some(value) => Ok(Value::String(text("lower", value)?.to_lowercase())),
        None => Ok(Value::String(String::new())),
    }
}

fn id(args: &[Value]) -> CompileResult<Value> {
    match args.first() {
        Some(Value::Reference(reference)) => reference.id.map(Value::Integer).ok_or_else(|| {
            CompileError::semantic(ErrorCode::E2005, "`id` cannot resolve an `auto` reference")
        }),
        Some(other) => integer("id", other).map(Value::Integer),
        None => Err(CompileError::semantic(ErrorCode::E2005, "`id` expects 1 argument")),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use pretty_assertions::assert_eq;

    use kdl_ir::ResourceReference;

    use super::*;

    fn root() -> Scope<'static> {
        let mut scope = Scope::new();
        install(&mut scope).unwrap();
        scope
    }

    #[test]
    fn test_min_max_clamp() {
        let mut scope = root();
        let args = [Value::Integer(4), Value::Integer(-2), Value::Integer(9)];
        assert_eq!(scope.call("min", &args).unwrap(), Value::Integer(-2));
        assert_eq!(scope.call("max", &args).unwrap(), Value::Integer(9));
        assert_eq!(scope.call("clamp", &args).unwrap(), Value::Integer(4));
        assert!(scope.call("min", &[]).is_err());
    }

    #[test]
    fn test_string_functions() {
        let mut scope = root();
        let s = [Value::String("Frigate".to_string())];
        assert_eq!(scope.call("len", &s).unwrap(), Value::Integer(7));
        assert_eq!(scope.call("upper", &s).unwrap(), Value::String("FRIGATE".to_string()));
        assert_eq!(scope.call("lower", &s).unwrap(), Value::String("frigate".to_string()));
    }

    #[test]
    fn test_id_of_reference() {
        let mut scope = root();
        let reference = Value::Reference(ResourceReference::with_id(128));
        assert_eq!(scope.call("id", &[reference]).unwrap(), Value::Integer(128));
        let auto = Value::Reference(ResourceReference::auto());
        assert!(scope.call("id", &[auto]).is_err());
    }

    #[test]
    fn test_arity_is_checked() {
        let mut scope = root();
        let err = scope.call("abs", &[]).unwrap_err();
        assert_eq!(err.message(), "Function `abs` expects 1 argument but received 0");
    }
}
