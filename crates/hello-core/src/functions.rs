//! The `hello` function table.

use crate::point::dummy_2_to_3;
use crate::registry::{CallError, FunctionSpec};
use crate::value::Value;

/// Doc string of the `hello` namespace.
pub const HELLO_DOC: &str = "This is a python docstring, seen when you run help(module)";

pub const FOO_DESCRIPTION: &str = "A Foo Function that returns 1";

pub const DUMMY_2_TO_3_DESCRIPTION: &str =
    "Lift a 2D point to 3D, keeping x and y and setting z to 1";

/// Functions published under the `hello` namespace.
pub static HELLO_FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "foo",
        description: FOO_DESCRIPTION,
        arity: 0,
        call: call_foo,
    },
    FunctionSpec {
        name: "dummy_2_to_3",
        description: DUMMY_2_TO_3_DESCRIPTION,
        arity: 1,
        call: call_dummy_2_to_3,
    },
];

/// Always returns 1.
pub fn foo() -> i32 {
    1
}

fn call_foo(_args: &[Value]) -> Result<Value, CallError> {
    Ok(foo().into())
}

fn call_dummy_2_to_3(args: &[Value]) -> Result<Value, CallError> {
    let arg = args.first().ok_or(CallError::Arity {
        function: "dummy_2_to_3".to_string(),
        expected: 1,
        given: 0,
    })?;
    let p = arg.as_point2().ok_or_else(|| CallError::ArgumentType {
        function: "dummy_2_to_3".to_string(),
        index: 0,
        expected: "point_2d",
        found: arg.type_name(),
    })?;
    Ok(dummy_2_to_3(p).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Point2, Point3};

    #[test]
    fn test_foo_is_constant() {
        for _ in 0..3 {
            assert_eq!(foo(), 1);
        }
    }

    #[test]
    fn test_table_rows() {
        let names: Vec<&str> = HELLO_FUNCTIONS.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["foo", "dummy_2_to_3"]);
        assert!(HELLO_FUNCTIONS.iter().all(|f| !f.description.is_empty()));
    }

    #[test]
    fn test_table_dispatch() {
        assert_eq!((HELLO_FUNCTIONS[0].call)(&[]).unwrap(), Value::Int(1));
        assert_eq!(
            (HELLO_FUNCTIONS[1].call)(&[Value::Point2(Point2::new(11.0, 22.0))]).unwrap(),
            Value::Point3(Point3::new(11.0, 22.0, 1.0))
        );
    }

    #[test]
    fn test_dummy_2_to_3_wrong_argument() {
        let err = call_dummy_2_to_3(&[Value::Int(3)]).unwrap_err();
        assert_eq!(
            err,
            CallError::ArgumentType {
                function: "dummy_2_to_3".to_string(),
                index: 0,
                expected: "point_2d",
                found: "int",
            }
        );
    }
}
