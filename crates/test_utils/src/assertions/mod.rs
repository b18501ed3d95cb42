//! Assertion utilities for testing

/// Assert that two byte arrays are equal
#[macro_export]
macro_rules! assert_bytes_eq {
    ($left:expr, $right:expr) => {
        assert_eq!($left.as_ref() as &[u8], $right.as_ref() as &[u8]);
    };
    ($left:expr, $right:expr, $($arg:tt)+) => {
        assert_eq!($left.as_ref() as &[u8], $right.as_ref() as &[u8], $($arg)+);
    };
}

/// Assert that a result is OK and unwrap it
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(err) => panic!("Expected Ok, got Err: {:?}", err),
        }
    };
    ($expr:expr, $($arg:tt)+) => {
        match $expr {
            Ok(val) => val,
            Err(err) => panic!("Expected Ok, got Err: {:?} ({})", err, format!($($arg)+)),
        }
    };
}

/// Assert that a result is Err and unwrap the error.
///
/// With a second argument, the error must also match that pattern.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(_) => panic!("Expected Err, got Ok"),
            Err(err) => err,
        }
    };
    ($expr:expr, $pat:pat) => {
        match $expr {
            Ok(_) => panic!("Expected Err matching {}, got Ok", stringify!($pat)),
            Err(err) => {
                assert!(
                    matches!(err, $pat),
                    "Expected Err matching {}, got {:?}",
                    stringify!($pat),
                    err
                );
                err
            }
        }
    };
}

/// Assert that a value is within a specific range
#[macro_export]
macro_rules! assert_in_range {
    ($value:expr, $min:expr, $max:expr) => {
        assert!($value >= $min && $value <= $max, "{} not in range [{}, {}]", $value, $min, $max);
    };
}
