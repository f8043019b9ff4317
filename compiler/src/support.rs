//! Small checks called from generated message code.

use std::fmt::Display;

use crate::error::CodecError;

pub fn check_len(message: &str, field: &str, expected: usize, actual: usize) -> Result<(), CodecError> {
    if expected != actual {
        return Err(CodecError::LengthMismatch {
            message: message.to_owned(),
            field: field.to_owned(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Narrows an element count to the integer type of its prefix.
pub fn count_to<T: TryFrom<usize>>(message: &str, field: &str, format: &str, count: usize) -> Result<T, CodecError> {
    T::try_from(count).map_err(|_| CodecError::CountOverflow {
        message: message.to_owned(),
        field: field.to_owned(),
        format: format.to_owned(),
        count,
    })
}

/// Widens a decoded count, rejecting negatives.
pub fn count_from<T: TryInto<usize> + Copy + Display>(message: &str, field: &str, value: T) -> Result<usize, CodecError> {
    value.try_into().map_err(|_| CodecError::InvalidCount {
        message: message.to_owned(),
        field:   field.to_owned(),
        found:   value.to_string(),
    })
}

#[test]
fn counts_convert_with_range_checks() {
    assert_eq!(count_to::<u8>("M", "v", "uint8", 255), Ok(255u8));
    assert!(matches!(
        count_to::<u8>("M", "v", "uint8", 256),
        Err(CodecError::CountOverflow { count: 256, .. })
    ));
    assert_eq!(count_from("M", "v", 7i16), Ok(7));
    assert_eq!(
        count_from("M", "v", -1i8),
        Err(CodecError::InvalidCount { message: "M".into(), field: "v".into(), found: "-1".into() })
    );
    assert!(check_len("M", "v", 2, 3).is_err());
}
