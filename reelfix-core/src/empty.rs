/// "Empty" is the sentinel for an unknown value.
///
/// Provider records and stored records never use `Option` for their
/// enrichable fields (except ids); instead an empty string, a zero number or
/// an empty list means "nothing known yet". Reconciliation only ever writes
/// into fields for which this returns `true`.
pub trait IsEmpty {
    fn is_empty_value(&self) -> bool;
}

impl IsEmpty for str {
    fn is_empty_value(&self) -> bool {
        self.trim().is_empty()
    }
}

impl IsEmpty for String {
    fn is_empty_value(&self) -> bool {
        self.as_str().is_empty_value()
    }
}

impl IsEmpty for f64 {
    fn is_empty_value(&self) -> bool {
        *self == 0.0 || self.is_nan()
    }
}

impl IsEmpty for u64 {
    fn is_empty_value(&self) -> bool {
        *self == 0
    }
}

impl IsEmpty for u32 {
    fn is_empty_value(&self) -> bool {
        *self == 0
    }
}

impl<T> IsEmpty for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: IsEmpty> IsEmpty for Option<T> {
    fn is_empty_value(&self) -> bool {
        match self {
            Some(v) => v.is_empty_value(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_string_is_empty() {
        assert!("   ".is_empty_value());
        assert!(String::new().is_empty_value());
        assert!(!"x".is_empty_value());
    }

    #[test]
    fn zero_numbers_are_empty() {
        assert!(0.0f64.is_empty_value());
        assert!(f64::NAN.is_empty_value());
        assert!(0u64.is_empty_value());
        assert!(!7.5f64.is_empty_value());
    }

    #[test]
    fn option_wraps_inner_rule() {
        assert!(None::<String>.is_empty_value());
        assert!(Some(String::new()).is_empty_value());
        assert!(Some(0u64).is_empty_value());
        assert!(!Some(27205u64).is_empty_value());
    }
}
