//! Priority and accept condition resolution
//!
//! Both resolvers are pure. The session records a diagnostic for the error
//! they return.

use crate::error::CompileError;
use crate::value::SchemeValue;
use vstc_core::{AcceptCondition, Priority};

/// Map `normal|low|high` or a raw integer to a [`Priority`]
pub fn resolve_priority(setting: Option<&SchemeValue>) -> Result<Priority, CompileError> {
    match setting {
        None => Ok(Priority::Normal),
        Some(SchemeValue::Str(s)) => match s.as_str() {
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            "high" => Ok(Priority::High),
            _ => Err(CompileError::InvalidPriority { value: s.clone() }),
        },
        Some(SchemeValue::Int(i)) => i32::try_from(*i)
            .map(Priority::from_value)
            .map_err(|_| CompileError::InvalidPriority { value: i.to_string() }),
        Some(other) => Err(CompileError::InvalidPriority {
            value: other.to_string(),
        }),
    }
}

/// Map `all|starts_with|in_between|ends_with` or a raw integer to an [`AcceptCondition`]
pub fn resolve_accept(setting: Option<&SchemeValue>) -> Result<AcceptCondition, CompileError> {
    match setting {
        None => Ok(AcceptCondition::All),
        Some(SchemeValue::Str(s)) => match s.as_str() {
            "all" => Ok(AcceptCondition::All),
            "starts_with" => Ok(AcceptCondition::StartsWith),
            "in_between" => Ok(AcceptCondition::InBetween),
            "ends_with" => Ok(AcceptCondition::EndsWith),
            _ => Err(CompileError::InvalidAccept { value: s.clone() }),
        },
        Some(SchemeValue::Int(i)) => i32::try_from(*i)
            .map(AcceptCondition::from_code)
            .map_err(|_| CompileError::InvalidAccept { value: i.to_string() }),
        Some(other) => Err(CompileError::InvalidAccept {
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbolic_priorities() {
        assert_eq!(resolve_priority(None).unwrap(), Priority::Normal);
        assert_eq!(resolve_priority(Some(&"normal".into())).unwrap(), Priority::Normal);
        assert_eq!(resolve_priority(Some(&"low".into())).unwrap(), Priority::Low);
        assert_eq!(resolve_priority(Some(&"high".into())).unwrap(), Priority::High);
    }

    #[test]
    fn raw_priorities_pass_through() {
        assert_eq!(resolve_priority(Some(&SchemeValue::Int(5))).unwrap().value(), 5);
        assert_eq!(resolve_priority(Some(&SchemeValue::Int(-1))).unwrap(), Priority::Low);
    }

    #[test]
    fn invalid_priorities() {
        assert!(matches!(
            resolve_priority(Some(&"urgent".into())),
            Err(CompileError::InvalidPriority { .. })
        ));
        assert!(resolve_priority(Some(&SchemeValue::Bool(true))).is_err());
        assert!(resolve_priority(Some(&SchemeValue::Int(i64::MAX))).is_err());
    }

    #[test]
    fn accept_conditions() {
        assert_eq!(resolve_accept(None).unwrap(), AcceptCondition::All);
        assert_eq!(resolve_accept(Some(&"all".into())).unwrap(), AcceptCondition::All);
        assert_eq!(
            resolve_accept(Some(&"starts_with".into())).unwrap(),
            AcceptCondition::StartsWith
        );
        assert_eq!(
            resolve_accept(Some(&"in_between".into())).unwrap(),
            AcceptCondition::InBetween
        );
        assert_eq!(
            resolve_accept(Some(&"ends_with".into())).unwrap(),
            AcceptCondition::EndsWith
        );
        assert_eq!(resolve_accept(Some(&SchemeValue::Int(7))).unwrap().code(), 7);
    }

    #[test]
    fn invalid_accept_conditions() {
        let err = resolve_accept(Some(&SchemeValue::list(vec!["all"]))).unwrap_err();
        assert_eq!(err, CompileError::InvalidAccept { value: "[all]".into() });
    }
}
