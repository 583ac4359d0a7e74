//! Token validation
//!
//! Checks run on the parsed tokens before any grouping or network access.

use std::collections::HashMap;

use super::{OrderError, WorkloadToken};

/// Largest order tag accepted unless configured otherwise
pub const DEFAULT_MAX_ORDINAL: u32 = 100;

/// Validate parsed tokens
///
/// # Arguments
/// * `tokens` - Tokens in the order they were given
/// * `max_ordinal` - Largest order tag allowed
///
/// # Errors
/// Returns an error if:
/// - an order tag exceeds `max_ordinal` (`InvalidOrderTag`)
/// - a workload is given two different tags, tagged and untagged included
///   (`ConflictingOrderTag`)
///
/// Repeating a token verbatim is not an error.
pub fn validate_tokens(tokens: &[WorkloadToken], max_ordinal: u32) -> Result<(), OrderError> {
    let mut seen: HashMap<&str, &WorkloadToken> = HashMap::new();

    for token in tokens {
        if let Some(ordinal) = token.ordinal {
            if ordinal > max_ordinal {
                return Err(OrderError::invalid_tag(
                    &token.to_string(),
                    format!("order {} exceeds the maximum of {}", ordinal, max_ordinal),
                ));
            }
        }

        if let Some(previous) = seen.insert(&token.name, token) {
            if previous.ordinal != token.ordinal {
                return Err(OrderError::ConflictingOrderTag {
                    name: token.name.clone(),
                    first: previous.to_string(),
                    second: token.to_string(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_empty_input() {
        assert!(validate_tokens(&[], DEFAULT_MAX_ORDINAL).is_ok());
    }

    #[test]
    fn test_accepts_ordinal_at_maximum() {
        let tokens = vec![WorkloadToken::ordered("api", 5)];
        assert!(validate_tokens(&tokens, 5).is_ok());
    }

    #[test]
    fn test_rejects_ordinal_above_maximum() {
        let tokens = vec![WorkloadToken::ordered("api", 6)];
        let result = validate_tokens(&tokens, 5);
        assert!(matches!(result, Err(OrderError::InvalidOrderTag { .. })));
    }

    #[test]
    fn test_rejects_conflicting_ordinals() {
        let tokens = vec![
            WorkloadToken::ordered("fe", 1),
            WorkloadToken::ordered("fe", 2),
        ];
        match validate_tokens(&tokens, DEFAULT_MAX_ORDINAL) {
            Err(OrderError::ConflictingOrderTag {
                name,
                first,
                second,
            }) => {
                assert_eq!(name, "fe");
                assert_eq!(first, "fe/1");
                assert_eq!(second, "fe/2");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_tagged_and_untagged_mix() {
        let tokens = vec![WorkloadToken::new("fe"), WorkloadToken::ordered("fe", 1)];
        assert!(matches!(
            validate_tokens(&tokens, DEFAULT_MAX_ORDINAL),
            Err(OrderError::ConflictingOrderTag { .. })
        ));
    }

    #[test]
    fn test_accepts_exact_duplicates() {
        let tokens = vec![
            WorkloadToken::ordered("fe", 1),
            WorkloadToken::ordered("fe", 1),
            WorkloadToken::new("worker"),
            WorkloadToken::new("worker"),
        ];
        assert!(validate_tokens(&tokens, DEFAULT_MAX_ORDINAL).is_ok());
    }
}
