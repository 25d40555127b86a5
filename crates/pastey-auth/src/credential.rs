//! Authorization header normalization

use crate::error::{AuthError, AuthResult};

pub const BEARER_SCHEME: &str = "Bearer";

/// Extract the token from an `Authorization` header value
///
/// | Header                      | Result                |
/// |-----------------------------|-----------------------|
/// | absent or `""`              | `Unauthenticated`     |
/// | `Bearer <token>`            | `Ok(token)`           |
/// | anything else               | `MalformedCredential` |
///
/// The scheme is case-sensitive and must be separated from the token by a
/// single space; the token itself may not contain spaces.
pub fn bearer_token(header: Option<&str>) -> AuthResult<&str> {
    let value = match header {
        None | Some("") => return Err(AuthError::Unauthenticated),
        Some(v) => v,
    };

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Ok(token),
        (Some(BEARER_SCHEME), _, _) => Err(AuthError::MalformedCredential(
            "expected exactly one token after the Bearer scheme".into(),
        )),
        _ => Err(AuthError::MalformedCredential(format!(
            "expected `{BEARER_SCHEME} <token>`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_extracted() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(bearer_token(None), Err(AuthError::Unauthenticated)));
        assert!(matches!(
            bearer_token(Some("")),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[test]
    fn test_malformed_header() {
        for value in [
            "Token xyz",
            "bearer xyz",
            "Bearer",
            "Bearer ",
            "Bearer  xyz",
            "Bearer xyz extra",
            "Basic dXNlcjpwYXNz",
            "xyz",
            "   ",
            " ",
        ] {
            assert!(
                matches!(
                    bearer_token(Some(value)),
                    Err(AuthError::MalformedCredential(_))
                ),
                "{value:?} should be malformed"
            );
        }
    }
}
