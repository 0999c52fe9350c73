//! OpenAPI-style security requirements.
//!
//! A requirement list is a set of alternatives; a client satisfies the
//! operation by meeting any one of them. Each alternative maps a security
//! scheme name to the scopes it needs.

use std::collections::BTreeMap;

/// Name of the HTTP bearer (JWT) security scheme.
pub const BEARER_AUTH: &str = "bearerAuth";

/// One alternative: security scheme name -> required scopes.
///
/// An empty map means "no authentication required".
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// The single-alternative list used by bearer-authenticated operations:
/// `[{"bearerAuth": []}]`.
#[must_use]
pub fn bearer_only() -> Vec<SecurityRequirement> {
    vec![SecurityRequirement::from([(BEARER_AUTH.to_string(), Vec::new())])]
}

/// The single empty alternative used by public operations: `[{}]`.
#[must_use]
pub fn anonymous() -> Vec<SecurityRequirement> {
    vec![SecurityRequirement::new()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_only_serializes_as_openapi() {
        let json = serde_json::to_value(bearer_only()).unwrap();
        assert_eq!(json, serde_json::json!([{ "bearerAuth": [] }]));
    }

    #[test]
    fn anonymous_is_one_empty_alternative() {
        let reqs = anonymous();
        assert_eq!(reqs.len(), 1);
        assert!(reqs[0].is_empty());
        assert_eq!(serde_json::to_value(reqs).unwrap(), serde_json::json!([{}]));
    }
}
