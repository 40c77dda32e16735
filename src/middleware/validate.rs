//! Declarative body validation.
//!
//! Rules are built fluently and attached to a route:
//!
//! ```rust
//! use storefront::middleware::validate::Rule;
//!
//! let rules = vec![
//!     Rule::body("title").not_empty().message("title is required"),
//!     Rule::body("price").not_empty().message("price is required")
//!         .numeric().message("price must be a number"),
//! ];
//! ```
//!
//! [`Validate`] applies them and records what failed; [`ValidationOutcome`]
//! is the gate that actually turns recorded failures into a `400`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::handler::BoxFuture;
use crate::middleware::{Flow, Gate};
use crate::request::Request;

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Errors accumulated for one request, in rule declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn is_empty(&self) -> bool { self.errors.is_empty() }
    pub fn errors(&self) -> &[FieldError] { &self.errors }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    pub fn into_errors(self) -> Vec<FieldError> { self.errors }
}

/// A single predicate over an optional field value.
///
/// An absent field fails every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Present and not `null`, `""` or `[]`.
    NotEmpty,
    /// A JSON number. Numeric strings are not accepted.
    Numeric,
    /// A non-negative JSON integer: `4` passes, `4.5`, `-1` and `"4"` do not.
    Integer,
}

impl Check {
    pub fn passes(&self, value: Option<&Value>) -> bool {
        let Some(value) = value else { return false };
        match self {
            Self::NotEmpty => match value {
                Value::Null => false,
                Value::String(s) => !s.is_empty(),
                Value::Array(items) => !items.is_empty(),
                Value::Bool(_) | Value::Number(_) | Value::Object(_) => true,
            },
            Self::Numeric => value.is_number(),
            Self::Integer => value.is_u64(),
        }
    }

    fn default_message(&self, field: &str) -> String {
        match self {
            Self::NotEmpty => format!("{field} is required"),
            Self::Numeric => format!("{field} must be a number"),
            Self::Integer => format!("{field} must be a whole number"),
        }
    }
}

/// Checks against one named body field.
///
/// Checks run in the order they were added; the first failure is the rule's
/// only error, so a missing field reports "required" rather than every
/// downstream check.
#[derive(Debug, Clone)]
pub struct Rule {
    field: String,
    checks: Vec<(Check, Option<String>)>,
}

impl Rule {
    pub fn body(field: impl Into<String>) -> Self {
        Self { field: field.into(), checks: Vec::new() }
    }

    pub fn field(&self) -> &str { &self.field }

    pub fn check(mut self, check: Check) -> Self {
        self.checks.push((check, None));
        self
    }

    pub fn not_empty(self) -> Self { self.check(Check::NotEmpty) }
    pub fn numeric(self) -> Self { self.check(Check::Numeric) }
    pub fn integer(self) -> Self { self.check(Check::Integer) }

    /// Overrides the message of the most recently added check.
    ///
    /// # Panics
    ///
    /// Panics if no check has been added yet. Rules are built at startup.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        let Some((_, slot)) = self.checks.last_mut() else {
            panic!("rule `{}`: message() before any check", self.field);
        };
        *slot = Some(message.into());
        self
    }

    /// Applies the rule to a body object.
    pub fn apply(&self, body: &Value) -> Option<FieldError> {
        let value = body.get(&self.field);
        self.checks.iter()
            .find(|(check, _)| !check.passes(value))
            .map(|(check, message)| {
                let message = message.clone().unwrap_or_else(|| check.default_message(&self.field));
                FieldError::new(self.field.clone(), message)
            })
    }
}

/// Applies every rule to `body`. Pure; the body is never modified.
pub fn validate(rules: &[Rule], body: &Value) -> ValidationResult {
    ValidationResult {
        errors: rules.iter().filter_map(|rule| rule.apply(body)).collect(),
    }
}

/// Gate that records rule failures on the request and always continues.
#[derive(Clone)]
pub struct Validate {
    rules: Arc<[Rule]>,
}

impl Validate {
    pub fn new(rules: impl Into<Vec<Rule>>) -> Self {
        let rules: Vec<Rule> = rules.into();
        Self { rules: rules.into() }
    }

    pub fn rules(&self) -> &[Rule] { &self.rules }
}

impl Gate for Validate {
    fn check<'a>(&'a self, req: &'a mut Request) -> BoxFuture<'a, Flow> {
        let result = validate(&self.rules, req.payload());
        if !result.is_empty() {
            debug!(path = %req.path(), failed = result.errors().len(), "validation rules failed");
        }
        req.validation_mut().extend(result);
        Box::pin(std::future::ready(Flow::Continue))
    }
}

/// Gate that terminates with `400` and every recorded `(field, message)`
/// pair when validation has failed. Never mutates the request.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValidationOutcome;

impl Gate for ValidationOutcome {
    fn check<'a>(&'a self, req: &'a mut Request) -> BoxFuture<'a, Flow> {
        let flow = if req.validation().is_empty() {
            Flow::Continue
        } else {
            Flow::terminate(ApiError::ValidationFailed(req.validation().errors().to_vec()))
        };
        Box::pin(std::future::ready(flow))
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::method::Method;
    use crate::request::test_request;

    fn product_like() -> Vec<Rule> {
        vec![
            Rule::body("title").not_empty().message("title is required"),
            Rule::body("price").not_empty().message("price is required")
                .numeric().message("price must be a number"),
            Rule::body("brand").not_empty().message("brand is required"),
        ]
    }

    #[test]
    fn errors_follow_declaration_order() {
        let result = validate(&product_like(), &json!({}));
        let fields: Vec<_> = result.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["title", "price", "brand"]);
    }

    #[test]
    fn first_failing_check_wins() {
        let result = validate(&product_like(), &json!({ "title": "t", "price": "12", "brand": "b" }));
        assert_eq!(result.errors(), [FieldError::new("price", "price must be a number")]);
    }

    #[test]
    fn empty_values_fail_not_empty() {
        let rule = Rule::body("x").not_empty();
        for body in [json!({}), json!({ "x": null }), json!({ "x": "" }), json!({ "x": [] })] {
            assert_eq!(rule.apply(&body), Some(FieldError::new("x", "x is required")), "{body}");
        }
        for body in [json!({ "x": 0 }), json!({ "x": false }), json!({ "x": " " }), json!({ "x": {} })] {
            assert_eq!(rule.apply(&body), None, "{body}");
        }
    }

    #[test]
    fn integer_rejects_fractions_and_negatives() {
        let rule = Rule::body("quantity").integer();
        assert!(rule.apply(&json!({ "quantity": 4 })).is_none());
        assert!(rule.apply(&json!({ "quantity": 0 })).is_none());
        for bad in [json!(1.5), json!(-1), json!("4"), json!(null)] {
            assert_eq!(
                rule.apply(&json!({ "quantity": bad })),
                Some(FieldError::new("quantity", "quantity must be a whole number")),
                "{bad}",
            );
        }
    }

    #[tokio::test]
    async fn validate_records_and_outcome_terminates() {
        let mut req = test_request(Method::Post, r#"{"price": 3}"#);
        let flow = Validate::new(product_like()).check(&mut req).await;
        assert!(matches!(flow, Flow::Continue));
        assert_eq!(req.validation().errors().len(), 2);

        match ValidationOutcome.check(&mut req).await {
            Flow::Terminate(res) => {
                assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
                let body: Value = res.json_body().unwrap();
                assert_eq!(body["errors"][0], json!({ "field": "title", "message": "title is required" }));
                assert_eq!(body["errors"][1]["field"], "brand");
            }
            Flow::Continue => panic!("outcome gate should terminate"),
        }
    }

    #[tokio::test]
    async fn outcome_passes_clean_requests() {
        let mut req = test_request(Method::Post, r#"{"title":"t","price":1,"brand":"b"}"#);
        Validate::new(product_like()).check(&mut req).await;
        assert!(matches!(ValidationOutcome.check(&mut req).await, Flow::Continue));
    }
}
