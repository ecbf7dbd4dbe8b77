//! Query domain value object
//!
//! A domain is an ordered list of clauses, each an ordered list of conditions.
//! Clauses are alternatives; the conditions inside a clause all have to hold.
//! On the wire it is a nested JSON array: `[[["category_id", "=", 5]]]`.
//! A single clause (`[["category_id", "=", 5]]`) or a single condition
//! (`["category_id", "=", 5]`) is accepted on input and written back nested.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{FieldValues, RecordId};

/// Operators whose value becomes a default for the operand field of a draft record
pub const DEFAULT_OPERATORS: &[&str] = &["=", "is", "like", "ilike"];

/// Operands never used as draft defaults
pub const NON_DEFAULT_OPERANDS: &[&str] = &["id", "name", "status"];

/// Single `(operand, operator, value)` condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, String, Value)", into = "(String, String, Value)")]
pub struct Condition {
    pub operand: String,
    pub operator: String,
    pub value: Value,
}

impl Condition {
    #[must_use]
    pub fn new(operand: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        Self {
            operand: operand.into(),
            operator: operator.into(),
            value,
        }
    }

    /// Whether this condition contributes a default value to a draft record
    #[must_use]
    pub fn provides_default(&self) -> bool {
        DEFAULT_OPERATORS.contains(&self.operator.as_str())
            && !NON_DEFAULT_OPERANDS.contains(&self.operand.as_str())
    }
}

impl From<(String, String, Value)> for Condition {
    fn from((operand, operator, value): (String, String, Value)) -> Self {
        Self {
            operand,
            operator,
            value,
        }
    }
}

impl From<Condition> for (String, String, Value) {
    fn from(condition: Condition) -> Self {
        (condition.operand, condition.operator, condition.value)
    }
}

/// Conjunction of conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clause(pub Vec<Condition>);

impl Clause {
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.0
    }
}

/// Ordered list of alternative clauses
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Domain(Vec<Clause>);

/// Shapes a domain may arrive in, most nested first
#[derive(Deserialize)]
#[serde(untagged)]
enum DomainRepr {
    Clauses(Vec<Clause>),
    Clause(Clause),
    Condition(Condition),
}

impl<'de> Deserialize<'de> for Domain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match DomainRepr::deserialize(deserializer)? {
            DomainRepr::Clauses(clauses) => Self(clauses),
            DomainRepr::Clause(clause) => Self(vec![clause]),
            DomainRepr::Condition(condition) => Self(vec![Clause(vec![condition])]),
        })
    }
}

impl Domain {
    /// Empty domain (matches everything)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Domain with a single clause holding a single condition
    #[must_use]
    pub fn from_condition(
        operand: impl Into<String>,
        operator: impl Into<String>,
        value: Value,
    ) -> Self {
        Self(vec![Clause(vec![Condition::new(operand, operator, value)])])
    }

    /// Domain targeting exactly one record
    #[must_use]
    pub fn by_id(id: RecordId) -> Self {
        Self::from_condition("id", "=", Value::from(id))
    }

    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|clause| clause.0.is_empty())
    }

    /// Append a condition to every clause (a new clause is created for an empty domain)
    pub fn push_condition(&mut self, condition: Condition) {
        if self.0.is_empty() {
            self.0.push(Clause::default());
        }
        for clause in &mut self.0 {
            clause.0.push(condition.clone());
        }
    }

    /// Append an alternative clause
    pub fn push_clause(&mut self, clause: Clause) {
        self.0.push(clause);
    }

    /// Conjunction of two domains: every clause of `self` combined with every clause of `other`
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let mut clauses = Vec::with_capacity(self.0.len() * other.0.len());
        for left in &self.0 {
            for right in &other.0 {
                let mut conditions = left.0.clone();
                conditions.extend(right.0.iter().cloned());
                clauses.push(Clause(conditions));
            }
        }
        Self(clauses)
    }

    /// Default field values implied by equality-type conditions
    #[must_use]
    pub fn equality_defaults(&self) -> FieldValues {
        let mut defaults = FieldValues::new();
        for condition in self.0.iter().flat_map(|clause| clause.0.iter()) {
            if condition.provides_default() {
                defaults.insert(condition.operand.clone(), condition.value.clone());
            }
        }
        defaults
    }
}

impl From<Vec<Clause>> for Domain {
    fn from(clauses: Vec<Clause>) -> Self {
        Self(clauses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_format_is_nested_arrays() {
        let domain = Domain::from_condition("category_id", "=", json!(5));
        let json = serde_json::to_value(&domain).unwrap();
        assert_eq!(json, json!([[["category_id", "=", 5]]]));

        let parsed: Domain = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, domain);
    }

    #[test]
    fn single_clause_and_single_condition_are_accepted() {
        let expected = Domain::from_condition("category_id", "=", json!(5));

        let clause: Domain = serde_json::from_value(json!([["category_id", "=", 5]])).unwrap();
        assert_eq!(clause, expected);
        let condition: Domain = serde_json::from_value(json!(["category_id", "=", 5])).unwrap();
        assert_eq!(condition, expected);

        let two: Domain =
            serde_json::from_value(json!([["category_id", "=", 5], ["active", "=", true]]))
                .unwrap();
        assert_eq!(two.clauses().len(), 1);
        assert_eq!(two.clauses()[0].conditions().len(), 2);
        assert_eq!(
            serde_json::to_value(&two).unwrap(),
            json!([[["category_id", "=", 5], ["active", "=", true]]])
        );

        let empty: Domain = serde_json::from_value(json!([])).unwrap();
        assert!(empty.is_empty());
        assert!(serde_json::from_value::<Domain>(json!([["category_id", "="]])).is_err());
        assert!(serde_json::from_value::<Domain>(json!("category_id")).is_err());
    }

    #[test]
    fn equality_defaults_skip_reserved_operands_and_other_operators() {
        let domain: Domain = serde_json::from_value(json!([[
            ["category_id", "=", 5],
            ["name", "=", "Desk"],
            ["id", "=", 3],
            ["status", "is", "draft"],
            ["price", ">", 10],
            ["code", "ilike", "DK-"],
            ["active", "is", true]
        ]]))
        .unwrap();

        let defaults = domain.equality_defaults();
        assert_eq!(defaults.len(), 3);
        assert_eq!(defaults["category_id"], json!(5));
        assert_eq!(defaults["code"], json!("DK-"));
        assert_eq!(defaults["active"], json!(true));
    }

    #[test]
    fn merge_combines_clauses_pairwise() {
        let mut left = Domain::from_condition("a", "=", json!(1));
        left.push_clause(Clause(vec![Condition::new("b", "=", json!(2))]));
        let right = Domain::from_condition("c", "=", json!(3));

        let merged = left.merge(&right);
        assert_eq!(
            serde_json::to_value(&merged).unwrap(),
            json!([[["a", "=", 1], ["c", "=", 3]], [["b", "=", 2], ["c", "=", 3]]])
        );
        assert_eq!(Domain::new().merge(&right), right);
    }

    #[test]
    fn push_condition_applies_to_every_clause() {
        let mut domain = Domain::new();
        domain.push_condition(Condition::new("active", "=", json!(true)));
        assert_eq!(domain.clauses().len(), 1);

        domain.push_clause(Clause(vec![Condition::new("b", "=", json!(2))]));
        domain.push_condition(Condition::new("c", "!=", json!(0)));
        assert!(domain
            .clauses()
            .iter()
            .all(|clause| clause.conditions().last().unwrap().operand == "c"));
    }
}
