//! Structured search terms.
//!
//! An [`EntrySearchFilter`] is built from [`Single`] comparisons combined by
//! [`Multi`] terms, and is evaluated by converting it into a [`Filter`].

use super::{Filter, FilterError};
use crate::entry::Entry;
use std::fmt;
use std::str::FromStr;

/// Comparison operators of a single term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Has,
    Ge,
    Le,
    Gt,
    Lt,
    StartsWith,
    EndsWith,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Has => "has",
            Operator::Ge => "ge",
            Operator::Le => "le",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::StartsWith => "startswith",
            Operator::EndsWith => "endswith",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eq" => Ok(Operator::Eq),
            "has" => Ok(Operator::Has),
            "ge" => Ok(Operator::Ge),
            "le" => Ok(Operator::Le),
            "gt" => Ok(Operator::Gt),
            "lt" => Ok(Operator::Lt),
            "startswith" => Ok(Operator::StartsWith),
            "endswith" => Ok(Operator::EndsWith),
            _ => Err(FilterError::UnknownOperator(s.to_string())),
        }
    }
}

/// One comparison, optionally negated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Single {
    pub negation: bool,
    pub attribute: String,
    pub operator: Operator,
    pub value: String,
}

impl Single {
    pub fn new(attribute: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            negation: false,
            attribute: attribute.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn negated(mut self) -> Self {
        self.negation = !self.negation;
        self
    }

    fn to_filter(&self) -> Filter {
        let attribute = self.attribute.clone();
        let value = self.value.clone();
        let filter = match self.operator {
            Operator::Eq => Filter::Equality(attribute, value),
            Operator::Has => Filter::Substring {
                attribute,
                initial: None,
                any: vec![value],
                last: None,
            },
            Operator::StartsWith => Filter::Substring {
                attribute,
                initial: Some(value),
                any: Vec::new(),
                last: None,
            },
            Operator::EndsWith => Filter::Substring {
                attribute,
                initial: None,
                any: Vec::new(),
                last: Some(value),
            },
            Operator::Ge => Filter::GreaterOrEqual(attribute, value),
            Operator::Le => Filter::LessOrEqual(attribute, value),
            Operator::Gt => Filter::And(vec![
                Filter::GreaterOrEqual(attribute.clone(), value.clone()),
                Filter::Not(Box::new(Filter::Equality(attribute, value))),
            ]),
            Operator::Lt => Filter::And(vec![
                Filter::LessOrEqual(attribute.clone(), value.clone()),
                Filter::Not(Box::new(Filter::Equality(attribute, value))),
            ]),
        };
        negate_if(self.negation, filter)
    }
}

/// Terms joined by AND (`and = true`) or OR, optionally negated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multi {
    pub negation: bool,
    pub and: bool,
    pub terms: Vec<Term>,
}

impl Multi {
    pub fn and(terms: Vec<Term>) -> Self {
        Self {
            negation: false,
            and: true,
            terms,
        }
    }

    pub fn or(terms: Vec<Term>) -> Self {
        Self {
            negation: false,
            and: false,
            terms,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negation = !self.negation;
        self
    }

    fn to_filter(&self) -> Filter {
        let filters = self.terms.iter().map(Term::to_filter).collect();
        let combined = if self.and {
            Filter::And(filters)
        } else {
            Filter::Or(filters)
        };
        negate_if(self.negation, combined)
    }
}

fn negate_if(negation: bool, filter: Filter) -> Filter {
    if negation {
        Filter::Not(Box::new(filter))
    } else {
        filter
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Single(Single),
    Multi(Multi),
}

impl Term {
    pub fn to_filter(&self) -> Filter {
        match self {
            Term::Single(single) => single.to_filter(),
            Term::Multi(multi) => multi.to_filter(),
        }
    }
}

impl From<Single> for Term {
    fn from(single: Single) -> Term {
        Term::Single(single)
    }
}

impl From<Multi> for Term {
    fn from(multi: Multi) -> Term {
        Term::Multi(multi)
    }
}

/// A structured search filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySearchFilter {
    term: Term,
}

impl EntrySearchFilter {
    pub fn new(term: impl Into<Term>) -> Self {
        Self { term: term.into() }
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn to_filter(&self) -> Filter {
        self.term.to_filter()
    }

    /// The equivalent LDAP filter string, with values escaped.
    pub fn to_ldap_string(&self) -> String {
        self.to_filter().to_string()
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        self.to_filter().matches(entry)
    }
}

impl fmt::Display for EntrySearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ldap_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{AttrChanges, EntryKind};

    fn resource() -> Entry {
        let mut entry = Entry::new(EntryKind::CalendarResource, "r-1", "room-1@d.test");
        let mut changes = AttrChanges::new();
        changes
            .set_str("calResType", "Location")
            .set_str("calResCapacity", "20")
            .set_str("calResSite", "Main (north)");
        entry.apply(&changes);
        entry
    }

    #[test]
    fn test_operators() {
        let entry = resource();
        let check = |op, value: &str| {
            EntrySearchFilter::new(Single::new("calResCapacity", op, value)).matches(&entry)
        };
        assert!(check(Operator::Eq, "20"));
        assert!(check(Operator::Ge, "20"));
        assert!(!check(Operator::Gt, "20"));
        assert!(check(Operator::Gt, "19"));
        assert!(check(Operator::Lt, "21"));
        assert!(!check(Operator::Lt, "20"));
        assert!(check(Operator::Le, "20"));
        assert!(check(Operator::StartsWith, "2"));
        assert!(check(Operator::EndsWith, "0"));
        assert!(check(Operator::Has, "0"));
    }

    #[test]
    fn test_multi_and_negation() {
        let filter = EntrySearchFilter::new(Multi::and(vec![
            Single::new("calResType", Operator::Eq, "Location").into(),
            Single::new("calResCapacity", Operator::Lt, "10").negated().into(),
        ]));
        assert!(filter.matches(&resource()));
        assert!(!EntrySearchFilter::new(Multi::or(vec![filter.term().clone()]).negated())
            .matches(&resource()));
    }

    #[test]
    fn test_ldap_string_escapes_values() {
        let filter = EntrySearchFilter::new(Single::new("calResSite", Operator::Has, "(north)"));
        assert_eq!(filter.to_ldap_string(), "(calResSite=*\\28north\\29*)");
        assert_eq!(Filter::parse(&filter.to_ldap_string()).unwrap(), filter.to_filter());
        assert!(filter.matches(&resource()));
    }

    #[test]
    fn test_operator_names() {
        assert_eq!("StartsWith".parse::<Operator>().unwrap(), Operator::StartsWith);
        assert!(matches!(
            "like".parse::<Operator>(),
            Err(FilterError::UnknownOperator(_))
        ));
    }
}
