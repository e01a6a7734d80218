//! Search filters evaluated against entries in memory.
//!
//! Two front ends produce the same [`Filter`] tree:
//!
//! - LDAP-style strings such as `(&(mail=*@example.test)(!(accountStatus=closed)))`,
//!   parsed by [`Filter::parse`]
//! - structured [`EntrySearchFilter`] terms built in code
//!
//! Attribute names and values compare ignoring ASCII case. Ordering
//! comparisons are numeric when both sides parse as integers. The pseudo
//! attributes `id` and `name` match the entry's id and name.

mod entry_search;
mod parser;

pub use entry_search::{EntrySearchFilter, Multi, Operator, Single, Term};

use crate::entry::Entry;
use std::cmp::Ordering;
use std::fmt;

/// Maximum nesting of `&`, `|` and `!`.
pub const FILTER_DEPTH_MAX: usize = 16;

/// Errors raised while parsing a filter string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("empty filter")]
    Empty,

    #[error("unexpected end of filter")]
    UnexpectedEnd,

    #[error("unexpected '{found}' at position {position}")]
    Unexpected { position: usize, found: char },

    #[error("missing attribute name at position {position}")]
    MissingAttribute { position: usize },

    #[error("invalid escape at position {position}")]
    InvalidEscape { position: usize },

    #[error("filter nests deeper than {limit}")]
    TooDeep { limit: usize },

    #[error("trailing input at position {position}")]
    TrailingInput { position: usize },

    #[error("unknown search operator '{0}'")]
    UnknownOperator(String),
}

/// A parsed filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Equality(String, String),
    Present(String),
    Substring {
        attribute: String,
        initial: Option<String>,
        any: Vec<String>,
        last: Option<String>,
    },
    GreaterOrEqual(String, String),
    LessOrEqual(String, String),
}

impl Filter {
    /// Parse an LDAP-style filter string.
    pub fn parse(input: &str) -> Result<Filter, FilterError> {
        parser::parse(input)
    }

    /// Whether `entry` satisfies the filter.
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Filter::And(filters) => filters.iter().all(|f| f.matches(entry)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(entry)),
            Filter::Not(filter) => !filter.matches(entry),
            Filter::Present(attribute) => !values_of(entry, attribute).is_empty(),
            Filter::Equality(attribute, expected) => values_of(entry, attribute)
                .iter()
                .any(|v| v.eq_ignore_ascii_case(expected)),
            Filter::Substring {
                attribute,
                initial,
                any,
                last,
            } => values_of(entry, attribute).iter().any(|v| {
                substring_matches(v, initial.as_deref(), any, last.as_deref())
            }),
            Filter::GreaterOrEqual(attribute, bound) => values_of(entry, attribute)
                .iter()
                .any(|v| compare(v, bound) != Ordering::Less),
            Filter::LessOrEqual(attribute, bound) => values_of(entry, attribute)
                .iter()
                .any(|v| compare(v, bound) != Ordering::Greater),
        }
    }

    /// Every attribute name the filter mentions.
    pub fn attributes(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_attributes(&mut names);
        names
    }

    fn collect_attributes<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Filter::And(filters) | Filter::Or(filters) => {
                for filter in filters {
                    filter.collect_attributes(names);
                }
            }
            Filter::Not(filter) => filter.collect_attributes(names),
            Filter::Equality(attribute, _)
            | Filter::Present(attribute)
            | Filter::GreaterOrEqual(attribute, _)
            | Filter::LessOrEqual(attribute, _)
            | Filter::Substring { attribute, .. } => names.push(attribute),
        }
    }
}

fn values_of<'a>(entry: &'a Entry, attribute: &str) -> Vec<&'a str> {
    if attribute.eq_ignore_ascii_case("id") {
        return vec![entry.id()];
    }
    if attribute.eq_ignore_ascii_case("name") {
        return vec![entry.name()];
    }
    entry
        .attrs()
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case(attribute))
        .flat_map(|(_, values)| values.iter().map(String::as_str))
        .collect()
}

fn substring_matches(value: &str, initial: Option<&str>, any: &[String], last: Option<&str>) -> bool {
    let value = value.to_ascii_lowercase();
    let mut rest = value.as_str();

    if let Some(initial) = initial {
        let initial = initial.to_ascii_lowercase();
        match rest.strip_prefix(initial.as_str()) {
            Some(after) => rest = after,
            None => return false,
        }
    }

    for part in any {
        let part = part.to_ascii_lowercase();
        match rest.find(part.as_str()) {
            Some(index) => rest = &rest[index + part.len()..],
            None => return false,
        }
    }

    match last {
        Some(last) => rest.ends_with(last.to_ascii_lowercase().as_str()),
        None => true,
    }
}

fn compare(value: &str, bound: &str) -> Ordering {
    match (value.trim().parse::<i64>(), bound.trim().parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => value.to_ascii_lowercase().cmp(&bound.to_ascii_lowercase()),
    }
}

/// Escape a value for use inside a filter string.
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\\' => escaped.push_str("\\5c"),
            '\0' => escaped.push_str("\\00"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::And(filters) => {
                f.write_str("(&")?;
                for filter in filters {
                    write!(f, "{}", filter)?;
                }
                f.write_str(")")
            }
            Filter::Or(filters) => {
                f.write_str("(|")?;
                for filter in filters {
                    write!(f, "{}", filter)?;
                }
                f.write_str(")")
            }
            Filter::Not(filter) => write!(f, "(!{})", filter),
            Filter::Equality(a, v) => write!(f, "({}={})", a, escape_value(v)),
            Filter::Present(a) => write!(f, "({}=*)", a),
            Filter::GreaterOrEqual(a, v) => write!(f, "({}>={})", a, escape_value(v)),
            Filter::LessOrEqual(a, v) => write!(f, "({}<={})", a, escape_value(v)),
            Filter::Substring {
                attribute,
                initial,
                any,
                last,
            } => {
                write!(f, "({}=", attribute)?;
                if let Some(initial) = initial {
                    f.write_str(&escape_value(initial))?;
                }
                f.write_str("*")?;
                for part in any {
                    write!(f, "{}*", escape_value(part))?;
                }
                if let Some(last) = last {
                    f.write_str(&escape_value(last))?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{AttrChanges, EntryKind};

    fn account() -> Entry {
        let mut entry = Entry::new(EntryKind::Account, "a-1", "acct-1@example.test");
        let mut changes = AttrChanges::new();
        changes
            .set_str("displayName", "Phoebe Shao")
            .set_str("mailQuota", "100")
            .set_multi("mailAlias", ["alias-1@example.test", "other@example.test"])
            .set_str("accountStatus", "active");
        entry.apply(&changes);
        entry
    }

    fn matches(filter: &str) -> bool {
        Filter::parse(filter).unwrap().matches(&account())
    }

    #[test]
    fn test_equality_and_presence() {
        assert!(matches("(displayName=phoebe shao)"));
        assert!(matches("(DISPLAYNAME=Phoebe Shao)"));
        assert!(!matches("(displayName=Phoebe)"));
        assert!(matches("(mailAlias=*)"));
        assert!(!matches("(description=*)"));
        assert!(matches("(name=acct-1@example.test)"));
        assert!(matches("(id=a-1)"));
    }

    #[test]
    fn test_substrings() {
        assert!(matches("(displayName=Pho*)"));
        assert!(matches("(displayName=*shao)"));
        assert!(matches("(displayName=P*e*S*o)"));
        assert!(!matches("(displayName=*x*)"));
        assert!(matches("(mailAlias=other@*)"));
    }

    #[test]
    fn test_ordering_is_numeric_when_possible() {
        assert!(matches("(mailQuota>=99)"));
        assert!(matches("(mailQuota<=100)"));
        assert!(!matches("(mailQuota>=1000)"));
        assert!(matches("(displayName>=A)"));
    }

    #[test]
    fn test_boolean_combinators() {
        assert!(matches("(&(accountStatus=active)(displayName=Phoebe*))"));
        assert!(!matches("(&(accountStatus=active)(!(displayName=Phoebe*)))"));
        assert!(matches("(|(accountStatus=closed)(mailQuota=100))"));
    }

    #[test]
    fn test_display_round_trip() {
        let text = "(&(mail=a\\2ab*)(|(!(cn=x))(quota>=5)))";
        let filter = Filter::parse(text).unwrap();
        assert_eq!(filter.to_string(), text);
        assert_eq!(Filter::parse(&filter.to_string()).unwrap(), filter);
        assert_eq!(filter.attributes(), vec!["mail", "cn", "quota"]);
    }
}
