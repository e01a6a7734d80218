//! Recursive descent parser for LDAP-style filter strings.

use super::{Filter, FilterError, FILTER_DEPTH_MAX};

pub(super) fn parse(input: &str) -> Result<Filter, FilterError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FilterError::Empty);
    }

    // A bare `attr=value` is accepted as if it were parenthesised.
    let text = if trimmed.starts_with('(') {
        trimmed.to_string()
    } else {
        format!("({})", trimmed)
    };

    let mut parser = Parser {
        chars: text.chars().collect(),
        position: 0,
    };
    let filter = parser.filter(FILTER_DEPTH_MAX)?;
    if parser.position != parser.chars.len() {
        return Err(FilterError::TrailingInput {
            position: parser.position,
        });
    }
    Ok(filter)
}

struct Parser {
    chars: Vec<char>,
    position: usize,
}

enum Comparison {
    Equal,
    GreaterOrEqual,
    LessOrEqual,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn next(&mut self) -> Result<char, FilterError> {
        let c = self.peek().ok_or(FilterError::UnexpectedEnd)?;
        self.position += 1;
        Ok(c)
    }

    fn expect(&mut self, expected: char) -> Result<(), FilterError> {
        let position = self.position;
        match self.next()? {
            c if c == expected => Ok(()),
            found => Err(FilterError::Unexpected { position, found }),
        }
    }

    fn filter(&mut self, depth: usize) -> Result<Filter, FilterError> {
        self.expect('(')?;
        let filter = match self.peek().ok_or(FilterError::UnexpectedEnd)? {
            '&' => {
                self.position += 1;
                Filter::And(self.list(Self::nested(depth)?)?)
            }
            '|' => {
                self.position += 1;
                Filter::Or(self.list(Self::nested(depth)?)?)
            }
            '!' => {
                self.position += 1;
                Filter::Not(Box::new(self.filter(Self::nested(depth)?)?))
            }
            _ => self.item()?,
        };
        self.expect(')')?;
        Ok(filter)
    }

    fn nested(depth: usize) -> Result<usize, FilterError> {
        depth.checked_sub(1).ok_or(FilterError::TooDeep {
            limit: FILTER_DEPTH_MAX,
        })
    }

    fn list(&mut self, depth: usize) -> Result<Vec<Filter>, FilterError> {
        let mut filters = Vec::new();
        while self.peek() == Some('(') {
            filters.push(self.filter(depth)?);
        }
        Ok(filters)
    }

    fn item(&mut self) -> Result<Filter, FilterError> {
        let start = self.position;
        let mut attribute = String::new();
        while let Some(c) = self.peek() {
            if matches!(c, '=' | '>' | '<' | '~' | '(' | ')') {
                break;
            }
            attribute.push(c);
            self.position += 1;
        }
        let attribute = attribute.trim().to_string();
        if attribute.is_empty() {
            return Err(FilterError::MissingAttribute { position: start });
        }

        let position = self.position;
        let comparison = match self.next()? {
            '=' => Comparison::Equal,
            '~' => {
                self.expect('=')?;
                Comparison::Equal
            }
            '>' => {
                self.expect('=')?;
                Comparison::GreaterOrEqual
            }
            '<' => {
                self.expect('=')?;
                Comparison::LessOrEqual
            }
            found => return Err(FilterError::Unexpected { position, found }),
        };

        let value_start = self.position;
        let segments = self.value()?;

        match comparison {
            Comparison::Equal => Ok(Self::equality(attribute, segments)),
            Comparison::GreaterOrEqual | Comparison::LessOrEqual if segments.len() > 1 => {
                Err(FilterError::Unexpected {
                    position: value_start,
                    found: '*',
                })
            }
            Comparison::GreaterOrEqual => {
                Ok(Filter::GreaterOrEqual(attribute, segments.concat()))
            }
            Comparison::LessOrEqual => Ok(Filter::LessOrEqual(attribute, segments.concat())),
        }
    }

    fn equality(attribute: String, mut segments: Vec<String>) -> Filter {
        if segments.len() == 1 {
            let value = segments.pop().unwrap_or_default();
            return Filter::Equality(attribute, value);
        }
        if segments.iter().all(String::is_empty) {
            return Filter::Present(attribute);
        }

        let last = segments.pop().filter(|s| !s.is_empty());
        let mut rest = segments.into_iter();
        let initial = rest.next().filter(|s| !s.is_empty());
        let any = rest.filter(|s| !s.is_empty()).collect();
        Filter::Substring {
            attribute,
            initial,
            any,
            last,
        }
    }

    /// Read a value up to the closing parenthesis, split on unescaped `*`.
    fn value(&mut self) -> Result<Vec<String>, FilterError> {
        let mut segments = Vec::new();
        let mut current: Vec<u8> = Vec::new();

        loop {
            let position = self.position;
            match self.peek().ok_or(FilterError::UnexpectedEnd)? {
                ')' => break,
                '(' => return Err(FilterError::Unexpected { position, found: '(' }),
                '*' => {
                    self.position += 1;
                    segments.push(String::from_utf8_lossy(&current).into_owned());
                    current.clear();
                }
                '\\' => {
                    self.position += 1;
                    let hi = self.next()?;
                    let lo = self.next()?;
                    let byte = hi
                        .to_digit(16)
                        .zip(lo.to_digit(16))
                        .and_then(|(hi, lo)| u8::try_from(hi * 16 + lo).ok())
                        .ok_or(FilterError::InvalidEscape { position })?;
                    current.push(byte);
                }
                c => {
                    self.position += 1;
                    let mut buffer = [0u8; 4];
                    current.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
                }
            }
        }

        segments.push(String::from_utf8_lossy(&current).into_owned());
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_items() {
        assert_eq!(
            parse("(mail=a@b.test)").unwrap(),
            Filter::Equality("mail".into(), "a@b.test".into())
        );
        assert_eq!(parse("(cn=*)").unwrap(), Filter::Present("cn".into()));
        assert_eq!(
            parse("(cn=ab*cd*ef)").unwrap(),
            Filter::Substring {
                attribute: "cn".into(),
                initial: Some("ab".into()),
                any: vec!["cd".into()],
                last: Some("ef".into()),
            }
        );
        assert_eq!(
            parse("(quota>=5)").unwrap(),
            Filter::GreaterOrEqual("quota".into(), "5".into())
        );
        assert_eq!(
            parse("uid=acct-1").unwrap(),
            Filter::Equality("uid".into(), "acct-1".into())
        );
    }

    #[test]
    fn test_escapes() {
        assert_eq!(
            parse(r"(cn=a\28b\29\2a\5c)").unwrap(),
            Filter::Equality("cn".into(), r"a(b)*\".into())
        );
        assert_eq!(
            parse(r"(cn=caf\c3\a9)").unwrap(),
            Filter::Equality("cn".into(), "café".into())
        );
        assert!(matches!(
            parse(r"(cn=\zz)"),
            Err(FilterError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("  "), Err(FilterError::Empty));
        assert_eq!(parse("(cn=x"), Err(FilterError::UnexpectedEnd));
        assert!(matches!(parse("(=x)"), Err(FilterError::MissingAttribute { .. })));
        assert!(matches!(parse("(cn=x))"), Err(FilterError::TrailingInput { .. })));
        assert!(matches!(parse("(cn>=a*)"), Err(FilterError::Unexpected { found: '*', .. })));

        let deep = format!("{}(cn=x){}", "(!".repeat(20), ")".repeat(20));
        assert_eq!(parse(&deep), Err(FilterError::TooDeep { limit: FILTER_DEPTH_MAX }));
    }

    proptest! {
        #[test]
        fn escaped_values_parse_back(value in "\\PC{0,24}") {
            let filter = Filter::Equality("cn".into(), value.clone());
            let parsed = parse(&filter.to_string()).unwrap();
            prop_assert_eq!(parsed, filter);
        }

        #[test]
        fn parser_never_panics(input in "\\PC{0,40}") {
            let _ = parse(&input);
        }
    }
}
