use std::str::FromStr;

use crate::{DecodeError, Result};

/// Split `line` on runs of whitespace, at most `max_splits` times.
///
/// The final field keeps any interior whitespace, which is how free-text
/// names and descriptions survive at the end of a record. Leading and
/// trailing whitespace of the line is ignored.
pub fn split_fields(line: &str, max_splits: usize) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut rest = line.trim();
    while !rest.is_empty() {
        if fields.len() == max_splits {
            fields.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                fields.push(rest);
                break;
            }
        }
    }
    fields
}

/// Fetch field `index`, reporting `what` is missing otherwise
pub fn field<'a>(fields: &[&'a str], index: usize, line: usize, what: &str) -> Result<&'a str> {
    fields
        .get(index)
        .copied()
        .ok_or_else(|| DecodeError::structural(line, format!("missing {}", what)))
}

pub fn parse_f64(token: &str, line: usize, what: &str) -> Result<f64> {
    let token = token.trim();
    token.parse::<f64>().map_err(|_| {
        DecodeError::structural(line, format!("can't read {} from '{}'", what, token))
    })
}

pub fn parse_int<T: FromStr>(token: &str, line: usize, what: &str) -> Result<T> {
    let token = token.trim();
    token.parse::<T>().map_err(|_| {
        DecodeError::structural(line, format!("can't read {} from '{}'", what, token))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_fields() {
        let test_cases = vec![
            ("1 2.0 3.0 4.0 Fuel tank", 4, vec!["1", "2.0", "3.0", "4.0", "Fuel tank"]),
            ("  0.0   90.0  Crew   compartment  ", 2, vec!["0.0", "90.0", "Crew   compartment"]),
            ("a b c", 10, vec!["a", "b", "c"]),
            ("a b c", 0, vec!["a b c"]),
            ("single", 3, vec!["single"]),
            ("", 3, vec![]),
            ("   ", 3, vec![]),
        ];

        for (input, max_splits, expected) in test_cases {
            assert_eq!(split_fields(input, max_splits), expected, "input: {:?}", input);
        }
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_f64(" 2.5 ", 1, "av").unwrap(), 2.5);
        assert_eq!(parse_f64("-1e2", 1, "av").unwrap(), -100.0);
        assert_eq!(parse_int::<u32>(" 12", 1, "count").unwrap(), 12);

        let err = parse_f64("abc", 4, "burst height").unwrap_err();
        assert_eq!(err.line(), Some(4));
        assert!(err.to_string().contains("burst height"));

        assert!(parse_int::<u32>("3.0", 1, "count").is_err());
        assert!(parse_int::<u32>("-3", 1, "count").is_err());
    }

    #[test]
    fn test_field_missing() {
        let fields = vec!["a", "b"];
        assert_eq!(field(&fields, 1, 1, "second").unwrap(), "b");
        let err = field(&fields, 2, 6, "table name").unwrap_err();
        assert_eq!(err.to_string(), "line 6: missing table name");
    }
}
