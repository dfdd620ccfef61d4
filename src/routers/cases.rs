//! Case tests
//!
//! Each test takes the router's rendered operand, the case's (evaluated)
//! arguments and the party, and either matches with a value or doesn't.
//! An `Err` means the case itself is broken, e.g. a bad regex or a missing
//! argument.

use crate::party::Party;
use regex::RegexBuilder;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct TestMatch {
    pub matched: String,
    pub extra: Option<Value>,
}

impl TestMatch {
    fn new(matched: impl Into<String>) -> Self {
        Self {
            matched: matched.into(),
            extra: None,
        }
    }
}

pub type TestResult = Result<Option<TestMatch>, String>;

pub type CaseTest = fn(&str, &[String], &Party) -> TestResult;

pub const BUILTIN_TESTS: &[(&str, CaseTest)] = &[
    ("has_text", has_text),
    ("has_only_text", has_only_text),
    ("has_any_word", has_any_word),
    ("has_all_words", has_all_words),
    ("has_phrase", has_phrase),
    ("has_only_phrase", has_only_phrase),
    ("has_beginning", has_beginning),
    ("has_pattern", has_pattern),
    ("has_number", has_number),
    ("has_number_between", has_number_between),
    ("has_number_lt", has_number_lt),
    ("has_number_lte", has_number_lte),
    ("has_number_eq", has_number_eq),
    ("has_number_gte", has_number_gte),
    ("has_number_gt", has_number_gt),
    ("has_group", has_group),
];

/* ===================== Helpers ===================== */

fn arg<'a>(args: &'a [String], index: usize, test: &str) -> Result<&'a str, String> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires at least {} argument(s)", test, index + 1))
}

/// Lowercased words, split on anything that isn't a letter or digit
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim_matches(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'));
    let trimmed = trimmed.trim_end_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn number_arg(args: &[String], index: usize, test: &str) -> Result<f64, String> {
    let raw = arg(args, index, test)?;
    parse_number(raw).ok_or_else(|| format!("{}: `{}` is not a number", test, raw))
}

/// The first number in the operand that satisfies `check`
fn first_number(operand: &str, check: impl Fn(f64) -> bool) -> TestResult {
    Ok(operand
        .split_whitespace()
        .find_map(|word| parse_number(word).filter(|&n| check(n)).map(|_| word))
        .map(|word| {
            let number = word.trim_matches(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'));
            TestMatch::new(number.trim_end_matches('.'))
        }))
}

/* ===================== Text ===================== */

pub fn has_text(operand: &str, _args: &[String], _party: &Party) -> TestResult {
    let trimmed = operand.trim();
    Ok((!trimmed.is_empty()).then(|| TestMatch::new(trimmed)))
}

pub fn has_only_text(operand: &str, args: &[String], _party: &Party) -> TestResult {
    let expected = arg(args, 0, "has_only_text")?;
    Ok((operand == expected).then(|| TestMatch::new(operand)))
}

pub fn has_any_word(operand: &str, args: &[String], _party: &Party) -> TestResult {
    let words = tokenize(operand);
    let wanted = tokenize(arg(args, 0, "has_any_word")?);

    let found: Vec<&str> = words
        .iter()
        .filter(|w| wanted.contains(w))
        .map(String::as_str)
        .collect();
    Ok((!found.is_empty()).then(|| TestMatch::new(found.join(" "))))
}

pub fn has_all_words(operand: &str, args: &[String], _party: &Party) -> TestResult {
    let words = tokenize(operand);
    let wanted = tokenize(arg(args, 0, "has_all_words")?);

    if wanted.iter().all(|w| words.contains(w)) {
        let found: Vec<&str> = words
            .iter()
            .filter(|w| wanted.contains(w))
            .map(String::as_str)
            .collect();
        return Ok(Some(TestMatch::new(found.join(" "))));
    }
    Ok(None)
}

pub fn has_phrase(operand: &str, args: &[String], _party: &Party) -> TestResult {
    let words = tokenize(operand);
    let phrase = tokenize(arg(args, 0, "has_phrase")?);

    if phrase.is_empty() {
        return Ok(Some(TestMatch::new("")));
    }
    let found = words.windows(phrase.len()).any(|window| window == phrase.as_slice());
    Ok(found.then(|| TestMatch::new(phrase.join(" "))))
}

pub fn has_only_phrase(operand: &str, args: &[String], _party: &Party) -> TestResult {
    let words = tokenize(operand);
    let phrase = tokenize(arg(args, 0, "has_only_phrase")?);
    Ok((words == phrase).then(|| TestMatch::new(phrase.join(" "))))
}

pub fn has_beginning(operand: &str, args: &[String], _party: &Party) -> TestResult {
    let beginning = arg(args, 0, "has_beginning")?.trim().to_lowercase();
    let text = operand.trim();
    let prefix_len = beginning.chars().count();

    let prefix: String = text.chars().take(prefix_len).collect();
    if !beginning.is_empty() && prefix.to_lowercase() == beginning {
        return Ok(Some(TestMatch::new(prefix)));
    }
    Ok(None)
}

pub fn has_pattern(operand: &str, args: &[String], _party: &Party) -> TestResult {
    let pattern = arg(args, 0, "has_pattern")?;
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| format!("has_pattern: invalid pattern `{}`: {}", pattern, e))?;

    let Some(captures) = regex.captures(operand) else {
        return Ok(None);
    };

    let mut groups = Map::new();
    for (i, group) in captures.iter().enumerate() {
        let text = group.map(|m| m.as_str()).unwrap_or_default();
        groups.insert(i.to_string(), Value::String(text.to_string()));
    }
    let matched = captures.get(0).map(|m| m.as_str()).unwrap_or_default();

    Ok(Some(TestMatch {
        matched: matched.to_string(),
        extra: Some(Value::Object(groups)),
    }))
}

/* ===================== Numbers ===================== */

pub fn has_number(operand: &str, _args: &[String], _party: &Party) -> TestResult {
    first_number(operand, |_| true)
}

pub fn has_number_between(operand: &str, args: &[String], _party: &Party) -> TestResult {
    let min = number_arg(args, 0, "has_number_between")?;
    let max = number_arg(args, 1, "has_number_between")?;
    first_number(operand, |n| n >= min && n <= max)
}

pub fn has_number_lt(operand: &str, args: &[String], _party: &Party) -> TestResult {
    let bound = number_arg(args, 0, "has_number_lt")?;
    first_number(operand, |n| n < bound)
}

pub fn has_number_lte(operand: &str, args: &[String], _party: &Party) -> TestResult {
    let bound = number_arg(args, 0, "has_number_lte")?;
    first_number(operand, |n| n <= bound)
}

pub fn has_number_eq(operand: &str, args: &[String], _party: &Party) -> TestResult {
    let bound = number_arg(args, 0, "has_number_eq")?;
    first_number(operand, |n| n == bound)
}

pub fn has_number_gte(operand: &str, args: &[String], _party: &Party) -> TestResult {
    let bound = number_arg(args, 0, "has_number_gte")?;
    first_number(operand, |n| n >= bound)
}

pub fn has_number_gt(operand: &str, args: &[String], _party: &Party) -> TestResult {
    let bound = number_arg(args, 0, "has_number_gt")?;
    first_number(operand, |n| n > bound)
}

/* ===================== Party ===================== */

/// Matches when the party belongs to the group; the operand is ignored
pub fn has_group(_operand: &str, args: &[String], party: &Party) -> TestResult {
    let group = arg(args, 0, "has_group")?;
    Ok(party.in_group(group).then(|| TestMatch::new(group)))
}
