//! Loose Debian version parsing, comparison, and constraint checks.
//!
//! Versions are split into components:
//! - runs of ASCII digits compare numerically
//! - runs of lowercase letters and runs of other symbols compare lexically
//! - `.` only separates components and is dropped
//!
//! A numeric component sorts before a non-numeric one, and a version that is
//! a strict prefix of another sorts first. This approximates `dpkg` ordering
//! closely enough for constraint checks; epoch and `~` precedence rules are
//! NOT implemented (`1:1.0` simply compares as `1`, `:`, `1`, `0`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use debtree_util::errors::{DebError, DebResult};
use serde::{Serialize, Serializer};

/// A parsed package version with comparable components.
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    components: Vec<Component>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Component {
    /// Digits with leading zeros removed, so length-then-lexical order is numeric order.
    Numeric(String),
    Text(String),
}

impl Version {
    /// Parse a version string. Never fails.
    pub fn parse(version: &str) -> Self {
        Self {
            original: version.to_string(),
            components: split_components(version),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.components.iter().zip(&other.components) {
            let ord = compare_components(a, b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.components.len().cmp(&other.components.len())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

fn compare_components(a: &Component, b: &Component) -> Ordering {
    match (a, b) {
        (Component::Numeric(a), Component::Numeric(b)) => {
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        (Component::Numeric(_), Component::Text(_)) => Ordering::Less,
        (Component::Text(_), Component::Numeric(_)) => Ordering::Greater,
        (Component::Text(a), Component::Text(b)) => a.cmp(b),
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Class {
    Digit,
    Lower,
    Other,
}

fn classify(ch: char) -> Class {
    if ch.is_ascii_digit() {
        Class::Digit
    } else if ch.is_ascii_lowercase() {
        Class::Lower
    } else {
        Class::Other
    }
}

fn split_components(version: &str) -> Vec<Component> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut current_class = None;

    let mut flush = |current: &mut String, class: Option<Class>| {
        if current.is_empty() {
            return;
        }
        let token = std::mem::take(current);
        components.push(match class {
            Some(Class::Digit) => {
                let trimmed = token.trim_start_matches('0');
                Component::Numeric(trimmed.to_string())
            }
            _ => Component::Text(token),
        });
    };

    for ch in version.chars() {
        if ch == '.' {
            flush(&mut current, current_class);
            current_class = None;
            continue;
        }
        let class = classify(ch);
        if current_class != Some(class) {
            flush(&mut current, current_class);
            current_class = Some(class);
        }
        current.push(ch);
    }
    flush(&mut current, current_class);

    components
}

/// A version comparison operator from a dependency clause.
///
/// Each variant keeps the literal spelling it was parsed from; `<<` and `<`
/// (likewise `>>`/`>`, `==`/`=`, `!=`/`<>`) evaluate identically.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Operator {
    /// `<=`
    LessOrEqual,
    /// `>=`
    GreaterOrEqual,
    /// `<<`
    StrictlyLess,
    /// `<`
    Less,
    /// `>>`
    StrictlyGreater,
    /// `>`
    Greater,
    /// `==`
    DoubleEqual,
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `<>`
    Different,
}

impl Operator {
    pub const ALL: [Operator; 10] = [
        Operator::LessOrEqual,
        Operator::GreaterOrEqual,
        Operator::StrictlyLess,
        Operator::Less,
        Operator::StrictlyGreater,
        Operator::Greater,
        Operator::DoubleEqual,
        Operator::Equal,
        Operator::NotEqual,
        Operator::Different,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::LessOrEqual => "<=",
            Operator::GreaterOrEqual => ">=",
            Operator::StrictlyLess => "<<",
            Operator::Less => "<",
            Operator::StrictlyGreater => ">>",
            Operator::Greater => ">",
            Operator::DoubleEqual => "==",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Different => "<>",
        }
    }

    /// Whether `lhs <op> rhs` holds.
    pub fn evaluate(self, lhs: &Version, rhs: &Version) -> bool {
        let ord = lhs.cmp(rhs);
        match self {
            Operator::LessOrEqual => ord != Ordering::Greater,
            Operator::GreaterOrEqual => ord != Ordering::Less,
            Operator::StrictlyLess | Operator::Less => ord == Ordering::Less,
            Operator::StrictlyGreater | Operator::Greater => ord == Ordering::Greater,
            Operator::DoubleEqual | Operator::Equal => ord == Ordering::Equal,
            Operator::NotEqual | Operator::Different => ord != Ordering::Equal,
        }
    }
}

impl FromStr for Operator {
    type Err = DebError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| DebError::UnknownOperator {
                operator: s.to_string(),
            })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A `(operator, version)` restriction on an acceptable dependency version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constraint {
    pub op: Operator,
    pub version: Version,
}

impl Constraint {
    pub fn new(op: Operator, version: Version) -> Self {
        Self { op, version }
    }

    /// Check whether `candidate` satisfies this constraint.
    pub fn is_satisfied_by(&self, candidate: &Version) -> bool {
        self.op.evaluate(candidate, &self.version)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.version)
    }
}

/// Evaluate `version_1 <op> version_2`.
pub fn check_version_constraint(version_1: &Version, op: Operator, version_2: &Version) -> bool {
    op.evaluate(version_1, version_2)
}

/// Like [`check_version_constraint`] with the operator given as text.
///
/// Fails with [`DebError::UnknownOperator`] for anything outside the fixed set.
pub fn check_version_constraint_str(
    version_1: &Version,
    op: &str,
    version_2: &Version,
) -> DebResult<bool> {
    let op: Operator = op.parse()?;
    Ok(op.evaluate(version_1, version_2))
}
