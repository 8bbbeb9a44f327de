//! `ENUM` and `SET` member values.
//!
//! Both carry the canonical member text next to the number MySQL stores: the
//! 1-based ordinal for an enum, the member bit mask for a set.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// `SET` columns hold at most 64 members.
const MAX_SET_MEMBERS: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enum {
    pub name: String,
    pub value: u64,
}

impl Enum {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Finds the member named `name`. A name that matches no member but reads as a
    /// number selects the member at that ordinal.
    pub fn parse_name(elems: &[String], name: &str) -> TypeResult<Self> {
        if let Some(index) = elems.iter().position(|elem| elem == name) {
            return Ok(Self::new(elems[index].clone(), index as u64 + 1));
        }
        match name.trim().parse::<u64>() {
            Ok(ordinal) => Self::parse_value(elems, ordinal),
            Err(_) => Err(TypeError::malformed("enum", name)),
        }
    }

    /// The member at 1-based `ordinal`.
    pub fn parse_value(elems: &[String], ordinal: u64) -> TypeResult<Self> {
        let index = usize::try_from(ordinal)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .filter(|&i| i < elems.len())
            .ok_or_else(|| TypeError::out_of_range("enum", ordinal))?;
        Ok(Self::new(elems[index].clone(), ordinal))
    }
}

impl PartialOrd for Enum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Enum {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value).then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for Enum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Set {
    pub name: String,
    pub value: u64,
}

impl Set {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Parses a comma-separated member list. Members may repeat and appear in any
    /// order; the resulting name lists them in declaration order. If a member is
    /// unknown the whole string is retried as a numeric mask.
    ///
    /// ```
    /// use datum_types::Set;
    ///
    /// let elems = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    /// let set = Set::parse_name(&elems, "c,a,a").unwrap();
    /// assert_eq!((set.name.as_str(), set.value), ("a,c", 5));
    /// ```
    pub fn parse_name(elems: &[String], name: &str) -> TypeResult<Self> {
        if name.is_empty() {
            return Ok(Self::default());
        }
        let mut mask = 0u64;
        for member in name.split(',') {
            match elems.iter().position(|elem| elem == member) {
                Some(index) if index < MAX_SET_MEMBERS => mask |= 1 << index,
                _ => {
                    return match name.trim().parse::<u64>() {
                        Ok(value) => Self::parse_value(elems, value),
                        Err(_) => Err(TypeError::malformed("set", name)),
                    };
                }
            }
        }
        Self::parse_value(elems, mask)
    }

    /// Decodes a member bit mask. Bits beyond the declared members are an error.
    pub fn parse_value(elems: &[String], value: u64) -> TypeResult<Self> {
        let members = elems.len().min(MAX_SET_MEMBERS);
        let known = if members == MAX_SET_MEMBERS {
            u64::MAX
        } else {
            (1u64 << members) - 1
        };
        if value & !known != 0 {
            return Err(TypeError::out_of_range("set", value));
        }
        let names: Vec<&str> = elems
            .iter()
            .take(members)
            .enumerate()
            .filter(|(i, _)| value & (1u64 << *i) != 0)
            .map(|(_, elem)| elem.as_str())
            .collect();
        Ok(Self::new(names.join(","), value))
    }
}

impl PartialOrd for Set {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Set {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value).then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
