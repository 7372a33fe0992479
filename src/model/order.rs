//! Order values and the "missing sorts last" policy.
//!
//! Every place that turns an `sh:order` object into something comparable goes
//! through [`Order::from_term`] and [`Order::sort_key`]. A missing, malformed,
//! or non-finite order is never an error: it simply sorts after every entity
//! that has one.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{vocab, Term};
use crate::{Error, Result};

/// A finite order value within one sibling scope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Order(f64);

impl Order {
    pub const ZERO: Order = Order(0.0);

    /// Sort key used for entities without an order.
    pub const MISSING: f64 = f64::MAX;

    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() {
            Ok(Order(value))
        } else {
            Err(Error::InvalidOrder(value.to_string()))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_integral(self) -> bool {
        self.0.fract() == 0.0
    }

    /// Shift by a signed step, staying finite.
    pub fn offset(self, by: i64) -> Order {
        Order(self.0 + by as f64)
    }

    /// Parse an order from a store object. `None` for anything that is not a
    /// numeric XSD literal with a finite value.
    pub fn from_term(term: &Term) -> Option<Order> {
        let lit = term.as_literal()?;
        if !vocab::is_numeric_datatype(&lit.datatype) {
            return None;
        }
        lit.lexical
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Order)
    }

    /// Literal written back to the store: `xsd:integer` when integral.
    pub fn to_term(self) -> Term {
        if self.is_integral() {
            Term::typed(format!("{:.0}", self.0), vocab::XSD_INTEGER)
        } else {
            Term::typed(self.0.to_string(), vocab::XSD_DECIMAL)
        }
    }

    /// Comparable key with missing orders at the maximum.
    pub fn sort_key(order: Option<Order>) -> f64 {
        order.map_or(Self::MISSING, Order::value)
    }

    /// Compare two optional orders, missing last.
    pub fn cmp_optional(a: Option<Order>, b: Option<Order>) -> Ordering {
        Self::sort_key(a).total_cmp(&Self::sort_key(b))
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Order {}

impl PartialOrd for Order {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Order {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<u32> for Order {
    fn from(v: u32) -> Self {
        Order(f64::from(v))
    }
}

impl From<usize> for Order {
    fn from(v: usize) -> Self {
        Order(v as f64)
    }
}

impl TryFrom<f64> for Order {
    type Error = Error;

    fn try_from(v: f64) -> Result<Self> {
        Order::new(v)
    }
}

impl From<Order> for f64 {
    fn from(o: Order) -> f64 {
        o.0
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integral() {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
