//! Typed filter expressions for scans.
//!
//! A filter is built as a tree and kept as a tree all the way to the table,
//! which evaluates it per item with [`Condition::matches`]. For logs and
//! for tables that want text, [`Condition::render`] produces the familiar
//! placeholder syntax with every literal bound out-of-line:
//!
//! ```text
//! #n0 BETWEEN :v0 AND :v1      { #n0: purchaseDate, :v0: "...", :v1: "..." }
//! ```
//!
//! Values never appear inside the expression string.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use super::attribute::{AttributeValue, Item};

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparator {
    fn symbol(self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Ne => "<>",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparator::Eq => ordering == Ordering::Equal,
            Comparator::Ne => ordering != Ordering::Equal,
            Comparator::Lt => ordering == Ordering::Less,
            Comparator::Le => ordering != Ordering::Greater,
            Comparator::Gt => ordering == Ordering::Greater,
            Comparator::Ge => ordering != Ordering::Less,
        }
    }
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// A predicate over the attributes of one item: comparisons and closed
/// ranges, joined with AND.
///
/// Comparisons against a missing attribute, or against a value of a
/// different type, are false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Compare {
        attribute: String,
        comparator: Comparator,
        value: AttributeValue,
    },
    /// Closed interval: `low <= attribute <= high`.
    Between {
        attribute: String,
        low: AttributeValue,
        high: AttributeValue,
    },
    And(Box<Condition>, Box<Condition>),
}

/// Entry point of the builder: `attr("purchaseDate").between(a, b)`.
pub fn attr(name: impl Into<String>) -> AttributeRef {
    AttributeRef(name.into())
}

/// A named attribute waiting for a comparison.
#[derive(Debug, Clone)]
pub struct AttributeRef(String);

impl AttributeRef {
    fn compare(self, comparator: Comparator, value: AttributeValue) -> Condition {
        Condition::Compare {
            attribute: self.0,
            comparator,
            value,
        }
    }

    pub fn eq(self, value: AttributeValue) -> Condition {
        self.compare(Comparator::Eq, value)
    }

    pub fn ne(self, value: AttributeValue) -> Condition {
        self.compare(Comparator::Ne, value)
    }

    pub fn lt(self, value: AttributeValue) -> Condition {
        self.compare(Comparator::Lt, value)
    }

    pub fn le(self, value: AttributeValue) -> Condition {
        self.compare(Comparator::Le, value)
    }

    pub fn gt(self, value: AttributeValue) -> Condition {
        self.compare(Comparator::Gt, value)
    }

    pub fn ge(self, value: AttributeValue) -> Condition {
        self.compare(Comparator::Ge, value)
    }

    pub fn between(self, low: AttributeValue, high: AttributeValue) -> Condition {
        Condition::Between {
            attribute: self.0,
            low,
            high,
        }
    }
}

impl Condition {
    pub fn and(self, other: Condition) -> Condition {
        Condition::And(Box::new(self), Box::new(other))
    }

    /// Evaluate against one item.
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Condition::Compare {
                attribute,
                comparator,
                value,
            } => item
                .get(attribute)
                .and_then(|actual| actual.compare(value))
                .is_some_and(|ordering| comparator.holds(ordering)),
            Condition::Between {
                attribute,
                low,
                high,
            } => item.get(attribute).is_some_and(|actual| {
                matches!(actual.compare(low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(actual.compare(high), Some(Ordering::Less | Ordering::Equal))
            }),
            Condition::And(left, right) => left.matches(item) && right.matches(item),
        }
    }

    /// Render to placeholder syntax with names and values bound separately.
    pub fn render(&self) -> RenderedFilter {
        let mut rendered = RenderedFilter::default();
        let mut renderer = Renderer {
            names: &mut rendered.names,
            values: &mut rendered.values,
        };
        rendered.expression = renderer.render(self);
        rendered
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// A filter in placeholder text form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedFilter {
    /// Expression text, e.g. `#n0 BETWEEN :v0 AND :v1`.
    pub expression: String,
    /// Name placeholder (`#n0`) -> attribute name.
    pub names: BTreeMap<String, String>,
    /// Value placeholder (`:v0`) -> bound literal.
    pub values: BTreeMap<String, AttributeValue>,
}

impl fmt::Display for RenderedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

struct Renderer<'a> {
    names: &'a mut BTreeMap<String, String>,
    values: &'a mut BTreeMap<String, AttributeValue>,
}

impl Renderer<'_> {
    fn name(&mut self, attribute: &str) -> String {
        if let Some((placeholder, _)) = self.names.iter().find(|(_, name)| *name == attribute) {
            return placeholder.clone();
        }
        let placeholder = format!("#n{}", self.names.len());
        self.names.insert(placeholder.clone(), attribute.to_string());
        placeholder
    }

    fn value(&mut self, value: &AttributeValue) -> String {
        let placeholder = format!(":v{}", self.values.len());
        self.values.insert(placeholder.clone(), value.clone());
        placeholder
    }

    fn render(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Compare {
                attribute,
                comparator,
                value,
            } => {
                let name = self.name(attribute);
                let value = self.value(value);
                format!("{name} {} {value}", comparator.symbol())
            }
            Condition::Between {
                attribute,
                low,
                high,
            } => {
                let name = self.name(attribute);
                let low = self.value(low);
                let high = self.value(high);
                format!("{name} BETWEEN {low} AND {high}")
            }
            Condition::And(left, right) => {
                let left = self.render(left);
                let right = self.render(right);
                format!("({left}) AND ({right})")
            }
        }
    }
}
