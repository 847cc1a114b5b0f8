use std::fmt;

use crate::ast::{Literal, Operator};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ty {
    Bool,
    Color,
    Pixel,
    Percentage,
    Scalar,
    /// Assigned, but not of any recognized literal kind.
    Undefined,
    /// An expression that already failed to check. Rules never fire on it,
    /// so one mistake produces one diagnostic.
    Unknown,
}

impl Ty {
    pub fn of_literal(lit: &Literal) -> Ty {
        match lit {
            Literal::Bool(_) => Ty::Bool,
            Literal::Color(_) => Ty::Color,
            Literal::Pixel(_) => Ty::Pixel,
            Literal::Percentage(_) => Ty::Percentage,
            Literal::Scalar(_) => Ty::Scalar,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, Ty::Unknown)
    }

    pub fn is_measurement(self) -> bool {
        matches!(self, Ty::Pixel | Ty::Percentage)
    }
}

/// Result type of `lhs op rhs`, or `None` if the operand types are not
/// allowed for `op`.
pub fn operation_result(op: Operator, lhs: Ty, rhs: Ty) -> Option<Ty> {
    match op {
        Operator::Add | Operator::Subtract => match (lhs, rhs) {
            (Ty::Pixel, Ty::Pixel) => Some(Ty::Pixel),
            (Ty::Percentage, Ty::Percentage) => Some(Ty::Percentage),
            _ => None,
        },
        Operator::Multiply => match (lhs, rhs) {
            (Ty::Scalar, other) | (other, Ty::Scalar) if other.is_measurement() => Some(other),
            _ => None,
        },
    }
}

/// Types a property accepts. `None` means the property is unconstrained.
pub fn property_constraint(property: &str) -> Option<&'static [Ty]> {
    match property {
        "width" | "height" => Some(&[Ty::Pixel, Ty::Percentage]),
        "color" | "background-color" => Some(&[Ty::Color]),
        _ => None,
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Bool => write!(f, "Bool"),
            Ty::Color => write!(f, "Color"),
            Ty::Pixel => write!(f, "Pixel"),
            Ty::Percentage => write!(f, "Percentage"),
            Ty::Scalar => write!(f, "Scalar"),
            Ty::Undefined => write!(f, "Undefined"),
            Ty::Unknown => write!(f, "_"),
        }
    }
}
