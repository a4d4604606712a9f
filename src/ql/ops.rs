//! Operators of the expression language

use std::fmt;

/// Operators an operation node can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Loe,
    Goe,
    Between,
    In,
    NotIn,
    IsNull,
    IsNotNull,

    // logical
    And,
    Or,
    Not,

    // string
    StringIsEmpty,
    StartsWith,
    StartsWithIc,
    EndsWith,
    EndsWithIc,
    EqIgnoreCase,
    StringContains,
    StringContainsIc,
    Matches,
    MatchesIc,
    Like,
    StringLength,
    Lower,
    Upper,
    Concat,

    // collections and maps
    ColIsEmpty,
    ColSize,
    ArraySize,
    ContainsKey,
}

impl Operator {
    /// Number of arguments the operator takes
    pub fn arity(&self) -> usize {
        use Operator::*;
        match self {
            IsNull | IsNotNull | Not | StringIsEmpty | StringLength | Lower | Upper
            | ColIsEmpty | ColSize | ArraySize => 1,
            Between => 3,
            _ => 2,
        }
    }

    /// Check if the operator yields a boolean
    pub fn is_predicate(&self) -> bool {
        use Operator::*;
        !matches!(
            self,
            StringLength | Lower | Upper | Concat | ColSize | ArraySize
        )
    }

    pub fn name(&self) -> &'static str {
        use Operator::*;
        match self {
            Eq => "EQ",
            Ne => "NE",
            Lt => "LT",
            Gt => "GT",
            Loe => "LOE",
            Goe => "GOE",
            Between => "BETWEEN",
            In => "IN",
            NotIn => "NOT_IN",
            IsNull => "IS_NULL",
            IsNotNull => "IS_NOT_NULL",
            And => "AND",
            Or => "OR",
            Not => "NOT",
            StringIsEmpty => "STRING_IS_EMPTY",
            StartsWith => "STARTS_WITH",
            StartsWithIc => "STARTS_WITH_IC",
            EndsWith => "ENDS_WITH",
            EndsWithIc => "ENDS_WITH_IC",
            EqIgnoreCase => "EQ_IGNORE_CASE",
            StringContains => "STRING_CONTAINS",
            StringContainsIc => "STRING_CONTAINS_IC",
            Matches => "MATCHES",
            MatchesIc => "MATCHES_IC",
            Like => "LIKE",
            StringLength => "STRING_LENGTH",
            Lower => "LOWER",
            Upper => "UPPER",
            Concat => "CONCAT",
            ColIsEmpty => "COL_IS_EMPTY",
            ColSize => "COL_SIZE",
            ArraySize => "ARRAY_SIZE",
            ContainsKey => "CONTAINS_KEY",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
