use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Customer attributes an audience rule can target
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Field {
    /// Lifetime spend of the customer
    #[default]
    TotalSpend,
    /// Number of recorded visits
    Visits,
    /// Last activity timestamp (ISO date-time text)
    LastActive,
    Email,
    Phone,
    Name,
    /// A field name outside the known schema, carried through verbatim
    Other(String),
}

impl Field {
    /// All fields the backend schema knows about, in display order
    pub const KNOWN: [Field; 6] = [
        Field::TotalSpend,
        Field::Visits,
        Field::LastActive,
        Field::Email,
        Field::Phone,
        Field::Name,
    ];

    /// Name of the field as it appears in a segment document
    pub fn wire_name(&self) -> &str {
        match self {
            Field::TotalSpend => "totalSpend",
            Field::Visits => "visits",
            Field::LastActive => "lastActive",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Name => "name",
            Field::Other(name) => name,
        }
    }

    /// Human readable label
    pub fn label(&self) -> &str {
        match self {
            Field::TotalSpend => "Total Spend",
            Field::Visits => "Visits",
            Field::LastActive => "Last Active (ISO date)",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::Name => "Name",
            Field::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Field::Other(_))
    }

    /// Comma separated names of the known fields, for messages
    pub fn known_names() -> String {
        Field::KNOWN
            .iter()
            .map(Field::wire_name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Resolve a name, falling back to `Other` for anything unrecognised
    pub fn from_name(name: &str) -> Self {
        match name {
            "totalSpend" => Field::TotalSpend,
            "visits" => Field::Visits,
            "lastActive" => Field::LastActive,
            "email" => Field::Email,
            "phone" => Field::Phone,
            "name" => Field::Name,
            other => Field::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Comparison operators, one per backend query token
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    #[default]
    Gte,
    Lt,
    Lte,
    /// Set membership, value is a comma separated list
    In,
    /// Set exclusion, value is a comma separated list
    NotIn,
    MatchesRegex,
    /// An operator token the backend schema doesn't define, carried through verbatim
    Other(String),
}

impl Operator {
    pub const KNOWN: [Operator; 9] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
        Operator::NotIn,
        Operator::MatchesRegex,
    ];

    /// Token emitted as a key inside a field's operator mapping
    pub fn wire_token(&self) -> &str {
        match self {
            Operator::Eq => "$eq",
            Operator::Ne => "$ne",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::In => "$in",
            Operator::NotIn => "$nin",
            Operator::MatchesRegex => "$regex",
            Operator::Other(token) => token,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Operator::Eq => "= (equal)",
            Operator::Ne => "≠ (not equal)",
            Operator::Gt => "> (greater)",
            Operator::Gte => "≥ (greater/equal)",
            Operator::Lt => "< (less)",
            Operator::Lte => "≤ (less/equal)",
            Operator::In => "in [a,b,c]",
            Operator::NotIn => "not in [a,b,c]",
            Operator::MatchesRegex => "matches regex",
            Operator::Other(token) => token,
        }
    }

    /// Operators whose value is a list rather than a scalar
    pub fn takes_list(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Operator::Other(_))
    }

    /// Comma separated wire tokens of the known operators, for messages
    pub fn known_tokens() -> String {
        Operator::KNOWN
            .iter()
            .map(Operator::wire_token)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Resolve a token in any accepted form, falling back to `Other`
    pub fn from_token(token: &str) -> Self {
        match token {
            "$eq" | "eq" => Operator::Eq,
            "$ne" | "ne" => Operator::Ne,
            "$gt" | "gt" => Operator::Gt,
            "$gte" | "gte" => Operator::Gte,
            "$lt" | "lt" => Operator::Lt,
            "$lte" | "lte" => Operator::Lte,
            "$in" | "in" => Operator::In,
            "$nin" | "nin" | "notIn" => Operator::NotIn,
            "$regex" | "regex" | "matchesRegex" => Operator::MatchesRegex,
            other => Operator::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_token())
    }
}

/// Error for strict parsing of user supplied field or operator names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToken(pub String);

impl FromStr for Field {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Field::from_name(s) {
            Field::Other(name) => Err(UnknownToken(name)),
            field => Ok(field),
        }
    }
}

impl FromStr for Operator {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Operator::from_token(s) {
            Operator::Other(token) => Err(UnknownToken(token)),
            op => Ok(op),
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Field::from_name(&name))
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_token())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Operator::from_token(&token))
    }
}
