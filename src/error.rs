use crate::registers::{Access, Bank};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("profile `{0}` is not registered")]
    UnknownProfile(String),
    #[error("profile `{profile}` is invalid")]
    InvalidProfile {
        profile: &'static str,
        #[source]
        defect: Defect,
    },
    #[error("{bank} registers have no field named `{name}`")]
    UnknownField { bank: Bank, name: String },
    #[error("register buffer is malformed")]
    MalformedBuffer(#[source] BufferDefect),
    #[error("field `{field}` cannot be written")]
    NotWritable {
        field: String,
        #[source]
        reason: Unwritable,
    },
    #[error("{value} is outside of the valid range {min}..={max} of `{field}`")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("`{value}` is not one of the values accepted by `{field}`")]
    InvalidEnumValue { field: String, value: String },
    #[error("{value} cannot be represented by the {bits}-bit register of `{field}`")]
    ScaleOverflow {
        field: String,
        value: f64,
        bits: u8,
        signed: bool,
    },
}

/// Structural problems found while building a profile from its declaration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Defect {
    #[error("another profile is already registered under the same key")]
    DuplicateKey,
    #[error("{bank} register {address} is declared more than once")]
    DuplicateAddress { bank: Bank, address: u16 },
    #[error("{bank} register {address} reuses the field name `{name}`")]
    DuplicateName {
        bank: Bank,
        address: u16,
        name: String,
    },
    #[error("virtual {bank} field `{name}` clashes with another field")]
    VirtualClash { bank: Bank, name: &'static str },
    #[error("input register {address} declares {access} access, input registers are read-only")]
    InputAccess { address: u16, access: Access },
    #[error("{bank} register {address} pairs with itself")]
    SelfPair { bank: Bank, address: u16 },
    #[error("{bank} register {address} pairs with {partner}, which is not declared")]
    MissingPartner {
        bank: Bank,
        address: u16,
        partner: u16,
    },
    #[error("{bank} register {address} pairs with {partner}, which does not pair back")]
    AsymmetricPair {
        bank: Bank,
        address: u16,
        partner: u16,
    },
    #[error("{bank} registers {high} and {low} form a pair with different access modes")]
    PairAccessMismatch { bank: Bank, high: u16, low: u16 },
    #[error("{bank} register pair {high}/{low} declares no combined scale")]
    MissingCombined { bank: Bank, high: u16, low: u16 },
    #[error("{bank} register pair {high}/{low} declares contradicting combined parameters")]
    ContradictoryCombined { bank: Bank, high: u16, low: u16 },
    #[error("no combined field name can be derived for {bank} register pair {high}/{low}")]
    UnnamedPair { bank: Bank, high: u16, low: u16 },
    #[error("{bank} register {address} declares a combined scale but has no pair")]
    CombinedWithoutPair { bank: Bank, address: u16 },
    #[error("paired {bank} register {address} declares enumerated values")]
    ValuesOnPair { bank: Bank, address: u16 },
    #[error("paired {bank} register {address} declares a canonical field")]
    MapsToOnPair { bank: Bank, address: u16 },
    #[error("{bank} register {address} maps to `{target}`, which is not a {bank} field")]
    UnknownTarget {
        bank: Bank,
        address: u16,
        target: &'static str,
    },
    #[error("{bank} register {address} maps to itself")]
    SelfMapping { bank: Bank, address: u16 },
    #[error("{bank} register {address} maps to `{target}`, which is an alternate itself")]
    ChainedMapping {
        bank: Bank,
        address: u16,
        target: &'static str,
    },
    #[error("{bank} register {address} declares the empty valid range {min}..={max}")]
    EmptyRange {
        bank: Bank,
        address: u16,
        min: f64,
        max: f64,
    },
    #[error("{bank} register {address} declares value code {code} more than once")]
    DuplicateCode { bank: Bank, address: u16, code: u16 },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferDefect {
    #[error("window of {len} words at {base} runs past the last register address")]
    PastEnd { base: u16, len: usize },
    #[error("window at {base} overlaps register {address} of an earlier window")]
    Overlap { base: u16, address: u16 },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Unwritable {
    #[error("input registers are read-only")]
    InputBank,
    #[error("register {address} has {access} access")]
    Access { address: u16, access: Access },
    #[error("register {address} is one half of the 32-bit field `{combined}`")]
    PairHalf { address: u16, combined: String },
    #[error("no register backs this field")]
    Virtual,
}
