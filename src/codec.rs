//! Conversion between raw register words and physical values.
//!
//! Every function here is a pure function of a [`Profile`] and its arguments. Decoding never
//! fails on a well-formed [`RegisterBuffer`], it yields whatever fields the buffer covers. Encoding
//! rejects anything it cannot write exactly as requested.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::error::{BufferDefect, Error, Unwritable};
use crate::profile::{Field, Pair, Profile, RegisterMap};
use crate::registers::{Bank, RegisterEntry};

/// Raw register words, possibly collected from several separately fetched windows.
#[derive(Debug, Default, Clone)]
pub struct RegisterBuffer {
    words: BTreeMap<u16, u16>,
}

impl RegisterBuffer {
    /// Buffer of one contiguous window starting at `base`.
    pub fn new(base: u16, words: &[u16]) -> Result<Self, Error> {
        let mut buffer = Self::default();
        buffer.add_window(base, words)?;
        Ok(buffer)
    }

    pub fn from_windows<'w>(
        windows: impl IntoIterator<Item = (u16, &'w [u16])>,
    ) -> Result<Self, Error> {
        let mut buffer = Self::default();
        for (base, words) in windows {
            buffer.add_window(base, words)?;
        }
        Ok(buffer)
    }

    /// Add another window. The buffer is left untouched if the window is rejected.
    pub fn add_window(&mut self, base: u16, words: &[u16]) -> Result<(), Error> {
        if usize::from(base) + words.len() > usize::from(u16::MAX) + 1 {
            return Err(Error::MalformedBuffer(BufferDefect::PastEnd {
                base,
                len: words.len(),
            }));
        }
        if words.is_empty() {
            return Ok(());
        }
        let end = (usize::from(base) + words.len() - 1) as u16;
        if let Some((&address, _)) = self.words.range(base..=end).next() {
            return Err(Error::MalformedBuffer(BufferDefect::Overlap { base, address }));
        }
        self.words.extend((base..=end).zip(words.iter().copied()));
        Ok(())
    }

    pub fn get(&self, address: u16) -> Option<u16> {
        self.words.get(&address).copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// The register words a reading was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum Raw {
    Word {
        address: u16,
        word: u16,
    },
    Pair {
        high_address: u16,
        high: u16,
        low_address: u16,
        low: u16,
    },
}

impl Raw {
    pub fn addresses(&self) -> Vec<u16> {
        match *self {
            Raw::Word { address, .. } => vec![address],
            Raw::Pair { high_address, low_address, .. } => vec![high_address, low_address],
        }
    }

    pub fn words(&self) -> Vec<u16> {
        match *self {
            Raw::Word { word, .. } => vec![word],
            Raw::Pair { high, low, .. } => vec![high, low],
        }
    }
}

impl std::fmt::Display for Raw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Raw::Word { address, word } => write!(f, "{address}={word}"),
            Raw::Pair { high_address, high, low_address, low } => {
                write!(f, "{high_address}={high},{low_address}={low}")
            }
        }
    }
}

/// Label of an enumerated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Known(&'static str),
    /// The register holds a code its declaration does not list.
    Unknown(u16),
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Known(label) => f.write_str(label),
            Label::Unknown(code) => write!(f, "unknown code {code}"),
        }
    }
}

impl serde::Serialize for Label {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One decoded field.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Reading<'p> {
    pub value: f64,
    pub unit: &'static str,
    pub label: Option<Label>,
    /// The raw value after sign extension, before scaling.
    pub integer: i64,
    pub raw: Raw,
    /// Field the value was decoded from. Differs from the name the reading is exposed under for
    /// aliases and fallbacks.
    pub source: &'p str,
}

/// A [`Reading`] that no longer borrows from the profile it was decoded with.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct OwnedReading {
    pub value: f64,
    pub unit: &'static str,
    pub label: Option<Label>,
    pub integer: i64,
    pub raw: Raw,
    pub source: String,
}

impl From<&Reading<'_>> for OwnedReading {
    fn from(reading: &Reading<'_>) -> Self {
        OwnedReading {
            value: reading.value,
            unit: reading.unit,
            label: reading.label,
            integer: reading.integer,
            raw: reading.raw,
            source: reading.source.to_owned(),
        }
    }
}

/// Result of decoding a buffer, in register address order.
#[derive(Debug, Default)]
pub struct Decoded<'p> {
    readings: Vec<(&'p str, Reading<'p>)>,
    index: HashMap<&'p str, usize>,
}

impl<'p> Decoded<'p> {
    fn insert(&mut self, name: &'p str, reading: Reading<'p>) {
        if self.index.contains_key(name) {
            return;
        }
        self.index.insert(name, self.readings.len());
        self.readings.push((name, reading));
    }

    pub fn get(&self, name: &str) -> Option<&Reading<'p>> {
        self.index.get(name).map(|&i| &self.readings[i].1)
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name).map(|r| r.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'p str, &Reading<'p>)> {
        self.readings.iter().map(|(name, reading)| (*name, reading))
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

fn slot_reading(entry: &'static RegisterEntry, word: u16) -> Reading<'static> {
    let integer = entry.data_type.integer(word);
    let label = entry.is_enumerated().then(|| match entry.label(word) {
        Some(label) => Label::Known(label),
        None => {
            debug!(message = "undeclared value code", address = entry.address, code = word);
            Label::Unknown(word)
        }
    });
    Reading {
        value: entry.data_type.scale().apply(integer),
        unit: entry.unit,
        label,
        integer,
        raw: Raw::Word { address: entry.address, word },
        source: entry.name,
    }
}

fn read_slot(entry: &'static RegisterEntry, buffer: &RegisterBuffer) -> Option<Reading<'static>> {
    if !entry.access.is_readable() {
        return None;
    }
    buffer.get(entry.address).map(|word| slot_reading(entry, word))
}

fn read_pair<'p>(pair: &'p Pair, buffer: &RegisterBuffer) -> Option<Reading<'p>> {
    if !pair.access().is_readable() {
        return None;
    }
    let [high_address, low_address] = pair.addresses();
    let (high, low) = match (buffer.get(high_address), buffer.get(low_address)) {
        (Some(high), Some(low)) => (high, low),
        (None, None) => return None,
        (high, low) => {
            debug!(
                message = "only one half of a pair is buffered",
                field = pair.name(),
                high = high.is_some(),
                low = low.is_some(),
            );
            return None;
        }
    };
    let composed = (u32::from(high) << 16) | u32::from(low);
    let integer = if pair.is_signed() { i64::from(composed as i32) } else { i64::from(composed) };
    Some(Reading {
        value: pair.scale().apply(integer),
        unit: pair.unit(),
        label: None,
        integer,
        raw: Raw::Pair { high_address, high, low_address, low },
        source: pair.name(),
    })
}

/// Decode every readable field of `bank` present in `buffer`.
///
/// Pair halves are folded into their combined field and are not reported separately (use
/// [`read_field`] for that). Canonical fields absent from the buffer are filled from the first
/// buffered alternate.
pub fn decode<'p>(profile: &'p Profile, bank: Bank, buffer: &RegisterBuffer) -> Decoded<'p> {
    let map = profile.bank(bank);
    let mut decoded = Decoded::default();
    for &entry in map.entries() {
        match entry.pair {
            None => {
                let Some(reading) = read_slot(entry, buffer) else { continue };
                if let Some(alias) = entry.alias {
                    decoded.insert(alias, reading.clone());
                }
                decoded.insert(entry.name, reading);
            }
            Some(partner) if entry.address < partner => {
                let Some(pair) = map.pair_containing(entry.address) else { continue };
                let Some(reading) = read_pair(pair, buffer) else { continue };
                if let Some(alias) = pair.alias() {
                    decoded.insert(alias, reading.clone());
                }
                decoded.insert(pair.name(), reading);
            }
            Some(_) => {}
        }
    }
    for fallback in map.fallbacks() {
        let canonical = fallback.canonical();
        if decoded.contains(canonical) {
            continue;
        }
        let alternate = fallback.alternates().iter().find_map(|alternate| decoded.get(alternate.name));
        let Some(reading) = alternate.cloned() else { continue };
        debug!(message = "canonical field filled from alternate", canonical, source = reading.source);
        let alias = match map.resolve(canonical) {
            Ok(Field::Slot(entry)) => entry.alias,
            Ok(Field::Pair(pair)) => pair.alias(),
            _ => None,
        };
        if let Some(alias) = alias {
            decoded.insert(alias, reading.clone());
        }
        decoded.insert(canonical, reading);
    }
    trace!(message = "decoded", %bank, words = buffer.len(), fields = decoded.len());
    decoded
}

/// Decode a single field by any of its names.
///
/// Unlike [`decode`], pair halves can be read on their own here. Returns `None` when the buffer
/// does not hold the registers the field needs.
pub fn read_field<'p>(
    profile: &'p Profile,
    bank: Bank,
    name: &str,
    buffer: &RegisterBuffer,
) -> Result<Option<Reading<'p>>, Error> {
    let map = profile.bank(bank);
    let reading = match map.resolve(name)? {
        Field::Slot(entry) => read_slot(entry, buffer),
        Field::Pair(pair) => read_pair(pair, buffer),
        Field::Virtual(_) => None,
    };
    if reading.is_some() {
        return Ok(reading);
    }
    let alternates = map.fallback_for(name).map(|f| f.alternates()).unwrap_or_default();
    Ok(alternates.iter().find_map(|&alternate| read_slot(alternate, buffer)))
}

/// A register whose buffered value differs from its documented default.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DefaultMismatch {
    pub address: u16,
    pub name: &'static str,
    pub expected: u16,
    pub actual: u16,
}

/// Compare every buffered register that documents a default value against that default.
pub fn check_defaults(profile: &Profile, bank: Bank, buffer: &RegisterBuffer) -> Vec<DefaultMismatch> {
    profile
        .bank(bank)
        .entries()
        .iter()
        .filter_map(|entry| {
            let expected = entry.default?;
            let actual = buffer.get(entry.address)?;
            (expected != actual).then_some(DefaultMismatch {
                address: entry.address,
                name: entry.name,
                expected,
                actual,
            })
        })
        .collect()
}

/// Value requested for a write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteValue {
    /// A physical value, or the raw code of an enumerated field.
    Number(f64),
    /// One of the labels of an enumerated field.
    Label(String),
}

impl std::str::FromStr for WriteValue {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<f64>() {
            Ok(number) => WriteValue::Number(number),
            Err(_) => WriteValue::Label(s.to_owned()),
        })
    }
}

impl From<f64> for WriteValue {
    fn from(value: f64) -> Self {
        WriteValue::Number(value)
    }
}

impl From<&str> for WriteValue {
    fn from(value: &str) -> Self {
        WriteValue::Label(value.to_owned())
    }
}

impl std::fmt::Display for WriteValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteValue::Number(number) => write!(f, "{number}"),
            WriteValue::Label(label) => f.write_str(label),
        }
    }
}

/// Register words to be written together, in ascending address order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RegisterWrite {
    pub bank: Bank,
    pub addresses: Vec<u16>,
    pub words: Vec<u16>,
}

impl RegisterWrite {
    /// Whether a single multiple-register write can carry all words.
    pub fn is_contiguous(&self) -> bool {
        self.addresses.windows(2).all(|w| w[0].checked_add(1) == Some(w[1]))
    }
}

/// Validate `value` for the field `name` and turn it into the register words to write.
pub fn encode(
    profile: &Profile,
    bank: Bank,
    name: &str,
    value: &WriteValue,
) -> Result<RegisterWrite, Error> {
    let map = profile.bank(bank);
    let field = map.resolve(name)?;
    let not_writable = |reason| Error::NotWritable {
        field: name.to_owned(),
        reason,
    };
    if bank == Bank::Input {
        return Err(not_writable(Unwritable::InputBank));
    }
    let write = match field {
        Field::Virtual(_) => return Err(not_writable(Unwritable::Virtual)),
        Field::Slot(entry) => {
            if let Some(pair) = map.pair_containing(entry.address) {
                return Err(not_writable(Unwritable::PairHalf {
                    address: entry.address,
                    combined: pair.name().to_owned(),
                }));
            }
            if !entry.access.is_writable() {
                return Err(not_writable(Unwritable::Access {
                    address: entry.address,
                    access: entry.access,
                }));
            }
            encode_slot(map, entry, name, value)?
        }
        Field::Pair(pair) => {
            if !pair.access().is_writable() {
                return Err(not_writable(Unwritable::Access {
                    address: pair.high().address,
                    access: pair.access(),
                }));
            }
            encode_pair(map, pair, name, value)?
        }
    };
    trace!(message = "encoded", field = name, %value, addresses = ?write.addresses, words = ?write.words);
    Ok(write)
}

fn encode_slot(
    map: &RegisterMap,
    entry: &'static RegisterEntry,
    name: &str,
    value: &WriteValue,
) -> Result<RegisterWrite, Error> {
    let scale = entry.data_type.scale();
    let signed = entry.data_type.is_signed();
    let invalid_enum = || Error::InvalidEnumValue {
        field: name.to_owned(),
        value: value.to_string(),
    };
    let word = if entry.is_enumerated() {
        let code = match value {
            WriteValue::Label(label) => entry.code(label),
            WriteValue::Number(number) => u16::try_from(*number as i64)
                .ok()
                .filter(|code| f64::from(*code) == *number && entry.label(*code).is_some()),
        }
        .ok_or_else(invalid_enum)?;
        check_range(entry.valid_range, name, scale.apply(i64::from(code)))?;
        code
    } else {
        let WriteValue::Number(physical) = *value else {
            return Err(invalid_enum());
        };
        let raw = to_raw(physical, entry.valid_range, scale, name, 16, signed)?;
        if signed { raw as i16 as u16 } else { raw as u16 }
    };
    Ok(RegisterWrite {
        bank: map.bank(),
        addresses: vec![entry.address],
        words: vec![word],
    })
}

fn encode_pair(
    map: &RegisterMap,
    pair: &Pair,
    name: &str,
    value: &WriteValue,
) -> Result<RegisterWrite, Error> {
    let WriteValue::Number(physical) = *value else {
        return Err(Error::InvalidEnumValue {
            field: name.to_owned(),
            value: value.to_string(),
        });
    };
    let raw = to_raw(physical, pair.valid_range(), pair.scale(), name, 32, pair.is_signed())?;
    let composed = if pair.is_signed() { raw as i32 as u32 } else { raw as u32 };
    Ok(RegisterWrite {
        bank: map.bank(),
        addresses: pair.addresses().to_vec(),
        words: vec![(composed >> 16) as u16, composed as u16],
    })
}

fn check_range(
    range: Option<crate::registers::ValidRange>,
    name: &str,
    physical: f64,
) -> Result<(), Error> {
    match range {
        Some(range) if !range.contains(physical) => Err(Error::OutOfRange {
            field: name.to_owned(),
            value: physical,
            min: range.min,
            max: range.max,
        }),
        _ => Ok(()),
    }
}

/// Round the scaled value to the register integer, checking it fits `bits` wide registers.
fn to_raw(
    physical: f64,
    range: Option<crate::registers::ValidRange>,
    scale: crate::registers::Scale,
    name: &str,
    bits: u8,
    signed: bool,
) -> Result<i64, Error> {
    let overflow = || Error::ScaleOverflow {
        field: name.to_owned(),
        value: physical,
        bits,
        signed,
    };
    if physical.is_nan() {
        return Err(overflow());
    }
    check_range(range, name, physical)?;
    if physical.is_infinite() {
        return Err(overflow());
    }
    let raw = scale.invert(physical).round();
    let (min, max) = if signed {
        (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
    } else {
        (0, (1i64 << bits) - 1)
    };
    if raw < min as f64 || raw > max as f64 {
        return Err(overflow());
    }
    Ok(raw as i64)
}
