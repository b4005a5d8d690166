use std::collections::HashMap;

use tracing::trace;

use crate::error::{Defect, Error};
use crate::registers::{Access, Bank, Combined, RegisterEntry, Scale, ValidRange};

/// Static declaration of one device profile, as written in [`crate::profiles`].
#[derive(Debug)]
pub struct ProfileDeclaration {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub notes: &'static str,
    pub input: &'static [RegisterEntry],
    pub holding: &'static [RegisterEntry],
    /// Canonical fields that have no register of their own and are only ever supplied by
    /// alternates declaring `maps_to`.
    pub virtual_fields: &'static [VirtualField],
}

#[derive(Debug, PartialEq, Eq)]
pub struct VirtualField {
    pub bank: Bank,
    pub name: &'static str,
    pub unit: &'static str,
}

/// Two registers read and written together as one 32-bit quantity.
#[derive(Debug)]
pub struct Pair {
    name: String,
    alias: Option<String>,
    high: &'static RegisterEntry,
    low: &'static RegisterEntry,
    combined: Combined,
    valid_range: Option<ValidRange>,
    signed: bool,
}

impl Pair {
    /// Name of the combined field, derived from the halves' names.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The more significant word, always the lower of the two addresses.
    pub fn high(&self) -> &'static RegisterEntry {
        self.high
    }

    pub fn low(&self) -> &'static RegisterEntry {
        self.low
    }

    pub fn scale(&self) -> Scale {
        self.combined.scale
    }

    pub fn unit(&self) -> &'static str {
        self.combined.unit
    }

    /// Signedness of the composed 32-bit value. Set when either half is declared signed.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    pub fn access(&self) -> Access {
        self.high.access
    }

    pub fn valid_range(&self) -> Option<ValidRange> {
        self.valid_range
    }

    pub fn description(&self) -> Option<&'static str> {
        self.high.description.or(self.low.description)
    }

    pub fn addresses(&self) -> [u16; 2] {
        [self.high.address, self.low.address]
    }
}

/// Precedence list of the registers able to supply one canonical field.
#[derive(Debug)]
pub struct Fallback {
    canonical: &'static str,
    primary: FieldRef,
    alternates: Vec<&'static RegisterEntry>,
}

impl Fallback {
    pub fn canonical(&self) -> &'static str {
        self.canonical
    }

    /// Alternates in the order they are consulted, which is ascending address order.
    pub fn alternates(&self) -> &[&'static RegisterEntry] {
        &self.alternates
    }
}

/// What a field name resolves to within one bank.
#[derive(Debug, Clone, Copy)]
pub enum Field<'m> {
    Slot(&'static RegisterEntry),
    Pair(&'m Pair),
    Virtual(&'static VirtualField),
}

impl<'m> Field<'m> {
    pub fn name(&self) -> &'m str {
        match *self {
            Field::Slot(entry) => entry.name,
            Field::Pair(pair) => pair.name(),
            Field::Virtual(field) => field.name,
        }
    }

    pub fn unit(&self) -> &'static str {
        match *self {
            Field::Slot(entry) => entry.unit,
            Field::Pair(pair) => pair.unit(),
            Field::Virtual(field) => field.unit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldRef {
    Slot(usize),
    Pair(usize),
    Virtual(usize),
}

/// Validated register map of one bank.
#[derive(Debug)]
pub struct RegisterMap {
    bank: Bank,
    entries: Vec<&'static RegisterEntry>,
    pairs: Vec<Pair>,
    virtual_fields: Vec<&'static VirtualField>,
    fallbacks: Vec<Fallback>,
    names: HashMap<String, FieldRef>,
}

impl RegisterMap {
    pub fn new(
        profile: &'static str,
        bank: Bank,
        declared: &'static [RegisterEntry],
        virtual_fields: impl IntoIterator<Item = &'static VirtualField>,
    ) -> Result<Self, Error> {
        let invalid = |defect| Error::InvalidProfile { profile, defect };
        let mut entries: Vec<&'static RegisterEntry> = declared.iter().collect();
        entries.sort_by_key(|e| e.address);
        if let Some(w) = entries.windows(2).find(|w| w[0].address == w[1].address) {
            return Err(invalid(Defect::DuplicateAddress {
                bank,
                address: w[0].address,
            }));
        }

        let mut map = Self {
            bank,
            entries,
            pairs: Vec::new(),
            virtual_fields: virtual_fields.into_iter().filter(|v| v.bank == bank).collect(),
            fallbacks: Vec::new(),
            names: HashMap::new(),
        };
        for index in 0..map.entries.len() {
            let entry = map.entries[index];
            map.check_entry(entry).map_err(invalid)?;
            if let Some(partner) = entry.pair {
                if entry.address < partner {
                    let pair = map.build_pair(entry, partner).map_err(invalid)?;
                    map.pairs.push(pair);
                }
            }
        }
        map.index_names().map_err(invalid)?;
        map.resolve_fallbacks().map_err(invalid)?;
        trace!(
            message = "register map validated",
            profile,
            %bank,
            entries = map.entries.len(),
            pairs = map.pairs.len(),
            fallbacks = map.fallbacks.len(),
        );
        Ok(map)
    }

    fn check_entry(&self, entry: &'static RegisterEntry) -> Result<(), Defect> {
        let (bank, address) = (self.bank, entry.address);
        if bank == Bank::Input && entry.access != Access::R {
            return Err(Defect::InputAccess {
                address,
                access: entry.access,
            });
        }
        if let Some(range) = entry.valid_range {
            if !(range.min <= range.max) {
                return Err(Defect::EmptyRange {
                    bank,
                    address,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        for (index, (code, _)) in entry.values.iter().enumerate() {
            if entry.values[..index].iter().any(|(c, _)| c == code) {
                return Err(Defect::DuplicateCode {
                    bank,
                    address,
                    code: *code,
                });
            }
        }
        let Some(partner) = entry.pair else {
            if entry.combined.is_some() {
                return Err(Defect::CombinedWithoutPair { bank, address });
            }
            return Ok(());
        };
        if partner == address {
            return Err(Defect::SelfPair { bank, address });
        }
        let Some(other) = self.entry_at(partner) else {
            return Err(Defect::MissingPartner {
                bank,
                address,
                partner,
            });
        };
        if other.pair != Some(address) {
            return Err(Defect::AsymmetricPair {
                bank,
                address,
                partner,
            });
        }
        if entry.is_enumerated() {
            return Err(Defect::ValuesOnPair { bank, address });
        }
        if entry.maps_to.is_some() {
            return Err(Defect::MapsToOnPair { bank, address });
        }
        Ok(())
    }

    fn build_pair(&self, high: &'static RegisterEntry, partner: u16) -> Result<Pair, Defect> {
        let bank = self.bank;
        // `check_entry` has already established that the partner exists.
        let low = self
            .entry_at(partner)
            .ok_or(Defect::MissingPartner { bank, address: high.address, partner })?;
        let (h, l) = (high.address, low.address);
        if high.access != low.access {
            return Err(Defect::PairAccessMismatch { bank, high: h, low: l });
        }
        let combined = match (high.combined, low.combined) {
            (Some(c), None) | (None, Some(c)) => c,
            (Some(a), Some(b)) if a == b => a,
            (Some(_), Some(_)) => {
                return Err(Defect::ContradictoryCombined { bank, high: h, low: l });
            }
            (None, None) => return Err(Defect::MissingCombined { bank, high: h, low: l }),
        };
        let valid_range = match (high.valid_range, low.valid_range) {
            (Some(a), Some(b)) if a != b => {
                return Err(Defect::ContradictoryCombined { bank, high: h, low: l });
            }
            (a, b) => a.or(b),
        };
        let name = combined_name(high.name, low.name)
            .ok_or(Defect::UnnamedPair { bank, high: h, low: l })?;
        let alias = match (high.alias, low.alias) {
            (None, None) => None,
            (high_alias, low_alias) => combined_name(
                high_alias.unwrap_or_default(),
                low_alias.unwrap_or_default(),
            ),
        };
        Ok(Pair {
            name,
            alias,
            high,
            low,
            combined,
            valid_range,
            signed: high.data_type.is_signed() || low.data_type.is_signed(),
        })
    }

    fn index_names(&mut self) -> Result<(), Defect> {
        let bank = self.bank;
        let mut names = HashMap::new();
        let mut claim = |name: &str, field: FieldRef, address: u16| {
            if names.insert(name.to_owned(), field).is_some() {
                return Err(Defect::DuplicateName {
                    bank,
                    address,
                    name: name.to_owned(),
                });
            }
            Ok(())
        };
        for (index, entry) in self.entries.iter().enumerate() {
            claim(entry.name, FieldRef::Slot(index), entry.address)?;
            if let Some(alias) = entry.alias {
                claim(alias, FieldRef::Slot(index), entry.address)?;
            }
        }
        for (index, pair) in self.pairs.iter().enumerate() {
            claim(&pair.name, FieldRef::Pair(index), pair.high.address)?;
            if let Some(alias) = &pair.alias {
                claim(alias, FieldRef::Pair(index), pair.high.address)?;
            }
        }
        for (index, field) in self.virtual_fields.iter().enumerate() {
            if names.insert(field.name.to_owned(), FieldRef::Virtual(index)).is_some() {
                return Err(Defect::VirtualClash {
                    bank,
                    name: field.name,
                });
            }
        }
        self.names = names;
        Ok(())
    }

    fn resolve_fallbacks(&mut self) -> Result<(), Defect> {
        let bank = self.bank;
        let mut fallbacks: Vec<Fallback> = Vec::new();
        for &entry in &self.entries {
            let Some(target) = entry.maps_to else { continue };
            let address = entry.address;
            let primary = match self.names.get(target) {
                None => return Err(Defect::UnknownTarget { bank, address, target }),
                Some(FieldRef::Slot(i)) if std::ptr::eq(self.entries[*i], entry) => {
                    return Err(Defect::SelfMapping { bank, address });
                }
                Some(FieldRef::Slot(i)) if self.entries[*i].maps_to.is_some() => {
                    return Err(Defect::ChainedMapping { bank, address, target });
                }
                Some(primary) => *primary,
            };
            match fallbacks.iter_mut().find(|f| f.primary == primary) {
                Some(fallback) => fallback.alternates.push(entry),
                None => fallbacks.push(Fallback {
                    canonical: target,
                    primary,
                    alternates: vec![entry],
                }),
            }
        }
        self.fallbacks = fallbacks;
        Ok(())
    }

    pub fn bank(&self) -> Bank {
        self.bank
    }

    /// All entries, sorted by address.
    pub fn entries(&self) -> &[&'static RegisterEntry] {
        &self.entries
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn fallbacks(&self) -> &[Fallback] {
        &self.fallbacks
    }

    pub fn virtual_fields(&self) -> &[&'static VirtualField] {
        &self.virtual_fields
    }

    pub fn entry_at(&self, address: u16) -> Option<&'static RegisterEntry> {
        let index = self.entries.partition_point(|e| e.address < address);
        self.entries.get(index).copied().filter(|e| e.address == address)
    }

    /// Entries with addresses in `start..=end`, sorted by address.
    pub fn entries_in_range(&self, start: u16, end: u16) -> &[&'static RegisterEntry] {
        if start > end {
            return &[];
        }
        let from = self.entries.partition_point(|e| e.address < start);
        let to = self.entries.partition_point(|e| e.address <= end);
        &self.entries[from..to]
    }

    /// The pair the register at `address` is one half of.
    pub fn pair_containing(&self, address: u16) -> Option<&Pair> {
        self.pairs.iter().find(|p| p.high.address == address || p.low.address == address)
    }

    pub fn resolve(&self, name: &str) -> Result<Field<'_>, Error> {
        self.lookup(name).map(|r| self.field(r)).ok_or_else(|| Error::UnknownField {
            bank: self.bank,
            name: name.to_owned(),
        })
    }

    /// Fallback precedence list of the canonical field `name` resolves to, if any.
    pub fn fallback_for(&self, name: &str) -> Option<&Fallback> {
        let field = self.lookup(name)?;
        self.fallbacks.iter().find(|f| f.primary == field)
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<FieldRef> {
        self.names.get(name).copied()
    }

    pub(crate) fn field(&self, field: FieldRef) -> Field<'_> {
        match field {
            FieldRef::Slot(i) => Field::Slot(self.entries[i]),
            FieldRef::Pair(i) => Field::Pair(&self.pairs[i]),
            FieldRef::Virtual(i) => Field::Virtual(self.virtual_fields[i]),
        }
    }
}

fn combined_name(high: &str, low: &str) -> Option<String> {
    high.strip_suffix("_high")
        .or_else(|| low.strip_suffix("_low"))
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}

/// A validated device profile: both register banks plus descriptive metadata.
#[derive(Debug)]
pub struct Profile {
    key: &'static str,
    name: &'static str,
    description: &'static str,
    notes: &'static str,
    input: RegisterMap,
    holding: RegisterMap,
}

impl Profile {
    pub fn new(declaration: &'static ProfileDeclaration) -> Result<Self, Error> {
        let key = declaration.key;
        let virtual_fields = declaration.virtual_fields;
        Ok(Self {
            key,
            name: declaration.name,
            description: declaration.description,
            notes: declaration.notes,
            input: RegisterMap::new(key, Bank::Input, declaration.input, virtual_fields)?,
            holding: RegisterMap::new(key, Bank::Holding, declaration.holding, virtual_fields)?,
        })
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn notes(&self) -> &'static str {
        self.notes
    }

    pub fn bank(&self, bank: Bank) -> &RegisterMap {
        match bank {
            Bank::Input => &self.input,
            Bank::Holding => &self.holding,
        }
    }

    pub fn resolve_field(&self, bank: Bank, name: &str) -> Result<Field<'_>, Error> {
        self.bank(bank).resolve(name)
    }

    pub fn entries_in_range(&self, bank: Bank, start: u16, end: u16) -> &[&'static RegisterEntry] {
        self.bank(bank).entries_in_range(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! declaration {
        ($key: literal, input = $input: expr, holding = $holding: expr, virtuals = $virtuals: expr) => {{
            static DECLARATION: ProfileDeclaration = ProfileDeclaration {
                key: $key,
                name: $key,
                description: "",
                notes: "",
                input: $input,
                holding: $holding,
                virtual_fields: $virtuals,
            };
            &DECLARATION
        }};
        ($key: literal, input = $input: expr) => {
            declaration!($key, input = $input, holding = &[], virtuals = &[])
        };
        ($key: literal, holding = $holding: expr) => {
            declaration!($key, input = &[], holding = $holding, virtuals = &[])
        };
    }

    fn defect(result: Result<Profile, Error>) -> Defect {
        match result {
            Err(Error::InvalidProfile { defect, .. }) => defect,
            other => panic!("expected an invalid profile, got {other:?}"),
        }
    }

    #[test]
    fn resolves_names_aliases_and_pairs() {
        let profile = Profile::new(declaration!(
            "NAMES",
            input = crate::input_registers! {
                38: U16_D1, "ac_voltage_r", "V", alias = "ac_voltage";
                35: I16, "ac_power_high", "", alias = "output_power_high", pair = 36;
                36: I16, "ac_power_low", "", alias = "output_power_low", pair = 35, combined = (D1, "W");
                31222: I16_D1, "battery_temp_vpp", "°C", maps_to = "battery_temp";
            },
            holding = &[],
            virtuals = &[VirtualField { bank: Bank::Input, name: "battery_temp", unit: "°C" }]
        ))
        .unwrap();

        let entries = profile.bank(Bank::Input).entries();
        assert_eq!(entries.iter().map(|e| e.address).collect::<Vec<_>>(), [35, 36, 38, 31222]);

        assert!(matches!(
            profile.resolve_field(Bank::Input, "ac_voltage"),
            Ok(Field::Slot(RegisterEntry { address: 38, .. }))
        ));
        let Ok(Field::Pair(pair)) = profile.resolve_field(Bank::Input, "output_power") else {
            panic!("output_power should resolve to the combined pair");
        };
        assert_eq!(pair.name(), "ac_power");
        assert_eq!(pair.addresses(), [35, 36]);
        assert_eq!(pair.scale(), Scale::D1);
        assert_eq!(pair.unit(), "W");
        assert!(pair.is_signed());
        assert!(matches!(
            profile.resolve_field(Bank::Input, "ac_power_low"),
            Ok(Field::Slot(RegisterEntry { address: 36, .. }))
        ));
        assert!(matches!(
            profile.resolve_field(Bank::Input, "battery_temp"),
            Ok(Field::Virtual(VirtualField { name: "battery_temp", .. }))
        ));
        assert_eq!(
            profile.resolve_field(Bank::Holding, "ac_voltage").unwrap_err(),
            Error::UnknownField { bank: Bank::Holding, name: "ac_voltage".into() }
        );

        let fallback = profile.bank(Bank::Input).fallback_for("battery_temp").unwrap();
        assert_eq!(fallback.canonical(), "battery_temp");
        assert_eq!(fallback.alternates()[0].address, 31222);
    }

    #[test]
    fn entries_in_range_is_inclusive_and_sorted() {
        let profile = Profile::new(declaration!(
            "RANGE",
            input = crate::input_registers! {
                8034: U16_D1, "battery_voltage", "V";
                3: U16_D1, "pv1_voltage", "V";
                4: U16_D1, "pv1_current", "A";
                93: I16_D1, "inverter_temp", "°C";
            }
        ))
        .unwrap();
        let addresses = |s: u16, e: u16| {
            profile.entries_in_range(Bank::Input, s, e).iter().map(|e| e.address).collect::<Vec<_>>()
        };
        assert_eq!(addresses(0, 100), [3, 4, 93]);
        assert_eq!(addresses(4, 8034), [4, 93, 8034]);
        assert_eq!(addresses(5, 92), Vec::<u16>::new());
        assert_eq!(addresses(100, 0), Vec::<u16>::new());
    }

    #[test]
    fn rejects_asymmetric_pair() {
        let result = Profile::new(declaration!(
            "ASYMMETRIC",
            input = crate::input_registers! {
                1: U16, "a_high", "", pair = 2;
                2: U16, "a_low", "", pair = 3, combined = (X1, "W");
                3: U16, "b_high", "", pair = 4;
                4: U16, "b_low", "", pair = 3, combined = (X1, "W");
            }
        ));
        assert_eq!(
            defect(result),
            Defect::AsymmetricPair { bank: Bank::Input, address: 1, partner: 2 }
        );
    }

    #[test]
    fn rejects_pair_structure_defects() {
        let missing = Profile::new(declaration!(
            "MISSING",
            input = crate::input_registers! { 1: U16, "a_high", "", pair = 9; }
        ));
        assert_eq!(
            defect(missing),
            Defect::MissingPartner { bank: Bank::Input, address: 1, partner: 9 }
        );

        let itself = Profile::new(declaration!(
            "SELF",
            input = crate::input_registers! { 1: U16, "a_high", "", pair = 1; }
        ));
        assert_eq!(defect(itself), Defect::SelfPair { bank: Bank::Input, address: 1 });

        let no_scale = Profile::new(declaration!(
            "NO_SCALE",
            input = crate::input_registers! {
                1: U16, "a_high", "", pair = 2;
                2: U16, "a_low", "", pair = 1;
            }
        ));
        assert_eq!(defect(no_scale), Defect::MissingCombined { bank: Bank::Input, high: 1, low: 2 });

        let contradicting = Profile::new(declaration!(
            "CONTRADICTING",
            input = crate::input_registers! {
                1: U16, "a_high", "", pair = 2, combined = (X1, "W");
                2: U16, "a_low", "", pair = 1, combined = (D1, "W");
            }
        ));
        assert_eq!(
            defect(contradicting),
            Defect::ContradictoryCombined { bank: Bank::Input, high: 1, low: 2 }
        );

        let unnamed = Profile::new(declaration!(
            "UNNAMED",
            input = crate::input_registers! {
                1: U16, "a", "", pair = 2;
                2: U16, "b", "", pair = 1, combined = (X1, "W");
            }
        ));
        assert_eq!(defect(unnamed), Defect::UnnamedPair { bank: Bank::Input, high: 1, low: 2 });

        let lone = Profile::new(declaration!(
            "LONE",
            input = crate::input_registers! { 1: U16, "a", "", combined = (X1, "W"); }
        ));
        assert_eq!(defect(lone), Defect::CombinedWithoutPair { bank: Bank::Input, address: 1 });

        let access = Profile::new(declaration!(
            "ACCESS",
            holding = crate::holding_registers! {
                137: U16, RW, "reactive_power_high", "", pair = 138;
                138: U16, R_, "reactive_power_low", "", pair = 137, combined = (D1, "var");
            }
        ));
        assert_eq!(
            defect(access),
            Defect::PairAccessMismatch { bank: Bank::Holding, high: 137, low: 138 }
        );
    }

    #[test]
    fn rejects_duplicates() {
        let address = Profile::new(declaration!(
            "DUP_ADDRESS",
            input = crate::input_registers! {
                3: U16_D1, "pv1_voltage", "V";
                3: U16_D1, "pv1_voltage_again", "V";
            }
        ));
        assert_eq!(defect(address), Defect::DuplicateAddress { bank: Bank::Input, address: 3 });

        let name = Profile::new(declaration!(
            "DUP_NAME",
            holding = crate::holding_registers! {
                874: U16, RW, "parallel_enable", "";
                973: U16, RW, "parallel_enable", "";
            }
        ));
        assert_eq!(
            defect(name),
            Defect::DuplicateName { bank: Bank::Holding, address: 973, name: "parallel_enable".into() }
        );

        let alias = Profile::new(declaration!(
            "DUP_ALIAS",
            input = crate::input_registers! {
                38: U16_D1, "ac_voltage_r", "V", alias = "ac_voltage";
                39: U16_D1, "ac_voltage", "V";
            }
        ));
        assert!(matches!(defect(alias), Defect::DuplicateName { address: 39, .. }));

        let code = Profile::new(declaration!(
            "DUP_CODE",
            holding = crate::holding_registers! {
                202: U16, RW, "enable", "", values = { 0 => "Off", 0 => "Disabled" };
            }
        ));
        assert_eq!(
            defect(code),
            Defect::DuplicateCode { bank: Bank::Holding, address: 202, code: 0 }
        );
    }

    #[test]
    fn rejects_mapping_defects() {
        let unknown = Profile::new(declaration!(
            "UNKNOWN_TARGET",
            input = crate::input_registers! {
                31222: I16_D1, "battery_temp_vpp", "°C", maps_to = "battery_temp";
            }
        ));
        assert_eq!(
            defect(unknown),
            Defect::UnknownTarget { bank: Bank::Input, address: 31222, target: "battery_temp" }
        );

        let itself = Profile::new(declaration!(
            "SELF_TARGET",
            input = crate::input_registers! {
                31214: U16_D1, "battery_voltage_vpp", "V", maps_to = "battery_voltage_vpp";
            }
        ));
        assert_eq!(defect(itself), Defect::SelfMapping { bank: Bank::Input, address: 31214 });

        let chained = Profile::new(declaration!(
            "CHAINED",
            input = crate::input_registers! {
                8034: U16_D1, "battery_voltage", "V";
                31214: U16_D1, "battery_voltage_vpp", "V", maps_to = "battery_voltage";
                31300: U16_D1, "battery_voltage_alt", "V", maps_to = "battery_voltage_vpp";
            }
        ));
        assert_eq!(
            defect(chained),
            Defect::ChainedMapping {
                bank: Bank::Input,
                address: 31300,
                target: "battery_voltage_vpp"
            }
        );

        let paired = Profile::new(declaration!(
            "PAIRED_TARGET",
            input = crate::input_registers! {
                1: U16, "x", "";
                5: U16, "a_high", "", pair = 6, maps_to = "x";
                6: U16, "a_low", "", pair = 5, combined = (X1, "W");
            }
        ));
        assert_eq!(defect(paired), Defect::MapsToOnPair { bank: Bank::Input, address: 5 });
    }

    #[test]
    fn rejects_bad_ranges_and_input_access() {
        let range = Profile::new(declaration!(
            "EMPTY_RANGE",
            holding = crate::holding_registers! {
                915: U16_D1, RW, "offgrid_softstart_time", "s", range = (20, 2);
            }
        ));
        assert!(matches!(defect(range), Defect::EmptyRange { address: 915, .. }));

        const WRITABLE_INPUT: &[RegisterEntry] = crate::holding_registers! {
            0: U16, RW, "inverter_status", "";
        };
        let access = Profile::new(declaration!("WRITABLE_INPUT", input = WRITABLE_INPUT));
        assert_eq!(defect(access), Defect::InputAccess { address: 0, access: Access::RW });
    }

    #[test]
    fn rejects_virtual_field_clash() {
        let result = Profile::new(declaration!(
            "VIRTUAL_CLASH",
            input = crate::input_registers! { 8034: U16_D1, "battery_voltage", "V"; },
            holding = &[],
            virtuals = &[VirtualField { bank: Bank::Input, name: "battery_voltage", unit: "V" }]
        ));
        assert_eq!(
            defect(result),
            Defect::VirtualClash { bank: Bank::Input, name: "battery_voltage" }
        );
    }
}
