/// Rational multiplier turning a raw register integer into a physical value.
///
/// Kept as a ratio rather than a float so that decoding divides exactly once and the result is the
/// correctly rounded value of `raw * numerator / denominator`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scale {
    numerator: u32,
    denominator: u32,
}

impl Scale {
    // Short names keep the register tables below tabulated.
    pub const X1: Self = Self::new(1, 1);
    pub const D1: Self = Self::new(1, 10);
    pub const D2: Self = Self::new(1, 100);
    pub const X05: Self = Self::new(1, 20);

    pub const fn new(numerator: u32, denominator: u32) -> Self {
        assert!(numerator != 0 && denominator != 0, "malformed Scale");
        Self { numerator, denominator }
    }

    pub const fn numerator(&self) -> u32 {
        self.numerator
    }

    pub const fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Physical value of a (sign-extended) raw integer.
    pub fn apply(&self, raw: i64) -> f64 {
        (i128::from(raw) * i128::from(self.numerator)) as f64 / f64::from(self.denominator)
    }

    /// Raw integer (before rounding) that represents the physical value.
    pub fn invert(&self, physical: f64) -> f64 {
        physical * f64::from(self.denominator) / f64::from(self.numerator)
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}", self.as_f64()))
    }
}

impl serde::Serialize for Scale {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

#[derive(Clone, Copy, Debug, serde::Serialize, PartialEq, Eq)]
pub struct DataType {
    scale: Scale,
    signed: bool,
}

impl DataType {
    // Convenience aliases for nicely tabulated register tables. `D1` and `D2` carry one and two
    // decimal places, `X05` counts in steps of 0.05.
    pub const U16: Self = Self {
        scale: Scale::X1,
        signed: false,
    };
    pub const I16: Self = Self {
        scale: Scale::X1,
        signed: true,
    };
    pub const U16_D1: Self = Self {
        scale: Scale::D1,
        signed: false,
    };
    pub const I16_D1: Self = Self {
        scale: Scale::D1,
        signed: true,
    };
    pub const U16_D2: Self = Self {
        scale: Scale::D2,
        signed: false,
    };
    pub const U16_X05: Self = Self {
        scale: Scale::X05,
        signed: false,
    };

    pub const fn new(scale: Scale, signed: bool) -> Self {
        Self { scale, signed }
    }

    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    pub const fn scale(&self) -> Scale {
        self.scale
    }

    /// Interpret a register word, sign-extending it when the type is signed.
    pub fn integer(&self, word: u16) -> i64 {
        if self.signed { i64::from(word as i16) } else { i64::from(word) }
    }

    pub fn value(&self, word: u16) -> f64 {
        self.scale.apply(self.integer(word))
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.signed { "S/" } else { "U/" })?;
        f.write_fmt(format_args!("{}", self.scale))?;
        Ok(())
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, strum::Display, strum::EnumString,
)]
pub enum Access {
    R,
    W,
    RW,
    RO,
}

impl Access {
    // Two-character aliases for the tabulated holding register tables.
    pub const R_: Self = Self::R;
    pub const W_: Self = Self::W;

    pub const fn is_readable(&self) -> bool {
        !matches!(self, Self::W)
    }

    pub const fn is_writable(&self) -> bool {
        matches!(self, Self::W | Self::RW)
    }
}

/// The two Modbus register address spaces.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::VariantArray,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Bank {
    /// Read-only telemetry, function code 4.
    Input,
    /// Configuration, function codes 3, 6 and 16.
    Holding,
}

/// Scale and unit of the 32-bit value synthesized from a register pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Combined {
    pub scale: Scale,
    pub unit: &'static str,
}

/// Inclusive bounds on the physical value accepted for a write.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
}

impl ValidRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// One declared 16-bit register slot.
///
/// Tables of these are written with [`input_registers!`](crate::input_registers) and
/// [`holding_registers!`](crate::holding_registers) and validated when a
/// [`Profile`](crate::profile::Profile) is built from them.
#[derive(Debug, PartialEq)]
pub struct RegisterEntry {
    pub address: u16,
    pub name: &'static str,
    pub data_type: DataType,
    pub unit: &'static str,
    pub access: Access,
    pub alias: Option<&'static str>,
    /// Partner address of a 32-bit pair. The lower address of the two holds the high word.
    pub pair: Option<u16>,
    pub combined: Option<Combined>,
    /// Canonical field this register is an alternate source for.
    pub maps_to: Option<&'static str>,
    pub valid_range: Option<ValidRange>,
    pub values: &'static [(u16, &'static str)],
    /// Documented raw value, only compared by the explicit self-test.
    pub default: Option<u16>,
    pub description: Option<&'static str>,
}

impl RegisterEntry {
    pub fn label(&self, code: u16) -> Option<&'static str> {
        self.values.iter().find(|(c, _)| *c == code).map(|(_, label)| *label)
    }

    pub fn code(&self, label: &str) -> Option<u16> {
        self.values.iter().find(|(_, l)| *l == label).map(|(code, _)| *code)
    }

    pub fn is_enumerated(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn is_paired(&self) -> bool {
        self.pair.is_some()
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! optional {
    () => {
        None
    };
    ($($lit: tt)+) => {
        Some($($lit)*)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! register_entry {
    (
        $address: literal, $dt: ident, $access: ident, $name: literal, $unit: literal,
        [$($alias: literal)?], [$($pair: literal)?], [$($cscale: ident, $cunit: literal)?],
        [$($maps_to: literal)?], [$($min: literal, $max: literal)?],
        [$($code: literal => $label: literal),*], [$($default: literal)?], [$($desc: literal)?]
    ) => {
        $crate::registers::RegisterEntry {
            address: $address,
            name: $name,
            data_type: $crate::registers::DataType::$dt,
            unit: $unit,
            access: $crate::registers::Access::$access,
            alias: $crate::optional!($($alias)?),
            pair: $crate::optional!($($pair)?),
            combined: $crate::optional!($($crate::registers::Combined {
                scale: $crate::registers::Scale::$cscale,
                unit: $cunit,
            })?),
            maps_to: $crate::optional!($($maps_to)?),
            valid_range: $crate::optional!($($crate::registers::ValidRange {
                min: $min as f64,
                max: $max as f64,
            })?),
            values: &[$(($code, $label)),*],
            default: $crate::optional!($($default)?),
            description: $crate::optional!($($desc)?),
        }
    };
}

/// Declare an input register table.
///
/// Input registers are always read-only, so the table has no access column:
///
/// ```
/// static TABLE: &[growatt_profile_tools::registers::RegisterEntry] = growatt_profile_tools::input_registers! {
///     3: U16_D1, "pv1_voltage", "V";
///     5: U16, "pv1_power_high", "", pair = 6;
///     6: U16, "pv1_power_low", "", pair = 5, combined = (D1, "W");
/// };
/// assert_eq!(TABLE.len(), 3);
/// ```
#[macro_export]
macro_rules! input_registers {
    ($(
        $address: literal: $dt: ident, $name: literal, $unit: literal
        $(, alias = $alias: literal)?
        $(, pair = $pair: literal)?
        $(, combined = ($cscale: ident, $cunit: literal))?
        $(, maps_to = $maps_to: literal)?
        $(, range = ($min: literal, $max: literal))?
        $(, values = { $($code: literal => $label: literal),+ $(,)? })?
        $(, default = $default: literal)?
        $(, desc = $desc: literal)?;
    )*) => {
        &[$(
            $crate::register_entry!(
                $address, $dt, R_, $name, $unit,
                [$($alias)?], [$($pair)?], [$($cscale, $cunit)?], [$($maps_to)?],
                [$($min, $max)?], [$($($code => $label),+)?], [$($default)?], [$($desc)?]
            )
        ),*]
    };
}

/// Declare a holding register table. The column after the data type is the access mode (`R_`,
/// `W_`, `RW` or `RO`).
#[macro_export]
macro_rules! holding_registers {
    ($(
        $address: literal: $dt: ident, $access: ident, $name: literal, $unit: literal
        $(, alias = $alias: literal)?
        $(, pair = $pair: literal)?
        $(, combined = ($cscale: ident, $cunit: literal))?
        $(, maps_to = $maps_to: literal)?
        $(, range = ($min: literal, $max: literal))?
        $(, values = { $($code: literal => $label: literal),+ $(,)? })?
        $(, default = $default: literal)?
        $(, desc = $desc: literal)?;
    )*) => {
        &[$(
            $crate::register_entry!(
                $address, $dt, $access, $name, $unit,
                [$($alias)?], [$($pair)?], [$($cscale, $cunit)?], [$($maps_to)?],
                [$($min, $max)?], [$($($code => $label),+)?], [$($default)?], [$($desc)?]
            )
        ),*]
    };
}
