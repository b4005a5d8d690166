pub mod profiles {
    use crate::output::{self, Record};
    use crate::registry::Registry;

    /// List the built-in register profiles.
    #[derive(clap::Parser)]
    pub struct Args {
        #[clap(flatten)]
        output: output::Args,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("could not load the profile registry")]
        Registry(#[source] crate::Error),
        #[error("could not output profiles")]
        Output(#[source] output::Error),
    }

    #[derive(serde::Serialize)]
    pub struct ProfileSummary {
        pub key: &'static str,
        pub name: &'static str,
        pub description: &'static str,
        pub notes: &'static str,
    }

    impl Record for ProfileSummary {
        const HEADERS: &'static [&'static str] = &["Key", "Name", "Description", "Notes"];
        fn row(&self) -> Vec<String> {
            vec![
                self.key.to_string(),
                self.name.to_string(),
                self.description.to_string(),
                self.notes.to_string(),
            ]
        }
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let registry = Registry::builtin().map_err(Error::Registry)?;
        let mut output = args.output.to_output::<ProfileSummary>().map_err(Error::Output)?;
        for profile in registry.profiles() {
            let summary = ProfileSummary {
                key: profile.key(),
                name: profile.name(),
                description: profile.description(),
                notes: profile.notes(),
            };
            output.record(&summary).map_err(Error::Output)?;
        }
        output.commit().map_err(Error::Output)
    }
}

pub mod registers {
    use crate::output::{self, Record};
    use crate::registers::{Access, Bank, DataType, RegisterEntry, ValidRange};
    use crate::registry::Registry;
    use strum::VariantArray as _;

    /// Search and output the register declarations of a profile.
    #[derive(clap::Parser)]
    pub struct Args {
        /// Profile key, as listed by the `profiles` command.
        profile: String,
        /// Only list registers of this bank.
        #[arg(long, short, value_enum)]
        bank: Option<Bank>,
        /// Case-insensitive substring of the name, alias, description or address.
        filter: Option<String>,
        #[clap(flatten)]
        output: output::Args,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("could not load the register profile")]
        Profile(#[source] crate::Error),
        #[error("could not output registers")]
        Output(#[source] output::Error),
    }

    #[derive(serde::Serialize)]
    pub struct RegisterSchema {
        pub bank: Bank,
        pub address: u16,
        pub name: &'static str,
        pub alias: Option<&'static str>,
        pub data_type: DataType,
        pub unit: &'static str,
        pub access: Access,
        pub pair: Option<u16>,
        pub combined: Option<String>,
        pub maps_to: Option<&'static str>,
        pub valid_range: Option<ValidRange>,
        pub values: Vec<String>,
        pub default: Option<u16>,
        pub description: Option<&'static str>,
    }

    impl RegisterSchema {
        pub fn new(bank: Bank, entry: &'static RegisterEntry) -> Self {
            RegisterSchema {
                bank,
                address: entry.address,
                name: entry.name,
                alias: entry.alias,
                data_type: entry.data_type,
                unit: entry.unit,
                access: entry.access,
                pair: entry.pair,
                combined: entry.combined.map(|c| format!("{} {}", c.scale, c.unit)),
                maps_to: entry.maps_to,
                valid_range: entry.valid_range,
                values: entry.values.iter().map(|(code, label)| format!("{code}={label}")).collect(),
                default: entry.default,
                description: entry.description,
            }
        }

        pub fn is_match(&self, pattern: &str) -> bool {
            let pattern = pattern.to_lowercase();
            let fields = [Some(self.name), self.alias, self.description];
            if fields.into_iter().flatten().any(|f| f.to_lowercase().contains(&pattern)) {
                return true;
            }
            self.address.to_string().contains(&pattern)
        }
    }

    impl Record for RegisterSchema {
        const HEADERS: &'static [&'static str] = &[
            "Bank",
            "Address",
            "Name",
            "Alias",
            "Type",
            "Unit",
            "Access",
            "Pair",
            "Maps to",
            "Range",
            "Values",
            "Description",
        ];
        fn row(&self) -> Vec<String> {
            let pair = match (self.pair, &self.combined) {
                (Some(partner), Some(combined)) => format!("{partner} ({combined})"),
                (Some(partner), None) => partner.to_string(),
                (None, _) => String::new(),
            };
            vec![
                self.bank.to_string(),
                self.address.to_string(),
                self.name.to_string(),
                self.alias.unwrap_or_default().to_string(),
                self.data_type.to_string(),
                self.unit.to_string(),
                self.access.to_string(),
                pair,
                self.maps_to.unwrap_or_default().to_string(),
                self.valid_range.map(|r| format!("{}..={}", r.min, r.max)).unwrap_or_default(),
                self.values.join(", "),
                self.description.unwrap_or_default().to_string(),
            ]
        }
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let registry = Registry::builtin().map_err(Error::Profile)?;
        let profile = registry.load(&args.profile).map_err(Error::Profile)?;
        let mut output = args.output.to_output::<RegisterSchema>().map_err(Error::Output)?;
        for &bank in Bank::VARIANTS {
            if args.bank.is_some_and(|b| b != bank) {
                continue;
            }
            for &entry in profile.bank(bank).entries() {
                let schema = RegisterSchema::new(bank, entry);
                if let Some(pattern) = &args.filter {
                    if !schema.is_match(pattern) {
                        continue;
                    }
                }
                output.record(&schema).map_err(Error::Output)?;
            }
        }
        output.commit().map_err(Error::Output)
    }
}

pub mod decode {
    use crate::codec::{self, DefaultMismatch, Label, Raw, RegisterBuffer};
    use crate::output::{self, Record};
    use crate::registers::Bank;
    use crate::registry::Registry;

    /// One window of raw register words, written as `BASE=WORD,WORD,...`.
    #[derive(Clone, Debug, PartialEq)]
    pub struct Window {
        pub base: u16,
        pub words: Vec<u16>,
    }

    fn parse_word(s: &str) -> Result<u16, String> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u16::from_str_radix(hex, 16),
            None => s.parse(),
        };
        parsed.map_err(|e| format!("`{s}` is not a register word: {e}"))
    }

    pub fn parse_window(s: &str) -> Result<Window, String> {
        let (base, words) = s.split_once('=').ok_or("expected BASE=WORD,WORD,...")?;
        let words = match words.trim() {
            "" => Vec::new(),
            words => words.split(',').map(parse_word).collect::<Result<_, _>>()?,
        };
        Ok(Window { base: parse_word(base)?, words })
    }

    /// Decode raw register words with a profile.
    #[derive(clap::Parser)]
    pub struct Args {
        /// Profile key, as listed by the `profiles` command.
        profile: String,
        #[arg(long, short, value_enum)]
        bank: Bank,
        /// Words read starting at an address, e.g. `31200=0,121` or `0=0x1,0x0`. May be repeated.
        #[arg(long, short, required = true, value_parser = parse_window)]
        window: Vec<Window>,
        /// Instead of the decoded values, list registers that differ from their documented
        /// default value.
        #[arg(long)]
        check_defaults: bool,
        #[clap(flatten)]
        output: output::Args,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("could not load the register profile")]
        Profile(#[source] crate::Error),
        #[error("could not assemble the register windows")]
        Buffer(#[source] crate::Error),
        #[error("could not output decoded values")]
        Output(#[source] output::Error),
    }

    #[derive(serde::Serialize)]
    pub struct DecodedValue<'p> {
        pub field: &'p str,
        pub value: f64,
        pub unit: &'static str,
        pub label: Option<Label>,
        pub raw: Raw,
        pub source: &'p str,
    }

    impl Record for DecodedValue<'_> {
        const HEADERS: &'static [&'static str] = &["Field", "Value", "Unit", "Label", "Raw", "Source"];
        fn row(&self) -> Vec<String> {
            vec![
                self.field.to_string(),
                self.value.to_string(),
                self.unit.to_string(),
                self.label.map(|l| l.to_string()).unwrap_or_default(),
                self.raw.to_string(),
                self.source.to_string(),
            ]
        }
    }

    impl Record for DefaultMismatch {
        const HEADERS: &'static [&'static str] = &["Address", "Name", "Expected", "Actual"];
        fn row(&self) -> Vec<String> {
            vec![
                self.address.to_string(),
                self.name.to_string(),
                self.expected.to_string(),
                self.actual.to_string(),
            ]
        }
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let registry = Registry::builtin().map_err(Error::Profile)?;
        let profile = registry.load(&args.profile).map_err(Error::Profile)?;
        let buffer = RegisterBuffer::from_windows(args.window.iter().map(|w| (w.base, &w.words[..])))
            .map_err(Error::Buffer)?;
        if args.check_defaults {
            let mut output = args.output.to_output::<DefaultMismatch>().map_err(Error::Output)?;
            for mismatch in codec::check_defaults(&profile, args.bank, &buffer) {
                tracing::warn!(
                    message = "register differs from its documented default",
                    address = mismatch.address,
                    expected = mismatch.expected,
                    actual = mismatch.actual,
                );
                output.record(&mismatch).map_err(Error::Output)?;
            }
            return output.commit().map_err(Error::Output);
        }
        let mut output = args.output.to_output::<DecodedValue>().map_err(Error::Output)?;
        for (field, reading) in codec::decode(&profile, args.bank, &buffer).iter() {
            let value = DecodedValue {
                field,
                value: reading.value,
                unit: reading.unit,
                label: reading.label,
                raw: reading.raw,
                source: reading.source,
            };
            output.record(&value).map_err(Error::Output)?;
        }
        output.commit().map_err(Error::Output)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn windows() {
            assert_eq!(
                parse_window("31200=0,121"),
                Ok(Window { base: 31200, words: vec![0, 121] })
            );
            assert_eq!(
                parse_window("0x7D = 0xFFFF, 12"),
                Ok(Window { base: 125, words: vec![65535, 12] })
            );
            assert_eq!(parse_window("8034="), Ok(Window { base: 8034, words: vec![] }));
            assert!(parse_window("8034").is_err());
            assert!(parse_window("8034=65536").is_err());
            assert!(parse_window("8034=1,,2").is_err());
        }
    }
}

pub mod encode {
    use crate::codec::WriteValue;
    use crate::output::{self, Record};
    use crate::registers::Bank;
    use crate::registry::Registry;

    /// Validate a value and print the register words that would be written for it.
    #[derive(clap::Parser)]
    pub struct Args {
        /// Profile key, as listed by the `profiles` command.
        profile: String,
        #[arg(long, short, value_enum, default_value_t = Bank::Holding)]
        bank: Bank,
        field: String,
        /// Physical value, raw code or label of an enumerated field.
        #[arg(allow_hyphen_values = true)]
        value: WriteValue,
        #[clap(flatten)]
        output: output::Args,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("could not load the register profile")]
        Profile(#[source] crate::Error),
        #[error("could not encode `{1}` for `{0}`")]
        Encode(String, WriteValue, #[source] crate::Error),
        #[error("could not output register words")]
        Output(#[source] output::Error),
    }

    #[derive(serde::Serialize)]
    pub struct EncodedWord {
        pub bank: Bank,
        pub address: u16,
        pub word: u16,
    }

    impl Record for EncodedWord {
        const HEADERS: &'static [&'static str] = &["Bank", "Address", "Word", "Hex"];
        fn row(&self) -> Vec<String> {
            vec![
                self.bank.to_string(),
                self.address.to_string(),
                self.word.to_string(),
                format!("{:#06x}", self.word),
            ]
        }
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let registry = Registry::builtin().map_err(Error::Profile)?;
        let profile = registry.load(&args.profile).map_err(Error::Profile)?;
        let write = crate::codec::encode(&profile, args.bank, &args.field, &args.value)
            .map_err(|e| Error::Encode(args.field.clone(), args.value.clone(), e))?;
        let mut output = args.output.to_output::<EncodedWord>().map_err(Error::Output)?;
        for (&address, &word) in write.addresses.iter().zip(&write.words) {
            let record = EncodedWord { bank: write.bank, address, word };
            output.record(&record).map_err(Error::Output)?;
        }
        output.commit().map_err(Error::Output)
    }
}

pub mod plan {
    use crate::output::{self, Record};
    use crate::read_plan::{self, ReadWindow};
    use crate::registers::Bank;
    use crate::registry::Registry;

    /// Print the fewest Modbus reads covering the given fields (all readable fields if none are
    /// given).
    #[derive(clap::Parser)]
    pub struct Args {
        /// Profile key, as listed by the `profiles` command.
        profile: String,
        #[arg(long, short, value_enum)]
        bank: Bank,
        /// Maximum number of registers per read.
        #[arg(long, short = 'm', default_value_t = read_plan::MAX_READ_COUNT)]
        max_len: u16,
        fields: Vec<String>,
        #[clap(flatten)]
        output: output::Args,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("could not load the register profile")]
        Profile(#[source] crate::Error),
        #[error("could not plan the reads")]
        Plan(#[source] crate::Error),
        #[error("could not output the read plan")]
        Output(#[source] output::Error),
    }

    impl Record for ReadWindow {
        const HEADERS: &'static [&'static str] = &["Bank", "Start", "End", "Count"];
        fn row(&self) -> Vec<String> {
            vec![
                self.bank.to_string(),
                self.start.to_string(),
                self.end().to_string(),
                self.count.to_string(),
            ]
        }
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let registry = Registry::builtin().map_err(Error::Profile)?;
        let profile = registry.load(&args.profile).map_err(Error::Profile)?;
        let windows = read_plan::plan_reads(profile.bank(args.bank), &args.fields, args.max_len)
            .map_err(Error::Plan)?;
        let mut output = args.output.to_output::<ReadWindow>().map_err(Error::Output)?;
        for window in &windows {
            output.record(window).map_err(Error::Output)?;
        }
        output.commit().map_err(Error::Output)
    }
}
