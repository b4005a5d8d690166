use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use tracing::{error, info};

use crate::codec::{self, OwnedReading, RegisterBuffer, RegisterWrite, WriteValue};
use crate::error::{Defect, Error};
use crate::profile::{Profile, ProfileDeclaration};
use crate::registers::Bank;

/// Validated profiles by key.
#[derive(Debug)]
pub struct Registry {
    profiles: BTreeMap<&'static str, Arc<Profile>>,
}

impl Registry {
    /// Validate every declaration. Any structural defect rejects the registry as a whole.
    pub fn new(
        declarations: impl IntoIterator<Item = &'static ProfileDeclaration>,
    ) -> Result<Self, Error> {
        let mut profiles = BTreeMap::new();
        for declaration in declarations {
            let profile = Profile::new(declaration)?;
            if profiles.insert(declaration.key, Arc::new(profile)).is_some() {
                return Err(Error::InvalidProfile {
                    profile: declaration.key,
                    defect: Defect::DuplicateKey,
                });
            }
        }
        Ok(Self { profiles })
    }

    /// The process-wide registry of built-in profiles, validated on first use.
    pub fn builtin() -> Result<&'static Registry, Error> {
        static BUILTIN: OnceLock<Result<Registry, Error>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                let registry = Registry::new(crate::profiles::BUILTIN.iter().copied());
                match &registry {
                    Ok(registry) => info!(message = "profile registry ready", profiles = registry.profiles.len()),
                    Err(error) => error!(message = "built-in profiles are invalid", %error),
                }
                registry
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn load(&self, key: &str) -> Result<Arc<Profile>, Error> {
        self.profiles
            .get(key)
            .cloned()
            .ok_or_else(|| Error::UnknownProfile(key.to_owned()))
    }

    /// Profiles in key order.
    pub fn profiles(&self) -> impl Iterator<Item = &Arc<Profile>> {
        self.profiles.values()
    }

    /// Decode one window of raw words into readings by field name.
    pub fn decode(
        &self,
        key: &str,
        bank: Bank,
        base: u16,
        words: &[u16],
    ) -> Result<BTreeMap<String, OwnedReading>, Error> {
        let profile = self.load(key)?;
        let buffer = RegisterBuffer::new(base, words)?;
        let decoded = codec::decode(&profile, bank, &buffer);
        Ok(decoded.iter().map(|(name, reading)| (name.to_owned(), OwnedReading::from(reading))).collect())
    }

    pub fn encode(
        &self,
        key: &str,
        bank: Bank,
        field: &str,
        value: impl Into<WriteValue>,
    ) -> Result<RegisterWrite, Error> {
        let profile = self.load(key)?;
        codec::encode(&profile, bank, field, &value.into())
    }
}
