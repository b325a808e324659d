use std::{collections::BTreeSet, fmt};

use serde::Serialize;

use crate::{Error, HotkeyBinding, InvalidKind, Key, Modifier, Modifiers, Platform, Result};

/// A binding translated into one platform's codes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolvedBinding {
    /// Platform whose tables produced the codes.
    pub platform: Platform,
    /// Logical modifier set.
    pub modifiers: Modifiers,
    /// Logical primary key.
    pub key: Key,
    /// Platform modifier codes, one per modifier.
    pub modifier_codes: BTreeSet<u32>,
    /// Platform key code.
    pub key_code: u32,
}

impl ResolvedBinding {
    /// Bitwise OR of all modifier codes, the form most OS APIs take.
    pub fn modifier_mask(&self) -> u32 {
        self.modifier_codes.iter().fold(0, |acc, c| acc | c)
    }
}

impl fmt::Display for ResolvedBinding {
    /// Canonical form, modifiers in Ctrl, Alt, Shift, Super order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in self.modifiers.modifiers() {
            write!(f, "{m}+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// Resolves bindings against one platform's code tables.
#[derive(Clone, Debug)]
pub struct Resolver {
    /// Target platform.
    platform: Platform,
    /// Replacement for the platform's default Alt code.
    alt_code: Option<u32>,
}

impl Resolver {
    /// A resolver using `platform`'s default tables.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            alt_code: None,
        }
    }

    /// Override the code used for `Alt`.
    ///
    /// A binding that selects Alt together with a modifier whose code equals
    /// the override fails to resolve with [`InvalidKind::CodeConflict`].
    pub fn with_alt_code(mut self, code: u32) -> Self {
        self.alt_code = Some(code);
        self
    }

    /// Target platform.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    fn modifier_code(&self, m: Modifier) -> u32 {
        match (m, self.alt_code) {
            (Modifier::Alt, Some(code)) => code,
            _ => m.code(self.platform),
        }
    }

    /// Resolve `binding`, failing on the first unrecognized token.
    pub fn resolve(&self, binding: &HotkeyBinding) -> Result<ResolvedBinding> {
        let mut modifiers = Modifiers::empty();
        for token in &binding.modifiers {
            let m = Modifier::from_name(token, self.platform)
                .ok_or_else(|| Error::invalid(token, InvalidKind::UnknownModifier))?;
            modifiers |= Modifiers::from(m);
        }
        if let Some(code) = self.alt_code
            && modifiers.contains(Modifiers::ALT)
            && modifiers
                .modifiers()
                .any(|m| m != Modifier::Alt && m.code(self.platform) == code)
        {
            return Err(Error::invalid(Modifier::Alt.name(), InvalidKind::CodeConflict));
        }
        if binding.key.is_empty() {
            return Err(Error::invalid(&binding.key, InvalidKind::EmptyKey));
        }
        let key = Key::from_name(&binding.key)
            .ok_or_else(|| Error::invalid(&binding.key, InvalidKind::UnknownKey))?;

        Ok(ResolvedBinding {
            platform: self.platform,
            modifiers,
            key,
            modifier_codes: modifiers
                .modifiers()
                .map(|m| self.modifier_code(m))
                .collect(),
            key_code: key.code(self.platform),
        })
    }
}
