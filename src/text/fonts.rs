use std::collections::HashMap;

use crate::foundation::error::{LaminaError, LaminaResult};

/// Allow-listed font families a text layer may use.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Inter,
    Montserrat,
    PlayfairDisplay,
    BebasNeue,
    Oswald,
    Lobster,
    Pacifico,
    RobotoMono,
}

impl FontFamily {
    pub const ALL: [FontFamily; 8] = [
        FontFamily::Inter,
        FontFamily::Montserrat,
        FontFamily::PlayfairDisplay,
        FontFamily::BebasNeue,
        FontFamily::Oswald,
        FontFamily::Lobster,
        FontFamily::Pacifico,
        FontFamily::RobotoMono,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            FontFamily::Inter => "inter",
            FontFamily::Montserrat => "montserrat",
            FontFamily::PlayfairDisplay => "playfair-display",
            FontFamily::BebasNeue => "bebas-neue",
            FontFamily::Oswald => "oswald",
            FontFamily::Lobster => "lobster",
            FontFamily::Pacifico => "pacifico",
            FontFamily::RobotoMono => "roboto-mono",
        }
    }

    pub fn from_slug(s: &str) -> LaminaResult<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.slug() == s)
            .ok_or_else(|| LaminaError::validation(format!("font family \"{s}\" is not allowed")))
    }

    /// Average advance of a glyph relative to the font size, used when no face is registered.
    pub(crate) fn approx_advance(self) -> f32 {
        match self {
            FontFamily::BebasNeue | FontFamily::Oswald => 0.44,
            FontFamily::RobotoMono => 0.60,
            FontFamily::Montserrat => 0.62,
            FontFamily::PlayfairDisplay | FontFamily::Lobster => 0.52,
            FontFamily::Pacifico => 0.58,
            FontFamily::Inter => 0.55,
        }
    }
}

/// Face registered for one allow-listed family.
#[derive(Clone)]
pub(crate) struct RegisteredFace {
    /// Family name as reported by the font itself; used for parley font stacks.
    pub(crate) family_name: String,
    pub(crate) font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for RegisteredFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredFace")
            .field("family_name", &self.family_name)
            .finish()
    }
}

/// Host-supplied font faces keyed by allow-listed family.
#[derive(Debug, Default)]
pub(crate) struct FontBook {
    faces: HashMap<FontFamily, RegisteredFace>,
}

impl FontBook {
    pub(crate) fn insert(&mut self, family: FontFamily, face: RegisteredFace) {
        self.faces.insert(family, face);
    }

    pub(crate) fn get(&self, family: FontFamily) -> Option<&RegisteredFace> {
        self.faces.get(&family)
    }

    pub(crate) fn contains(&self, family: FontFamily) -> bool {
        self.faces.contains_key(&family)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
