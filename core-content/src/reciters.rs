//! Reciter registry.
//!
//! A fixed, curated set of reciters. The edition identifier doubles as the
//! key into the recitation audio API, so the registry is the single place
//! where display names and API parameters meet.

use crate::error::{ContentError, Result};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// An identified narrator whose recorded audio is used for verse playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reciter {
    /// Audio API edition identifier (e.g. `ar.alafasy`).
    pub edition: String,
    /// English display name.
    pub name: String,
    /// Arabic display name.
    pub name_arabic: String,
}

impl Reciter {
    fn new(edition: &str, name: &str, name_arabic: &str) -> Self {
        Self {
            edition: edition.to_string(),
            name: name.to_string(),
            name_arabic: name_arabic.to_string(),
        }
    }
}

static REGISTRY: OnceLock<Vec<Reciter>> = OnceLock::new();

/// The curated reciter list, in presentation order.
pub fn registry() -> &'static [Reciter] {
    REGISTRY.get_or_init(|| {
        vec![
            Reciter::new("ar.alafasy", "Mishary Rashid Alafasy", "مشاري راشد العفاسي"),
            Reciter::new(
                "ar.abdulbasitmurattal",
                "Abdul Basit Abdul Samad",
                "عبد الباسط عبد الصمد",
            ),
            Reciter::new(
                "ar.abdurrahmaansudais",
                "Abdurrahmaan As-Sudais",
                "عبد الرحمن السديس",
            ),
            Reciter::new("ar.husary", "Mahmoud Khalil Al-Husary", "محمود خليل الحصري"),
            Reciter::new(
                "ar.minshawi",
                "Mohamed Siddiq El-Minshawi",
                "محمد صديق المنشاوي",
            ),
            Reciter::new("ar.saoodshuraym", "Saood Ash-Shuraym", "سعود الشريم"),
            Reciter::new("ar.mahermuaiqly", "Maher Al-Muaiqly", "ماهر المعيقلي"),
            Reciter::new("ar.shaatree", "Abu Bakr Ash-Shaatree", "أبو بكر الشاطري"),
            Reciter::new("ar.hanirifai", "Hani Ar-Rifai", "هاني الرفاعي"),
            Reciter::new("ar.ahmedajamy", "Ahmed ibn Ali Al-Ajamy", "أحمد بن علي العجمي"),
        ]
    })
}

/// Look up a reciter by edition identifier.
pub fn by_edition(edition: &str) -> Result<&'static Reciter> {
    registry()
        .iter()
        .find(|reciter| reciter.edition == edition)
        .ok_or_else(|| ContentError::UnknownReciter(edition.to_string()))
}

/// The reciter used when the caller expresses no preference.
pub fn default_reciter() -> &'static Reciter {
    // Registry is non-empty by construction; Alafasy leads the curation.
    &registry()[0]
}
