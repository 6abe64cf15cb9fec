//! Keyword tables for maintenance triage, one set per locale.
//!
//! Matching is plain substring containment against lowercased text, so a
//! keyword also matches inside a longer word ("crack" inside "cracked").

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language used for keyword matching, urgency rules and generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Es];

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }

    /// English name of the language, used in translation prompts.
    pub fn language_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Es => "Spanish",
        }
    }

    /// Keyword tables for this locale.
    pub fn keywords(&self) -> &'static KeywordTables {
        match self {
            Locale::En => &ENGLISH,
            Locale::Es => &SPANISH,
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "es" | "spanish" | "español" | "espanol" => Ok(Locale::Es),
            _ => Err(format!("Unsupported locale: {}", s)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Keyword category scanned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Structural,
    Plumbing,
    Electrical,
    Openings,
    Problems,
    SeverityIndicators,
    Locations,
}

impl Category {
    /// Scan order. Component categories come first.
    pub const ALL: [Category; 7] = [
        Category::Structural,
        Category::Plumbing,
        Category::Electrical,
        Category::Openings,
        Category::Problems,
        Category::SeverityIndicators,
        Category::Locations,
    ];

    /// Whether matches in this category count as building components.
    pub fn is_component(&self) -> bool {
        matches!(
            self,
            Category::Structural | Category::Plumbing | Category::Electrical | Category::Openings
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Structural => "structural",
            Category::Plumbing => "plumbing",
            Category::Electrical => "electrical",
            Category::Openings => "openings",
            Category::Problems => "problems",
            Category::SeverityIndicators => "severity_indicators",
            Category::Locations => "locations",
        }
    }
}

/// Category → keyword mapping for a single locale.
#[derive(Debug)]
pub struct KeywordTables {
    pub structural: &'static [&'static str],
    pub plumbing: &'static [&'static str],
    pub electrical: &'static [&'static str],
    pub openings: &'static [&'static str],
    pub problems: &'static [&'static str],
    pub severity_indicators: &'static [&'static str],
    pub locations: &'static [&'static str],
}

impl KeywordTables {
    pub fn category(&self, category: Category) -> &'static [&'static str] {
        match category {
            Category::Structural => self.structural,
            Category::Plumbing => self.plumbing,
            Category::Electrical => self.electrical,
            Category::Openings => self.openings,
            Category::Problems => self.problems,
            Category::SeverityIndicators => self.severity_indicators,
            Category::Locations => self.locations,
        }
    }
}

pub static ENGLISH: KeywordTables = KeywordTables {
    structural: &[
        "wall", "ceiling", "floor", "foundation", "beam", "drywall", "concrete", "structural",
        "support", "joist", "stud", "framing", "subfloor", "tile", "linoleum", "carpet",
        "baseboard", "trim", "molding",
    ],
    plumbing: &[
        "pipe", "leak", "faucet", "sink", "toilet", "drain", "water", "valve", "plumbing",
        "sewer", "vent", "supply line", "drain line", "p-trap", "shower", "bathtub",
        "water heater", "garbage disposal",
    ],
    electrical: &[
        "wire", "outlet", "switch", "breaker", "electrical", "circuit", "wiring", "socket",
        "fixture", "panel", "conduit", "junction box", "light", "lamp", "ceiling fan",
        "appliance",
    ],
    openings: &[
        "door", "window", "frame", "hinge", "lock", "handle", "knob", "sliding", "patio",
        "screen", "glass", "pane", "threshold",
    ],
    problems: &[
        "broken", "cracked", "damaged", "leaking", "stained", "corroded", "rusted", "mold",
        "mildew", "rotten", "decayed", "worn", "frayed", "bent", "warped", "sagging", "loose",
        "detached", "missing", "hole", "gap", "crack", "fracture", "split", "shattered",
        "exposed", "uncovered", "revealed", "visible", "showing",
    ],
    severity_indicators: &[
        "large", "big", "major", "severe", "significant", "extensive", "serious", "critical",
        "urgent", "hazard", "danger", "risk", "unsafe", "emergency", "collapse", "flooding",
        "overflow",
    ],
    locations: &[
        "bathroom", "kitchen", "basement", "garage", "under sink", "utility", "laundry",
        "mechanical", "closet", "pantry", "bedroom", "living room", "exterior", "interior",
        "attic", "crawlspace", "hallway",
    ],
};

pub static SPANISH: KeywordTables = KeywordTables {
    structural: &[
        "pared", "muro", "techo", "cielorraso", "piso", "suelo", "cimiento", "viga", "yeso",
        "hormigón", "concreto", "estructura", "soporte", "vigueta", "azulejo", "baldosa",
        "alfombra", "zócalo", "moldura",
    ],
    plumbing: &[
        "tubería", "tubo", "fuga", "grifo", "lavabo", "fregadero", "inodoro", "desagüe", "agua",
        "válvula", "fontanería", "alcantarilla", "ducha", "bañera", "calentador",
        "triturador",
    ],
    electrical: &[
        "cable", "enchufe", "toma de corriente", "interruptor", "disyuntor", "eléctric",
        "circuito", "cableado", "luminaria", "tablero", "conducto", "caja de conexiones",
        "lámpara", "ventilador de techo", "electrodoméstico",
    ],
    openings: &[
        "puerta", "ventana", "marco", "bisagra", "cerradura", "manija", "pomo", "corredera",
        "mosquitera", "vidrio", "cristal", "umbral",
    ],
    problems: &[
        "roto", "rota", "agrietad", "dañad", "goteando", "gotea", "manchad", "corroíd",
        "oxidad", "moho", "hongo", "podrid", "desgastad", "deshilachad", "doblad", "deformad",
        "hundid", "suelto", "suelta", "despegad", "falta", "agujero", "hueco", "grieta",
        "fractura", "partid", "destrozad", "expuest", "visible",
    ],
    severity_indicators: &[
        "grande", "enorme", "mayor", "grave", "severo", "significativ", "extens", "serio",
        "crític", "urgente", "peligr", "riesgo", "insegur", "emergencia", "colapso",
        "inundación", "desborde",
    ],
    locations: &[
        "baño", "cocina", "sótano", "garaje", "bajo el fregadero", "lavandería",
        "cuarto de máquinas", "armario", "despensa", "dormitorio", "sala de estar", "exterior",
        "interior", "ático", "desván", "pasillo",
    ],
};
