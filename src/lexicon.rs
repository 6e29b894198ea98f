//! Static vocabulary used by the rule classifier and concept extractor.
//!
//! All entries are lowercase; they are matched against normalized text.

/// Symptom vocabulary (English plus common Hinglish terms)
pub const COMPLAINT_TOKENS: &[&str] = &[
    "fever",
    "cough",
    "cold",
    "headache",
    "pain",
    "ache",
    "aches",
    "vomiting",
    "vomit",
    "nausea",
    "diarrhea",
    "diarrhoea",
    "dizziness",
    "dizzy",
    "fatigue",
    "tired",
    "weakness",
    "breathlessness",
    "shortness of breath",
    "wheezing",
    "rash",
    "itching",
    "swelling",
    "sore throat",
    "chest pain",
    "back pain",
    "stomach ache",
    "loose motion",
    "loose motions",
    "burning",
    "bleeding",
    "chills",
    "body ache",
    "congestion",
    "runny nose",
    "sneezing",
    "constipation",
    "palpitations",
    "insomnia",
    "cramps",
    // Hinglish
    "bukhar",
    "khansi",
    "dard",
    "sar dard",
    "pet dard",
    "ulti",
    "chakkar",
    "kamzori",
    "jukam",
    "zukam",
    "khujli",
    "dast",
];

/// Leading verbs that mark an instruction
pub const IMPERATIVE_VERBS: &[&str] = &[
    "take", "start", "continue", "stop", "avoid", "drink", "apply", "use", "wear", "rest",
    "monitor", "increase", "reduce", "schedule", "follow", "come",
];

/// Phrases anywhere in the sentence that mark an instruction addressed to the patient
pub const ADVICE_CUES: &[&str] = &["you should", "you need to", "please", "kindly"];

/// Dosage-frequency and follow-up vocabulary
pub const ADVICE_PHRASES: &[&str] = &[
    "once daily",
    "twice daily",
    "thrice daily",
    "once a day",
    "twice a day",
    "three times a day",
    "times a day",
    "every morning",
    "every night",
    "at bedtime",
    "at night",
    "before food",
    "after food",
    "with food",
    "before meals",
    "after meals",
    "empty stomach",
    "follow-up",
    "follow up",
    "review after",
    "revisit",
    "bid",
    "tid",
    "qid",
    "sos",
    "as needed",
    "tablet",
    "tablets",
    "capsule",
    "capsules",
    "syrup",
    "drops",
    "ointment",
    "plenty of fluids",
    "salt water gargle",
];

/// First-person symptom narrative cues
pub const FIRST_PERSON_CUES: &[&str] = &[
    "i have",
    "i've",
    "i had",
    "i feel",
    "i am feeling",
    "i'm feeling",
    "i am having",
    "i'm having",
    "i get",
    "my",
    "since",
    "for",
    "suffering",
    "complains of",
    "c/o",
    "mujhe",
    "ho raha",
];

/// Tokens that negate a following symptom
pub const NEGATION_CUES: &[&str] = &[
    "no", "not", "denies", "deny", "denied", "without", "never", "nil", "nahi", "nahin", "na",
];

/// How many tokens after a negation cue are inspected for a symptom
pub const NEGATION_WINDOW: usize = 5;

/// A local concept-code entry: one code, its display name, and spoken synonyms
#[derive(Debug, Clone, Copy)]
pub struct ConceptEntry {
    pub code: &'static str,
    pub display: &'static str,
    pub synonyms: &'static [&'static str],
}

/// SNOMED CT codes for common presenting complaints
pub const CONCEPT_TABLE: &[ConceptEntry] = &[
    ConceptEntry {
        code: "386661006",
        display: "Fever",
        synonyms: &["fever", "pyrexia", "bukhar"],
    },
    ConceptEntry {
        code: "49727002",
        display: "Cough",
        synonyms: &["cough", "khansi"],
    },
    ConceptEntry {
        code: "25064002",
        display: "Headache",
        synonyms: &["headache", "sar dard"],
    },
    ConceptEntry {
        code: "162397003",
        display: "Pain in throat",
        synonyms: &["sore throat", "throat pain"],
    },
    ConceptEntry {
        code: "21522001",
        display: "Abdominal pain",
        synonyms: &["abdominal pain", "stomach ache", "stomach pain", "pet dard"],
    },
    ConceptEntry {
        code: "422400008",
        display: "Vomiting",
        synonyms: &["vomiting", "ulti"],
    },
    ConceptEntry {
        code: "422587007",
        display: "Nausea",
        synonyms: &["nausea"],
    },
    ConceptEntry {
        code: "62315008",
        display: "Diarrhea",
        synonyms: &["diarrhea", "diarrhoea", "loose motion", "dast"],
    },
    ConceptEntry {
        code: "404640003",
        display: "Dizziness",
        synonyms: &["dizziness", "chakkar"],
    },
    ConceptEntry {
        code: "84229001",
        display: "Fatigue",
        synonyms: &["fatigue", "tiredness", "kamzori"],
    },
    ConceptEntry {
        code: "267036007",
        display: "Dyspnea",
        synonyms: &["shortness of breath", "breathlessness"],
    },
    ConceptEntry {
        code: "29857009",
        display: "Chest pain",
        synonyms: &["chest pain"],
    },
    ConceptEntry {
        code: "161891005",
        display: "Backache",
        synonyms: &["back pain", "backache"],
    },
    ConceptEntry {
        code: "271807003",
        display: "Eruption of skin",
        synonyms: &["rash"],
    },
    ConceptEntry {
        code: "64531003",
        display: "Nasal discharge",
        synonyms: &["runny nose", "jukam", "zukam"],
    },
    ConceptEntry {
        code: "68962001",
        display: "Muscle pain",
        synonyms: &["body ache", "myalgia"],
    },
    ConceptEntry {
        code: "14760008",
        display: "Constipation",
        synonyms: &["constipation"],
    },
    ConceptEntry {
        code: "80313002",
        display: "Palpitations",
        synonyms: &["palpitations"],
    },
];

/// True when `phrase` occurs in `text` on word boundaries.
///
/// A boundary is the string edge or any char that is not alphanumeric. Phrases
/// may contain spaces, hyphens or slashes.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(pos) = text[from..].find(phrase) {
        let start = from + pos;
        let end = start + phrase.len();
        let before_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        // Advance past the first char of this occurrence
        from = start + text[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

pub fn contains_any_phrase(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| contains_phrase(text, p))
}

/// Strip surrounding punctuation from a whitespace token
pub fn clean_token(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
}

pub fn is_negation_cue(token: &str) -> bool {
    NEGATION_CUES.contains(&clean_token(token))
}
