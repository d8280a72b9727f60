// Dictionary + morphology lemmatizer for English.
//
// Works the way WordNet's morphy does, minus the full lexicon: irregular
// forms come from an exception table, regular inflections are detached by
// suffix rules, and the stem is repaired afterwards (undoubling "runn" → "run",
// restoring the dropped "e" in "mak" → "make"). Output is always a real-word
// base form for the common cases, never a truncated stem like "moviy".
//
// `lemmatize` applies the rules until the word stops changing, so
// lemmatize(lemmatize(w)) == lemmatize(w) for every input.

use std::collections::{HashMap, HashSet};

/// Upper bound on rule applications per word. Every rule either shortens the
/// word or maps it through the exception table, so this is never reached in
/// practice.
const MAX_PASSES: usize = 8;

/// Irregular inflections (nouns and verbs) mapped to their base form.
const EXCEPTIONS: &[(&str, &str)] = &[
    // irregular plurals
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("wolves", "wolf"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("lives", "life"),
    ("leaves", "leaf"),
    ("thieves", "thief"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("selves", "self"),
    ("calves", "calf"),
    ("loaves", "loaf"),
    ("elves", "elf"),
    ("scarves", "scarf"),
    ("hooves", "hoof"),
    ("heroes", "hero"),
    ("potatoes", "potato"),
    ("tomatoes", "tomato"),
    ("echoes", "echo"),
    ("torpedoes", "torpedo"),
    ("volcanoes", "volcano"),
    ("cacti", "cactus"),
    ("fungi", "fungus"),
    ("alumni", "alumnus"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("theses", "thesis"),
    ("oases", "oasis"),
    ("quizzes", "quiz"),
    ("buses", "bus"),
    ("gases", "gas"),
    // irregular verbs
    ("ran", "run"),
    ("went", "go"),
    ("gone", "go"),
    ("going", "go"),
    ("came", "come"),
    ("saw", "see"),
    ("seen", "see"),
    ("took", "take"),
    ("taken", "take"),
    ("gave", "give"),
    ("given", "give"),
    ("found", "find"),
    ("told", "tell"),
    ("knew", "know"),
    ("known", "know"),
    ("thought", "think"),
    ("brought", "bring"),
    ("bought", "buy"),
    ("caught", "catch"),
    ("taught", "teach"),
    ("fought", "fight"),
    ("sought", "seek"),
    ("felt", "feel"),
    ("kept", "keep"),
    ("met", "meet"),
    ("sent", "send"),
    ("spent", "spend"),
    ("built", "build"),
    ("lost", "lose"),
    ("held", "hold"),
    ("stood", "stand"),
    ("understood", "understand"),
    ("wrote", "write"),
    ("written", "write"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("rode", "ride"),
    ("ridden", "ride"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("began", "begin"),
    ("begun", "begin"),
    ("sang", "sing"),
    ("sung", "sing"),
    ("swam", "swim"),
    ("drank", "drink"),
    ("won", "win"),
    ("fled", "flee"),
    ("led", "lead"),
    ("fed", "feed"),
    ("bred", "breed"),
    ("hid", "hide"),
    ("hidden", "hide"),
    ("broke", "break"),
    ("broken", "break"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("stole", "steal"),
    ("stolen", "steal"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("froze", "freeze"),
    ("frozen", "freeze"),
    ("woke", "wake"),
    ("forgot", "forget"),
    ("forgotten", "forget"),
    ("got", "get"),
    ("gotten", "get"),
    ("struck", "strike"),
    ("stuck", "stick"),
    ("dug", "dig"),
    ("hung", "hang"),
    ("shot", "shoot"),
    ("slept", "sleep"),
    ("wept", "weep"),
    ("swept", "sweep"),
    ("crept", "creep"),
    ("dealt", "deal"),
    ("meant", "mean"),
    ("threw", "throw"),
    ("thrown", "throw"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("drew", "draw"),
    ("drawn", "draw"),
    ("flew", "fly"),
    ("flown", "fly"),
    ("blew", "blow"),
    ("wore", "wear"),
    ("worn", "wear"),
    ("tore", "tear"),
    ("torn", "tear"),
    ("swore", "swear"),
    ("shook", "shake"),
    ("forgave", "forgive"),
    ("became", "become"),
    ("overcame", "overcome"),
    ("arose", "arise"),
    ("awoke", "awake"),
    ("paid", "pay"),
    ("said", "say"),
    ("laid", "lay"),
    ("made", "make"),
    ("sat", "sit"),
    ("lit", "light"),
    ("dying", "die"),
    ("lying", "lie"),
    ("tying", "tie"),
    ("using", "use"),
    ("aging", "age"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("is", "be"),
    ("are", "be"),
    ("am", "be"),
    ("has", "have"),
    ("had", "have"),
    ("did", "do"),
    ("done", "do"),
    ("does", "do"),
    // regular forms the suffix rules get wrong
    ("created", "create"),
    ("creating", "create"),
    ("focused", "focus"),
    ("focusing", "focus"),
    ("added", "add"),
    ("adding", "add"),
    ("used", "use"),
    ("united", "unite"),
    ("lenses", "lens"),
];

/// Base forms that look inflected but are not.
const BASE_FORMS: &[&str] = &[
    "news", "series", "species", "physics", "mathematics", "politics", "economics", "ethics",
    "athletics", "gymnastics", "pants", "jeans", "scissors", "thanks", "atlas", "canvas", "bias",
    "alias", "christmas", "texas", "chaos", "cosmos", "ethos", "kudos", "pathos", "lens",
    "hundred", "sacred", "naked", "wicked", "beloved", "kindred", "rugged", "ragged", "crooked",
    "need", "seed", "feed", "breed", "speed", "proceed", "succeed", "exceed", "bleed", "weed",
    "deed", "greed", "heed", "reed", "steed", "tweed", "creed", "indeed", "wedding", "morning",
    "evening", "ceiling", "sibling", "darling", "viking", "pudding", "clothing", "lightning",
    "icing", "herring", "duckling", "earring", "offspring", "building", "nothing", "something",
    "anything", "everything", "during", "always", "perhaps", "sometimes", "afterwards",
    "towards", "backwards", "forwards", "upwards", "downwards", "outwards", "besides",
    "nowadays", "overseas", "whereabouts",
];

/// Nouns whose plural ends in "-ies" but whose singular ends in "-ie".
const IE_NOUNS: &[&str] = &[
    "movie", "cookie", "zombie", "rookie", "hippie", "calorie", "genie", "prairie", "brownie",
    "selfie", "auntie", "goalie", "newbie", "hoodie", "sweetie", "collie", "bootie", "pixie",
    "smoothie", "groupie", "junkie", "yuppie", "boogie",
];

/// Read-only lemmatizer. Build once and share.
pub struct Lemmatizer {
    exceptions: HashMap<&'static str, &'static str>,
    base_forms: HashSet<&'static str>,
    ie_nouns: HashSet<&'static str>,
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer {
    pub fn new() -> Self {
        Self {
            exceptions: EXCEPTIONS.iter().copied().collect(),
            base_forms: BASE_FORMS.iter().copied().collect(),
            ie_nouns: IE_NOUNS.iter().copied().collect(),
        }
    }

    /// Reduce a lowercase word to its base form.
    ///
    /// "running" → "run", "wolves" → "wolf", "lions" → "lion",
    /// "movies" → "movie". Unknown or already-base words come back unchanged.
    pub fn lemmatize(&self, word: &str) -> String {
        let mut current = word.to_string();
        for _ in 0..MAX_PASSES {
            match self.step(&current) {
                Some(next) if next != current => current = next,
                _ => break,
            }
        }
        current
    }

    /// Apply the first matching rule once. `None` means the word is a base form.
    fn step(&self, word: &str) -> Option<String> {
        if let Some(base) = self.exceptions.get(word) {
            return Some((*base).to_string());
        }
        if self.base_forms.contains(word) {
            return None;
        }

        let chars: Vec<char> = word.chars().collect();
        if chars.len() <= 3 {
            return None;
        }

        if let Some(stem) = word.strip_suffix("ies") {
            return Some(self.ie_or_y(stem));
        }
        if let Some(stem) = word.strip_suffix("ied") {
            return Some(self.ie_or_y(stem));
        }
        if word.ends_with("ves") {
            // Irregular -ves plurals live in the exception table; the rest
            // ("moves", "drives") just lose the "s".
            return Some(drop_chars(word, 1));
        }
        for suffix in ["sses", "ches", "shes", "xes", "zzes"] {
            if word.ends_with(suffix) {
                return Some(drop_chars(word, 2));
            }
        }
        if let Some(stem) = word.strip_suffix("ing") {
            if is_detachable(stem) {
                return Some(repair_stem(stem));
            }
            return None;
        }
        if word.ends_with("eed") {
            return Some(drop_chars(word, 1));
        }
        if let Some(stem) = word.strip_suffix("ed") {
            if is_detachable(stem) {
                return Some(repair_stem(stem));
            }
            return None;
        }
        if word.ends_with('s') && !(word.ends_with("ss") || word.ends_with("us") || word.ends_with("is")) {
            return Some(drop_chars(word, 1));
        }

        None
    }

    fn ie_or_y(&self, stem: &str) -> String {
        let with_ie = format!("{stem}ie");
        if stem.chars().count() <= 1 || self.ie_nouns.contains(with_ie.as_str()) {
            with_ie
        } else {
            format!("{stem}y")
        }
    }
}

/// A stem left after stripping "-ing"/"-ed" must be long enough and contain a
/// vowel, otherwise the suffix was part of the word ("king", "string", "bed").
fn is_detachable(stem: &str) -> bool {
    stem.chars().count() >= 3 && stem.chars().any(|c| is_vowel_char(c) || c == 'y')
}

/// Undo consonant doubling or restore a silent "e" dropped by inflection.
fn repair_stem(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    let last = chars[n - 1];
    let prev = chars[n - 2];

    // stopp → stop, runn → run
    if last == prev && "bdgmnprt".contains(last) {
        return chars[..n - 1].iter().collect();
    }

    if needs_silent_e(&chars) {
        let mut restored = stem.to_string();
        restored.push('e');
        return restored;
    }

    stem.to_string()
}

fn needs_silent_e(chars: &[char]) -> bool {
    let n = chars.len();
    let last = chars[n - 1];
    let prev = chars[n - 2];
    let stem: String = chars.iter().collect();
    let cons_before = |offset: usize| n > offset && is_consonant(chars, n - 1 - offset);

    // No English base form ends in these.
    if last == 'v' || last == 'u' {
        return true;
    }
    if last == 'c' && cons_before(1) {
        return true;
    }
    if stem.ends_with("rg") || stem.ends_with("dg") || stem.ends_with("iz") || stem.ends_with("com") {
        return true;
    }
    if last == 'z' && is_vowel_char(prev) {
        return true;
    }
    if stem.ends_with("us") {
        return true;
    }
    if last == 's' && prev != 's' && cons_before(1) {
        return true;
    }
    if last == 'l' && cons_before(1) && !"lrwn".contains(prev) {
        return true;
    }
    if stem.ends_with("chang") || stem.ends_with("rang") || stem.ends_with("lleng") {
        return true;
    }
    if (stem.ends_with("ir") || stem.ends_with("ur")) && cons_before(2) {
        return true;
    }

    if measure(chars) >= 2 && n >= 3 {
        let vowel = chars[n - 2];
        let before_vowel_is_consonant = is_consonant(chars, n - 3);
        let ends_with = |tail: &str| stem.ends_with(tail);
        if before_vowel_is_consonant
            && (ends_with("at")
                || ends_with("ut")
                || ends_with("ag")
                || ends_with("in")
                || ends_with("ok")
                || (last == 'd' && "aiou".contains(vowel)))
        {
            return true;
        }
    }

    // Single-syllable consonant-vowel-consonant stems: mak → make, hop → hope.
    measure(chars) == 1 && ends_cvc(chars)
}

fn is_vowel_char(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Porter's definition: a consonant is any non-vowel, and "y" is a consonant
/// only when it follows a vowel (or starts the word).
fn is_consonant(chars: &[char], i: usize) -> bool {
    match chars[i] {
        c if is_vowel_char(c) => false,
        'y' => i == 0 || !is_consonant(chars, i - 1),
        _ => true,
    }
}

/// Number of vowel→consonant transitions in the word.
fn measure(chars: &[char]) -> usize {
    let mut m = 0;
    let mut seen_vowel = false;
    for i in 0..chars.len() {
        if is_consonant(chars, i) {
            if seen_vowel {
                m += 1;
                seen_vowel = false;
            }
        } else {
            seen_vowel = true;
        }
    }
    m
}

fn ends_cvc(chars: &[char]) -> bool {
    let n = chars.len();
    n >= 3
        && is_consonant(chars, n - 3)
        && !is_consonant(chars, n - 2)
        && is_consonant(chars, n - 1)
        && !matches!(chars[n - 1], 'w' | 'x' | 'y')
}

fn drop_chars(word: &str, count: usize) -> String {
    let keep = word.chars().count().saturating_sub(count);
    word.chars().take(keep).collect()
}
