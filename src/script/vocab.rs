use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use regex::Regex;

use crate::foundation::error::{ToonError, ToonResult};
use crate::script::model::{ActionKind, Emotion, ObjectKind};

/// Version stamp of [`Vocabulary::builtin`].
pub const BUILTIN_VOCABULARY_VERSION: u32 = 1;

/// One canonical identifier and the surface forms that select it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VocabEntry<K> {
    /// Canonical identifier.
    pub id: K,
    /// Lowercase surface forms; stems are derived at match time.
    pub forms: Vec<String>,
}

impl<K> VocabEntry<K> {
    fn new(id: K, forms: &[&str]) -> Self {
        Self {
            id,
            forms: forms.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

/// Keyword tables driving the description parser.
///
/// Entry order is match priority: when two entries could match the same token the earlier one
/// wins.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Table version, bumped whenever the builtin tables change meaning.
    pub version: u32,
    /// Action keywords.
    pub actions: Vec<VocabEntry<ActionKind>>,
    /// Prop keywords.
    pub objects: Vec<VocabEntry<ObjectKind>>,
    /// Emotion keywords.
    pub emotions: Vec<VocabEntry<Emotion>>,
    /// Words that end a clause. Commas always end a clause.
    pub connectives: Vec<String>,
    /// Regexes whose first capture group is the numeric result.
    pub numeric_patterns: Vec<String>,
    /// Words producing `OutcomeFlag(true)`.
    pub success_words: Vec<String>,
    /// Words producing `OutcomeFlag(false)`.
    pub failure_words: Vec<String>,
    /// Action used when nothing in the description is recognized.
    pub fallback_action: ActionKind,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Vocabulary {
    /// The builtin English tables.
    pub fn builtin() -> Self {
        Self {
            version: BUILTIN_VOCABULARY_VERSION,
            actions: vec![
                VocabEntry::new(
                    ActionKind::Walk,
                    &["walk", "walking", "walks", "stroll", "waddle"],
                ),
                VocabEntry::new(
                    ActionKind::Jump,
                    &["jump", "jumping", "jumps", "hop", "leap", "bounce"],
                ),
                VocabEntry::new(
                    ActionKind::Fly,
                    &["fly", "flying", "flies", "soar", "glide", "flap"],
                ),
                VocabEntry::new(ActionKind::Idle, &["idle", "stand", "wait", "rest", "breathe"]),
                VocabEntry::new(
                    ActionKind::Cheer,
                    &["cheer", "celebrate", "excited", "yay", "victory", "dance"],
                ),
                VocabEntry::new(
                    ActionKind::Roll,
                    &["roll", "rolling", "rolls", "spin", "tumble"],
                ),
                VocabEntry::new(ActionKind::Blink, &["blink", "blinks", "wink"]),
            ],
            objects: vec![
                VocabEntry::new(ObjectKind::Dice, &["dice", "die", "cube"]),
                VocabEntry::new(ObjectKind::Star, &["star", "sparkle", "twinkle"]),
                VocabEntry::new(ObjectKind::Heart, &["heart", "love"]),
                VocabEntry::new(ObjectKind::Coin, &["coin", "money"]),
            ],
            emotions: vec![
                VocabEntry::new(
                    Emotion::Happy,
                    &["happy", "joyful", "glad", "pleased", "cheerful"],
                ),
                VocabEntry::new(Emotion::Excited, &["excited", "thrilled", "energetic"]),
                VocabEntry::new(Emotion::Sad, &["sad", "unhappy", "disappointed"]),
                VocabEntry::new(Emotion::Surprised, &["surprised", "shocked", "amazed"]),
            ],
            connectives: ["and", "then", "as", "while", "when", "after", "afterwards", "before"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            numeric_patterns: vec![
                r"(?:result|shows?|displays?|is|lands? on|gets?)\s+(?:a\s+)?(\d+)".to_string(),
            ],
            success_words: ["win", "wins", "success", "succeeds"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            failure_words: ["lose", "loses", "fail", "fails"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            fallback_action: ActionKind::Idle,
        }
    }

    /// Parse tables from a JSON reader. Missing fields fall back to the builtin tables.
    pub fn from_reader<R: std::io::Read>(r: R) -> ToonResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ToonError::config(format!("parse vocabulary JSON: {e}")))
    }

    /// Parse tables from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ToonResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ToonError::config(format!("open vocabulary JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate the tables and build the matcher used by the parser.
    pub fn compile(&self) -> ToonResult<CompiledVocabulary> {
        fn check_forms<K: std::fmt::Debug>(
            table: &str,
            entries: &[VocabEntry<K>],
        ) -> ToonResult<()> {
            for e in entries {
                if e.forms.is_empty() {
                    return Err(ToonError::config(format!(
                        "{table} entry {:?} has no surface forms",
                        e.id
                    )));
                }
                if let Some(bad) = e.forms.iter().find(|f| f.trim().is_empty()) {
                    return Err(ToonError::config(format!(
                        "{table} entry {:?} has blank form {bad:?}",
                        e.id
                    )));
                }
            }
            Ok(())
        }

        if self.actions.is_empty() {
            return Err(ToonError::config("vocabulary needs at least one action entry"));
        }
        check_forms("action", &self.actions)?;
        check_forms("object", &self.objects)?;
        check_forms("emotion", &self.emotions)?;

        let numeric = self
            .numeric_patterns
            .iter()
            .map(|p| {
                let re = Regex::new(p)
                    .map_err(|e| ToonError::config(format!("numeric pattern {p:?}: {e}")))?;
                if re.captures_len() < 2 {
                    return Err(ToonError::config(format!(
                        "numeric pattern {p:?} needs a capture group for the number"
                    )));
                }
                Ok(re)
            })
            .collect::<ToonResult<Vec<_>>>()?;

        Ok(CompiledVocabulary {
            actions: stem_table(&self.actions),
            objects: stem_table(&self.objects),
            emotions: stem_table(&self.emotions),
            connectives: lower_all(&self.connectives),
            numeric,
            success_words: lower_all(&self.success_words),
            failure_words: lower_all(&self.failure_words),
            fallback_action: self.fallback_action,
        })
    }
}

/// Validated, match-ready form of a [`Vocabulary`].
#[derive(Clone, Debug)]
pub struct CompiledVocabulary {
    actions: Vec<(ActionKind, Vec<Form>)>,
    objects: Vec<(ObjectKind, Vec<Form>)>,
    emotions: Vec<(Emotion, Vec<Form>)>,
    connectives: Vec<String>,
    numeric: Vec<Regex>,
    success_words: Vec<String>,
    failure_words: Vec<String>,
    fallback_action: ActionKind,
}

#[derive(Clone, Debug)]
struct Form {
    exact: String,
    stem: String,
}

impl CompiledVocabulary {
    pub(crate) fn action(&self, token: &str) -> Option<ActionKind> {
        lookup(&self.actions, token)
    }

    pub(crate) fn object(&self, token: &str) -> Option<ObjectKind> {
        lookup(&self.objects, token)
    }

    pub(crate) fn emotion(&self, token: &str) -> Option<Emotion> {
        lookup(&self.emotions, token)
    }

    pub(crate) fn is_connective(&self, token: &str) -> bool {
        self.connectives.iter().any(|c| c == token)
    }

    pub(crate) fn outcome(&self, token: &str) -> Option<bool> {
        if self.success_words.iter().any(|w| w == token) {
            Some(true)
        } else if self.failure_words.iter().any(|w| w == token) {
            Some(false)
        } else {
            None
        }
    }

    /// Raw digit strings captured by the numeric patterns, in pattern order.
    pub(crate) fn numeric_captures<'a>(&'a self, clause: &'a str) -> impl Iterator<Item = &'a str> {
        self.numeric
            .iter()
            .filter_map(move |re| re.captures(clause))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
    }

    pub(crate) fn fallback_action(&self) -> ActionKind {
        self.fallback_action
    }
}

fn lower_all(words: &[String]) -> Vec<String> {
    words.iter().map(|w| w.trim().to_lowercase()).collect()
}

fn stem_table<K: Copy>(entries: &[VocabEntry<K>]) -> Vec<(K, Vec<Form>)> {
    entries
        .iter()
        .map(|e| {
            let forms = e
                .forms
                .iter()
                .map(|f| {
                    let exact = f.trim().to_lowercase();
                    let stem = stem(&exact);
                    Form { exact, stem }
                })
                .collect();
            (e.id, forms)
        })
        .collect()
}

fn lookup<K: Copy>(table: &[(K, Vec<Form>)], token: &str) -> Option<K> {
    if let Some((id, _)) = table
        .iter()
        .find(|(_, forms)| forms.iter().any(|f| f.exact == token))
    {
        return Some(*id);
    }
    let token_stem = stem(token);
    if token_stem.len() < MIN_STEM_LEN {
        return None;
    }
    table
        .iter()
        .find(|(_, forms)| forms.iter().any(|f| f.stem == token_stem))
        .map(|(id, _)| *id)
}

const MIN_STEM_LEN: usize = 3;

/// Light suffix stripper: one of `ing`/`ed`/`es`/`s`, then a doubled final consonant, then a
/// trailing `e`. Words that would shrink below three characters are returned unchanged.
pub(crate) fn stem(word: &str) -> String {
    let mut s = word.to_string();
    for suffix in ["ing", "ed", "es", "s"] {
        if s.len() >= suffix.len() + MIN_STEM_LEN && s.ends_with(suffix) {
            s.truncate(s.len() - suffix.len());
            break;
        }
    }
    let bytes = s.as_bytes();
    if bytes.len() > MIN_STEM_LEN {
        let (a, b) = (bytes[bytes.len() - 2], bytes[bytes.len() - 1]);
        if a == b && !matches!(b, b'a' | b'e' | b'i' | b'o' | b'u' | b'l' | b's') {
            s.pop();
        }
    }
    if s.len() > MIN_STEM_LEN && s.ends_with('e') {
        s.pop();
    }
    s
}

#[cfg(test)]
#[path = "../../tests/unit/script/vocab.rs"]
mod tests;
