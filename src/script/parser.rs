use std::sync::LazyLock;

use crate::animation::noise::mix_key;
use crate::foundation::error::ToonResult;
use crate::script::model::{
    Action, ActionKind, ActionPlan, Condition, Emotion, ObjectKind, ObjectSpec,
};
use crate::script::vocab::{CompiledVocabulary, Vocabulary};

/// Numbers above this are treated as unreadable and dropped.
pub const MAX_NUMERIC_RESULT: u32 = 999;

static BUILTIN: LazyLock<Parser> = LazyLock::new(|| Parser {
    vocab: Vocabulary::builtin()
        .compile()
        .expect("builtin vocabulary tables compile"),
});

/// Parse `text` with the builtin vocabulary.
pub fn parse(text: &str) -> ActionPlan {
    BUILTIN.parse(text)
}

/// Table-driven description scanner.
#[derive(Clone, Debug)]
pub struct Parser {
    vocab: CompiledVocabulary,
}

impl Default for Parser {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Break,
}

#[derive(Debug, Default)]
struct Clause {
    action: Option<ActionKind>,
    objects: Vec<ObjectKind>,
    emotion: Option<Emotion>,
    condition: Option<Condition>,
}

impl Clause {
    fn has_modifiers(&self) -> bool {
        !self.objects.is_empty() || self.emotion.is_some() || self.condition.is_some()
    }
}

impl Parser {
    /// Parser over the builtin tables.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Compile `vocab` into a parser.
    pub fn new(vocab: &Vocabulary) -> ToonResult<Self> {
        Ok(Self {
            vocab: vocab.compile()?,
        })
    }

    /// Turn free text into an ordered action plan.
    ///
    /// Never fails: text with no recognized action falls back to a single default action.
    #[tracing::instrument(skip(self))]
    pub fn parse(&self, text: &str) -> ActionPlan {
        let clauses: Vec<Clause> = self
            .split_clauses(tokenize(text))
            .iter()
            .map(|words| self.scan_clause(words))
            .collect();

        let mut actions: Vec<Action> = Vec::new();
        let mut leading: Vec<Clause> = Vec::new();
        for clause in clauses {
            match clause.action {
                Some(kind) => {
                    let mut action = Action::new(kind);
                    apply_modifiers(&mut action, clause);
                    actions.push(action);
                }
                None if !clause.has_modifiers() => {}
                None => match actions.last_mut() {
                    Some(prev) => apply_modifiers(prev, clause),
                    None => leading.push(clause),
                },
            }
        }

        if actions.is_empty() {
            tracing::warn!(
                fallback = ?self.vocab.fallback_action(),
                "no action keyword recognized; using fallback action"
            );
        }

        if !leading.is_empty() {
            let target = match actions.iter().position(|a| a.kind.is_idle_like()) {
                Some(i) => i,
                None => {
                    actions.insert(0, Action::new(self.vocab.fallback_action()));
                    0
                }
            };
            for clause in leading {
                apply_modifiers(&mut actions[target], clause);
            }
        }

        if actions.is_empty() {
            actions.push(Action::new(self.vocab.fallback_action()));
        }

        for (i, action) in actions.iter_mut().enumerate() {
            for (j, object) in action.objects.iter_mut().enumerate() {
                object.params_seed = mix_key(i as u64, j as u64);
            }
        }

        let plan = ActionPlan::from_checked(actions);
        tracing::debug!(
            actions = plan.actions().len(),
            frames = plan.suggested_frame_count(),
            duration_ms = plan.suggested_frame_duration_ms(),
            "parsed description"
        );
        plan
    }

    fn split_clauses(&self, tokens: Vec<Token>) -> Vec<Vec<String>> {
        let mut clauses = Vec::new();
        let mut current = Vec::new();
        for token in tokens {
            match token {
                Token::Word(w) if !self.vocab.is_connective(&w) => current.push(w),
                _ => {
                    if !current.is_empty() {
                        clauses.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            clauses.push(current);
        }
        clauses
    }

    fn scan_clause(&self, words: &[String]) -> Clause {
        let mut clause = Clause::default();
        for w in words {
            if clause.action.is_none()
                && let Some(kind) = self.vocab.action(w)
            {
                clause.action = Some(kind);
                continue;
            }
            if let Some(kind) = self.vocab.object(w) {
                if !clause.objects.contains(&kind) {
                    clause.objects.push(kind);
                }
                continue;
            }
            if let Some(emotion) = self.vocab.emotion(w) {
                clause.emotion.get_or_insert(emotion);
                continue;
            }
            if let Some(flag) = self.vocab.outcome(w)
                && clause.condition.is_none()
            {
                clause.condition = Some(Condition::OutcomeFlag(flag));
            }
        }

        let text = words.join(" ");
        let numeric = self
            .vocab
            .numeric_captures(&text)
            .find_map(|digits| match digits.parse::<u32>() {
                Ok(n) if n <= MAX_NUMERIC_RESULT => Some(n),
                _ => {
                    tracing::debug!(digits, "dropping unreadable numeric result");
                    None
                }
            });
        if let Some(n) = numeric {
            clause.condition = Some(Condition::NumericResult(n));
        }
        clause
    }
}

fn apply_modifiers(action: &mut Action, clause: Clause) {
    for kind in clause.objects {
        action.attach_object(ObjectSpec {
            kind,
            params_seed: 0,
        });
    }
    if action.emotion.is_none() {
        action.emotion = clause.emotion;
    }
    if let Some(condition) = clause.condition {
        match action.condition {
            None => action.condition = Some(condition),
            Some(kept) => {
                tracing::debug!(?kept, dropped = ?condition, "action already has a condition")
            }
        }
    }
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut word = String::new();
    let flush = |word: &mut String, out: &mut Vec<Token>| {
        if !word.is_empty() {
            out.push(Token::Word(std::mem::take(word)));
        }
    };
    for c in text.chars() {
        if c.is_alphanumeric() {
            word.extend(c.to_lowercase());
        } else if c != '\'' && c != '\u{2019}' {
            flush(&mut word, &mut out);
            if c == ',' || c == ';' {
                out.push(Token::Break);
            }
        }
    }
    flush(&mut word, &mut out);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/script/parser.rs"]
mod tests;
