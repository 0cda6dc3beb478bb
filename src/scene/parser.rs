//! Keyword goal parser.
//!
//! Turns text such as
//! `"a large green triangle at the bottom_left, with a medium purple circle to its right"`
//! into goal objects. Clauses are split on `,`, ` with ` and ` and `; a clause
//! without a known shape is ignored. Relational clauses refer to the object
//! of the previous clause.

use crate::config;
use crate::hdc::lexicon::Vocabulary;
use crate::scene::goal::{GoalObject, Placement, Relation, RelationKind};

pub struct GoalParser<'a> {
    vocabulary: &'a Vocabulary,
    position_labels: Vec<&'a str>,
}

impl<'a> GoalParser<'a> {
    /// Parser recognising `vocabulary` words and the given position labels.
    pub fn new(
        vocabulary: &'a Vocabulary,
        position_labels: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            vocabulary,
            position_labels: position_labels.into_iter().collect(),
        }
    }

    /// Parse a comma/`and` separated description into goal objects.
    pub fn parse(&self, text: &str) -> Vec<GoalObject> {
        let text = text.to_lowercase();
        let mut objects: Vec<GoalObject> = Vec::new();

        for clause in split_clauses(&text) {
            let Some(mut obj) = self.parse_clause(clause) else {
                continue;
            };
            obj.id = format!("obj_{}", objects.len());

            if let Placement::Relative(relation) = &mut obj.placement {
                match objects.last() {
                    Some(previous) => relation.reference = Some(previous.id.clone()),
                    None => {
                        tracing::warn!(
                            clause,
                            "relational clause has no reference object, ignoring relation"
                        );
                        obj.placement = Placement::Free;
                    }
                }
            }
            objects.push(obj);
        }

        objects
    }

    fn parse_clause(&self, clause: &str) -> Option<GoalObject> {
        let words: Vec<&str> = clause
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|w| !w.is_empty())
            .collect();

        let shape = first_known(&words, &self.vocabulary.shapes)?;
        let color = first_known(&words, &self.vocabulary.colors).unwrap_or(config::DEFAULT_COLOR);
        let size = first_known(&words, &self.vocabulary.sizes).unwrap_or(config::DEFAULT_SIZE);
        let position = words
            .iter()
            .find(|w| self.position_labels.iter().any(|p| p == *w))
            .copied();

        let mut obj = GoalObject::new("", shape).with_color(color).with_size(size);
        obj.placement = match position {
            Some(label) => Placement::Absolute(label.to_string()),
            None => match self.find_relation(&words) {
                Some(kind) => Placement::Relative(Relation {
                    kind,
                    reference: None,
                }),
                None => Placement::Free,
            },
        };
        Some(obj)
    }

    /// First relation (in vocabulary order) mentioned by the clause.
    fn find_relation(&self, words: &[&str]) -> Option<RelationKind> {
        self.vocabulary
            .relations
            .iter()
            .filter_map(|r| r.parse::<RelationKind>().ok())
            .find(|kind| mentions_relation(words, *kind))
    }
}

fn split_clauses(text: &str) -> impl Iterator<Item = &str> {
    text.split(',')
        .flat_map(|part| part.split(" with "))
        .flat_map(|part| part.split(" and "))
        .map(str::trim)
        .filter(|c| !c.is_empty())
}

/// Leftmost word in the clause that belongs to `known`.
fn first_known<'w>(words: &[&'w str], known: &[String]) -> Option<&'w str> {
    words
        .iter()
        .find(|w| known.iter().any(|k| k == *w))
        .copied()
}

fn mentions_relation(words: &[&str], kind: RelationKind) -> bool {
    let to_the = |side: &str| {
        words
            .windows(3)
            .any(|w| w[0] == "to" && (w[1] == "its" || w[1] == "the") && w[2] == side)
    };
    let has = |word: &str| words.iter().any(|w| *w == word);
    match kind {
        RelationKind::LeftOf => has("left_of") || to_the("left"),
        RelationKind::RightOf => has("right_of") || to_the("right"),
        other => has(other.as_str()),
    }
}
