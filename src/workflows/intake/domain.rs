use serde::{Deserialize, Serialize};

/// Number of multiple-choice questions asked in a topic round.
pub const QUESTIONS_PER_ROUND: usize = 4;

/// Number of options every question in the bank carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// One row of the question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "Konu")]
    pub topic: String,
    #[serde(rename = "Soru")]
    pub question_text: String,
    #[serde(rename = "Secenek1")]
    pub option_1: String,
    #[serde(rename = "Secenek2")]
    pub option_2: String,
    #[serde(rename = "Secenek3")]
    pub option_3: String,
    #[serde(rename = "Secenek4")]
    pub option_4: String,
}

impl QuestionRecord {
    pub fn options(&self) -> [&str; OPTIONS_PER_QUESTION] {
        [
            self.option_1.as_str(),
            self.option_2.as_str(),
            self.option_3.as_str(),
            self.option_4.as_str(),
        ]
    }

    /// Option text for a 1-based choice.
    pub fn option(&self, choice: usize) -> Option<&str> {
        choice
            .checked_sub(1)
            .and_then(|index| self.options().get(index).copied())
    }
}

/// One ledger row: a single answer, or a packed topic round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    #[serde(rename = "Konu")]
    pub topic: String,
    #[serde(rename = "Soru")]
    pub question: String,
    #[serde(rename = "Cevap")]
    pub answer: String,
}

impl ApplicationRecord {
    pub fn new(
        topic: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Empty record emitted when a topic has too few questions for a round.
    pub fn placeholder(topic: impl Into<String>) -> Self {
        Self::new(topic, String::new(), String::new())
    }
}

/// Free-text background question asked before topic selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityPrompt {
    pub topic: &'static str,
    pub question: &'static str,
}

/// Background questions in the order they are asked. The topic labels and
/// question texts are stored in the ledger verbatim.
pub const IDENTITY_PROMPTS: [IdentityPrompt; 5] = [
    IdentityPrompt {
        topic: "İsim ve Bölüm",
        question: "İsminiz nedir?",
    },
    IdentityPrompt {
        topic: "İsim ve Bölüm",
        question: "Bitirdiğiniz bölüm nedir?",
    },
    IdentityPrompt {
        topic: "Tecrübe",
        question: "Kaç yıl tecrübeniz var?",
    },
    IdentityPrompt {
        topic: "Programlama Dili",
        question: "Hangi programlama diline hakimsiniz?",
    },
    IdentityPrompt {
        topic: "Yabancı Dil",
        question: "Yabancı dil seviyeniz nedir?",
    },
];

/// Accumulates the answers of one topic round into a single ledger record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRecord {
    topic: String,
    questions: Vec<String>,
    answers: Vec<String>,
}

impl RoundRecord {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            questions: Vec::new(),
            answers: Vec::new(),
        }
    }

    pub fn push(&mut self, question: &QuestionRecord, chosen: &str) {
        self.questions
            .push(format!("{}:{}", question.question_text, chosen));
        self.answers.push(chosen.to_string());
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn into_record(self) -> ApplicationRecord {
        ApplicationRecord {
            topic: self.topic,
            question: self.questions.join(" "),
            answer: self.answers.join(" "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> QuestionRecord {
        QuestionRecord {
            topic: "Backend".to_string(),
            question_text: "Favori veritabanı?".to_string(),
            option_1: "PostgreSQL".to_string(),
            option_2: "MySQL".to_string(),
            option_3: "SQLite".to_string(),
            option_4: "MongoDB".to_string(),
        }
    }

    #[test]
    fn option_lookup_is_one_based() {
        let question = question();
        assert_eq!(question.option(1), Some("PostgreSQL"));
        assert_eq!(question.option(4), Some("MongoDB"));
        assert_eq!(question.option(0), None);
        assert_eq!(question.option(5), None);
    }

    #[test]
    fn round_record_pairs_each_question_with_the_chosen_option() {
        let mut round = RoundRecord::new("Backend");
        round.push(&question(), "MySQL");
        round.push(&question(), "SQLite");

        let record = round.into_record();
        assert_eq!(record.topic, "Backend");
        assert_eq!(
            record.question,
            "Favori veritabanı?:MySQL Favori veritabanı?:SQLite"
        );
        assert_eq!(record.answer, "MySQL SQLite");
    }

    #[test]
    fn empty_round_collapses_to_placeholder() {
        let record = RoundRecord::new("Frontend").into_record();
        assert_eq!(record, ApplicationRecord::placeholder("Frontend"));
    }
}
