use super::domain::QuestionRecord;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum QuestionBankError {
    #[error("failed to open question bank: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid question bank CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Questions of one topic, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicQuestions {
    pub topic: String,
    pub questions: Vec<QuestionRecord>,
}

/// Topic-grouped catalog of multiple-choice questions. Topics keep the order
/// in which they first appear in the source; the bank is read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    topics: Vec<TopicQuestions>,
}

impl QuestionBank {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, QuestionBankError> {
        let file = std::fs::File::open(path.as_ref())?;
        let bank = Self::from_reader(file)?;
        info!(
            path = %path.as_ref().display(),
            topics = bank.len(),
            questions = bank.question_count(),
            "question bank loaded"
        );
        Ok(bank)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, QuestionBankError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in csv_reader.deserialize::<QuestionRecord>() {
            records.push(row?);
        }

        Ok(Self::from_records(records))
    }

    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = QuestionRecord>,
    {
        let mut topics: Vec<TopicQuestions> = Vec::new();
        for record in records {
            match topics.iter_mut().find(|group| group.topic == record.topic) {
                Some(group) => group.questions.push(record),
                None => topics.push(TopicQuestions {
                    topic: record.topic.clone(),
                    questions: vec![record],
                }),
            }
        }

        Self { topics }
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|group| group.topic.as_str())
    }

    pub fn questions(&self, topic: &str) -> Option<&[QuestionRecord]> {
        self.topics
            .iter()
            .find(|group| group.topic == topic)
            .map(|group| group.questions.as_slice())
    }

    /// Every question text paired with its topic label.
    pub fn training_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.topics.iter().flat_map(|group| {
            group
                .questions
                .iter()
                .map(move |question| (question.question_text.as_str(), group.topic.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn question_count(&self) -> usize {
        self.topics.iter().map(|group| group.questions.len()).sum()
    }
}
