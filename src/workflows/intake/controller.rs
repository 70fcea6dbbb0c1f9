use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use super::classifier::{ClassifierError, TopicClassifier};
use super::domain::{
    ApplicationRecord, QuestionRecord, RoundRecord, IDENTITY_PROMPTS, OPTIONS_PER_QUESTION,
    QUESTIONS_PER_ROUND,
};
use super::ledger::{Ledger, LedgerError};
use super::question_bank::QuestionBank;

const GREETING: &str = "Merhaba! Ben bir sanal çalışanım. Yazılım Şirketi iş başvurunuz için size bazı sorular soracağım.";
const TOPIC_PROMPT: &str = "Hangi alanda iş başvurusu yaptınız? ";
const INVALID_TOPIC: &str = "Geçersiz seçim. Lütfen geçerli bir konu seçin.";
const INVALID_OPTION: &str = "Geçersiz seçim. Lütfen geçerli bir seçenek girin.";
const POOL_EXHAUSTED: &str = "Bu konuda başka soru bulunmuyor.";
const CLOSING: &str = "Teşekkürler, iş başvurunuz alınmıştır. İyi günler dileriz.";

#[derive(Debug, thiserror::Error)]
pub enum InterviewError {
    #[error("console i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("input closed before the interview finished")]
    InputClosed,
    #[error("gave up after {attempts} invalid answers")]
    AttemptsExhausted { attempts: u32 },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Bounds how often a single prompt is repeated after invalid input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self { max_attempts: None }
    }

    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
        }
    }

    fn exhausted(&self, failures: u32) -> bool {
        self.max_attempts.is_some_and(|limit| failures >= limit)
    }
}

/// Interview progression. Each state hands the next one to the run loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewState {
    Start,
    IdentityCapture,
    TopicSelection,
    QuestionRound { topic: String },
    Commit { record: ApplicationRecord },
    End,
}

impl InterviewState {
    pub fn label(&self) -> &'static str {
        match self {
            InterviewState::Start => "start",
            InterviewState::IdentityCapture => "identity_capture",
            InterviewState::TopicSelection => "topic_selection",
            InterviewState::QuestionRound { .. } => "question_round",
            InterviewState::Commit { .. } => "commit",
            InterviewState::End => "end",
        }
    }
}

/// Summary of a finished interview.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterviewOutcome {
    pub applicant: String,
    pub topic: String,
    pub questions_asked: usize,
    pub records_appended: usize,
}

/// Line-oriented console used for prompts and answers.
pub struct Console<I, O> {
    input: I,
    output: O,
}

impl<I: BufRead, O: Write> Console<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (I, O) {
        (self.input, self.output)
    }

    fn say(&mut self, line: &str) -> Result<(), InterviewError> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Prints `prompt` without a newline and returns the next input line
    /// with its line terminator removed.
    fn ask(&mut self, prompt: &str) -> Result<String, InterviewError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InterviewError::InputClosed);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    /// Shows `menu` and `prompt` until the answer is a number in `1..=max`.
    fn choose(
        &mut self,
        menu: &[String],
        prompt: &str,
        max: usize,
        invalid: &str,
        policy: RetryPolicy,
    ) -> Result<usize, InterviewError> {
        let mut failures = 0;
        loop {
            for line in menu {
                self.say(line)?;
            }
            let raw = self.ask(prompt)?;
            if let Some(choice) = parse_choice(&raw, max) {
                return Ok(choice);
            }

            failures += 1;
            warn!(input = %raw, failures, "rejected menu choice");
            self.say(invalid)?;
            if policy.exhausted(failures) {
                return Err(InterviewError::AttemptsExhausted { attempts: failures });
            }
        }
    }
}

/// Accepts plain decimal digits naming a position in `1..=max`.
pub fn parse_choice(raw: &str, max: usize) -> Option<usize> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed
        .parse::<usize>()
        .ok()
        .filter(|choice| (1..=max).contains(choice))
}

/// Drives one applicant interview and commits it to the ledger.
pub struct ConversationController<I, O, G> {
    bank: QuestionBank,
    ledger: Ledger,
    ledger_path: PathBuf,
    classifier: TopicClassifier,
    console: Console<I, O>,
    rng: G,
    policy: RetryPolicy,
}

impl<I, O, G> ConversationController<I, O, G>
where
    I: BufRead,
    O: Write,
    G: Rng,
{
    /// Builds the controller and trains the topic classifier on the bank.
    pub fn new(
        bank: QuestionBank,
        ledger: Ledger,
        ledger_path: impl Into<PathBuf>,
        console: Console<I, O>,
        rng: G,
    ) -> Result<Self, ClassifierError> {
        let mut controller = Self {
            bank,
            ledger,
            ledger_path: ledger_path.into(),
            classifier: TopicClassifier::new(),
            console,
            rng,
            policy: RetryPolicy::unbounded(),
        };
        controller.train_classifier()?;
        Ok(controller)
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn train_classifier(&mut self) -> Result<(), ClassifierError> {
        self.classifier.train(&self.bank)
    }

    pub fn predict_topic(&self, text: &str) -> Result<&str, ClassifierError> {
        self.classifier.predict(text)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn into_console(self) -> Console<I, O> {
        self.console
    }

    pub fn run(&mut self) -> Result<InterviewOutcome, InterviewError> {
        let starting_records = self.ledger.len();
        let mut outcome = InterviewOutcome::default();
        let mut state = InterviewState::Start;

        while state != InterviewState::End {
            debug!(state = state.label(), "interview step");
            state = match state {
                InterviewState::Start => {
                    self.console.say(GREETING)?;
                    InterviewState::IdentityCapture
                }
                InterviewState::IdentityCapture => {
                    outcome.applicant = self.capture_identity()?;
                    self.console.say(&format!(
                        "Merhaba {}! Şimdi yazılım sektöründe hangi alanda çalışmak istediğinizi soracağım.",
                        outcome.applicant
                    ))?;
                    InterviewState::TopicSelection
                }
                InterviewState::TopicSelection => {
                    let topic = self.select_topic()?;
                    outcome.topic = topic.clone();
                    InterviewState::QuestionRound { topic }
                }
                InterviewState::QuestionRound { topic } => {
                    let round = self.ask_questions(&topic)?;
                    outcome.questions_asked = round.len();
                    InterviewState::Commit {
                        record: round.into_record(),
                    }
                }
                InterviewState::Commit { record } => {
                    self.commit(record)?;
                    InterviewState::End
                }
                InterviewState::End => InterviewState::End,
            };
        }

        outcome.records_appended = self.ledger.len() - starting_records;
        info!(
            applicant = %outcome.applicant,
            topic = %outcome.topic,
            questions = outcome.questions_asked,
            "interview completed"
        );
        Ok(outcome)
    }

    /// Asks the free-text background questions, recording each answer as it
    /// arrives. Returns the applicant's name.
    fn capture_identity(&mut self) -> Result<String, InterviewError> {
        let mut name = String::new();
        for (index, prompt) in IDENTITY_PROMPTS.iter().enumerate() {
            let answer = self.console.ask(&format!("{} ", prompt.question))?;
            if index == 0 {
                name = answer.clone();
            }
            self.ledger
                .append(ApplicationRecord::new(prompt.topic, prompt.question, answer));
        }
        Ok(name)
    }

    /// The bank is never empty here: `new` refuses a bank the classifier
    /// cannot train on.
    fn select_topic(&mut self) -> Result<String, InterviewError> {
        let mut topics: Vec<String> = self.bank.topics().map(str::to_string).collect();
        let menu: Vec<String> = topics
            .iter()
            .enumerate()
            .map(|(index, topic)| format!("{}. {}", index + 1, topic))
            .collect();
        let choice = self.console.choose(
            &menu,
            TOPIC_PROMPT,
            topics.len(),
            INVALID_TOPIC,
            self.policy,
        )?;

        let topic = topics.swap_remove(choice - 1);
        info!(%topic, "topic selected");
        Ok(topic)
    }

    /// Runs the question round for `topic`. Topics with fewer questions than a
    /// full round are skipped and yield an empty round.
    fn ask_questions(&mut self, topic: &str) -> Result<RoundRecord, InterviewError> {
        let mut round = RoundRecord::new(topic);
        let pool = self.bank.questions(topic).unwrap_or(&[]);
        if pool.len() < QUESTIONS_PER_ROUND {
            info!(topic, available = pool.len(), "not enough questions, skipping round");
            return Ok(round);
        }

        let mut asked: HashSet<&str> = HashSet::new();
        for _ in 0..QUESTIONS_PER_ROUND {
            let available: Vec<&QuestionRecord> = pool
                .iter()
                .filter(|question| !asked.contains(question.question_text.as_str()))
                .collect();
            let Some(question) = available.choose(&mut self.rng).copied() else {
                self.console.say(POOL_EXHAUSTED)?;
                break;
            };
            asked.insert(question.question_text.as_str());
            debug!(topic, question = %question.question_text, "asking question");

            let mut menu = vec![question.question_text.clone()];
            menu.extend(
                question
                    .options()
                    .iter()
                    .enumerate()
                    .map(|(index, option)| format!("{}. {}", index + 1, option)),
            );
            let choice = self.console.choose(
                &menu,
                &format!("{} için bir seçenek girin: ", question.question_text),
                OPTIONS_PER_QUESTION,
                INVALID_OPTION,
                self.policy,
            )?;

            if let Some(chosen) = question.option(choice) {
                round.push(question, chosen);
            }
        }

        Ok(round)
    }

    fn commit(&mut self, record: ApplicationRecord) -> Result<(), InterviewError> {
        self.ledger.append(record);
        self.ledger.save(&self.ledger_path)?;
        self.console.say(CLOSING)?;
        Ok(())
    }
}
