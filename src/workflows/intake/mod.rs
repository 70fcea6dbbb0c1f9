//! Job-application intake: question bank, application ledger, topic
//! classifier and the console interview that ties them together.

pub mod classifier;
pub mod controller;
pub mod domain;
pub mod ledger;
pub mod question_bank;

pub use classifier::{ClassifierError, TopicClassifier};
pub use controller::{
    parse_choice, Console, ConversationController, InterviewError, InterviewOutcome,
    InterviewState, RetryPolicy,
};
pub use domain::{
    ApplicationRecord, IdentityPrompt, QuestionRecord, RoundRecord, IDENTITY_PROMPTS,
    OPTIONS_PER_QUESTION, QUESTIONS_PER_ROUND,
};
pub use ledger::{Ledger, LedgerError, LEDGER_HEADER};
pub use question_bank::{QuestionBank, QuestionBankError, TopicQuestions};
