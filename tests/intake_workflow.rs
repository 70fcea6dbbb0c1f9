use std::collections::HashSet;
use std::path::Path;

use intake_agent::workflows::intake::{
    ApplicationRecord, ClassifierError, Console, ConversationController, InterviewError,
    InterviewOutcome, Ledger, QuestionBank, QuestionRecord, RetryPolicy, IDENTITY_PROMPTS,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const CLOSING: &str = "Teşekkürler, iş başvurunuz alınmıştır. İyi günler dileriz.";
const INVALID_TOPIC: &str = "Geçersiz seçim. Lütfen geçerli bir konu seçin.";
const INVALID_OPTION: &str = "Geçersiz seçim. Lütfen geçerli bir seçenek girin.";

fn question(topic: &str, text: &str) -> QuestionRecord {
    QuestionRecord {
        topic: topic.to_string(),
        question_text: text.to_string(),
        option_1: "A".to_string(),
        option_2: "B".to_string(),
        option_3: "C".to_string(),
        option_4: "D".to_string(),
    }
}

fn bank() -> QuestionBank {
    let mut records: Vec<QuestionRecord> = (1..=5)
        .map(|n| question("Backend", &format!("Backend{n}?")))
        .collect();
    records.push(question("Frontend", "Frontend1?"));
    records.push(question("Frontend", "Frontend2?"));
    records.extend((1..=4).map(|n| question("Mobil", &format!("Mobil{n}?"))));
    QuestionBank::from_records(records)
}

struct Session {
    result: Result<InterviewOutcome, InterviewError>,
    ledger: Ledger,
    output: String,
}

fn interview(
    ledger: Ledger,
    path: &Path,
    script: &[&str],
    seed: u64,
    policy: RetryPolicy,
) -> Session {
    interview_with_bank(bank(), ledger, path, script, seed, policy)
}

fn interview_with_bank(
    bank: QuestionBank,
    ledger: Ledger,
    path: &Path,
    script: &[&str],
    seed: u64,
    policy: RetryPolicy,
) -> Session {
    let input = script.iter().map(|line| format!("{line}\n")).collect::<String>();
    let console = Console::new(input.as_bytes(), Vec::new());
    let mut controller =
        ConversationController::new(bank, ledger, path, console, StdRng::seed_from_u64(seed))
            .expect("classifier trains")
            .with_retry_policy(policy);

    let result = controller.run();
    let ledger = controller.ledger().clone();
    let (_, output) = controller.into_console().into_inner();

    Session {
        result,
        ledger,
        output: String::from_utf8(output).expect("utf8 output"),
    }
}

const IDENTITY: [&str; 5] = ["Ada", "CS", "3", "Python", "B2"];

fn script(rest: &[&'static str]) -> Vec<&'static str> {
    IDENTITY.iter().chain(rest).copied().collect()
}

#[test]
fn full_interview_appends_identity_and_round_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("isbasvurulari.csv");
    let mut existing = Ledger::new();
    existing.append(ApplicationRecord::new("Tecrübe", "Kaç yıl tecrübeniz var?", "10"));

    let session = interview(
        existing,
        &path,
        &script(&["1", "2", "1", "3", "2"]),
        7,
        RetryPolicy::unbounded(),
    );
    let outcome = session.result.expect("interview completes");

    assert_eq!(outcome.applicant, "Ada");
    assert_eq!(outcome.topic, "Backend");
    assert_eq!(outcome.questions_asked, 4);
    assert_eq!(outcome.records_appended, 6);

    let records = session.ledger.records();
    assert_eq!(records.len(), 7);
    for (record, (prompt, answer)) in records[1..6]
        .iter()
        .zip(IDENTITY_PROMPTS.iter().zip(IDENTITY))
    {
        assert_eq!(record.topic, prompt.topic);
        assert_eq!(record.question, prompt.question);
        assert_eq!(record.answer, answer);
    }

    let round = &records[6];
    assert_eq!(round.topic, "Backend");
    assert_eq!(round.answer, "B A C B");

    let persisted = Ledger::load(&path).expect("ledger persisted");
    assert_eq!(persisted, session.ledger);
    assert!(session.output.contains("Merhaba Ada!"));
    assert!(session.output.ends_with(&format!("{CLOSING}\n")));
}

#[test]
fn round_asks_four_distinct_questions_from_the_chosen_topic() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool: HashSet<String> = (1..=5).map(|n| format!("Backend{n}?")).collect();

    for seed in 0..25 {
        let path = dir.path().join(format!("ledger-{seed}.csv"));
        let session = interview(
            Ledger::new(),
            &path,
            &script(&["1", "4", "4", "4", "4"]),
            seed,
            RetryPolicy::unbounded(),
        );
        session.result.expect("interview completes");

        let round = session.ledger.records().last().expect("round record");
        let asked: Vec<&str> = round
            .question
            .split(' ')
            .map(|pair| pair.strip_suffix(":D").expect("paired with chosen option"))
            .collect();
        assert_eq!(asked.len(), 4);
        let distinct: HashSet<&str> = asked.iter().copied().collect();
        assert_eq!(distinct.len(), 4, "seed {seed} repeated a question");
        assert!(asked.iter().all(|text| pool.contains(*text)));
    }
}

#[test]
fn topic_with_too_few_questions_skips_the_round() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ledger.csv");

    let session = interview(
        Ledger::new(),
        &path,
        &script(&["2"]),
        1,
        RetryPolicy::unbounded(),
    );
    let outcome = session.result.expect("interview completes");

    assert_eq!(outcome.topic, "Frontend");
    assert_eq!(outcome.questions_asked, 0);
    assert_eq!(session.ledger.len(), 6);
    assert_eq!(
        session.ledger.records()[5],
        ApplicationRecord::placeholder("Frontend")
    );
    assert!(!session.output.contains("Frontend1?"));
    assert_eq!(Ledger::load(&path).expect("persisted").len(), 6);
}

#[test]
fn invalid_topic_choices_reprompt_without_binding() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ledger.csv");

    let session = interview(
        Ledger::new(),
        &path,
        &script(&["abc", "5", "0", "3", "1", "1", "1", "1"]),
        3,
        RetryPolicy::unbounded(),
    );
    let outcome = session.result.expect("interview completes");

    assert_eq!(outcome.topic, "Mobil");
    assert_eq!(session.output.matches(INVALID_TOPIC).count(), 3);
    assert_eq!(session.output.matches("1. Backend").count(), 4);
    assert_eq!(
        session.ledger.records().last().expect("round").answer,
        "A A A A"
    );
}

#[test]
fn invalid_option_reprompts_the_current_question_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ledger.csv");

    let session = interview(
        Ledger::new(),
        &path,
        &script(&["1", "2", "9", "x", "1", "3", "2"]),
        11,
        RetryPolicy::unbounded(),
    );
    let outcome = session.result.expect("interview completes");

    assert_eq!(outcome.questions_asked, 4);
    assert_eq!(session.output.matches(INVALID_OPTION).count(), 2);
    assert_eq!(
        session.ledger.records().last().expect("round").answer,
        "B A C B"
    );
}

#[test]
fn exhausted_retries_abort_without_persisting() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ledger.csv");

    let session = interview(
        Ledger::new(),
        &path,
        &script(&["x", "y", "1"]),
        5,
        RetryPolicy::bounded(2),
    );

    assert!(matches!(
        session.result,
        Err(InterviewError::AttemptsExhausted { attempts: 2 })
    ));
    assert!(!path.exists());
}

#[test]
fn closed_input_aborts_without_persisting() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ledger.csv");

    let session = interview(
        Ledger::new(),
        &path,
        &["Ada", "CS"],
        5,
        RetryPolicy::unbounded(),
    );

    assert!(matches!(session.result, Err(InterviewError::InputClosed)));
    assert!(!path.exists());
}

#[test]
fn controller_exposes_the_trained_classifier() {
    let bank = QuestionBank::from_records([
        question("X", "Which database engine handles transactions?"),
        question("X", "How would you shard a relational database?"),
        question("Y", "Which CSS rule makes a grid responsive?"),
        question("Y", "How does the browser render a component tree?"),
    ]);
    let console = Console::new(&b""[..], Vec::new());
    let controller = ConversationController::new(
        bank,
        Ledger::new(),
        "unused.csv",
        console,
        StdRng::seed_from_u64(0),
    )
    .expect("classifier trains");

    assert_eq!(
        controller
            .predict_topic("Which database engine handles transactions?")
            .expect("prediction"),
        "X"
    );
}

#[test]
fn round_keeps_partial_answers_when_distinct_questions_run_out() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ledger.csv");
    let bank = QuestionBank::from_records([
        question("T", "Q1"),
        question("T", "Q1"),
        question("T", "Q2"),
        question("T", "Q3"),
    ]);

    let session = interview_with_bank(
        bank,
        Ledger::new(),
        &path,
        &script(&["1", "1", "2", "3"]),
        1,
        RetryPolicy::unbounded(),
    );
    let outcome = session.result.expect("interview completes");

    assert_eq!(outcome.questions_asked, 3);
    assert_eq!(outcome.records_appended, 6);
    let round = session.ledger.records().last().expect("round record");
    assert_eq!(round.topic, "T");
    assert_eq!(round.answer, "A B C");
    let asked: HashSet<&str> = round
        .question
        .split(' ')
        .filter_map(|pair| pair.split(':').next())
        .collect();
    assert_eq!(asked, HashSet::from(["Q1", "Q2", "Q3"]));
    assert!(session.output.contains("Bu konuda başka soru bulunmuyor."));
    assert_eq!(Ledger::load(&path).expect("persisted").len(), 6);
}

#[test]
fn empty_bank_is_rejected_before_any_prompt() {
    let console = Console::new(&b"Ada\n"[..], Vec::new());
    let result = ConversationController::new(
        QuestionBank::default(),
        Ledger::new(),
        "unused.csv",
        console,
        StdRng::seed_from_u64(0),
    );

    assert!(matches!(result, Err(ClassifierError::EmptyTrainingSet)));
}
