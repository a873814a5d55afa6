mod extract;
mod quiz;

use std::{error::Error, future::Future, sync::Arc};

use dotenv::dotenv;
use rand::{rngs::StdRng, SeedableRng};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    net::Download,
    prelude::*,
    types::{InputFile, KeyboardButton, KeyboardMarkup, KeyboardRemove},
};

use quiz::ai_helper::GptQuestionModel;
use quiz::synth::{self, ModelError, NaiveModel, QuestionModel};
use quiz::{QuestionRecord, QuizSession};

type QuizDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    ReceiveQuestionCount {
        text: String,
    },
    InQuiz {
        session: QuizSession,
        current: usize,
    },
    Finished {
        session: QuizSession,
    },
}

/// Which collaborator writes the MCQ question text.
enum QuestionSource {
    Gpt(GptQuestionModel),
    Naive(NaiveModel),
}

impl QuestionModel for QuestionSource {
    fn generate(
        &self,
        answer: &str,
        context: &str,
    ) -> impl Future<Output = Result<String, ModelError>> + Send {
        async move {
            match self {
                QuestionSource::Gpt(model) => model.generate(answer, context).await,
                QuestionSource::Naive(model) => model.generate(answer, context).await,
            }
        }
    }
}

const GREETING: &str = "Hi! Send me your study notes as text, or upload a .pdf, .docx or .txt \
file, and I'll turn them into a quiz.";
const PROMPT_NOTES: &str = "Please upload or paste notes.";

const MIN_QUESTIONS: usize = 3;
const MAX_QUESTIONS: usize = 15;
const CHUNK_SENTENCES: usize = 4;

const TRY_AGAIN: &str = "Try Again";
const NEW_QUIZ: &str = "New Quiz";
const EXPORT_JSON: &str = "Export JSON";
const EXPORT_CSV: &str = "Export CSV";

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting quizzy bot...");

    let bot = Bot::from_env();

    let question_source = Arc::new(match std::env::var("CHATGPT_API_KEY") {
        Ok(key) => match GptQuestionModel::new(&key) {
            Ok(model) => QuestionSource::Gpt(model),
            Err(err) => {
                log::warn!("ChatGPT unavailable ({err}), using naive question text");
                QuestionSource::Naive(NaiveModel)
            }
        },
        Err(_) => {
            log::info!("CHATGPT_API_KEY not set, using naive question text");
            QuestionSource::Naive(NaiveModel)
        }
    });

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(receive_notes))
            .branch(dptree::case![State::ReceiveQuestionCount { text }].endpoint(
                move |bot: Bot, dialogue: QuizDialogue, text: String, msg: Message| {
                    receive_question_count(question_source.clone(), bot, dialogue, text, msg)
                },
            ))
            .branch(dptree::case![State::InQuiz { session, current }].endpoint(in_quiz))
            .branch(dptree::case![State::Finished { session }].endpoint(finished)),
    )
    .dependencies(dptree::deps![InMemStorage::<State>::new()])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

async fn receive_notes(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            bot.send_message(msg.chat.id, GREETING).await?;
            return Ok(());
        }
    }

    let text = match notes_from_message(&bot, &msg).await {
        Ok(text) => text,
        Err(err) => {
            log::warn!("text extraction failed: {err}");
            bot.send_message(msg.chat.id, format!("{err}\n{PROMPT_NOTES}"))
                .await?;
            return Ok(());
        }
    };

    if text.trim().is_empty() {
        bot.send_message(msg.chat.id, PROMPT_NOTES).await?;
        return Ok(());
    }

    let keyboard = KeyboardMarkup::new(vec![
        vec![KeyboardButton::new("5")],
        vec![KeyboardButton::new("10")],
        vec![KeyboardButton::new("15")],
    ]);
    bot.send_message(
        msg.chat.id,
        format!("Got your notes! How many questions? ({MIN_QUESTIONS}-{MAX_QUESTIONS})"),
    )
    .reply_markup(keyboard)
    .await?;

    dialogue.update(State::ReceiveQuestionCount { text }).await?;
    Ok(())
}

/// Uploaded documents are downloaded and run through the extraction
/// collaborator; anything else is the message text itself.
async fn notes_from_message(
    bot: &Bot,
    msg: &Message,
) -> Result<String, Box<dyn Error + Send + Sync>> {
    if let Some(document) = msg.document() {
        let name = document.file_name.clone().unwrap_or_default();
        let format = extract::SourceFormat::from_file_name(&name);

        let file = bot.get_file(document.file.id.clone()).await?;
        let mut bytes: Vec<u8> = Vec::new();
        bot.download_file(&file.path, &mut bytes).await?;

        return Ok(extract::extract_text(format, &bytes)?);
    }
    Ok(msg.text().unwrap_or_default().to_string())
}

async fn receive_question_count(
    source: Arc<QuestionSource>,
    bot: Bot,
    dialogue: QuizDialogue,
    text: String,
    msg: Message,
) -> HandlerResult {
    let amount: usize = match msg.text().and_then(|t| t.trim().parse().ok()) {
        Some(amount) if (MIN_QUESTIONS..=MAX_QUESTIONS).contains(&amount) => amount,
        _ => {
            bot.send_message(
                msg.chat.id,
                format!("Please pick a number between {MIN_QUESTIONS} and {MAX_QUESTIONS}"),
            )
            .await?;
            return Ok(());
        }
    };

    bot.send_message(msg.chat.id, "Generating questions...")
        .await?;

    let chunks: Vec<_> = quiz::chunker::chunk_text(&text, CHUNK_SENTENCES).collect();
    let mut rng = StdRng::from_entropy();
    let questions = synth::synthesize_quiz(&chunks, amount, source.as_ref(), &mut rng).await;

    if questions.is_empty() {
        bot.send_message(
            msg.chat.id,
            "I couldn't build any questions from these notes. Try a longer passage!",
        )
        .await?;
        dialogue.update(State::Start).await?;
        return Ok(());
    }

    let mut session = QuizSession::new();
    session.begin(questions);

    bot.send_message(
        msg.chat.id,
        format!("Generated {} questions! Let's play.", session.len()),
    )
    .await?;
    ask_question(&bot, &msg, &session, 0).await?;

    dialogue
        .update(State::InQuiz {
            session,
            current: 1,
        })
        .await?;
    Ok(())
}

async fn ask_question(
    bot: &Bot,
    msg: &Message,
    session: &QuizSession,
    index: usize,
) -> HandlerResult {
    let header = format!("Question {} of {}", index + 1, session.len());

    match &session.questions()[index] {
        QuestionRecord::Mcq {
            question, options, ..
        } => {
            let keyboard = KeyboardMarkup::new(
                options
                    .iter()
                    .map(|option| vec![KeyboardButton::new(option.clone())])
                    .collect::<Vec<_>>(),
            );
            bot.send_message(msg.chat.id, format!("{header}:\n{question}"))
                .reply_markup(keyboard)
                .await?;
        }
        QuestionRecord::TrueFalse { statement, .. } => {
            let keyboard = KeyboardMarkup::new(vec![vec![
                KeyboardButton::new("True"),
                KeyboardButton::new("False"),
            ]]);
            bot.send_message(msg.chat.id, format!("{header}, true or false?\n{statement}"))
                .reply_markup(keyboard)
                .await?;
        }
        QuestionRecord::Cloze { question, .. } => {
            bot.send_message(
                msg.chat.id,
                format!("{header}, fill in the blank:\n{question}"),
            )
            .reply_markup(KeyboardRemove::new())
            .await?;
        }
    }
    Ok(())
}

async fn in_quiz(
    bot: Bot,
    dialogue: QuizDialogue,
    (mut session, current): (QuizSession, usize),
    msg: Message,
) -> HandlerResult {
    let answer = match msg.text() {
        Some(answer) => answer,
        None => {
            bot.send_message(msg.chat.id, "Please answer with text").await?;
            return Ok(());
        }
    };

    if current != 0 {
        session.submit_answer(current - 1, answer)?;
    }

    if current >= session.len() {
        let score = session.score()?;
        let keyboard = KeyboardMarkup::new(vec![
            vec![
                KeyboardButton::new(TRY_AGAIN),
                KeyboardButton::new(NEW_QUIZ),
            ],
            vec![
                KeyboardButton::new(EXPORT_JSON),
                KeyboardButton::new(EXPORT_CSV),
            ],
        ]);
        bot.send_message(msg.chat.id, format!("Final Score: {score}"))
            .reply_markup(keyboard)
            .await?;

        dialogue.update(State::Finished { session }).await?;
        return Ok(());
    }

    ask_question(&bot, &msg, &session, current).await?;

    dialogue
        .update(State::InQuiz {
            session,
            current: current + 1,
        })
        .await?;
    Ok(())
}

async fn finished(
    bot: Bot,
    dialogue: QuizDialogue,
    mut session: QuizSession,
    msg: Message,
) -> HandlerResult {
    match msg.text() {
        Some(TRY_AGAIN) => {
            if session.reset().is_err() {
                bot.send_message(msg.chat.id, GREETING).await?;
                dialogue.update(State::Start).await?;
                return Ok(());
            }
            bot.send_message(msg.chat.id, "Same questions, clean slate. Good luck!")
                .await?;
            ask_question(&bot, &msg, &session, 0).await?;
            dialogue
                .update(State::InQuiz {
                    session,
                    current: 1,
                })
                .await?;
        }
        Some(NEW_QUIZ) => {
            session.regenerate();
            bot.send_message(msg.chat.id, GREETING)
                .reply_markup(KeyboardRemove::new())
                .await?;
            dialogue.update(State::Start).await?;
        }
        Some(EXPORT_JSON) => {
            let json = quiz::export::to_json(session.questions())?;
            bot.send_document(
                msg.chat.id,
                InputFile::memory(json.into_bytes()).file_name(quiz::export::JSON_FILE_NAME),
            )
            .await?;
        }
        Some(EXPORT_CSV) => {
            let csv = quiz::export::to_csv(session.questions())?;
            bot.send_document(
                msg.chat.id,
                InputFile::memory(csv.into_bytes()).file_name(quiz::export::CSV_FILE_NAME),
            )
            .await?;
        }
        _ => {
            bot.send_message(
                msg.chat.id,
                format!("Choose one of: {TRY_AGAIN}, {NEW_QUIZ}, {EXPORT_JSON} or {EXPORT_CSV}"),
            )
            .await?;
        }
    }
    Ok(())
}
