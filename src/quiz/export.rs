use thiserror::Error;

use super::QuestionRecord;

pub const JSON_FILE_NAME: &str = "quiz.json";
pub const CSV_FILE_NAME: &str = "quiz.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("serializing quiz JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("writing quiz CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("finalizing quiz CSV: {0}")]
    CsvFinish(String),
}

/// JSON array of question records, tagged by `type`.
pub fn to_json(questions: &[QuestionRecord]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(questions)?)
}

/// One CSV row per question; fields a kind lacks stay blank, MCQ options
/// are joined with " | ".
pub fn to_csv(questions: &[QuestionRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["type", "question", "statement", "options", "answer"])?;

    for record in questions {
        match record {
            QuestionRecord::Mcq {
                question,
                options,
                answer,
            } => {
                writer.write_record([
                    "MCQ",
                    question.as_str(),
                    "",
                    options.join(" | ").as_str(),
                    answer.as_str(),
                ])?;
            }
            QuestionRecord::TrueFalse { statement, answer } => {
                writer.write_record(["TF", "", statement.as_str(), "", answer.as_str()])?;
            }
            QuestionRecord::Cloze { question, answer } => {
                writer.write_record(["Cloze", question.as_str(), "", "", answer.as_str()])?;
            }
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::CsvFinish(err.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::TfAnswer;

    fn sample_quiz() -> Vec<QuestionRecord> {
        vec![
            QuestionRecord::Mcq {
                question: "Capital of France?".to_string(),
                options: vec![
                    "Paris".to_string(),
                    "Lyon".to_string(),
                    "Nice".to_string(),
                    "Lille".to_string(),
                ],
                answer: "Paris".to_string(),
            },
            QuestionRecord::TrueFalse {
                statement: "France is in Europe".to_string(),
                answer: TfAnswer::True,
            },
            QuestionRecord::Cloze {
                question: "The _____ barked.".to_string(),
                answer: "dog".to_string(),
            },
        ]
    }

    #[test]
    fn test_json_export_is_tagged_by_type() {
        let json = to_json(&sample_quiz()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let array = parsed.as_array().unwrap();

        assert_eq!(array.len(), 3);
        assert_eq!(array[0]["type"], "MCQ");
        assert_eq!(array[0]["options"].as_array().unwrap().len(), 4);
        assert_eq!(array[1]["type"], "TF");
        assert_eq!(array[1]["statement"], "France is in Europe");
        assert_eq!(array[1]["answer"], "True");
        assert_eq!(array[2]["type"], "Cloze");
        assert_eq!(array[2]["answer"], "dog");
    }

    #[test]
    fn test_json_round_trips() {
        let quiz = sample_quiz();
        let json = to_json(&quiz).unwrap();
        let back: Vec<QuestionRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, quiz);
    }

    #[test]
    fn test_csv_export_has_one_row_per_question() {
        let csv = to_csv(&sample_quiz()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "type,question,statement,options,answer");
        assert!(lines[1].starts_with("MCQ,Capital of France?,,"));
        assert!(lines[2].starts_with("TF,,France is in Europe,,True"));
        assert!(lines[3].starts_with("Cloze,The _____ barked.,,,dog"));
    }

    #[test]
    fn test_empty_quiz_exports_header_only() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
