use std::future::Future;

use chatgpt::client::ChatGPT;
use chatgpt::config::ChatGPTEngine;
use chatgpt::types::CompletionResponse;

use super::synth::{ModelError, QuestionModel};

/// ChatGPT-backed question writer. Requests carry a bounded timeout so one
/// slow call cannot stall a whole generation batch.
pub struct GptQuestionModel {
    chat_gpt: ChatGPT,
}

impl GptQuestionModel {
    pub fn new(api_key: &str) -> Result<Self, chatgpt::err::Error> {
        let mut chat_gpt = ChatGPT::new(api_key)?;

        chat_gpt.config.engine = ChatGPTEngine::Gpt35Turbo;
        chat_gpt.config.timeout = std::time::Duration::from_secs(15);

        Ok(Self { chat_gpt })
    }
}

impl QuestionModel for GptQuestionModel {
    fn generate(
        &self,
        answer: &str,
        context: &str,
    ) -> impl Future<Output = Result<String, ModelError>> + Send {
        let prompt = format!(
            "You write quiz questions from study notes.\n\
             Based only on this excerpt:\n{context}\n\n\
             Write one short question whose answer is \"{answer}\".\n\
             Reply with the question text alone."
        );

        async move {
            let response: CompletionResponse = self
                .chat_gpt
                .send_message(&prompt)
                .await
                .map_err(|err| ModelError::Backend(err.to_string()))?;
            let content = response.message().clone().content;

            log::debug!("completion: {content:?}");

            Ok(content)
        }
    }
}
