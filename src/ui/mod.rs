//! Seam between the workflow and whatever renders the screen.

pub mod terminal;

/// What a prompt choice does to the pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateChoice {
    Proceed,
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptChoice {
    pub label: &'static str,
    pub choice: GateChoice,
}

/// A blocking question put to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: &'static str,
    pub message: String,
    pub choices: Vec<PromptChoice>,
}

impl Prompt {
    /// Map the index picked by the UI to its action. Dismissal aborts.
    pub fn resolve(&self, picked: Option<usize>) -> GateChoice {
        picked
            .and_then(|i| self.choices.get(i))
            .map_or(GateChoice::Abort, |c| c.choice)
    }
}

/// UI collaborator of the report screen.
#[allow(async_fn_in_trait)]
pub trait ScreenUi {
    /// Present the prompt and wait for an answer, with no timeout. Returns
    /// the index of the chosen option, or `None` when dismissed.
    async fn choose(&self, prompt: &Prompt) -> Option<usize>;

    async fn alert(&self, title: &str, message: &str);

    /// Non-blocking progress line, e.g. while the photo is being verified.
    fn show_status(&self, message: &str);

    fn navigate_home(&self);
}
