use dialoguer::Select;

use crate::ui::{Prompt, ScreenUi};

/// Interactive terminal front end: prompts with `dialoguer`, alerts on stdout.
#[derive(Debug, Default)]
pub struct TerminalUi;

impl ScreenUi for TerminalUi {
    async fn choose(&self, prompt: &Prompt) -> Option<usize> {
        let header = format!("{}: {}", prompt.title, prompt.message);
        let labels: Vec<&'static str> = prompt.choices.iter().map(|c| c.label).collect();

        let picked = tokio::task::spawn_blocking(move || {
            Select::new()
                .with_prompt(header)
                .items(&labels)
                .default(0)
                .interact_opt()
        })
        .await;

        match picked {
            Ok(Ok(index)) => index,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Prompt failed, treating as dismissed");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prompt task failed, treating as dismissed");
                None
            }
        }
    }

    async fn alert(&self, title: &str, message: &str) {
        println!("\n[{}] {}", title, message);
    }

    fn show_status(&self, message: &str) {
        println!("{}", message);
    }

    fn navigate_home(&self) {
        println!("Returning to home.");
    }
}
