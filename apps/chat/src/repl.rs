//! Interactive read-eval-print loop

use console::Style;
use sov_chat::{send_turn, ChatSession, Transcript};
use sov_net::{ChatApi, CompletionParams};
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::select;

/// What a line typed at the prompt asks for
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Empty,
    Quit,
    Clear,
    Status,
    Message(&'a str),
}

impl<'a> Input<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim() {
            "" => Self::Empty,
            "/quit" | "/exit" | "/q" => Self::Quit,
            "/clear" => Self::Clear,
            "/status" => Self::Status,
            message => Self::Message(message),
        }
    }
}

/// Render model ids as `['a', 'b']`
pub fn format_models(models: &[String]) -> String {
    let quoted: Vec<String> = models.iter().map(|m| format!("'{m}'")).collect();
    format!("[{}]", quoted.join(", "))
}

pub struct Repl {
    api: ChatApi,
    params: CompletionParams,
    session: ChatSession,
    transcript: Transcript,
    label: Style,
    dim: Style,
}

impl Repl {
    pub fn new(
        api: ChatApi,
        params: CompletionParams,
        session: ChatSession,
        transcript: Transcript,
        colors_enabled: bool,
    ) -> Self {
        Self {
            api,
            params,
            session,
            transcript,
            label: Style::new().cyan().bold().force_styling(colors_enabled),
            dim: Style::new().dim().force_styling(colors_enabled),
        }
    }

    fn print_banner(&self) {
        println!();
        println!("  {}", self.label.apply_to("Sovereign Chat (vLLM Metal)"));
        println!(
            "  Server: {}  |  Model: {}",
            self.api.base_url(),
            self.params.model
        );
        println!("  Log: {}", self.transcript.path().display());
        println!("  {}", self.dim.apply_to("Commands: /clear /status /quit"));
        println!();
    }

    fn prompt(&self) -> io::Result<()> {
        print!("{} ", self.label.apply_to("You:"));
        io::stdout().flush()
    }

    /// Run until `/quit`, end of input or Ctrl-C
    pub async fn run(mut self) -> io::Result<()> {
        self.print_banner();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            self.prompt()?;

            let line = select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(line) = line else {
                println!("\nBye.");
                return Ok(());
            };

            match Input::parse(&line) {
                Input::Empty => {}
                Input::Quit => return Ok(()),
                Input::Clear => {
                    self.session.clear();
                    tracing::info!("conversation cleared");
                    println!("  [cleared]\n");
                }
                Input::Status => match self.api.list_models().await {
                    Ok(models) => println!("  Connected. Models: {}\n", format_models(&models)),
                    Err(e) => println!("  Offline: {e}\n"),
                },
                Input::Message(message) => {
                    let reply = match send_turn(
                        &self.api,
                        &self.params,
                        &mut self.session,
                        &self.transcript,
                        message,
                    )
                    .await
                    {
                        Ok(reply) => reply,
                        Err(e) => {
                            tracing::info!(error = %e, "chat turn failed");
                            format!("[Error: {e}]")
                        }
                    };
                    println!("{} {reply}\n", self.label.apply_to("AI:"));
                }
            }
        }
    }
}
