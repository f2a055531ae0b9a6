//! A terminal client demonstrating how to use `docchat` as a library.

#[macro_use]
extern crate tracing;

use std::env;
use std::fs;
use std::io::Write as _;
use std::time::Duration;

use docchat::SessionBuilder;
use docchat::core::{
    ChatSession, ChatTurn, ConversationContext, Error, Notification,
    SessionEvent,
};
use docchat::http::{Endpoints, HttpBackendConfigBuilder};
use docchat::model::{BindingKind, DocumentQuery};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

const BAR_CHAR: &str = "▎";

type Input = io::BufReader<io::Stdin>;

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Document(&'a str),
    Topic { id: &'a str, name: &'a str },
    Ticket(usize),
    Copy(usize),
    Reload,
    Clear,
    Quit,
    Message(&'a str),
}

fn parse_command(line: &str) -> Result<Command<'_>, &'static str> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Message(line));
    };
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name {
        "doc" if !args.is_empty() => Ok(Command::Document(args)),
        "doc" => Err("usage: /doc <id>"),
        "topic" => match args.split_once(char::is_whitespace) {
            Some((id, name)) => Ok(Command::Topic {
                id,
                name: name.trim(),
            }),
            None => Err("usage: /topic <id> <name>"),
        },
        "ticket" => args
            .parse()
            .map(Command::Ticket)
            .map_err(|_| "usage: /ticket <index>"),
        "copy" => args
            .parse()
            .map(Command::Copy)
            .map_err(|_| "usage: /copy <index>"),
        "reload" => Ok(Command::Reload),
        "clear" => Ok(Command::Clear),
        "quit" => Ok(Command::Quit),
        _ => Err("unknown command"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(base_url) = env::var("DOCCHAT_BASE_URL") else {
        eprintln!("DOCCHAT_BASE_URL environment variable is not set");
        return;
    };
    let language =
        env::var("DOCCHAT_LANGUAGE").unwrap_or_else(|_| "spanish".to_owned());

    let mut config = HttpBackendConfigBuilder::with_base_url(base_url);
    if let Ok(user_email) = env::var("DOCCHAT_USER_EMAIL") {
        config = config.with_user_email(user_email);
    }
    if let Ok(path) = env::var("DOCCHAT_CONFIG") {
        match load_endpoints(&path) {
            Ok(endpoints) => config = config.with_endpoints(endpoints),
            Err(err) => {
                eprintln!("failed to load {path}: {err}");
                return;
            }
        }
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let session = SessionBuilder::with_http_config(config.build())
        .with_topic("", "", language.clone())
        .on_event(move |event| {
            event_tx.send(event.clone()).ok();
        })
        .on_notification(print_notification)
        .on_clipboard(|text| {
            let bar = BAR_CHAR.bright_black();
            for line in text.lines() {
                println!("{bar}{}", line.dimmed());
            }
        })
        .on_step_back(|| {
            println!("{}", "Pick a topic with /topic <id> <name>".dimmed());
        })
        .build();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let mut context = ConversationContext {
        language_code: language,
        ..Default::default()
    };
    let mut repl = Repl {
        session: &session,
        events: &mut event_rx,
        input: io::BufReader::new(io::stdin()),
        progress_style,
    };

    loop {
        match session.snapshot().await {
            Ok(snapshot) => {
                if let Some(placeholder) = snapshot.input_placeholder {
                    println!("{}", placeholder.dimmed());
                }
            }
            Err(err) => {
                print_error(&err);
                break;
            }
        }
        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line(&mut repl.input).await else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(usage) => {
                eprintln!("{}", usage.bright_red());
                continue;
            }
        };

        let result = match command {
            Command::Message("") => continue,
            Command::Message(text) => repl.chat(text).await,
            Command::Document(id) => repl.select_document(&context, id).await,
            Command::Topic { id, name } => {
                context.topic_id = id.to_owned();
                context.topic_name = name.to_owned();
                context.document = None;
                repl.select_topic(&context).await
            }
            Command::Ticket(index) => repl.ticket(index).await,
            Command::Copy(index) => session.copy_answer(index).await.map(drop),
            Command::Reload => repl.reload().await,
            Command::Clear => {
                context.topic_id.clear();
                context.topic_name.clear();
                context.document = None;
                session.step_back().await
            }
            Command::Quit => break,
        };
        if let Err(err) = result {
            print_error(&err);
        }
    }

    session.close();
}

struct Repl<'a> {
    session: &'a ChatSession,
    events: &'a mut mpsc::UnboundedReceiver<SessionEvent>,
    input: Input,
    progress_style: ProgressStyle,
}

impl Repl<'_> {
    async fn chat(&mut self, text: &str) -> Result<(), Error> {
        self.session.send_message(text).await?;
        let loading = self
            .session
            .snapshot()
            .await?
            .turns
            .last()
            .map(|turn| turn.text().to_owned())
            .unwrap_or_default();

        // Failures are reported through notifications.
        if let Some(SessionEvent::ExchangeResolved {
            index,
            escalation_offered,
        }) = self.wait_for_settlement(loading).await
        {
            let snapshot = self.session.snapshot().await?;
            if let Some(turn) = snapshot.turns.get(index) {
                print_answer(index, turn, escalation_offered);
            }
        }
        Ok(())
    }

    async fn select_document(
        &mut self,
        context: &ConversationContext,
        id: &str,
    ) -> Result<(), Error> {
        let query = DocumentQuery {
            document_id: id.to_owned(),
            kind: BindingKind::Document,
            user_email: None,
        };
        self.session.select_document(query, context.clone()).await?;
        self.print_greeting().await
    }

    async fn reload(&mut self) -> Result<(), Error> {
        self.session.reload().await?;
        self.print_greeting().await
    }

    async fn print_greeting(&self) -> Result<(), Error> {
        let snapshot = self.session.snapshot().await?;
        if let Some(greeting) = snapshot.turns.first() {
            println!("{}{}", BAR_CHAR.bright_black(), greeting.text().bold());
        }
        Ok(())
    }

    async fn select_topic(
        &mut self,
        context: &ConversationContext,
    ) -> Result<(), Error> {
        self.session.bind(context.clone()).await?;
        let documents =
            self.session.list_topic_documents(&context.topic_id).await?;
        match serde_json::to_string_pretty(&documents) {
            Ok(documents) => println!("{}", documents.dimmed()),
            Err(err) => warn!("failed to print the documents: {err}"),
        }
        Ok(())
    }

    async fn ticket(&mut self, index: usize) -> Result<(), Error> {
        let mut draft = self.session.open_escalation(index).await?;
        let bar = BAR_CHAR.bright_yellow();
        println!("\n{bar}Support ticket for answer #{index}");

        loop {
            let input = &mut self.input;
            let Some(name) = prompt_field(input, "Name", draft.name()).await
            else {
                return self.session.dismiss_escalation().await;
            };
            let Some(email) = prompt_field(input, "Email", draft.email()).await
            else {
                return self.session.dismiss_escalation().await;
            };
            let Some(description) =
                prompt_field(input, "Description", draft.description()).await
            else {
                return self.session.dismiss_escalation().await;
            };
            draft.set_name(name);
            draft.set_email(&email);
            draft.set_description(description);

            let edited = draft.clone();
            let errors = self
                .session
                .edit_draft(move |draft| *draft = edited)
                .await?;
            if errors.is_empty() {
                break;
            }
            for (field, error) in errors {
                eprintln!("{bar}{}", format!("{field}: {error}").bright_red());
            }
        }

        self.session.submit_ticket().await?;
        if let Some(SessionEvent::TicketCreated { ticket_id, .. }) =
            self.wait_for_settlement("Creating ticket".to_owned()).await
        {
            println!("{bar}Ticket {}", ticket_id.bold());
        }
        Ok(())
    }

    /// Shows a spinner until a backend request settles.
    async fn wait_for_settlement(
        &mut self,
        message: String,
    ) -> Option<SessionEvent> {
        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(self.progress_style.clone());
        progress_bar.set_message(message);

        let event = loop {
            progress_bar.inc(1);

            let sleep = sleep(Duration::from_millis(100));
            select! {
                event = self.events.recv() => match event {
                    Some(SessionEvent::ConversationReset { .. }) => continue,
                    event => break event,
                },
                _ = sleep => continue,
            }
        };

        // Finish the progress bar before printing anything else.
        progress_bar.finish_and_clear();
        event
    }
}

fn load_endpoints(
    path: &str,
) -> Result<Endpoints, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)?;
    Ok(Endpoints::from_app_config(&json)?)
}

fn print_answer(index: usize, turn: &ChatTurn, escalation_offered: bool) {
    let bar = BAR_CHAR.bright_cyan();
    println!("{bar}🤖 {}", turn.text().bright_white());
    let references = turn.references().map_or(0, <[_]>::len);
    if references > 0 {
        println!("{bar}{}", format!("{references} reference(s)").dimmed());
    }
    println!("{bar}{}", format!("#{index}, /copy {index}").dimmed());
    if escalation_offered {
        let bar = BAR_CHAR.bright_yellow();
        println!("{bar}Not answered? Open a ticket with /ticket {index}");
    }
}

fn print_notification(notification: Notification) {
    let title = notification.title.bold();
    if notification.success {
        println!("{}{title}", BAR_CHAR.bright_green());
    } else {
        println!("{}{title}", BAR_CHAR.bright_red());
    }
    if !notification.content.is_empty() {
        println!("{}{}", BAR_CHAR.bright_black(), notification.content);
    }
}

fn print_error(err: &Error) {
    eprintln!("{} {err}", "error:".bright_red());
}

async fn prompt_field(
    input: &mut Input,
    label: &str,
    current: &str,
) -> Option<String> {
    if current.is_empty() {
        print!("{label}: ");
    } else {
        print!("{label} [{}]: ", current.dimmed());
    }
    std::io::stdout().flush().unwrap();

    let line = read_line(input).await?;
    let line = line.trim();
    let value = if line.is_empty() { current } else { line };
    Some(value.to_owned())
}

async fn read_line(input: &mut Input) -> Option<String> {
    let mut line = String::new();

    match input.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
