//! Command-line front end: collects a file or a question, calls the client,
//! prints the result or the error message verbatim.

use crate::{
    Result,
    api::DocumentFile,
    client::{KnowledgeApi, KnowledgeClient},
    config::Config,
    session::ChatSession,
    store::DocumentStore,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::info;

/// Upload documents to a knowledge backend and ask questions about them
#[derive(Parser, Debug)]
#[command(name = "ragdesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides the configuration file)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// File remembering the latest uploaded document id
    #[arg(long, global = true, env = "RAGDESK_STATE", value_name = "FILE")]
    pub state_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload and index a document
    Upload {
        /// Path of the document to upload
        path: PathBuf,
    },
    /// Ask a single question
    Ask {
        /// The question; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Scope the question to this document instead of the latest upload
        #[arg(short, long, value_name = "ID")]
        document_id: Option<String>,
    },
    /// Interactive question/answer session on stdin
    Chat {
        #[arg(short, long, value_name = "ID")]
        document_id: Option<String>,
    },
    /// Check that the backend is up
    Health,
    /// Forget the latest uploaded document id
    Forget,
}

impl Cli {
    /// Folds command-line overrides into the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref url) = self.base_url {
            config.api.base_url = url.clone();
        }
        if let Some(ref path) = self.state_path {
            config.storage.state_path = path.clone();
        }
    }
}

pub async fn run(command: Command, config: Config) -> Result<()> {
    let store = DocumentStore::open(&config.storage.state_path).await?;
    let client = KnowledgeClient::new(&config.api, store)?;
    info!("Using backend at {}", config.api.base());

    let mut stdout = tokio::io::stdout();

    match command {
        Command::Upload { path } => {
            let file = DocumentFile::from_path(&path, config.api.max_upload_bytes).await?;
            let result = client.upload(Some(file)).await?;
            let mut line = format!("✅ {}", result.message());
            if let Some(id) = result.document_id() {
                line.push_str(&format!(" (document id: {})", id));
            }
            write_line(&mut stdout, &line).await?;
        }
        Command::Ask {
            question,
            document_id,
        } => {
            let question = question.join(" ");
            let result = client.ask(&question, document_id.as_deref()).await?;
            write_line(&mut stdout, &result.answer).await?;
        }
        Command::Chat { document_id } => {
            let mut session = ChatSession::new(client);
            if let Some(id) = document_id {
                session = session.with_document(id);
            }
            chat_loop(&mut session, tokio::io::stdin(), &mut stdout).await?;
        }
        Command::Health => {
            let status = client.health().await?;
            let label = if status.healthy { "healthy" } else { "unhealthy" };
            write_line(&mut stdout, &format!("{} {}", label, status.body)).await?;
        }
        Command::Forget => {
            client.store().forget().await?;
            write_line(&mut stdout, "Forgot the latest document id").await?;
        }
    }

    Ok(())
}

/// Reads questions line by line until EOF or `exit`/`quit`, printing each
/// reply. Failures are printed and the loop continues.
pub async fn chat_loop<A, R, W>(session: &mut ChatSession<A>, input: R, output: &mut W) -> Result<()>
where
    A: KnowledgeApi,
    R: tokio::io::AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(input).lines();

    write_prompt(output).await?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if matches!(line, "exit" | "quit") {
            break;
        }

        if let Some(turn) = session.send(line).await {
            let text = if turn.is_error {
                format!("❌ {}", turn.text)
            } else {
                turn.text.clone()
            };
            write_line(output, &text).await?;
        }
        write_prompt(output).await?;
    }

    Ok(())
}

async fn write_prompt<W: AsyncWrite + Unpin>(output: &mut W) -> Result<()> {
    output.write_all(b"> ").await?;
    output.flush().await?;
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
