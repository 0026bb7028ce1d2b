mod command;
mod painter;

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use medchat_widget::chat::Submit;
use medchat_widget::settings::{SettingsError, SettingsStore};
use medchat_widget::timer::TokioSleeper;
use medchat_widget::{
    ApiError, ChatApi, ChatWidgetController, HttpChatApi, Intent, Sleeper, UploadSource,
    WidgetView,
};
use snafu::{ResultExt, Snafu};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::{JoinSet, LocalSet};
use tracing_subscriber::EnvFilter;

use crate::command::{Command, HELP};
use crate::painter::TerminalPainter;

#[derive(Debug, Snafu)]
enum CliError {
    #[snafu(display("failed to load settings on `{stage}`: {source}"))]
    Settings {
        stage: &'static str,
        source: SettingsError,
    },

    #[snafu(display("failed to create the HTTP client on `{stage}`: {source}"))]
    Client {
        stage: &'static str,
        source: ApiError,
    },

    #[snafu(display("failed to start the runtime on `{stage}`: {source}"))]
    Runtime {
        stage: &'static str,
        source: std::io::Error,
    },

    #[snafu(display("failed to read from stdin on `{stage}`: {source}"))]
    Stdin {
        stage: &'static str,
        source: std::io::Error,
    },
}

#[snafu::report]
fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = SettingsStore::load().context(SettingsSnafu {
        stage: "load-settings",
    })?;
    let settings = store.settings().clone();
    let api = HttpChatApi::new(&settings).context(ClientSnafu {
        stage: "build-http-client",
    })?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context(RuntimeSnafu {
            stage: "build-runtime",
        })?;

    let controller = Rc::new(
        ChatWidgetController::new(api, TokioSleeper)
            .with_status_clear_delay(settings.status_clear_delay()),
    );
    attach_painter(&controller);
    println!(
        "medchat connected to {}, type /help for commands",
        settings.base_url
    );

    let stdin = BufReader::new(tokio::io::stdin());
    LocalSet::new().block_on(&runtime, run(controller, stdin))
}

fn attach_painter<A: ChatApi, S: Sleeper>(controller: &ChatWidgetController<A, S>) {
    let painter = RefCell::new(TerminalPainter::default());
    controller.set_observer(Rc::new(move |view: &WidgetView| {
        for line in painter.borrow_mut().paint(view) {
            println!("{line}");
        }
    }));
}

/// Reads commands until `/quit` or end of input.
///
/// Must run inside a [`LocalSet`]. On end of input every command still in
/// flight is awaited; `/quit` drops them.
async fn run<A, S, R>(
    controller: Rc<ChatWidgetController<A, S>>,
    input: R,
) -> Result<(), CliError>
where
    A: ChatApi + 'static,
    S: Sleeper + 'static,
    R: AsyncBufRead + Unpin,
{
    let mut tasks = JoinSet::new();

    let restoring = Rc::clone(&controller);
    tasks.spawn_local(async move {
        restoring.sync_active_file_on_load().await;
    });

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context(StdinSnafu {
        stage: "read-command",
    })? {
        match Command::parse(&line) {
            Command::Quit => {
                tracing::debug!(pending = tasks.len(), "quit requested");
                return Ok(());
            }
            Command::Help => println!("{HELP}"),
            Command::Invalid(reason) => println!("{reason}"),
            Command::ClosePreview => controller.close_preview(),
            command => {
                let controller = Rc::clone(&controller);
                tasks.spawn_local(async move {
                    execute(&controller, command).await;
                });
            }
        }
    }

    tracing::debug!(pending = tasks.len(), "input closed, finishing pending commands");
    while let Some(joined) = tasks.join_next().await {
        if let Err(error) = joined {
            tracing::error!(%error, "command task failed");
        }
    }
    Ok(())
}

async fn execute<A, S>(controller: &ChatWidgetController<A, S>, command: Command)
where
    A: ChatApi,
    S: Sleeper,
{
    let intent = match command {
        Command::Send(text) => Intent::from(Submit::new(text)),
        Command::Upload(path) => match read_upload(&path).await {
            Ok(source) => Intent::from(source),
            Err(error) => {
                tracing::warn!(path = ?path, %error, "failed to read file for upload");
                println!("cannot read {}: {error}", path.display());
                return;
            }
        },
        Command::Clear => Intent::ClearFile,
        Command::ClosePreview => Intent::ClosePreview,
        Command::Help | Command::Quit | Command::Invalid(_) => return,
    };

    controller.dispatch(intent).await;
}

async fn read_upload(path: &Path) -> std::io::Result<UploadSource> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadSource::new(file_name, bytes))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::future::LocalBoxFuture;
    use medchat_widget::chat::BubbleContent;
    use medchat_widget::{ApiResult, ChatRequest, FileStatus, FileType, UploadedFile};

    use super::*;

    /// Answers after one second per character of the message, so replies land
    /// after the input is exhausted and in the order they were sent.
    struct SlowBackend;

    impl ChatApi for SlowBackend {
        fn chat<'a>(&'a self, request: ChatRequest) -> LocalBoxFuture<'a, ApiResult<String>> {
            Box::pin(async move {
                let delay = Duration::from_secs(request.message.len() as u64);
                tokio::time::sleep(delay).await;
                Ok(format!("echo: {}", request.message))
            })
        }

        fn upload<'a>(
            &'a self,
            file: UploadSource,
        ) -> LocalBoxFuture<'a, ApiResult<UploadedFile>> {
            Box::pin(async move {
                Ok(UploadedFile {
                    filename: file.file_name,
                    file_type: FileType::Pdf,
                    content: Some("LDL 190".to_string()),
                    file_url: None,
                })
            })
        }

        fn clear_file<'a>(&'a self) -> LocalBoxFuture<'a, ApiResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn file_status<'a>(&'a self) -> LocalBoxFuture<'a, ApiResult<FileStatus>> {
            Box::pin(async { Ok(FileStatus::default()) })
        }
    }

    fn texts(view: &WidgetView) -> Vec<String> {
        view.transcript
            .iter()
            .filter_map(|bubble| match &bubble.content {
                BubbleContent::Paragraphs(paragraphs) => Some(paragraphs.join("\n")),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn pending_turns_finish_after_input_closes() {
        let controller = Rc::new(ChatWidgetController::new(SlowBackend, TokioSleeper));
        let input = BufReader::new(&b"hello\nhow are you?\n"[..]);

        LocalSet::new()
            .run_until(run(Rc::clone(&controller), input))
            .await
            .expect("run should finish cleanly");

        assert_eq!(
            texts(&controller.view()),
            vec!["hello", "how are you?", "echo: hello", "echo: how are you?"]
        );
        assert_eq!(controller.view().typing, None);
    }

    #[tokio::test(start_paused = true)]
    async fn quit_returns_without_waiting_for_replies() {
        let controller = Rc::new(ChatWidgetController::new(SlowBackend, TokioSleeper));
        let input = BufReader::new(&b"hello\n/quit\nignored\n"[..]);

        LocalSet::new()
            .run_until(run(Rc::clone(&controller), input))
            .await
            .expect("run should finish cleanly");

        assert!(!texts(&controller.view()).contains(&"echo: hello".to_string()));
        assert!(!texts(&controller.view()).contains(&"ignored".to_string()));
    }
}
