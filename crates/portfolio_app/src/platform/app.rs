use std::io::{self, BufRead};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use portfolio_core::{
    update, Certificate, CollectionDetails, CollectionState, CollectionView, ContactForm,
    ContentRecord, ExperienceDetails, LoadPhase, Msg, ProjectDetails, Record, ALL_CATEGORIES,
};
use portfolio_engine::{
    AppContext, BackendSettings, CacheStore, ContentLoader, FallbackRecords, FileCache,
    MemoryCache,
};
use portfolio_logging::{portfolio_info, portfolio_warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::admin;
use super::cli::{BrowseArgs, Cli, CollectionArg, Commands, ContactArgs};
use super::effects::EffectRunner;
use super::logging;
use super::render;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

pub fn run_app() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::initialize(cli.log.into());

    let settings = BackendSettings::from_env();
    if let Some(warning) = settings.config_warning() {
        portfolio_warn!("{}", warning);
    }

    match cli.command {
        Commands::EnvCheck => {
            env_check(&settings);
            Ok(())
        }
        Commands::Contact(args) => contact(args),
        Commands::Browse(args) => {
            let cache = open_cache(&args)?;
            let ctx = AppContext::connect(settings, cache)?;
            match args.collection {
                CollectionArg::Projects => browse::<ProjectDetails>(&ctx, &args, None),
                CollectionArg::Experience => {
                    let certificates = ViewSession::start(ctx.certificates_loader())?;
                    browse::<ExperienceDetails>(&ctx, &args, Some(certificates))
                }
            }
        }
        Commands::Cv { out } => {
            let ctx = AppContext::connect(settings, Arc::new(MemoryCache::new()))?;
            runtime()?.block_on(admin::download_cv(&ctx, &out))
        }
        Commands::Admin(args) => {
            let ctx = AppContext::connect(settings, Arc::new(MemoryCache::new()))?;
            runtime()?.block_on(admin::run(&ctx, args))
        }
    }
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start async runtime")
}

fn open_cache(args: &BrowseArgs) -> anyhow::Result<Arc<dyn CacheStore>> {
    if args.session_cache {
        return Ok(Arc::new(MemoryCache::new()));
    }
    let cache = FileCache::new(&args.cache_dir)
        .with_context(|| format!("cannot use cache directory {}", args.cache_dir.display()))?;
    Ok(Arc::new(cache))
}

fn env_check(settings: &BackendSettings) {
    let diagnostics = settings.diagnostics();
    println!("Backend URL:    {}", diagnostics.backend_url);
    println!("Anon key:       {}", diagnostics.anon_key);
    println!("Configured:     {}", if diagnostics.configured { "yes" } else { "no" });
    println!("Load deadline:  {:?}", diagnostics.load_deadline);
    if let Some(warning) = settings.config_warning() {
        println!();
        println!("{warning}");
    }
}

fn contact(args: ContactArgs) -> anyhow::Result<()> {
    let form = ContactForm {
        name: args.name,
        email: args.email,
        subject: args.subject,
        message: args.message,
    };
    if let Err(errors) = form.validate() {
        for error in errors.iter() {
            eprintln!("  {error}");
        }
        anyhow::bail!("contact form has {} problem(s)", errors.0.len());
    }
    println!("Message from {} <{}> is ready to send.", form.name.trim(), form.email.trim());
    Ok(())
}

/// Owns the collection state and feeds its effects to the engine.
struct ViewSession<R: Record> {
    state: CollectionState<R>,
    runner: EffectRunner<R>,
}

impl<R> ViewSession<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    /// Starts an engine for `loader` and mounts the view.
    fn start(loader: ContentLoader<R>) -> anyhow::Result<Self> {
        let runner = EffectRunner::new(loader).context("failed to start the load engine")?;
        let mut session = Self {
            state: CollectionState::new(),
            runner,
        };
        session.dispatch(Msg::Mounted);
        Ok(session)
    }

    fn dispatch(&mut self, msg: Msg<R>) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    fn pump(&mut self) {
        for msg in self.runner.drain() {
            self.dispatch(msg);
        }
        self.dispatch(Msg::Tick { now: Instant::now() });
    }

    fn take_dirty_view(&mut self) -> Option<CollectionView<R>> {
        if self.state.consume_dirty() {
            Some(self.state.view())
        } else {
            None
        }
    }

    /// Live data or a final failure is in and no search input is still pending.
    fn is_settled(&self) -> bool {
        let view = self.state.view();
        matches!(self.state.phase(), LoadPhase::Settled { .. })
            && view.query_input == view.committed_query
    }
}

/// Experience is browsed together with the uploaded certificates, each with
/// its own snapshot and deadline.
fn browse<D>(
    ctx: &AppContext,
    args: &BrowseArgs,
    mut certificates: Option<ViewSession<Certificate>>,
) -> anyhow::Result<()>
where
    D: CollectionDetails + Serialize + DeserializeOwned,
    ContentRecord<D>: FallbackRecords,
{
    let mut session = ViewSession::start(ctx.loader::<D>())?;

    if let Some(category) = &args.category {
        session.dispatch(Msg::CategorySelected(category.clone()));
    }
    if let Some(query) = &args.query {
        session.dispatch(Msg::QueryChanged {
            text: query.clone(),
            at: Instant::now(),
        });
        session.dispatch(Msg::QuerySubmitted);
    }

    if args.interactive {
        interactive_loop(&mut session, &mut certificates);
    } else {
        while !session.is_settled() || certificates.as_ref().is_some_and(|c| !c.is_settled()) {
            session.pump();
            if let Some(view) = session.take_dirty_view() {
                portfolio_info!("{}", render::header(&view));
            }
            if let Some(certificates) = certificates.as_mut() {
                certificates.pump();
                if let Some(view) = certificates.take_dirty_view() {
                    portfolio_info!("{}", render::header(&view));
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
        for line in render::render(&session.state.view()) {
            println!("{line}");
        }
        if let Some(certificates) = &certificates {
            print_certificates(&certificates.state.view());
        }
    }

    session.dispatch(Msg::Unmounted);
    if let Some(certificates) = certificates.as_mut() {
        certificates.dispatch(Msg::Unmounted);
    }
    Ok(())
}

fn print_certificates(view: &CollectionView<Certificate>) {
    let lines = render::render_certificates(view);
    if !lines.is_empty() {
        println!();
    }
    for line in lines {
        println!("{line}");
    }
}

fn interactive_loop<R>(
    session: &mut ViewSession<R>,
    certificates: &mut Option<ViewSession<Certificate>>,
) where
    R: Record + Serialize + DeserializeOwned,
{
    println!("Type to search, `:c <category>` to filter, `:r` to refresh, `:q` to quit.");
    let input = spawn_stdin_reader();
    loop {
        session.pump();
        if let Some(certificates) = certificates.as_mut() {
            certificates.pump();
        }
        let main_view = session.take_dirty_view();
        let certificates_view = certificates.as_mut().and_then(ViewSession::take_dirty_view);
        if main_view.is_some() || certificates_view.is_some() {
            println!();
            for line in render::render(&session.state.view()) {
                println!("{line}");
            }
            if let Some(certificates) = certificates.as_ref() {
                print_certificates(&certificates.state.view());
            }
        }
        match input.recv_timeout(POLL_INTERVAL) {
            Ok(InputLine::Quit) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Ok(InputLine::Refresh) => {
                session.dispatch(Msg::RefreshRequested);
                if let Some(certificates) = certificates.as_mut() {
                    certificates.dispatch(Msg::RefreshRequested);
                }
            }
            Ok(line) => {
                if let Some(msg) = line.into_msg() {
                    session.dispatch(msg);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputLine {
    Query(String),
    Category(String),
    Refresh,
    Quit,
}

impl InputLine {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        match trimmed.trim() {
            ":q" | ":quit" => return InputLine::Quit,
            ":r" | ":refresh" => return InputLine::Refresh,
            ":c" | ":category" => return InputLine::Category(ALL_CATEGORIES.to_string()),
            _ => {}
        }
        for prefix in [":c ", ":category "] {
            if let Some(category) = trimmed.trim_start().strip_prefix(prefix) {
                return InputLine::Category(category.trim().to_string());
            }
        }
        InputLine::Query(trimmed.to_string())
    }

    fn into_msg<R>(self) -> Option<Msg<R>> {
        match self {
            InputLine::Query(text) => Some(Msg::QueryChanged {
                text,
                at: Instant::now(),
            }),
            InputLine::Category(category) => Some(Msg::CategorySelected(category)),
            InputLine::Refresh => Some(Msg::RefreshRequested),
            InputLine::Quit => None,
        }
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<InputLine> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let parsed = InputLine::parse(&line);
            let quit = parsed == InputLine::Quit;
            if tx.send(parsed).is_err() || quit {
                break;
            }
        }
    });
    rx
}
