use anyhow::Result;
use clap::Parser;
use idle_interrupts::config::{Config, WINDOW_TARGET};
use idle_interrupts::services::{
    create_interrupt_source, default_scheduler, global_window, DefaultWindowProvider,
    EventDispatcher, InterruptSource, TargetObject,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "idle-interrupts")]
#[command(about = "Демонстрация источников прерываний: события из stdin рассылаются по целям")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "idle.toml")]
    config: String,

    /// Режим SSR: источники подключаются, но ничего не слушают
    #[arg(long)]
    ssr: bool,

    /// Уровень логирования (перекрывает конфигурацию)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let mut config = Config::load(&args.config)?;
    if args.ssr {
        config.force_ssr();
    }

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск idle-interrupts v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.ssr {
        warn!("Режим SSR - прерывания не будут генерироваться");
    }

    // Именованные цели, кроме окна, создаёт сам хост
    let dispatchers: HashMap<String, Arc<EventDispatcher>> = config
        .named_targets()
        .into_iter()
        .map(|name| (name.to_string(), Arc::new(EventDispatcher::new())))
        .collect();
    let targets: HashMap<String, Arc<dyn TargetObject>> = dispatchers
        .iter()
        .map(|(name, dispatcher)| (name.clone(), Arc::clone(dispatcher) as Arc<dyn TargetObject>))
        .collect();

    let mut sources: Vec<Box<dyn InterruptSource>> = Vec::with_capacity(config.sources.len());
    for source_config in &config.sources {
        let source = create_interrupt_source(
            source_config,
            &DefaultWindowProvider,
            &targets,
            default_scheduler(),
        )?;
        source.on_interrupt().subscribe(|interrupt| {
            info!("Прерывание: {}", interrupt);
        });
        source.attach();
        sources.push(source);
    }

    info!("Подключено источников: {}", sources.len());
    info!("Вводите события построчно: <событие> или <цель>:<событие>");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => dispatch_line(line.trim(), &dispatchers),
                Ok(None) => {
                    info!("Ввод завершён");
                    break;
                }
                Err(e) => {
                    error!("Ошибка чтения stdin: {}", e);
                    break;
                }
            },
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                    Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
                }
                break;
            }
        }
    }

    info!("Завершение работы...");
    for source in &sources {
        source.detach();
    }

    info!("idle-interrupts завершил работу");
    Ok(())
}

fn dispatch_line(line: &str, dispatchers: &HashMap<String, Arc<EventDispatcher>>) {
    if line.is_empty() {
        return;
    }

    let (target, event) = match line.split_once(':') {
        Some((target, event)) => (target.trim(), event.trim()),
        None => (WINDOW_TARGET, line),
    };

    let delivered = if target == WINDOW_TARGET {
        global_window().dispatch_named(event)
    } else {
        match dispatchers.get(target) {
            Some(dispatcher) => dispatcher.dispatch_named(event),
            None => {
                warn!("Неизвестная цель: {}", target);
                return;
            }
        }
    };

    if delivered == 0 {
        info!("Событие '{}' на '{}' никто не слушает", event, target);
    }
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        "compact" => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    Ok(())
}
