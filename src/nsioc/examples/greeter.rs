use std::sync::Arc;
use std::time::Duration;

use nsioc::prelude::*;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nsioc=debug".parse().unwrap()))
        .init();

    let container = Container::new();
    container.config().registry(GreeterConfig::new()).unwrap();
    container.default_namespace().registry(ConsoleLogger).unwrap();
    container
        .default_namespace()
        .registry(ConfiguredGreeter {
            config: Autowired::new(),
        })
        .unwrap();
    container
        .controllers()
        .registry(App {
            logger: Autowired::new(),
            greeter: Autowired::new(),
        })
        .unwrap();

    // GREETER_GREETER_GREETING="Hi" overrides the greeting.
    let request = LoadRequest::new().with_config(
        LoadConfigRequest::new()
            .with_env_prefix("GREETER_")
            .with_file("greeter.toml")
            .skip_missing_files(true),
    );
    if let Err(err) = container.load(&request) {
        eprintln!("{err}");
        return;
    }

    print!("{}", container.dependency_graph());

    let app: Arc<App> = container.require("controllers", "app").unwrap();
    app.run("Rust");

    container.shutdown(&ShutdownContext::with_timeout(Duration::from_secs(1)));
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Greeting {
    greeting: String,
    punctuation: String,
}

#[derive(Autowire)]
struct GreeterConfig {
    value: Mutex<Greeting>,
}

impl GreeterConfig {
    fn new() -> Self {
        Self {
            value: Mutex::new(Greeting {
                greeting: "Hello".into(),
                punctuation: "!".into(),
            }),
        }
    }
}

impl Object for GreeterConfig {
    fn name(&self) -> &str {
        "greeter"
    }

    fn load_config(&self, source: &ConfigSource<'_>) -> Result<(), ConfigError> {
        let current = self.value.lock().clone();
        *self.value.lock() = source.extract(&current)?;
        Ok(())
    }
}

trait Logger: Send + Sync + 'static {
    fn log(&self, message: &str);
}

#[derive(Autowire)]
#[ioc(provides(dyn Logger))]
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("[greeter] {message}");
    }
}

impl Object for ConsoleLogger {
    fn name(&self) -> &str {
        "logger"
    }

    fn priority(&self) -> i32 {
        100
    }
}

trait Greeter: Send + Sync + 'static {
    fn greet(&self, name: &str) -> String;
}

#[derive(Autowire)]
#[ioc(provides(dyn Greeter))]
struct ConfiguredGreeter {
    #[ioc("autowire=true;namespace=config;name=greeter")]
    config: Autowired<GreeterConfig>,
}

impl Greeter for ConfiguredGreeter {
    fn greet(&self, name: &str) -> String {
        match self.config.get() {
            Some(config) => {
                let value = config.value.lock();
                format!("{}, {name}{}", value.greeting, value.punctuation)
            }
            None => format!("Hello, {name}!"),
        }
    }
}

impl Object for ConfiguredGreeter {
    fn name(&self) -> &str {
        "greeter"
    }
}

#[derive(Autowire)]
struct App {
    #[ioc("autowire=true;namespace=default;name=logger")]
    logger: Autowired<dyn Logger>,
    #[ioc("autowire=true;namespace=default;name=greeter")]
    greeter: Autowired<dyn Greeter>,
}

impl App {
    fn run(&self, name: &str) {
        let (Some(logger), Some(greeter)) = (self.logger.get(), self.greeter.get()) else {
            eprintln!("app is not wired");
            return;
        };
        logger.log(&greeter.greet(name));
    }
}

impl Object for App {
    fn name(&self) -> &str {
        "app"
    }

    fn on_pre_stop(&self, _ctx: &ShutdownContext) -> Result<(), BoxError> {
        if let Some(logger) = self.logger.get() {
            logger.log("goodbye");
        }
        Ok(())
    }
}
