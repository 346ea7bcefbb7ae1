use configor::{ConfigError, Configor};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Serialize, Deserialize, Configor)]
#[serde(default)]
pub struct Database {
    /// Database name
    pub name: String,
    /// Database user
    #[field(default = "root")]
    pub user: String,
    /// Database password
    #[field(required, env = "DBPassword")]
    pub password: String,
    /// Database port
    #[field(default = 3306)]
    pub port: u32,
}

#[derive(Debug, Default, Serialize, Deserialize, Configor)]
#[serde(default)]
pub struct Contact {
    pub name: String,
    #[field(required)]
    pub email: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Configor)]
#[serde(default)]
pub struct Meta {
    /// Free-form description
    pub description: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Configor)]
#[serde(default)]
pub struct DemoConfig {
    /// Application name
    #[field(default = "configor")]
    pub app_name: String,
    pub db: Database,
    pub contacts: Vec<Contact>,
    #[field(anonymous)]
    pub meta: Meta,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    dotenvy::from_filename("./test.env").ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("load") => load(&args[1..]),
        Some("dump") => dump(&args[1..]),
        Some("docs") => docs(args.get(1).map(String::as_str)),
        Some(arg) => {
            println!(
                "unknown arg: {}. Available: load, dump, docs",
                arg
            );
            Ok(())
        }
        None => {
            println!("Usage: configor-cli [command]");
            println!("Commands:");
            println!("  load <files..> - Load DemoConfig from files and the environment");
            println!("  dump <path>    - Load DemoConfig from the environment and write it to <path>");
            println!("  docs [path]    - Print or write the environment variable documentation");
            Ok(())
        }
    };

    if let Err(error) = result {
        eprintln!("Failed to load config:");
        eprintln!("\t- {}", error);
        std::process::exit(1);
    }
}

fn load(files: &[String]) -> Result<(), ConfigError> {
    let mut config = DemoConfig::default();
    Configor::new().load(&mut config, files)?;

    println!("Config loaded successfully!");
    println!("  app_name: {}", config.app_name);
    println!("  db.name: {}", config.db.name);
    println!("  db.user: {}", config.db.user);
    println!("  db.port: {}", config.db.port);
    println!("  contacts: {}", config.contacts.len());
    println!("  description: {}", config.meta.description);
    Ok(())
}

fn dump(args: &[String]) -> Result<(), ConfigError> {
    let Some(path) = args.first() else {
        println!("Usage: configor-cli dump <path>");
        return Ok(());
    };

    let configor = Configor::new();
    let mut config = DemoConfig::default();
    configor.bind(&mut config)?;
    configor.dump(&config, path)?;
    println!("✓ Configuration written to {}", path);
    Ok(())
}

fn docs(path: Option<&str>) -> Result<(), ConfigError> {
    let mut config = DemoConfig {
        contacts: vec![Contact::default()],
        ..Default::default()
    };
    let docs = Configor::new().docs(&mut config)?;

    match path {
        Some(path) => match docs.write(path) {
            Ok(_) => println!("✓ Documentation written to {}", path),
            Err(e) => eprintln!("✗ Failed to write documentation: {}", e),
        },
        None => print!("{}", docs.to_markdown()),
    }
    Ok(())
}
