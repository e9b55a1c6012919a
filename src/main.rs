use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use diem_thi_lookup::models::{Config, DataSourceMode};
use diem_thi_lookup::report::{export_group_csv, render_error, render_lookup};
use diem_thi_lookup::{ConfiguredSource, DataSource, Session};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("diem-thi-lookup")
        .version("1.0")
        .about("Looks up exam scores by SBD and lists eligible admission subject groups")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("sbd")
                .short('s')
                .long("sbd")
                .value_name("SBD")
                .help("Examinee identifier to look up (repeatable); reads from stdin when omitted")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("export")
                .short('e')
                .long("export")
                .help("Write each group report as CSV into the output directory")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .value_name("FILE")
                .help("Read the dataset from this local file")
                .conflicts_with("url"),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .value_name("URL")
                .help("Download the dataset from this URL"),
        )
        .get_matches();

    let config_file = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config.toml");

    // Load or create configuration
    let mut config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)
            .with_context(|| format!("Failed to load configuration: {}", config_file))?
    } else {
        println!("📝 Creating default configuration file: {}", config_file);
        let default_config = Config::default();
        default_config.save_to_file(config_file)?;
        default_config
    };

    if let Some(path) = matches.get_one::<String>("data") {
        config.data_source_mode = DataSourceMode::Local;
        config.data_file = Some(path.clone());
    }
    if let Some(url) = matches.get_one::<String>("url") {
        config.data_source_mode = DataSourceMode::Internet;
        config.data_url = Some(url.clone());
    }

    let export_dir = matches.get_flag("export").then(|| {
        PathBuf::from(config.output_directory.as_deref().unwrap_or("output"))
    });

    let source = ConfiguredSource::from_config(&config)?;
    println!("📂 Dataset: {}", source.describe());
    let session = Session::new(source);

    if config.preload {
        match session.preload().await {
            Ok(count) => println!("✅ Loaded {} examinee records", count),
            Err(err) => println!("{}", render_error(&err)),
        }
    }

    let queries: Vec<String> = matches
        .get_many::<String>("sbd")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    if queries.is_empty() {
        run_interactive(&session, export_dir.as_deref()).await?;
    } else {
        for query in &queries {
            run_query(&session, query, export_dir.as_deref()).await?;
        }
    }

    Ok(())
}

async fn run_interactive<S: DataSource>(session: &Session<S>, export_dir: Option<&Path>) -> Result<()> {
    println!("🔍 Enter an SBD to look up (q to quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("SBD> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == "q" {
            break;
        }
        run_query(session, &line, export_dir).await?;
    }

    Ok(())
}

async fn run_query<S: DataSource>(
    session: &Session<S>,
    query: &str,
    export_dir: Option<&Path>,
) -> Result<()> {
    let lookup = match session.lookup(query).await {
        Ok(lookup) => lookup,
        Err(err) => {
            println!("{}", render_error(&err));
            return Ok(());
        }
    };

    println!("\n{}", render_lookup(&lookup));
    info!(groups = lookup.groups.groups.len(), "lookup complete");

    if let Some(dir) = export_dir {
        let path = export_group_csv(&lookup, dir)?;
        println!("📄 Group report written to: {}", path.display());
    }

    Ok(())
}
