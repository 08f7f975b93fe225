use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command line client for the command gateway API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token sent with every call.
    #[arg(short, long)]
    token: Option<String>,

    /// API base path.
    #[arg(long, default_value = "/api")]
    base_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a device or entity (GET)
    Get {
        /// Command path, e.g. boiler/temp
        path: String,
    },
    /// Call a command with an optional JSON body
    Call {
        /// Command path, e.g. boiler/temp
        path: String,
        /// JSON object sent as the body
        #[arg(short, long)]
        data: Option<String>,
        #[arg(short, long, value_enum, default_value_t = CallMethod::Post)]
        method: CallMethod,
    },
    /// Show gateway info (system/info)
    Info,
}

#[derive(Clone, Copy, ValueEnum)]
enum CallMethod {
    Post,
    Put,
    Patch,
}

impl From<CallMethod> for Method {
    fn from(m: CallMethod) -> Self {
        match m {
            CallMethod::Post => Method::POST,
            CallMethod::Put => Method::PUT,
            CallMethod::Patch => Method::PATCH,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    let endpoint = |path: &str| {
        format!(
            "{}{}/{}",
            cli.url.trim_end_matches('/'),
            cli.base_path.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    };

    let res = match &cli.command {
        Commands::Get { path } => client.get(endpoint(path)).headers(headers).send().await?,
        Commands::Call { path, data, method } => {
            let mut req = client.request((*method).into(), endpoint(path)).headers(headers);
            if let Some(data) = data {
                let body: Value = serde_json::from_str(data)?;
                req = req.json(&body);
            }
            req.send().await?
        }
        Commands::Info => client.get(endpoint("system/info")).headers(headers).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let body = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", body);
    } else {
        eprintln!("Error: API returned status {}", status);
        eprintln!("{}", body);
        std::process::exit(1);
    }
    Ok(())
}
