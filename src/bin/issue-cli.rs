use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use url::Url;

#[derive(Parser)]
#[command(name = "issue-cli")]
#[command(about = "Command-line client for the issue tracker API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a project's issues
    List {
        project: String,
        /// Equality filter, e.g. `--filter open=true` (repeatable)
        #[arg(short, long, value_parser = parse_filter)]
        filter: Vec<(String, String)>,
    },
    /// Create an issue
    Create {
        project: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        created_by: String,
        #[arg(long)]
        assigned_to: Option<String>,
        #[arg(long)]
        status_text: Option<String>,
    },
    /// Update fields of an issue
    Update {
        project: String,
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        created_by: Option<String>,
        #[arg(long)]
        assigned_to: Option<String>,
        #[arg(long)]
        status_text: Option<String>,
        #[arg(long)]
        open: Option<bool>,
    },
    /// Delete an issue
    Delete { project: String, id: String },
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

/// `{base}/api/issues/{project}`, escaping `project` as a single path segment.
fn issues_url(base: &str, project: &str) -> Result<Url, String> {
    let mut url = Url::parse(base).map_err(|e| format!("invalid --url '{base}': {e}"))?;
    url.path_segments_mut()
        .map_err(|_| format!("--url '{base}' cannot carry a path"))?
        .pop_if_empty()
        .extend(["api", "issues", project]);
    Ok(url)
}

fn insert_some(body: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(v) = value {
        body.insert(key.to_string(), v);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.as_str();

    match cli.command {
        Commands::List { project, filter } => {
            let res = client
                .get(issues_url(base, &project)?)
                .query(&filter)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Create {
            project,
            title,
            text,
            created_by,
            assigned_to,
            status_text,
        } => {
            let mut body = Map::new();
            body.insert("issue_title".into(), title.into());
            body.insert("issue_text".into(), text.into());
            body.insert("created_by".into(), created_by.into());
            insert_some(&mut body, "assigned_to", assigned_to.map(Value::from));
            insert_some(&mut body, "status_text", status_text.map(Value::from));

            let res = client
                .post(issues_url(base, &project)?)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Update {
            project,
            id,
            title,
            text,
            created_by,
            assigned_to,
            status_text,
            open,
        } => {
            let mut body = Map::new();
            body.insert("_id".into(), id.into());
            insert_some(&mut body, "issue_title", title.map(Value::from));
            insert_some(&mut body, "issue_text", text.map(Value::from));
            insert_some(&mut body, "created_by", created_by.map(Value::from));
            insert_some(&mut body, "assigned_to", assigned_to.map(Value::from));
            insert_some(&mut body, "status_text", status_text.map(Value::from));
            insert_some(&mut body, "open", open.map(Value::from));

            let res = client
                .put(issues_url(base, &project)?)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Delete { project, id } => {
            let res = client
                .delete(issues_url(base, &project)?)
                .json(&serde_json::json!({ "_id": id }))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    if let Some(error) = json.get("error").and_then(Value::as_str) {
        eprintln!("Error: {}", error);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
