use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::client::types::StoredResume;
use crate::client::upload::upload_file;
use crate::client::ApiClient;
use crate::errors::ClientError;
use crate::session::{AnalysisForm, AnalysisSession, ResumeFile};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Match a résumé against a job posting and get tailoring advice.
#[derive(Parser, Debug)]
#[command(name = "tailor", author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the tailoring service
    #[arg(long, global = true, env = "TAILOR_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a job posting, optionally against a PDF résumé, and stream the advice
    Analyze {
        /// URL of the job posting
        #[arg(long)]
        job_url: String,

        /// PDF résumé to compare against the posting
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Also write the finished Markdown to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Upload a file straight to object storage through a presigned URL
    Upload {
        path: PathBuf,

        /// Override the content type inferred from the extension
        #[arg(long)]
        content_type: Option<String>,
    },

    /// List résumés already in storage, newest first
    Resumes,
}

pub async fn run(cli: Cli) -> Result<()> {
    let client = ApiClient::new(&cli.api_url)?;

    match cli.command {
        Command::Analyze {
            job_url,
            resume,
            save,
        } => analyze(client, &job_url, resume.as_deref(), save.as_deref()).await?,
        Command::Upload { path, content_type } => {
            let stored = upload_file(&client, &path, content_type.as_deref()).await?;
            println!("Uploaded to s3://{}/{}", stored.bucket, stored.key);
        }
        Command::Resumes => {
            let resumes = client.list_resumes().await?;
            print!("{}", render_resume_list(&resumes));
        }
    }
    Ok(())
}

async fn analyze(
    client: ApiClient,
    job_url: &str,
    resume: Option<&Path>,
    save: Option<&Path>,
) -> Result<(), ClientError> {
    let resume = match resume {
        Some(path) => Some(ResumeFile::load(path).await?),
        None => None,
    };
    let form = AnalysisForm::new(job_url, resume)?;
    let session = AnalysisSession::new(client);

    eprintln!("Analyzing...");
    let mut stdout = std::io::stdout().lock();
    let result = session
        .submit(&form, |text| {
            // A closed stdout (e.g. piped into `head`) must not abort the stream.
            let _ = stdout.write_all(text.as_bytes());
            let _ = stdout.flush();
        })
        .await;
    let _ = writeln!(stdout);

    let markdown = result?;
    if let Some(path) = save {
        tokio::fs::write(path, &markdown)
            .await
            .map_err(|source| ClientError::SaveFile {
                path: path.to_path_buf(),
                source,
            })?;
        eprintln!("Saved analysis to {}", path.display());
    }
    Ok(())
}

pub fn render_resume_list(resumes: &[StoredResume]) -> String {
    if resumes.is_empty() {
        return "No resumes found. Upload your first resume to get started!\n".to_string();
    }

    let mut out = String::new();
    for resume in resumes {
        out.push_str(&format!(
            "{:<40} {:>10}  {:<20}  {}\n",
            resume.file_name,
            format_size(resume.size_bytes),
            resume.last_modified.as_deref().unwrap_or("-"),
            resume.key,
        ));
    }
    out
}

fn format_size(bytes: i64) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes.max(0) as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < KIB * KIB {
        format!("{:.1} KB", b / KIB)
    } else {
        format!("{:.1} MB", b / (KIB * KIB))
    }
}
