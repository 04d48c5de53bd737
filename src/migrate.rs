//! The interactive move: list the projects on one billing account, then ask about and move
//! each one in turn.
use crate::{Client, Error};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Invalid answers tolerated in a row before the prompt gives up.
pub const MAX_PROMPT_ATTEMPTS: usize = 32;

const PROMPT: &str = "Proceed? (y/n + enter). CTRL+C to quit\n";

/// How a completed run went.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub moved: usize,
    pub skipped: usize,
}

async fn say<W: AsyncWrite + Unpin>(out: &mut W, msg: &str) -> io::Result<()> {
    out.write_all(msg.as_bytes()).await?;
    out.flush().await
}

/// Asks whether to proceed and reads answers from `input` until one starts with `y` or `n`.
///
/// Only the first character of each line counts. Fails if `input` is exhausted or after
/// [`MAX_PROMPT_ATTEMPTS`] invalid answers.
pub async fn confirm<R, W>(input: &mut R, out: &mut W) -> crate::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();
    for _ in 0..MAX_PROMPT_ATTEMPTS {
        say(out, PROMPT).await?;
        line.clear();
        if input.read_line(&mut line).await.map_err(Error::Input)? == 0 {
            return Err(Error::Input(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "standard input closed",
            )));
        }
        if line.starts_with('y') {
            return Ok(true);
        }
        if line.starts_with('n') {
            return Ok(false);
        }
        let shown: String = line
            .chars()
            .take(1)
            .map(|c| {
                if c.is_control() {
                    c.escape_default().to_string()
                } else {
                    c.to_string()
                }
            })
            .collect();
        say(out, &format!("Invalid input [{}]\n", shown)).await?;
    }
    tracing::warn!(attempts = MAX_PROMPT_ATTEMPTS, "giving up on confirmation");
    Err(Error::Msg(
        format!("no valid answer after {} attempts", MAX_PROMPT_ATTEMPTS).into(),
    ))
}

/// Moves every project on billing account `from` to billing account `to`, asking on `out` and
/// reading the answer from `input` before each move.
///
/// Stops at the first error. Projects moved before that stay moved, and since they are no
/// longer attached to `from` they won't be offered again by a rerun.
pub async fn migrate<R, W>(
    client: &Client,
    from: &str,
    to: &str,
    input: &mut R,
    out: &mut W,
) -> crate::Result<Summary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let projects = client
        .list_projects(from)
        .await
        .map_err(|e| Error::List {
            account: from.to_owned(),
            source: Box::new(e),
        })?;
    tracing::info!(account = from, count = projects.len(), "found projects");

    let mut summary = Summary::default();
    for mut project in projects {
        let id = project.project_id.clone();
        say(
            out,
            &format!("Moving project [{}] from [{}] to [{}]\n", id, from, to),
        )
        .await?;
        if confirm(input, out).await? {
            client
                .update_billing_info(&mut project, to)
                .await
                .map_err(|e| Error::Update {
                    project: id.clone(),
                    source: Box::new(e),
                })?;
            tracing::info!(project = %id, account = to, "moved project");
            say(out, &format!("Project [{}] moved\n", id)).await?;
            summary.moved += 1;
        } else {
            tracing::info!(project = %id, "skipped project");
            say(out, &format!("Skipped [{}]\n", id)).await?;
            summary.skipped += 1;
        }
    }
    Ok(summary)
}
